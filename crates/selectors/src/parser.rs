//! Recursive-descent selector parsing.
//! Spec: <https://www.w3.org/TR/selectors-3/#grammar>
//!
//! The parser keeps one token of lookahead over the lexer. Whitespace
//! discipline: an `S` token between simple-selector sequences records a
//! pending descendant combinator, which an explicit `>`, `+`, `~` or `*`
//! overrides; trailing whitespace before `,` or end of input is discarded.

use crate::error::{ParseError, ParseErrorKind};
use crate::lexer::{Lexer, Token, TokenKind};
use crate::matcher::{AttrOp, CombinatorKind, Matcher, Nth, PseudoClass};
use log::trace;

/// Parse a comma-separated selector group into one matcher tree per
/// selector. An empty input produces an empty group.
pub(crate) fn parse_group(input: &str) -> Result<Vec<Matcher>, ParseError> {
    let mut parser = Parser::new(input);
    let mut group = Vec::new();
    loop {
        parser.skip_space();
        if parser.token.kind == TokenKind::End {
            break;
        }
        group.push(parser.parse_selector()?);
        match parser.token.kind {
            TokenKind::Comma => parser.bump(),
            TokenKind::End => break,
            _ => return Err(parser.error(ParseErrorKind::TrailingGarbage)),
        }
    }
    trace!("parsed {} selector(s)", group.len());
    Ok(group)
}

struct Parser<'input> {
    lexer: Lexer<'input>,
    token: Token,
}

impl<'input> Parser<'input> {
    fn new(input: &'input str) -> Self {
        let mut lexer = Lexer::new(input);
        let token = lexer.next();
        Self { lexer, token }
    }

    #[inline]
    fn bump(&mut self) {
        self.token = self.lexer.next();
    }

    #[inline]
    fn skip_space(&mut self) {
        if self.token.kind == TokenKind::Space {
            self.bump();
        }
    }

    /// An error positioned at the first byte of the current token.
    #[inline]
    fn error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError::new(self.lexer.last_token_start(), kind)
    }

    fn expect_delim(&mut self, wanted: char) -> Result<(), ParseError> {
        if self.token.kind == TokenKind::Delim(wanted) {
            self.bump();
            Ok(())
        } else {
            Err(self.error(ParseErrorKind::ExpectedChar(wanted)))
        }
    }

    /// selector := simpleSeq (combinator simpleSeq)*
    ///
    /// Builds a left-leaning chain of combinator nodes so that the rightmost
    /// sequence stays the subject.
    fn parse_selector(&mut self) -> Result<Matcher, ParseError> {
        self.skip_space();
        let mut selector = self.parse_simple_sequence()?;

        loop {
            let mut saw_space = false;
            if self.token.kind == TokenKind::Space {
                saw_space = true;
                self.bump();
            }

            let explicit = match self.token.kind {
                TokenKind::Plus => Some(CombinatorKind::AdjacentSibling),
                TokenKind::Greater => Some(CombinatorKind::Child),
                TokenKind::Tilde => Some(CombinatorKind::GeneralSibling),
                TokenKind::Delim('*') => Some(CombinatorKind::GrandchildOrDeeper),
                _ => None,
            };

            let kind = match explicit {
                Some(kind) => {
                    self.bump();
                    self.skip_space();
                    kind
                }
                None => {
                    // Trailing whitespace before a group separator, a
                    // negation close, or the end is not a combinator.
                    let ends_selector = matches!(
                        self.token.kind,
                        TokenKind::End | TokenKind::Comma | TokenKind::Delim(')')
                    );
                    if !saw_space || ends_selector {
                        return Ok(selector);
                    }
                    CombinatorKind::Descendant
                }
            };

            trace!("combinator {:?}", kind);
            let right = self.parse_simple_sequence()?;
            selector = Matcher::Combinator {
                left: Box::new(selector),
                right: Box::new(right),
                kind,
            };
        }
    }

    /// simpleSeq := (type | universal)? suffix*, at least one component.
    fn parse_simple_sequence(&mut self) -> Result<Matcher, ParseError> {
        let mut children = Vec::new();

        match self.token.kind {
            TokenKind::Ident => {
                children.push(Matcher::Type {
                    name: self.token.text.clone(),
                });
                self.bump();
            }
            TokenKind::Delim('*') => {
                children.push(Matcher::Universal);
                self.bump();
            }
            _ => {}
        }

        loop {
            match self.token.kind {
                TokenKind::Hash => {
                    children.push(Matcher::AttributeValue {
                        name: String::from("id"),
                        value: self.token.text.clone(),
                        op: AttrOp::Equals,
                    });
                    self.bump();
                }
                TokenKind::Delim('.') => {
                    self.bump();
                    if self.token.kind != TokenKind::Ident {
                        return Err(self.error(ParseErrorKind::ExpectedIdent));
                    }
                    children.push(Matcher::AttributeValue {
                        name: String::from("class"),
                        value: self.token.text.clone(),
                        op: AttrOp::Includes,
                    });
                    self.bump();
                }
                TokenKind::Delim('[') => children.push(self.parse_attribute()?),
                TokenKind::Delim(':') => children.push(self.parse_pseudo()?),
                TokenKind::Not => {
                    self.bump();
                    let inner = self.parse_selector()?;
                    self.expect_delim(')')?;
                    children.push(Matcher::Negation {
                        inner: Box::new(inner),
                    });
                }
                _ => break,
            }
        }

        if children.is_empty() {
            return Err(self.error(ParseErrorKind::ExpectedIdent));
        }
        Ok(Matcher::Sequence { children })
    }

    /// `[` S? name S? (op S? value S?)? `]`
    fn parse_attribute(&mut self) -> Result<Matcher, ParseError> {
        self.bump();
        self.skip_space();
        if self.token.kind != TokenKind::Ident {
            return Err(self.error(ParseErrorKind::ExpectedIdent));
        }
        let name = self.token.text.clone();
        self.bump();
        self.skip_space();

        if self.token.kind == TokenKind::Delim(']') {
            self.bump();
            return Ok(Matcher::Attribute { name });
        }

        let op = match self.token.kind {
            TokenKind::Includes => AttrOp::Includes,
            TokenKind::DashMatch => AttrOp::DashMatch,
            TokenKind::PrefixMatch => AttrOp::Prefix,
            TokenKind::SuffixMatch => AttrOp::Suffix,
            TokenKind::SubstringMatch => AttrOp::Substring,
            TokenKind::Delim('=') => AttrOp::Equals,
            _ => return Err(self.error(ParseErrorKind::InvalidAttributeOperator)),
        };
        self.bump();
        self.skip_space();

        let value = match self.token.kind {
            TokenKind::String => strip_quotes(&self.token.text),
            TokenKind::Ident => self.token.text.clone(),
            _ => return Err(self.error(ParseErrorKind::ExpectedStringOrIdent)),
        };
        self.bump();
        self.skip_space();
        self.expect_delim(']')?;

        Ok(Matcher::AttributeValue { name, value, op })
    }

    /// `:` `:`? (ident | function) — `::x` parses like `:x` with a marker
    /// name so pseudo-elements are accepted but never match.
    fn parse_pseudo(&mut self) -> Result<Matcher, ParseError> {
        self.bump();
        let mut element = false;
        if self.token.kind == TokenKind::Delim(':') {
            element = true;
            self.bump();
        }

        match self.token.kind {
            TokenKind::Ident => {
                let name = self.token.text.to_ascii_lowercase();
                self.bump();
                let class = if element {
                    PseudoClass::Other(format!(":{}", name))
                } else {
                    resolve_pseudo_class(&name)
                };
                Ok(Matcher::Pseudo { class })
            }
            TokenKind::Function => {
                let name = self.token.text.to_ascii_lowercase();
                self.bump();
                let nth_kind = if element { None } else { nth_pseudo(&name) };
                match nth_kind {
                    Some(build) => {
                        let nth = self.parse_nth_argument()?;
                        Ok(Matcher::Pseudo { class: build(nth) })
                    }
                    None => {
                        // Unsupported functional pseudo: consume the balanced
                        // argument and match nothing.
                        self.skip_to_close_paren()?;
                        Ok(Matcher::Pseudo {
                            class: PseudoClass::Other(name),
                        })
                    }
                }
            }
            _ => Err(self.error(ParseErrorKind::ExpectedIdentOrFunction)),
        }
    }

    /// `An+B` microsyntax with non-negative coefficients:
    /// odd | even | B | An | An+B | n | n+B, then `)`.
    fn parse_nth_argument(&mut self) -> Result<Nth, ParseError> {
        self.skip_space();
        let nth = match self.token.kind {
            TokenKind::Ident if self.token.text.eq_ignore_ascii_case("odd") => {
                self.bump();
                Nth { step: 2, offset: 1 }
            }
            TokenKind::Ident if self.token.text.eq_ignore_ascii_case("even") => {
                self.bump();
                Nth { step: 2, offset: 0 }
            }
            TokenKind::Ident if self.token.text.eq_ignore_ascii_case("n") => {
                self.bump();
                let offset = self.parse_nth_offset()?;
                Nth { step: 1, offset }
            }
            TokenKind::Number => {
                let leading = self.parse_number()?;
                self.bump();
                match self.token.kind {
                    TokenKind::Ident if self.token.text.eq_ignore_ascii_case("n") => {
                        self.bump();
                        let offset = self.parse_nth_offset()?;
                        Nth {
                            step: leading,
                            offset,
                        }
                    }
                    // `2n-4` lexes as the identifier `n-4`; negative offsets
                    // are rejected.
                    TokenKind::Ident => {
                        return Err(self.error(ParseErrorKind::InvalidNthArgument));
                    }
                    _ => Nth {
                        step: 0,
                        offset: leading,
                    },
                }
            }
            _ => return Err(self.error(ParseErrorKind::InvalidNthArgument)),
        };
        self.skip_space();
        self.expect_delim(')')?;
        Ok(nth)
    }

    /// Optional `+ B` after the `n` of an `An+B` argument.
    fn parse_nth_offset(&mut self) -> Result<u32, ParseError> {
        self.skip_space();
        if self.token.kind != TokenKind::Plus {
            return Ok(0);
        }
        self.bump();
        self.skip_space();
        if self.token.kind != TokenKind::Number {
            return Err(self.error(ParseErrorKind::InvalidNthArgument));
        }
        let offset = self.parse_number()?;
        self.bump();
        Ok(offset)
    }

    fn parse_number(&mut self) -> Result<u32, ParseError> {
        self.token
            .text
            .parse::<u32>()
            .map_err(|_| self.error(ParseErrorKind::InvalidNthArgument))
    }

    /// Skip tokens up to and past the `)` closing the current function,
    /// balancing any nested parentheses.
    fn skip_to_close_paren(&mut self) -> Result<(), ParseError> {
        let mut depth = 1usize;
        loop {
            match self.token.kind {
                TokenKind::End => return Err(self.error(ParseErrorKind::ExpectedChar(')'))),
                TokenKind::Function | TokenKind::Not | TokenKind::Delim('(') => {
                    depth = depth.saturating_add(1);
                }
                TokenKind::Delim(')') => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        self.bump();
                        return Ok(());
                    }
                }
                _ => {}
            }
            self.bump();
        }
    }
}

#[inline]
fn strip_quotes(text: &str) -> String {
    text.get(1..text.len().saturating_sub(1))
        .unwrap_or("")
        .to_owned()
}

fn resolve_pseudo_class(name: &str) -> PseudoClass {
    match name {
        "root" => PseudoClass::Root,
        "first-child" => PseudoClass::FirstChild,
        "last-child" => PseudoClass::LastChild,
        "only-child" => PseudoClass::OnlyChild,
        "first-of-type" => PseudoClass::FirstOfType,
        "last-of-type" => PseudoClass::LastOfType,
        "only-of-type" => PseudoClass::OnlyOfType,
        "empty" => PseudoClass::Empty,
        _ => PseudoClass::Other(name.to_owned()),
    }
}

type NthBuilder = fn(Nth) -> PseudoClass;

fn nth_pseudo(name: &str) -> Option<NthBuilder> {
    match name {
        "nth-child" => Some(PseudoClass::NthChild as NthBuilder),
        "nth-last-child" => Some(PseudoClass::NthLastChild as NthBuilder),
        "nth-of-type" => Some(PseudoClass::NthOfType as NthBuilder),
        "nth-last-of-type" => Some(PseudoClass::NthLastOfType as NthBuilder),
        _ => None,
    }
}
