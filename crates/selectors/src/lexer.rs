//! CSS selector tokenizer.
//! Spec: <https://www.w3.org/TR/selectors-3/#lex>
//!
//! Whitespace is emitted as an explicit token because whitespace between
//! simple-selector sequences is the descendant combinator. The tokenizer
//! never fails; input it cannot classify comes out as single-character
//! [`TokenKind::Delim`] tokens, which the parser rejects with a positional
//! error.

/// Token kinds of the selector grammar.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum TokenKind {
    /// An identifier, escapes decoded.
    Ident,
    /// A quoted string; the token text keeps the surrounding quotes, inner
    /// escapes are decoded.
    String,
    /// `#` followed by a name; the token text is the name without the `#`.
    Hash,
    /// An identifier immediately followed by `(`; the token text is the name
    /// without the parenthesis.
    Function,
    /// A run of decimal digits.
    Number,
    /// A run of whitespace.
    Space,
    /// `~=`
    Includes,
    /// `|=`
    DashMatch,
    /// `^=`
    PrefixMatch,
    /// `$=`
    SuffixMatch,
    /// `*=`
    SubstringMatch,
    /// The sequence `:not(`, case-insensitive.
    Not,
    /// `+`
    Plus,
    /// `>`
    Greater,
    /// `~`
    Tilde,
    /// `,`
    Comma,
    /// Any other single character.
    Delim(char),
    /// End of input.
    End,
}

#[derive(Clone, Debug)]
pub(crate) struct Token {
    pub(crate) kind: TokenKind,
    pub(crate) text: String,
}

/// Tokenizer over a selector string, tracking byte offsets for diagnostics.
pub(crate) struct Lexer<'input> {
    input: &'input str,
    /// Byte offset just past the last emitted token.
    cursor: usize,
    /// Byte offset of the first byte of the last emitted token.
    token_start: usize,
}

#[inline]
fn is_css_space(character: char) -> bool {
    matches!(character, ' ' | '\t' | '\r' | '\n' | '\u{c}')
}

#[inline]
fn is_name_start(character: char) -> bool {
    character == '_' || character.is_ascii_alphabetic() || !character.is_ascii()
}

#[inline]
fn is_name_char(character: char) -> bool {
    is_name_start(character) || character.is_ascii_digit() || character == '-'
}

impl<'input> Lexer<'input> {
    pub(crate) fn new(input: &'input str) -> Self {
        Self {
            input,
            cursor: 0,
            token_start: 0,
        }
    }

    /// Byte offset of the first byte of the last token returned by `next`.
    #[inline]
    pub(crate) fn last_token_start(&self) -> usize {
        self.token_start
    }

    #[inline]
    fn peek(&self) -> Option<char> {
        self.input.get(self.cursor..)?.chars().next()
    }

    #[inline]
    fn peek_at(&self, offset: usize) -> Option<char> {
        self.input
            .get(self.cursor.saturating_add(offset)..)?
            .chars()
            .next()
    }

    #[inline]
    fn bump(&mut self, character: char) {
        self.cursor = self.cursor.saturating_add(character.len_utf8());
    }

    /// Return the next token and advance past it.
    pub(crate) fn next(&mut self) -> Token {
        self.token_start = self.cursor;
        let Some(current) = self.peek() else {
            return Token {
                kind: TokenKind::End,
                text: String::new(),
            };
        };

        if is_css_space(current) {
            while matches!(self.peek(), Some(c) if is_css_space(c)) {
                self.cursor = self.cursor.saturating_add(1);
            }
            return Token {
                kind: TokenKind::Space,
                text: String::from(" "),
            };
        }

        if current == '"' || current == '\'' {
            return self.lex_string(current);
        }

        if current.is_ascii_digit() {
            let start = self.cursor;
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.cursor = self.cursor.saturating_add(1);
            }
            let text = self.input.get(start..self.cursor).unwrap_or("").to_owned();
            return Token {
                kind: TokenKind::Number,
                text,
            };
        }

        if current == '#' {
            if matches!(self.peek_at(1), Some(c) if is_name_char(c) || c == '\\') {
                self.bump('#');
                let name = self.lex_name();
                return Token {
                    kind: TokenKind::Hash,
                    text: name,
                };
            }
            self.bump('#');
            return Token {
                kind: TokenKind::Delim('#'),
                text: String::from("#"),
            };
        }

        if current == ':' && self.rest_starts_with_not() {
            self.cursor = self.cursor.saturating_add(5);
            return Token {
                kind: TokenKind::Not,
                text: String::from(":not("),
            };
        }

        // Two-character match operators.
        if matches!(current, '~' | '|' | '^' | '$' | '*') && self.peek_at(1) == Some('=') {
            self.cursor = self.cursor.saturating_add(2);
            let kind = match current {
                '~' => TokenKind::Includes,
                '|' => TokenKind::DashMatch,
                '^' => TokenKind::PrefixMatch,
                '$' => TokenKind::SuffixMatch,
                _ => TokenKind::SubstringMatch,
            };
            return Token {
                kind,
                text: format!("{}=", current),
            };
        }

        if let Some(kind) = match current {
            '+' => Some(TokenKind::Plus),
            '>' => Some(TokenKind::Greater),
            '~' => Some(TokenKind::Tilde),
            ',' => Some(TokenKind::Comma),
            _ => None,
        } {
            self.bump(current);
            return Token {
                kind,
                text: current.to_string(),
            };
        }

        let starts_ident = is_name_start(current)
            || current == '\\'
            || (current == '-'
                && matches!(self.peek_at(1), Some(c) if is_name_start(c) || c == '\\'));
        if starts_ident {
            let name = self.lex_name();
            if self.peek() == Some('(') {
                self.bump('(');
                return Token {
                    kind: TokenKind::Function,
                    text: name,
                };
            }
            return Token {
                kind: TokenKind::Ident,
                text: name,
            };
        }

        self.bump(current);
        Token {
            kind: TokenKind::Delim(current),
            text: current.to_string(),
        }
    }

    /// True when the input at the cursor reads `:not(` case-insensitively.
    fn rest_starts_with_not(&self) -> bool {
        self.input
            .get(self.cursor..)
            .is_some_and(|rest| rest.len() >= 5 && rest.as_bytes()[..5].eq_ignore_ascii_case(b":not("))
    }

    /// Consume an identifier body, decoding escapes into their characters.
    fn lex_name(&mut self) -> String {
        let mut out = String::new();
        while let Some(character) = self.peek() {
            if is_name_char(character) {
                out.push(character);
                self.bump(character);
            } else if character == '\\' {
                self.bump('\\');
                if let Some(decoded) = self.lex_escape() {
                    out.push(decoded);
                }
            } else {
                break;
            }
        }
        out
    }

    /// Decode one escape sequence; the backslash is already consumed.
    ///
    /// Either 1-6 hex digits (optionally followed by a single whitespace,
    /// which is consumed) naming a code point, or any single non-newline
    /// character taken literally.
    fn lex_escape(&mut self) -> Option<char> {
        let mut value = 0u32;
        let mut digits = 0usize;
        while digits < 6 {
            match self.peek() {
                Some(character) if character.is_ascii_hexdigit() => {
                    value = value
                        .saturating_mul(16)
                        .saturating_add(character.to_digit(16).unwrap_or(0));
                    self.bump(character);
                    digits = digits.saturating_add(1);
                }
                _ => break,
            }
        }
        if digits > 0 {
            if matches!(self.peek(), Some(c) if is_css_space(c)) {
                self.cursor = self.cursor.saturating_add(1);
            }
            return Some(char::from_u32(value).unwrap_or('\u{fffd}'));
        }
        match self.peek() {
            Some('\n') | None => None,
            Some(character) => {
                self.bump(character);
                Some(character)
            }
        }
    }

    /// Lex a quoted string. The token text keeps the surrounding quotes so
    /// the parser can tell strings from identifiers; inner escapes are
    /// decoded, and a backslash-newline pair is a line continuation.
    fn lex_string(&mut self, quote: char) -> Token {
        let mut text = String::new();
        text.push(quote);
        self.bump(quote);
        while let Some(character) = self.peek() {
            if character == quote {
                self.bump(quote);
                break;
            }
            if character == '\\' {
                self.bump('\\');
                if self.peek() == Some('\n') {
                    self.bump('\n');
                    continue;
                }
                if let Some(decoded) = self.lex_escape() {
                    text.push(decoded);
                }
                continue;
            }
            text.push(character);
            self.bump(character);
        }
        text.push(quote);
        Token {
            kind: TokenKind::String,
            text,
        }
    }
}
