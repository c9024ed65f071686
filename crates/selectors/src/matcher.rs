//! Matcher trees and per-node predicate evaluation.
//! Spec: <https://www.w3.org/TR/selectors-3/> (sections 5-11)
//!
//! A parsed selector is a tree of [`Matcher`] variants owned exclusively by
//! their parent. Combinator trees are right-heavy: the rightmost
//! simple-selector sequence is the subject, and evaluation walks leftward
//! (upward or across siblings) from the candidate node.

use crate::TreeAdapter;

/// Attribute value comparison operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum AttrOp {
    /// `=` — case-insensitive equality.
    Equals,
    /// `~=` — whitespace-token list contains the value.
    Includes,
    /// `|=` — equal, or value followed by `-`.
    DashMatch,
    /// `^=` — prefix.
    Prefix,
    /// `$=` — suffix.
    Suffix,
    /// `*=` — substring.
    Substring,
}

/// A parsed `An+B` argument with non-negative coefficients.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Nth {
    pub(crate) step: u32,
    pub(crate) offset: u32,
}

impl Nth {
    /// Whether a 1-based position is in the set `{ A*k + B | k >= 0 }`.
    #[inline]
    pub(crate) fn matches_position(self, position: usize) -> bool {
        let position = u32::try_from(position).unwrap_or(u32::MAX);
        if self.step == 0 {
            position == self.offset
        } else {
            position >= self.offset && (position - self.offset) % self.step == 0
        }
    }
}

/// Structural pseudo-classes, plus a catch-all for names that parse but
/// never match (unsupported pseudo-classes and all pseudo-elements).
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum PseudoClass {
    Root,
    FirstChild,
    LastChild,
    OnlyChild,
    FirstOfType,
    LastOfType,
    OnlyOfType,
    Empty,
    NthChild(Nth),
    NthLastChild(Nth),
    NthOfType(Nth),
    NthLastOfType(Nth),
    Other(String),
}

/// Combinator relations between a candidate node and the left selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CombinatorKind {
    /// Whitespace — any ancestor.
    Descendant,
    /// `>` — the parent.
    Child,
    /// `+` — the nearest preceding element sibling.
    AdjacentSibling,
    /// `~` — any preceding element sibling.
    GeneralSibling,
    /// `*` in combinator position — any ancestor from the grandparent up.
    GrandchildOrDeeper,
}

/// One node of a matcher tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Matcher {
    /// `*` — any element.
    Universal,
    /// `E` — element with a tag name, ASCII case-insensitive.
    Type { name: String },
    /// `[a]` — attribute presence.
    Attribute { name: String },
    /// `[a <op> v]`, `#id`, `.class` — attribute value predicate.
    AttributeValue {
        name: String,
        value: String,
        op: AttrOp,
    },
    /// `:name` — structural pseudo-class.
    Pseudo { class: PseudoClass },
    /// `:not(...)`.
    Negation { inner: Box<Matcher> },
    /// A simple-selector sequence; conjunction over one node. Never empty.
    Sequence { children: Vec<Matcher> },
    /// Two selectors related by a combinator; `right` applies to the
    /// candidate node itself.
    Combinator {
        left: Box<Matcher>,
        right: Box<Matcher>,
        kind: CombinatorKind,
    },
}

impl Matcher {
    /// Evaluate this matcher against one node.
    pub(crate) fn matches<A: TreeAdapter>(&self, adapter: &A, node: A::Handle) -> bool {
        match self {
            Matcher::Universal => adapter.is_element(node),
            Matcher::Type { name } => {
                adapter.is_element(node) && adapter.tag_name(node).eq_ignore_ascii_case(name)
            }
            Matcher::Attribute { name } => adapter.attribute(node, name).is_some(),
            Matcher::AttributeValue { name, value, op } => adapter
                .attribute(node, name)
                .is_some_and(|actual| attr_value_matches(*op, actual, value)),
            Matcher::Pseudo { class } => class.matches(adapter, node),
            Matcher::Negation { inner } => !inner.matches(adapter, node),
            Matcher::Sequence { children } => {
                children.iter().all(|child| child.matches(adapter, node))
            }
            Matcher::Combinator { left, right, kind } => {
                right.matches(adapter, node) && combinator_matches(*kind, left, adapter, node)
            }
        }
    }
}

/// Evaluate the left side of a combinator from the candidate node.
fn combinator_matches<A: TreeAdapter>(
    kind: CombinatorKind,
    left: &Matcher,
    adapter: &A,
    node: A::Handle,
) -> bool {
    match kind {
        CombinatorKind::Descendant => {
            let mut current = adapter.parent(node);
            while let Some(ancestor) = current {
                if left.matches(adapter, ancestor) {
                    return true;
                }
                current = adapter.parent(ancestor);
            }
            false
        }
        CombinatorKind::GrandchildOrDeeper => {
            let mut current = adapter.parent(node).and_then(|parent| adapter.parent(parent));
            while let Some(ancestor) = current {
                if left.matches(adapter, ancestor) {
                    return true;
                }
                current = adapter.parent(ancestor);
            }
            false
        }
        CombinatorKind::Child => adapter
            .parent(node)
            .is_some_and(|parent| left.matches(adapter, parent)),
        CombinatorKind::AdjacentSibling => previous_element_sibling(adapter, node)
            .is_some_and(|sibling| left.matches(adapter, sibling)),
        CombinatorKind::GeneralSibling => {
            let mut current = previous_element_sibling(adapter, node);
            while let Some(sibling) = current {
                if left.matches(adapter, sibling) {
                    return true;
                }
                current = previous_element_sibling(adapter, sibling);
            }
            false
        }
    }
}

impl PseudoClass {
    pub(crate) fn matches<A: TreeAdapter>(&self, adapter: &A, node: A::Handle) -> bool {
        match self {
            // :empty is the one pseudo-class defined for non-element nodes.
            PseudoClass::Empty => empty_matches(adapter, node),
            _ if !adapter.is_element(node) => false,
            PseudoClass::Root => adapter.root_sentinel(node),
            PseudoClass::FirstChild => {
                first_element_in(adapter, node, Direction::Forward) == Some(node)
            }
            PseudoClass::LastChild => {
                first_element_in(adapter, node, Direction::Backward) == Some(node)
            }
            PseudoClass::OnlyChild => {
                PseudoClass::FirstChild.matches(adapter, node)
                    && PseudoClass::LastChild.matches(adapter, node)
            }
            PseudoClass::FirstOfType => {
                first_of_type_in(adapter, node, Direction::Forward) == Some(node)
            }
            PseudoClass::LastOfType => {
                first_of_type_in(adapter, node, Direction::Backward) == Some(node)
            }
            PseudoClass::OnlyOfType => {
                PseudoClass::FirstOfType.matches(adapter, node)
                    && PseudoClass::LastOfType.matches(adapter, node)
            }
            PseudoClass::NthChild(nth) => {
                sibling_position(adapter, node, Direction::Forward)
                    .is_some_and(|position| nth.matches_position(position))
            }
            PseudoClass::NthLastChild(nth) => {
                sibling_position(adapter, node, Direction::Backward)
                    .is_some_and(|position| nth.matches_position(position))
            }
            PseudoClass::NthOfType(nth) => type_position(adapter, node, Direction::Forward)
                .is_some_and(|position| nth.matches_position(position)),
            PseudoClass::NthLastOfType(nth) => type_position(adapter, node, Direction::Backward)
                .is_some_and(|position| nth.matches_position(position)),
            // Recognized syntactically but not supported: never matches.
            PseudoClass::Other(_) => false,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

/// First (or last) element among the siblings of `node`, including `node`
/// itself. `None` when the parent is the document sentinel, so the root
/// element is never first-child or last-child.
fn first_element_in<A: TreeAdapter>(
    adapter: &A,
    node: A::Handle,
    direction: Direction,
) -> Option<A::Handle> {
    let parent = adapter.parent(node)?;
    let mut current = match direction {
        Direction::Forward => adapter.first_child(parent),
        Direction::Backward => adapter.last_child(parent),
    };
    while let Some(sibling) = current {
        if adapter.is_element(sibling) {
            return Some(sibling);
        }
        current = match direction {
            Direction::Forward => adapter.next_sibling(sibling),
            Direction::Backward => adapter.prev_sibling(sibling),
        };
    }
    None
}

/// First (or last) sibling sharing `node`'s tag name, ASCII case-insensitive.
fn first_of_type_in<A: TreeAdapter>(
    adapter: &A,
    node: A::Handle,
    direction: Direction,
) -> Option<A::Handle> {
    let parent = adapter.parent(node)?;
    let tag = adapter.tag_name(node);
    let mut current = match direction {
        Direction::Forward => adapter.first_child(parent),
        Direction::Backward => adapter.last_child(parent),
    };
    while let Some(sibling) = current {
        if adapter.is_element(sibling) && adapter.tag_name(sibling).eq_ignore_ascii_case(tag) {
            return Some(sibling);
        }
        current = match direction {
            Direction::Forward => adapter.next_sibling(sibling),
            Direction::Backward => adapter.prev_sibling(sibling),
        };
    }
    None
}

/// 1-based position of `node` among all of its siblings, counted from the
/// front or the back. `None` when the parent is the document sentinel.
fn sibling_position<A: TreeAdapter>(
    adapter: &A,
    node: A::Handle,
    direction: Direction,
) -> Option<usize> {
    adapter.parent(node)?;
    let mut position = 1usize;
    let mut current = match direction {
        Direction::Forward => adapter.prev_sibling(node),
        Direction::Backward => adapter.next_sibling(node),
    };
    while let Some(sibling) = current {
        position = position.saturating_add(1);
        current = match direction {
            Direction::Forward => adapter.prev_sibling(sibling),
            Direction::Backward => adapter.next_sibling(sibling),
        };
    }
    Some(position)
}

/// 1-based position of `node` among element siblings with its tag name.
fn type_position<A: TreeAdapter>(
    adapter: &A,
    node: A::Handle,
    direction: Direction,
) -> Option<usize> {
    adapter.parent(node)?;
    let tag = adapter.tag_name(node);
    let mut position = 1usize;
    let mut current = match direction {
        Direction::Forward => adapter.prev_sibling(node),
        Direction::Backward => adapter.next_sibling(node),
    };
    while let Some(sibling) = current {
        if adapter.is_element(sibling) && adapter.tag_name(sibling).eq_ignore_ascii_case(tag) {
            position = position.saturating_add(1);
        }
        current = match direction {
            Direction::Forward => adapter.prev_sibling(sibling),
            Direction::Backward => adapter.next_sibling(sibling),
        };
    }
    Some(position)
}

/// `:empty` — an element with no children other than comments, a text node
/// of length zero, or a comment.
fn empty_matches<A: TreeAdapter>(adapter: &A, node: A::Handle) -> bool {
    if adapter.is_element(node) {
        let mut current = adapter.first_child(node);
        while let Some(child) = current {
            if !adapter.is_comment(child) {
                return false;
            }
            current = adapter.next_sibling(child);
        }
        return true;
    }
    adapter.is_comment(node) || adapter.text_len(node) == 0
}

fn previous_element_sibling<A: TreeAdapter>(adapter: &A, node: A::Handle) -> Option<A::Handle> {
    let mut current = adapter.prev_sibling(node);
    while let Some(sibling) = current {
        if adapter.is_element(sibling) {
            return Some(sibling);
        }
        current = adapter.prev_sibling(sibling);
    }
    None
}

/// Attribute value predicate. All comparisons are ASCII case-insensitive;
/// an empty requested value never matches for prefix/suffix/substring.
fn attr_value_matches(op: AttrOp, actual: &str, requested: &str) -> bool {
    match op {
        AttrOp::Equals => actual.eq_ignore_ascii_case(requested),
        AttrOp::Prefix => !requested.is_empty() && starts_with_ignore_case(actual, requested),
        AttrOp::Suffix => {
            !requested.is_empty()
                && actual.len() >= requested.len()
                && actual.as_bytes()[actual.len() - requested.len()..]
                    .eq_ignore_ascii_case(requested.as_bytes())
        }
        AttrOp::Substring => !requested.is_empty() && contains_ignore_case(actual, requested),
        AttrOp::DashMatch => {
            actual.eq_ignore_ascii_case(requested)
                || (actual.len() > requested.len()
                    && starts_with_ignore_case(actual, requested)
                    && actual.as_bytes()[requested.len()] == b'-')
        }
        AttrOp::Includes => actual
            .split_ascii_whitespace()
            .any(|word| word.eq_ignore_ascii_case(requested)),
    }
}

#[inline]
fn starts_with_ignore_case(haystack: &str, prefix: &str) -> bool {
    haystack.len() >= prefix.len()
        && haystack.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() || haystack.len() < needle.len() {
        return false;
    }
    let haystack = haystack.as_bytes();
    let needle = needle.as_bytes();
    (0..=haystack.len() - needle.len())
        .any(|start| haystack[start..start + needle.len()].eq_ignore_ascii_case(needle))
}
