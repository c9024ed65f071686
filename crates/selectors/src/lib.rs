//! Selectors Level 3 — Expression parsing and tree matching.
//! Spec: <https://www.w3.org/TR/selectors-3/>
//!
//! This crate implements the subset of the selector grammar needed to query
//! element trees produced by a host HTML parser:
//! - Type, universal, class, id, and attribute selectors with the full
//!   operator set (`=`, `~=`, `|=`, `^=`, `$=`, `*=`)
//! - Structural pseudo-classes including the `An+B` positional family
//! - Negation with arbitrary inner selectors
//! - Combinators: descendant, child, adjacent sibling, general sibling
//!
//! The engine never owns document nodes. Matching is expressed against the
//! [`TreeAdapter`] trait, which abstracts read-only navigation over whatever
//! node-handle type the host DOM uses. Expressions are parsed once per call
//! into an internal matcher tree; parse failures carry the byte offset of the
//! offending token so callers can render caret diagnostics.

#![forbid(unsafe_code)]

mod error;
mod lexer;
mod matcher;
mod parser;
mod select;

pub use error::{ParseError, ParseErrorKind};
pub use select::{Selection, select_all, select_in};

use core::hash::Hash;

/// An adapter that abstracts DOM access for selector matching.
/// Implement this for your DOM layer.
///
/// The conceptual document node is hidden from the engine: `parent` returns
/// `None` for top-level elements and [`TreeAdapter::root_sentinel`] reports
/// them, which is what `:root` keys on. Ancestor walks therefore stop below
/// the document.
pub trait TreeAdapter {
    type Handle: Copy + Eq + Hash;

    /// Parent node, or `None` when the parent is the document sentinel.
    fn parent(&self, node: Self::Handle) -> Option<Self::Handle>;

    /// First child node, if any.
    fn first_child(&self, node: Self::Handle) -> Option<Self::Handle>;

    /// Last child node, if any.
    fn last_child(&self, node: Self::Handle) -> Option<Self::Handle>;

    /// Previous sibling node (any kind, not just elements).
    fn prev_sibling(&self, node: Self::Handle) -> Option<Self::Handle>;

    /// Next sibling node (any kind, not just elements).
    fn next_sibling(&self, node: Self::Handle) -> Option<Self::Handle>;

    /// True for element nodes, false for text/comment nodes.
    fn is_element(&self, node: Self::Handle) -> bool;

    /// True for comment nodes.
    fn is_comment(&self, node: Self::Handle) -> bool;

    /// Tag name of an element; the empty string for non-elements.
    fn tag_name(&self, node: Self::Handle) -> &str;

    /// Attribute value looked up ASCII case-insensitively by name.
    /// `Some("")` means present with an empty value.
    fn attribute(&self, node: Self::Handle, name: &str) -> Option<&str>;

    /// Text length of a text node; 0 for everything else. Used by `:empty`.
    fn text_len(&self, node: Self::Handle) -> usize;

    /// True when this node's parent is the conceptual document sentinel.
    /// Defines `:root`.
    fn root_sentinel(&self, node: Self::Handle) -> bool;
}
