//! Arena-backed document trees for selector matching.
//!
//! A [`Document`] stores element, text, and comment nodes in an
//! `indextree::Arena` under a hidden document node and implements the
//! engine's [`TreeAdapter`], hiding the sentinel: the root element's parent
//! reads as `None` and [`TreeAdapter::root_sentinel`] reports it, which is
//! what `:root` and the ancestor walks key on.
//!
//! Trees are built programmatically; parsing HTML into a `Document` is the
//! host application's job.

#![forbid(unsafe_code)]

use indextree::{Arena, NodeId};
use selectors::{ParseError, Selection, TreeAdapter, select_all};
use std::fmt::Write as _;

/// Payload of one tree node.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum NodeData {
    /// The hidden document sentinel; exactly one per tree.
    #[default]
    Document,
    Element {
        tag: String,
        /// Attributes in insertion order; names are matched ASCII
        /// case-insensitively on lookup.
        attrs: Vec<(String, String)>,
    },
    Text {
        text: String,
    },
    Comment {
        text: String,
    },
}

/// An element/text/comment tree with a hidden document root.
#[derive(Debug)]
pub struct Document {
    arena: Arena<NodeData>,
    document: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let document = arena.new_node(NodeData::Document);
        Self { arena, document }
    }

    /// The document sentinel. Use it as the parent of top-level elements.
    #[inline]
    pub fn document_id(&self) -> NodeId {
        self.document
    }

    /// Append an element node under `parent` and return its id.
    pub fn append_element(&mut self, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let data = NodeData::Element {
            tag: tag.to_owned(),
            attrs: attrs
                .iter()
                .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
                .collect(),
        };
        self.append(parent, data)
    }

    /// Append a text node under `parent` and return its id.
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.append(
            parent,
            NodeData::Text {
                text: text.to_owned(),
            },
        )
    }

    /// Append a comment node under `parent` and return its id.
    pub fn append_comment(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.append(
            parent,
            NodeData::Comment {
                text: text.to_owned(),
            },
        )
    }

    fn append(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        let node = self.arena.new_node(data);
        parent.append(node, &mut self.arena);
        node
    }

    /// Top-level nodes (the document sentinel's children), in order.
    pub fn top_level(&self) -> Vec<NodeId> {
        self.document.children(&self.arena).collect()
    }

    /// Payload of a node. Stale ids read as the document sentinel.
    pub fn data(&self, node: NodeId) -> &NodeData {
        static SENTINEL: NodeData = NodeData::Document;
        self.arena
            .get(node)
            .map(indextree::Node::get)
            .unwrap_or(&SENTINEL)
    }

    /// Run a selector expression against the whole tree.
    ///
    /// # Errors
    /// Returns the engine's positional [`ParseError`] on a syntax error.
    pub fn select(&self, expr: &str) -> Result<Selection<NodeId>, ParseError> {
        select_all(self, &self.top_level(), expr)
    }

    /// Render an element's opening tag, e.g. `<p title="t2" lang="en-gb">`.
    /// Intended for test diagnostics and assertions.
    pub fn opening_tag(&self, node: NodeId) -> String {
        match self.data(node) {
            NodeData::Element { tag, attrs } => {
                let mut out = String::new();
                out.push('<');
                out.push_str(tag);
                for (name, value) in attrs {
                    let _ = write!(out, " {}=\"{}\"", name, value);
                }
                out.push('>');
                out
            }
            NodeData::Text { text } => format!("#text({})", text),
            NodeData::Comment { .. } => String::from("<!---->"),
            NodeData::Document => String::from("#document"),
        }
    }

    fn node(&self, id: NodeId) -> Option<&indextree::Node<NodeData>> {
        self.arena.get(id)
    }
}

impl TreeAdapter for Document {
    type Handle = NodeId;

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.node(node)?.parent()?;
        (parent != self.document).then_some(parent)
    }

    fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.node(node)?.first_child()
    }

    fn last_child(&self, node: NodeId) -> Option<NodeId> {
        self.node(node)?.last_child()
    }

    fn prev_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.node(node)?.previous_sibling()
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.node(node)?.next_sibling()
    }

    fn is_element(&self, node: NodeId) -> bool {
        matches!(self.data(node), NodeData::Element { .. })
    }

    fn is_comment(&self, node: NodeId) -> bool {
        matches!(self.data(node), NodeData::Comment { .. })
    }

    fn tag_name(&self, node: NodeId) -> &str {
        match self.data(node) {
            NodeData::Element { tag, .. } => tag,
            _ => "",
        }
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        match self.data(node) {
            NodeData::Element { attrs, .. } => attrs
                .iter()
                .find(|(attr_name, _)| attr_name.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.as_str()),
            _ => None,
        }
    }

    fn text_len(&self, node: NodeId) -> usize {
        match self.data(node) {
            NodeData::Text { text } => text.len(),
            _ => 0,
        }
    }

    fn root_sentinel(&self, node: NodeId) -> bool {
        self.node(node)
            .and_then(indextree::Node::parent)
            .is_some_and(|parent| parent == self.document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_paragraphs() -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = Document::new();
        let html = doc.append_element(doc.document_id(), "html", &[]);
        let first = doc.append_element(html, "p", &[("id", "a")]);
        let second = doc.append_element(html, "p", &[("Lang", "en-gb")]);
        (doc, html, first, second)
    }

    #[test]
    fn sentinel_is_hidden_from_parent_navigation() {
        let (doc, html, first, _) = two_paragraphs();
        assert_eq!(doc.parent(html), None);
        assert!(doc.root_sentinel(html));
        assert_eq!(doc.parent(first), Some(html));
        assert!(!doc.root_sentinel(first));
    }

    #[test]
    fn attribute_lookup_is_case_insensitive_on_names() {
        let (doc, _, _, second) = two_paragraphs();
        assert_eq!(doc.attribute(second, "lang"), Some("en-gb"));
        assert_eq!(doc.attribute(second, "LANG"), Some("en-gb"));
        assert_eq!(doc.attribute(second, "title"), None);
    }

    #[test]
    fn select_runs_against_the_whole_tree() {
        let (doc, _, first, second) = two_paragraphs();
        let selection = doc.select("p").expect("valid selector");
        assert_eq!(selection.nodes(), &[first, second]);
        let selection = doc.select("#a").expect("valid selector");
        assert_eq!(selection.nodes(), &[first]);
    }

    #[test]
    fn opening_tag_renders_attributes_in_order() {
        let mut doc = Document::new();
        let html = doc.append_element(doc.document_id(), "html", &[]);
        let p = doc.append_element(html, "p", &[("title", "t2"), ("lang", "en-gb")]);
        assert_eq!(doc.opening_tag(p), "<p title=\"t2\" lang=\"en-gb\">");
    }

    #[test]
    fn text_and_comment_nodes_are_not_elements() {
        let mut doc = Document::new();
        let html = doc.append_element(doc.document_id(), "html", &[]);
        let text = doc.append_text(html, "hello");
        let comment = doc.append_comment(html, " c ");
        assert!(!doc.is_element(text));
        assert!(doc.is_comment(comment));
        assert_eq!(doc.text_len(text), 5);
        assert_eq!(doc.tag_name(text), "");
    }
}
