//! Live-DOM implementation of the document tree.
//!
//! The adapter works directly on `web_sys::Node` handles: no shadow copy of
//! the document is kept. Class and data-attribute conventions match the XML
//! loader on the native side: `zero-len`, `no-capture`, `underline` with
//! `data-start`/`data-end`/`data-comment`, plus `underline-marker` for the
//! nodes this adapter inserts itself. Subtree lengths are memoized in a
//! `data-len` attribute on elements.
//!
//! Offsets here are UTF-16 code units, because that is the unit the DOM
//! `Selection` and `Range` APIs speak; payload lengths are measured in the
//! same unit so local indices line up.

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CharacterData, Document, Element, HtmlElement, Node};

use underline_core::{DocTree, MarkerData, NodeKind, Position};

const LEN_ATTR: &str = "data-len";
const MARKER_CLASS: &str = "underline-marker";

pub struct DomTree {
    document: Document,
    root: Node,
}

impl DomTree {
    /// Wrap the node acting as the text root. Everything outside it is
    /// invisible to the tree: parent and sibling lookups return `None` for
    /// the root and for any node not contained in it, so the resolvers
    /// report page chrome as detached instead of walking into it.
    pub fn new(document: Document, root: Node) -> Self {
        Self { document, root }
    }

    fn in_root(&self, node: &Node) -> bool {
        self.root.contains(Some(node))
    }

    fn as_element<'a>(&self, node: &'a Node) -> Option<&'a Element> {
        node.dyn_ref::<Element>()
    }

    fn has_class(&self, node: &Node, name: &str) -> bool {
        self.as_element(node)
            .map(|el| el.class_list().contains(name))
            .unwrap_or(false)
    }

    fn data_attr(&self, node: &Node, name: &str) -> Option<String> {
        self.as_element(node)?.get_attribute(name)
    }

    /// Insert `node` at a caret location via a collapsed DOM range. The
    /// range machinery splits a text node when the caret falls inside one,
    /// exactly the split the in-memory tree performs by hand.
    fn insert_at(&self, at: &Position<Node>, node: &Node) {
        let range = self
            .document
            .create_range()
            .expect_throw("failed to create a DOM range");
        range
            .set_start(&at.node, at.local as u32)
            .expect_throw("caret location is not a valid range start");
        range
            .insert_node(node)
            .expect_throw("failed to insert into the document");
    }
}

impl DocTree for DomTree {
    type Node = Node;

    fn root(&self) -> Node {
        self.root.clone()
    }

    fn kind(&self, node: &Node) -> NodeKind {
        match node.node_type() {
            Node::ELEMENT_NODE => NodeKind::Container,
            Node::TEXT_NODE | Node::CDATA_SECTION_NODE => NodeKind::Text,
            Node::COMMENT_NODE | Node::PROCESSING_INSTRUCTION_NODE => NodeKind::Ignorable,
            other => panic!("unsupported node type {other} inside the text root"),
        }
    }

    fn children(&self, node: &Node) -> Vec<Node> {
        let list = node.child_nodes();
        (0..list.length()).filter_map(|i| list.item(i)).collect()
    }

    fn parent(&self, node: &Node) -> Option<Node> {
        if *node == self.root || !self.in_root(node) {
            return None;
        }
        node.parent_node()
    }

    fn prev_sibling(&self, node: &Node) -> Option<Node> {
        if *node == self.root || !self.in_root(node) {
            return None;
        }
        node.previous_sibling()
    }

    fn next_sibling(&self, node: &Node) -> Option<Node> {
        if *node == self.root || !self.in_root(node) {
            return None;
        }
        node.next_sibling()
    }

    fn payload(&self, node: &Node) -> String {
        node.dyn_ref::<CharacterData>()
            .map(|data| data.data())
            .unwrap_or_default()
    }

    fn payload_len(&self, node: &Node) -> usize {
        // UTF-16 units, to match DOM selection offsets.
        self.payload(node).encode_utf16().count()
    }

    fn payload_slice(&self, node: &Node, lo: usize, hi: usize) -> String {
        let units: Vec<u16> = self.payload(node).encode_utf16().collect();
        let hi = hi.min(units.len());
        let lo = lo.min(hi);
        String::from_utf16_lossy(&units[lo..hi])
    }

    fn cached_len(&self, node: &Node) -> Option<usize> {
        self.data_attr(node, LEN_ATTR)?.parse().ok()
    }

    fn store_len(&self, node: &Node, len: usize) {
        if let Some(el) = self.as_element(node) {
            let _ = el.set_attribute(LEN_ATTR, &len.to_string());
        }
    }

    fn is_zero_len(&self, node: &Node) -> bool {
        self.has_class(node, "zero-len")
    }

    fn is_ignored(&self, node: &Node) -> bool {
        self.has_class(node, "no-capture")
    }

    fn annotation_ref(&self, node: &Node) -> Option<MarkerData> {
        if !self.has_class(node, "underline") {
            return None;
        }
        let comment = self.data_attr(node, "data-comment");
        let start = self.data_attr(node, "data-start")?.parse().ok()?;
        let end = self.data_attr(node, "data-end")?.parse().ok()?;
        Some(MarkerData::new(start, end, comment))
    }

    fn marker_of(&self, node: &Node) -> Option<MarkerData> {
        if !self.has_class(node, MARKER_CLASS) {
            return None;
        }
        let comment = self.data_attr(node, "title").filter(|t| !t.is_empty());
        let start = self.data_attr(node, "data-start")?.parse().ok()?;
        let end = self.data_attr(node, "data-end")?.parse().ok()?;
        Some(MarkerData::new(start, end, comment))
    }

    fn offset_top(&self, node: &Node) -> i32 {
        node.dyn_ref::<HtmlElement>()
            .map(|el| el.offset_top())
            .unwrap_or(0)
    }

    fn offset_parent(&self, node: &Node) -> Option<Node> {
        let el = node.dyn_ref::<HtmlElement>()?;
        el.offset_parent().map(Into::into)
    }

    fn insert_marker_before(&mut self, at: &Position<Node>, data: MarkerData) -> Node {
        let span = self
            .document
            .create_element("span")
            .expect_throw("failed to create a marker element");
        span.set_class_name(&format!("{MARKER_CLASS} zero-len"));
        let _ = span.set_attribute("data-start", &data.start.to_string());
        let _ = span.set_attribute("data-end", &data.end.to_string());
        if let Some(comment) = &data.comment {
            let _ = span.set_attribute("title", comment);
        }
        span.set_text_content(Some("\u{270e}"));

        let node: Node = span.into();
        self.insert_at(at, &node);
        node
    }

    fn insert_probe(&mut self, at: &Position<Node>) -> Node {
        let span = self
            .document
            .create_element("span")
            .expect_throw("failed to create a probe element");
        span.set_class_name("zero-len");
        // position: relative makes the probe its own offset box, so
        // offsetTop reads are stable wherever the caret landed.
        let _ = span.set_attribute("style", "position: relative");
        span.set_text_content(Some("\u{feff}"));

        let node: Node = span.into();
        self.insert_at(at, &node);
        node
    }

    fn remove(&mut self, node: &Node) {
        if let Some(parent) = node.parent_node() {
            let _ = parent.remove_child(node);
        }
    }
}
