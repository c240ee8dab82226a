//! Arena-backed in-memory implementation of [`DocTree`].
//!
//! Nodes live in a flat arena and are addressed by [`NodeId`]; removal only
//! detaches a node from its parent, so handles stay valid for the lifetime
//! of the tree (a session-scoped structure, like the document it models).

use std::cell::Cell;

use super::{DocTree, MarkerData, NodeKind, Position};

/// Handle to a node in a [`MemTree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    text: String,
    zero_len: bool,
    ignored: bool,
    cached_len: Cell<Option<usize>>,
    annotation_ref: Option<MarkerData>,
    marker: Option<MarkerData>,
    offset_top: i32,
}

impl NodeData {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            text: String::new(),
            zero_len: false,
            ignored: false,
            cached_len: Cell::new(None),
            annotation_ref: None,
            marker: None,
            offset_top: 0,
        }
    }
}

/// In-memory document tree with an empty container as the designated root.
#[derive(Debug)]
pub struct MemTree {
    nodes: Vec<NodeData>,
    root: NodeId,
}

impl MemTree {
    pub fn new() -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            root: NodeId(0),
        };
        tree.root = tree.alloc(NodeData::new(NodeKind::Container));
        tree
    }

    /// Append a container child.
    pub fn add_container(&mut self, parent: NodeId) -> NodeId {
        let id = self.alloc(NodeData::new(NodeKind::Container));
        self.attach(parent, id);
        id
    }

    /// Append a text leaf child.
    pub fn add_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        let mut data = NodeData::new(NodeKind::Text);
        data.text = text.to_string();
        let id = self.alloc(data);
        self.attach(parent, id);
        id
    }

    /// Append an ignorable child (a comment node equivalent).
    pub fn add_ignorable(&mut self, parent: NodeId) -> NodeId {
        let id = self.alloc(NodeData::new(NodeKind::Ignorable));
        self.attach(parent, id);
        id
    }

    pub fn set_zero_len(&mut self, node: NodeId, flag: bool) {
        self.node_mut(node).zero_len = flag;
    }

    pub fn set_ignored(&mut self, node: NodeId, flag: bool) {
        self.node_mut(node).ignored = flag;
    }

    pub fn set_annotation_ref(&mut self, node: NodeId, data: MarkerData) {
        self.node_mut(node).annotation_ref = Some(data);
    }

    /// Assign the vertical offset this node reports to the layout probe.
    pub fn set_offset_top(&mut self, node: NodeId, top: i32) {
        self.node_mut(node).offset_top = top;
    }

    /// All live marker nodes in document order.
    pub fn markers(&self) -> Vec<(NodeId, MarkerData)> {
        let mut out = Vec::new();
        self.collect_markers(self.root, &mut out);
        out
    }

    fn collect_markers(&self, node: NodeId, out: &mut Vec<(NodeId, MarkerData)>) {
        if let Some(data) = &self.node(node).marker {
            out.push((node, data.clone()));
        }
        for &child in &self.node(node).children {
            self.collect_markers(child, out);
        }
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(data);
        id
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.node_mut(child).parent = Some(parent);
        self.node_mut(parent).children.push(child);
    }

    fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.0]
    }

    fn child_index(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        self.node(parent).children.iter().position(|&c| c == child)
    }

    /// Wire `node` into the tree at the caret location `at`. Splits a text
    /// leaf when the caret falls strictly inside its payload; the split
    /// preserves every subtree length.
    fn insert_at(&mut self, at: &Position<NodeId>, node: NodeId) {
        match self.node(at.node).kind {
            NodeKind::Container => {
                let index = at.local.min(self.node(at.node).children.len());
                self.node_mut(node).parent = Some(at.node);
                self.node_mut(at.node).children.insert(index, node);
            }
            NodeKind::Text | NodeKind::Ignorable => {
                let Some(parent) = self.node(at.node).parent else {
                    return;
                };
                let Some(index) = self.child_index(parent, at.node) else {
                    return;
                };
                let len = self.payload_len(&at.node);
                let index = if at.local == 0 {
                    index
                } else if at.local >= len {
                    index + 1
                } else {
                    self.split_text(parent, index, at.node, at.local);
                    index + 1
                };
                self.node_mut(node).parent = Some(parent);
                self.node_mut(parent).children.insert(index, node);
            }
        }
    }

    /// Split a text leaf at a local character index, leaving the head in
    /// place and the tail as a new sibling right after it.
    fn split_text(&mut self, parent: NodeId, index: usize, leaf: NodeId, local: usize) {
        let byte = self
            .node(leaf)
            .text
            .char_indices()
            .nth(local)
            .map(|(b, _)| b)
            .unwrap_or_else(|| self.node(leaf).text.len());
        let tail = self.node(leaf).text[byte..].to_string();
        self.node_mut(leaf).text.truncate(byte);
        let mut data = NodeData::new(NodeKind::Text);
        data.text = tail;
        data.parent = Some(parent);
        let tail_id = self.alloc(data);
        self.node_mut(parent).children.insert(index + 1, tail_id);
    }
}

impl Default for MemTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DocTree for MemTree {
    type Node = NodeId;

    fn root(&self) -> NodeId {
        self.root
    }

    fn kind(&self, node: &NodeId) -> NodeKind {
        self.node(*node).kind
    }

    fn children(&self, node: &NodeId) -> Vec<NodeId> {
        self.node(*node).children.clone()
    }

    fn parent(&self, node: &NodeId) -> Option<NodeId> {
        self.node(*node).parent
    }

    fn prev_sibling(&self, node: &NodeId) -> Option<NodeId> {
        let parent = self.node(*node).parent?;
        let index = self.child_index(parent, *node)?;
        if index == 0 {
            None
        } else {
            Some(self.node(parent).children[index - 1])
        }
    }

    fn next_sibling(&self, node: &NodeId) -> Option<NodeId> {
        let parent = self.node(*node).parent?;
        let index = self.child_index(parent, *node)?;
        self.node(parent).children.get(index + 1).copied()
    }

    fn payload(&self, node: &NodeId) -> String {
        self.node(*node).text.clone()
    }

    fn payload_len(&self, node: &NodeId) -> usize {
        match self.node(*node).kind {
            NodeKind::Text => self.node(*node).text.chars().count(),
            _ => 0,
        }
    }

    fn cached_len(&self, node: &NodeId) -> Option<usize> {
        self.node(*node).cached_len.get()
    }

    fn store_len(&self, node: &NodeId, len: usize) {
        self.node(*node).cached_len.set(Some(len));
    }

    fn is_zero_len(&self, node: &NodeId) -> bool {
        self.node(*node).zero_len
    }

    fn is_ignored(&self, node: &NodeId) -> bool {
        self.node(*node).ignored
    }

    fn annotation_ref(&self, node: &NodeId) -> Option<MarkerData> {
        self.node(*node).annotation_ref.clone()
    }

    fn marker_of(&self, node: &NodeId) -> Option<MarkerData> {
        self.node(*node).marker.clone()
    }

    fn offset_top(&self, node: &NodeId) -> i32 {
        self.node(*node).offset_top
    }

    fn offset_parent(&self, node: &NodeId) -> Option<NodeId> {
        self.node(*node).parent
    }

    fn insert_marker_before(&mut self, at: &Position<NodeId>, data: MarkerData) -> NodeId {
        let mut node = NodeData::new(NodeKind::Container);
        node.zero_len = true;
        node.marker = Some(data);
        let id = self.alloc(node);
        self.insert_at(at, id);
        id
    }

    fn insert_probe(&mut self, at: &Position<NodeId>) -> NodeId {
        let mut node = NodeData::new(NodeKind::Container);
        node.zero_len = true;
        let id = self.alloc(node);
        let mut text = NodeData::new(NodeKind::Text);
        text.text = "\u{feff}".to_string();
        text.parent = Some(id);
        let text_id = self.alloc(text);
        self.node_mut(id).children.push(text_id);
        self.insert_at(at, id);
        id
    }

    fn remove(&mut self, node: &NodeId) {
        if let Some(parent) = self.node(*node).parent {
            if let Some(index) = self.child_index(parent, *node) {
                self.node_mut(parent).children.remove(index);
            }
        }
        self.node_mut(*node).parent = None;
    }
}
