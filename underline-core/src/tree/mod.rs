//! The abstract document tree the rest of the crate is written against.
//!
//! A document is an ordered, rooted tree of [`NodeKind::Container`],
//! [`NodeKind::Text`] and [`NodeKind::Ignorable`] nodes. The designated root
//! is the node acting as the text root: global offset 0 starts there.
//! Concrete trees implement [`DocTree`]; the crate ships [`MemTree`] and the
//! web frontend implements the same trait over live DOM nodes.

mod mem;
mod xml;

pub use mem::{MemTree, NodeId};
pub use xml::ParseError;

use serde::{Deserialize, Serialize};

/// Node kinds in the document tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Element with ordered children.
    Container,
    /// Leaf with a literal character payload.
    Text,
    /// Contributes nothing to the visible text (comments and the like).
    Ignorable,
}

/// An exact caret location: a node plus a local character index inside it.
///
/// Invariant: `0 <= local <= payload_len(node)` for `Text` nodes; for a
/// childless container the only valid local index is 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position<N> {
    pub node: N,
    pub local: usize,
}

impl<N> Position<N> {
    pub fn new(node: N, local: usize) -> Self {
        Self { node, local }
    }
}

/// The offset range and optional comment carried by an underline marker, and
/// equally by a persisted annotation reference found in the loaded document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerData {
    pub start: usize,
    pub end: usize,
    pub comment: Option<String>,
}

impl MarkerData {
    pub fn new(start: usize, end: usize, comment: Option<String>) -> Self {
        Self {
            start,
            end,
            comment,
        }
    }

    /// True when `offset` falls inside the annotated range.
    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end
    }
}

/// Read and mutation access to one document tree.
///
/// The parent link is a non-owning lookup relation; children are the single
/// ownership edge. Metadata accessors take `&self` (the length cache is
/// interiorly mutable) so the resolvers can stay read-only.
pub trait DocTree {
    type Node: Clone + PartialEq;

    /// The designated text root. Global offset 0 is the start of this node.
    fn root(&self) -> Self::Node;

    fn kind(&self, node: &Self::Node) -> NodeKind;
    fn children(&self, node: &Self::Node) -> Vec<Self::Node>;
    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;
    fn prev_sibling(&self, node: &Self::Node) -> Option<Self::Node>;
    fn next_sibling(&self, node: &Self::Node) -> Option<Self::Node>;

    /// Literal content of a `Text` node; empty for other kinds.
    fn payload(&self, node: &Self::Node) -> String;

    /// Character count of a `Text` node's payload; 0 for other kinds.
    /// Counted in whatever unit the implementation's local indices use:
    /// `char`s for [`MemTree`], UTF-16 code units for the DOM adapter.
    fn payload_len(&self, node: &Self::Node) -> usize;

    /// Substring of a `Text` payload between two local indices, in the same
    /// unit [`Self::payload_len`] counts.
    fn payload_slice(&self, node: &Self::Node, lo: usize, hi: usize) -> String {
        self.payload(node)
            .chars()
            .skip(lo)
            .take(hi.saturating_sub(lo))
            .collect()
    }

    /// Memoized subtree length, if one was stored.
    fn cached_len(&self, node: &Self::Node) -> Option<usize>;

    /// Store a subtree length. Write-once per node for the session: the
    /// oracle never invalidates, see [`crate::length::text_len`].
    fn store_len(&self, node: &Self::Node, len: usize);

    /// Decoration flag: the node counts as length 0 regardless of content.
    fn is_zero_len(&self, node: &Self::Node) -> bool;

    /// Capture-exempt flag: pointer events originating here are ignored.
    fn is_ignored(&self, node: &Self::Node) -> bool;

    /// Persisted annotation reference carried by this node in the loaded
    /// document, if any. Distinct from [`Self::marker_of`]: the reference
    /// describes where a marker should be inserted at load time.
    fn annotation_ref(&self, node: &Self::Node) -> Option<MarkerData>;

    /// Payload of a live marker node inserted by
    /// [`Self::insert_marker_before`], if this is one.
    fn marker_of(&self, node: &Self::Node) -> Option<MarkerData>;

    /// Vertical offset of this node relative to its offset parent.
    fn offset_top(&self, node: &Self::Node) -> i32;

    /// Next node up the screen-measurement chain.
    fn offset_parent(&self, node: &Self::Node) -> Option<Self::Node>;

    /// Insert a marker node at the given caret location. The inserted node
    /// must report length 0 so ancestor length caches stay valid without
    /// invalidation. Splits a `Text` leaf when the caret falls inside it.
    fn insert_marker_before(&mut self, at: &Position<Self::Node>, data: MarkerData) -> Self::Node;

    /// Insert a transient measurement probe at the given caret location.
    /// Same length-0 contract as markers; callers remove it right after
    /// reading its screen position.
    fn insert_probe(&mut self, at: &Position<Self::Node>) -> Self::Node;

    /// Detach a node from its parent.
    fn remove(&mut self, node: &Self::Node);
}
