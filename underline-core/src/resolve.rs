//! The two inverse offset resolvers.
//!
//! [`position_to_offset`] walks up and left, summing subtree lengths;
//! [`offset_to_position`] descends, consuming the offset. The boundary rule
//! in the descent is load-bearing: an offset exactly equal to a subtree's
//! length belongs to the start of the *next* sibling, never to the end of
//! the current one, so the two walks agree at every subtree boundary. Only
//! the document-final offset, which has no next sibling anywhere up the
//! chain, resolves to the end of the last leaf.

use thiserror::Error;

use crate::length::text_len;
use crate::tree::{DocTree, Position};

/// Resolver failures. Both are local: a failed capture shows nothing, a
/// failed annotation replay skips that one marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// A parentless node that is not the designated root: detached from the
    /// tracked tree.
    #[error("node is detached from the document tree")]
    Detached,
    /// The offset walk ran off the end of the document. Happens only for
    /// malformed or out-of-date persisted offsets.
    #[error("offset {0} is past the end of the document")]
    OutOfRange(usize),
}

/// Global offset of the start of `node`.
pub fn position_to_offset<T: DocTree>(tree: &T, node: &T::Node) -> Result<usize, ResolveError> {
    if *node == tree.root() {
        return Ok(0);
    }
    if let Some(prev) = tree.prev_sibling(node) {
        Ok(text_len(tree, &prev) + position_to_offset(tree, &prev)?)
    } else {
        match tree.parent(node) {
            // A first child starts where its parent starts.
            Some(parent) => position_to_offset(tree, &parent),
            None => Err(ResolveError::Detached),
        }
    }
}

/// Structural position of a global offset, descending from the root.
pub fn offset_to_position<T: DocTree>(
    tree: &T,
    offset: usize,
) -> Result<Position<T::Node>, ResolveError> {
    offset_to_position_from(tree, &tree.root(), offset)
}

/// Structural position of `offset` counted from the start of `node`.
pub fn offset_to_position_from<T: DocTree>(
    tree: &T,
    node: &T::Node,
    offset: usize,
) -> Result<Position<T::Node>, ResolveError> {
    let tl = text_len(tree, node);
    if tl < offset {
        return match tree.next_sibling(node) {
            Some(next) => offset_to_position_from(tree, &next, offset - tl),
            None => Err(ResolveError::OutOfRange(offset)),
        };
    }
    if tl == offset {
        // Boundary tie-break: the offset belongs to the start of the next
        // sibling, not to the end of this subtree. Only a document-final
        // offset, with nothing after it, lands at the end of the last leaf.
        if let Some(next) = tree.next_sibling(node) {
            return offset_to_position_from(tree, &next, 0);
        }
    }
    // The offset lies within this subtree: descend without consuming.
    let children = tree.children(node);
    match children.first() {
        Some(first) => offset_to_position_from(tree, first, offset),
        None => Ok(Position::new(node.clone(), offset)),
    }
}

/// The rendered text of an offset range: in-order text leaves with
/// decoration and ignorable content excluded, consistent with the length
/// model the offsets are defined by.
pub fn text_between<T: DocTree>(
    tree: &T,
    start: usize,
    end: usize,
) -> Result<String, ResolveError> {
    if end > text_len(tree, &tree.root()) {
        return Err(ResolveError::OutOfRange(end));
    }
    let mut out = String::new();
    let mut pos = 0;
    collect(tree, &tree.root(), start, end, &mut pos, &mut out);
    Ok(out)
}

fn collect<T: DocTree>(
    tree: &T,
    node: &T::Node,
    start: usize,
    end: usize,
    pos: &mut usize,
    out: &mut String,
) {
    use crate::tree::NodeKind;

    if *pos >= end {
        return;
    }
    match tree.kind(node) {
        NodeKind::Ignorable => {}
        NodeKind::Text => {
            let len = tree.payload_len(node);
            let lo = start.saturating_sub(*pos).min(len);
            let hi = end.saturating_sub(*pos).min(len);
            if lo < hi {
                out.push_str(&tree.payload_slice(node, lo, hi));
            }
            *pos += len;
        }
        NodeKind::Container => {
            if tree.is_zero_len(node) {
                return;
            }
            for child in tree.children(node) {
                collect(tree, &child, start, end, pos, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::MemTree;

    /// root ── p ── "Hello " / em ── "world" / "!" ── p2 ── "Goodbye"
    fn fixture() -> (MemTree, crate::tree::NodeId, crate::tree::NodeId) {
        let mut tree = MemTree::new();
        let root = tree.root();
        let p = tree.add_container(root);
        tree.add_text(p, "Hello ");
        let em = tree.add_container(p);
        let world = tree.add_text(em, "world");
        tree.add_text(p, "!");
        let p2 = tree.add_container(root);
        tree.add_text(p2, "Goodbye");
        (tree, world, p2)
    }

    #[test]
    fn root_is_offset_zero() {
        let (tree, _, _) = fixture();
        assert_eq!(position_to_offset(&tree, &tree.root()), Ok(0));
    }

    #[test]
    fn nested_leaf_offset() {
        let (tree, world, p2) = fixture();
        assert_eq!(position_to_offset(&tree, &world), Ok(6));
        assert_eq!(position_to_offset(&tree, &p2), Ok(12));
    }

    #[test]
    fn detached_node_is_an_error() {
        let mut other = MemTree::new();
        let root = other.root();
        let leaf = other.add_text(root, "x");
        other.remove(&leaf);
        assert_eq!(position_to_offset(&other, &leaf), Err(ResolveError::Detached));
    }

    #[test]
    fn offset_descends_into_nested_leaf() {
        let (tree, world, _) = fixture();
        let pos = offset_to_position(&tree, 8).unwrap();
        assert_eq!(pos, Position::new(world, 2));
    }

    #[test]
    fn offset_past_end_fails() {
        let (tree, _, _) = fixture();
        let total = text_len(&tree, &tree.root());
        assert_eq!(
            offset_to_position(&tree, total + 1),
            Err(ResolveError::OutOfRange(total + 1))
        );
    }

    #[test]
    fn boundary_offset_lands_in_next_leaf() {
        // Two adjacent leaves of lengths 3 and 4 starting at offset 10.
        let mut tree = MemTree::new();
        let root = tree.root();
        tree.add_text(root, "0123456789");
        let a = tree.add_text(root, "abc");
        let b = tree.add_text(root, "defg");

        let pos = offset_to_position(&tree, 13).unwrap();
        assert_eq!(pos, Position::new(b, 0));
        let pos = offset_to_position(&tree, 12).unwrap();
        assert_eq!(pos, Position::new(a, 2));
    }

    #[test]
    fn document_final_offset_resolves_to_last_leaf_end() {
        let (tree, _, _) = fixture();
        let total = text_len(&tree, &tree.root());
        let pos = offset_to_position(&tree, total).unwrap();
        assert_eq!(tree.payload(&pos.node), "Goodbye");
        assert_eq!(pos.local, 7);
    }

    #[test]
    fn round_trips_every_offset() {
        let (tree, _, _) = fixture();
        let total = text_len(&tree, &tree.root());
        for offset in 0..total {
            let pos = offset_to_position(&tree, offset).unwrap();
            let back = position_to_offset(&tree, &pos.node).unwrap() + pos.local;
            assert_eq!(back, offset, "offset {offset} did not round-trip");
        }
    }

    #[test]
    fn text_between_slices_in_the_trees_own_unit() {
        let mut tree = MemTree::new();
        let root = tree.root();
        tree.add_text(root, "\u{1F389}ab");

        assert_eq!(text_len(&tree, &root), 3);
        assert_eq!(text_between(&tree, 1, 3).unwrap(), "ab");
        assert_eq!(text_between(&tree, 0, 1).unwrap(), "\u{1F389}");
    }

    #[test]
    fn text_between_skips_decoration() {
        let mut tree = MemTree::new();
        let root = tree.root();
        tree.add_text(root, "one ");
        let deco = tree.add_container(root);
        tree.set_zero_len(deco, true);
        tree.add_text(deco, "[note]");
        tree.add_text(root, "two");

        assert_eq!(text_between(&tree, 0, 7).unwrap(), "one two");
        assert_eq!(text_between(&tree, 4, 7).unwrap(), "two");
        assert_eq!(
            text_between(&tree, 0, 8),
            Err(ResolveError::OutOfRange(8))
        );
    }
}
