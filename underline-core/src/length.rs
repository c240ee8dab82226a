//! The length oracle: how much visible text a subtree covers.

use crate::tree::{DocTree, NodeKind};

/// Visible text length of the subtree rooted at `node`.
///
/// Policy, in order: ignorable nodes and zero-length decoration count as 0
/// (the latter regardless of descendant content), text leaves count their
/// payload, and containers sum their children with the result memoized in
/// node metadata.
///
/// The memo is write-once for the session: the oracle assumes a subtree is
/// stable once measured and performs no invalidation. Any caller that
/// changes a subtree's length owns the consequences; marker and probe
/// insertion stay safe because the inserted nodes report length 0, leaving
/// every ancestor cache valid.
pub fn text_len<T: DocTree>(tree: &T, node: &T::Node) -> usize {
    match tree.kind(node) {
        NodeKind::Ignorable => 0,
        _ if tree.is_zero_len(node) => 0,
        NodeKind::Container => {
            if let Some(len) = tree.cached_len(node) {
                return len;
            }
            let len = tree
                .children(node)
                .iter()
                .map(|child| text_len(tree, child))
                .sum();
            tree.store_len(node, len);
            len
        }
        NodeKind::Text => tree.payload_len(node),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::MemTree;

    #[test]
    fn sums_text_across_containers() {
        let mut tree = MemTree::new();
        let root = tree.root();
        let p = tree.add_container(root);
        tree.add_text(p, "Hello ");
        let em = tree.add_container(p);
        tree.add_text(em, "world");
        tree.add_text(root, "!");

        assert_eq!(text_len(&tree, &root), 12);
        assert_eq!(text_len(&tree, &p), 11);
        assert_eq!(text_len(&tree, &em), 5);
    }

    #[test]
    fn ignorable_nodes_count_zero() {
        let mut tree = MemTree::new();
        let root = tree.root();
        tree.add_text(root, "ab");
        tree.add_ignorable(root);
        assert_eq!(text_len(&tree, &root), 2);
    }

    #[test]
    fn zero_len_flag_wins_over_descendants() {
        let mut tree = MemTree::new();
        let root = tree.root();
        let deco = tree.add_container(root);
        tree.set_zero_len(deco, true);
        tree.add_text(deco, "[1]");
        tree.add_text(root, "body");

        assert_eq!(text_len(&tree, &deco), 0);
        assert_eq!(text_len(&tree, &root), 4);
    }

    #[test]
    fn memo_is_write_once() {
        let mut tree = MemTree::new();
        let root = tree.root();
        let p = tree.add_container(root);
        tree.add_text(p, "abc");

        assert_eq!(text_len(&tree, &p), 3);
        assert_eq!(tree.cached_len(&p), Some(3));

        // A non-zero-length mutation after measurement goes stale on
        // purpose: the oracle never invalidates, callers must.
        tree.add_text(p, "def");
        assert_eq!(text_len(&tree, &p), 3);
    }
}
