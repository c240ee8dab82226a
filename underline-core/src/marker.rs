//! Underline markers: zero-length nodes anchoring annotations in the tree.

use crate::resolve::{offset_to_position, ResolveError};
use crate::tree::{DocTree, MarkerData, Position};

/// Insert a marker carrying `(start, end, comment)` at the structural
/// position of `start`.
///
/// Returns `None`, mutating nothing, when the range is degenerate
/// (`start >= end`) or `start` has no structural position (empty root,
/// stale persisted offset). The inserted node reports length 0, so no
/// existing offset and no ancestor length cache moves.
pub fn materialize<T: DocTree>(
    tree: &mut T,
    start: usize,
    end: usize,
    comment: Option<String>,
) -> Option<T::Node> {
    if start >= end {
        return None;
    }
    let at = offset_to_position(tree, start).ok()?;
    Some(tree.insert_marker_before(&at, MarkerData::new(start, end, comment)))
}

/// Resolve a marker's stored range back into a structural range, for the
/// frontend to apply as the live selection on activation.
///
/// Start and end resolve independently; a document that changed since the
/// annotation was saved surfaces as `OutOfRange` here.
pub fn dematerialize<T: DocTree>(
    tree: &T,
    data: &MarkerData,
) -> Result<(Position<T::Node>, Position<T::Node>), ResolveError> {
    let start = offset_to_position(tree, data.start)?;
    let end = offset_to_position(tree, data.end)?;
    Ok((start, end))
}

/// All persisted annotation references in the tree, in document order.
pub fn annotation_refs<T: DocTree>(tree: &T) -> Vec<MarkerData> {
    let mut out = Vec::new();
    scan(tree, &tree.root(), &mut out);
    out
}

fn scan<T: DocTree>(tree: &T, node: &T::Node, out: &mut Vec<MarkerData>) {
    if let Some(found) = tree.annotation_ref(node) {
        out.push(found);
    }
    for child in tree.children(node) {
        scan(tree, &child, out);
    }
}

/// Load-time replay: one [`materialize`] call per persisted annotation
/// reference in the document. A reference whose offsets no longer resolve
/// is skipped; the rest proceed independently. Returns how many markers
/// were inserted.
pub fn replay<T: DocTree>(tree: &mut T) -> usize {
    annotation_refs(tree)
        .into_iter()
        .filter(|data| materialize(tree, data.start, data.end, data.comment.clone()).is_some())
        .count()
}
