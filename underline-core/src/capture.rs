//! Selection capture: from a live platform selection to an offset range.

use crate::resolve::{position_to_offset, text_between, ResolveError};
use crate::tree::{DocTree, Position};

/// A live selection as the platform reports it: anchor where the selection
/// started, focus where it ended. May be reversed in document order; the
/// capture normalizes.
#[derive(Debug, Clone)]
pub struct RawSelection<N> {
    pub anchor: Position<N>,
    pub focus: Position<N>,
}

/// What a successful capture hands to the citation panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    pub start: usize,
    pub end: usize,
    pub text: String,
    pub screen_top: i32,
}

/// Outcome of a pointer-release capture attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// The pointer release originated inside a capture-exempt subtree
    /// (the authoring widgets themselves). Nothing changes.
    Ignored,
    /// Zero-width selection. Not an error; the panel should hide.
    Empty,
    Captured(Capture),
}

/// Run the capture protocol for a pointer release at `origin` with the
/// given live selection.
///
/// Offsets come from the resolvers; the screen position comes from a
/// transient zero-length probe inserted at the start of the normalized
/// range, measured up its offset-parent chain, and removed again before
/// returning.
pub fn capture<T: DocTree>(
    tree: &mut T,
    origin: &T::Node,
    raw: &RawSelection<T::Node>,
) -> Result<CaptureOutcome, ResolveError> {
    if in_ignored(tree, origin) {
        return Ok(CaptureOutcome::Ignored);
    }

    let anchor = position_to_offset(tree, &raw.anchor.node)? + raw.anchor.local;
    let focus = position_to_offset(tree, &raw.focus.node)? + raw.focus.local;
    if anchor == focus {
        return Ok(CaptureOutcome::Empty);
    }

    // Normalize a backwards selection so start <= end.
    let (start, end, start_pos) = if anchor <= focus {
        (anchor, focus, &raw.anchor)
    } else {
        (focus, anchor, &raw.focus)
    };

    let text = text_between(tree, start, end)?;
    let screen_top = measure_top(tree, start_pos);

    Ok(CaptureOutcome::Captured(Capture {
        start,
        end,
        text,
        screen_top,
    }))
}

/// Walk ancestors from `node`; true if any is flagged capture-exempt.
fn in_ignored<T: DocTree>(tree: &T, node: &T::Node) -> bool {
    let mut cur = Some(node.clone());
    while let Some(n) = cur {
        if tree.is_ignored(&n) {
            return true;
        }
        cur = tree.parent(&n);
    }
    false
}

/// Vertical screen position of a caret location, via a transient probe.
fn measure_top<T: DocTree>(tree: &mut T, at: &Position<T::Node>) -> i32 {
    let probe = tree.insert_probe(at);
    let mut top = 0;
    let mut cur = Some(probe.clone());
    while let Some(n) = cur {
        top += tree.offset_top(&n);
        cur = tree.offset_parent(&n);
    }
    tree.remove(&probe);
    top
}
