//! End-to-end properties of the offset model, over trees built from markup.

use underline_core::{
    capture, dematerialize, materialize, offset_to_position, position_to_offset, replay,
    text_between, text_len, Capture, CaptureOutcome, CiteBox, DocTree, MemTree, PanelState,
    RawSelection, ResolveError,
};

const BOOK: &str = r#"<div>
<p>Litwo! Ojczyzno <em>moja</em>! ty jesteś jak <strong>zdrowie</strong>;</p>
<span class="zero-len">[1]</span><p>Ile cię trzeba <em>cenić</em>, ten tylko się dowie,</p>
<!-- editorial note -->
<p>Kto cię stracił.</p>
</div>"#;

fn book() -> MemTree {
    MemTree::from_xml(BOOK).unwrap()
}

#[test]
fn round_trip_holds_for_every_valid_offset() {
    let tree = book();
    let total = text_len(&tree, &tree.root());
    assert!(total > 0);
    for offset in 0..total {
        let pos = offset_to_position(&tree, offset).unwrap();
        let back = position_to_offset(&tree, &pos.node).unwrap() + pos.local;
        assert_eq!(back, offset, "offset {offset} did not round-trip");
    }
}

#[test]
fn offsets_are_monotone_in_document_order() {
    let tree = book();
    let total = text_len(&tree, &tree.root());
    let mut last = 0;
    for offset in 0..total {
        let pos = offset_to_position(&tree, offset).unwrap();
        let resolved = position_to_offset(&tree, &pos.node).unwrap() + pos.local;
        assert!(resolved >= last);
        last = resolved;
    }
}

#[test]
fn marker_insertion_changes_no_offset_and_no_length() {
    let mut tree = book();
    let total = text_len(&tree, &tree.root());

    // Resolve every position first, then insert markers all over, then
    // check that each position still reports the same offset.
    let positions: Vec<_> = (0..total)
        .map(|o| offset_to_position(&tree, o).unwrap())
        .collect();

    for offset in (0..total).step_by(7) {
        materialize(&mut tree, offset, offset + 1, None).unwrap();
    }

    assert_eq!(text_len(&tree, &tree.root()), total);
    for (offset, pos) in positions.iter().enumerate() {
        let back = position_to_offset(&tree, &pos.node).unwrap() + pos.local;
        assert_eq!(back, offset, "offset {offset} moved after insertion");
    }
}

#[test]
fn boundary_offset_belongs_to_the_next_leaf() {
    let tree = MemTree::from_xml("<div>0123456789<em>abc</em><em>defg</em></div>").unwrap();
    let pos = offset_to_position(&tree, 13).unwrap();
    assert_eq!(tree.payload(&pos.node), "defg");
    assert_eq!(pos.local, 0);
}

#[test]
fn offset_past_document_end_is_out_of_range() {
    let tree = book();
    let total = text_len(&tree, &tree.root());
    assert_eq!(
        offset_to_position(&tree, total + 1),
        Err(ResolveError::OutOfRange(total + 1))
    );
}

#[test]
fn simple_underline_scenario() {
    let mut tree = MemTree::from_xml("<p>Hello world</p>").unwrap();
    let root = tree.root();

    let raw = RawSelection {
        anchor: offset_to_position(&tree, 6).unwrap(),
        focus: offset_to_position(&tree, 11).unwrap(),
    };
    let outcome = capture(&mut tree, &root, &raw).unwrap();
    let CaptureOutcome::Captured(cap) = outcome else {
        panic!("expected a capture");
    };
    assert_eq!((cap.start, cap.end), (6, 11));
    assert_eq!(cap.text, "world");

    materialize(&mut tree, 6, 11, None).unwrap();
    assert_eq!(text_between(&tree, 0, 11).unwrap(), "Hello world");
    assert_eq!(text_len(&tree, &root), 11);
}

#[test]
fn persisted_annotation_replay_scenario() {
    let mut tree = MemTree::from_xml(
        r#"<div><span class="underline zero-len" data-start="0" data-end="5" data-comment="nice"/>Hello world</div>"#,
    )
    .unwrap();

    assert_eq!(replay(&mut tree), 1);
    let markers = tree.markers();
    assert_eq!(markers.len(), 1);

    let (start, end) = dematerialize(&tree, &markers[0].1).unwrap();
    let s = position_to_offset(&tree, &start.node).unwrap() + start.local;
    let e = position_to_offset(&tree, &end.node).unwrap() + end.local;
    assert_eq!((s, e), (0, 5));
}

#[test]
fn nested_decoration_counts_zero_everywhere() {
    let tree = MemTree::from_xml(
        r#"<div><p>ab<span class="zero-len"><em>wxyz</em></span>cd</p></div>"#,
    )
    .unwrap();
    let root = tree.root();
    assert_eq!(text_len(&tree, &root), 4);
    assert_eq!(text_between(&tree, 0, 4).unwrap(), "abcd");
}

#[test]
fn capture_drives_the_panel() {
    let mut tree = MemTree::from_xml("<p>Hello world</p>").unwrap();
    let root = tree.root();
    let mut panel = CiteBox::new();

    let raw = RawSelection {
        anchor: offset_to_position(&tree, 6).unwrap(),
        focus: offset_to_position(&tree, 11).unwrap(),
    };
    match capture(&mut tree, &root, &raw).unwrap() {
        CaptureOutcome::Captured(cap) => panel.show_quick(cap),
        CaptureOutcome::Empty => panel.hide(),
        CaptureOutcome::Ignored => {}
    }
    assert_eq!(panel.state(), PanelState::QuickForm);

    // Empty release hides it again.
    let raw = RawSelection {
        anchor: offset_to_position(&tree, 3).unwrap(),
        focus: offset_to_position(&tree, 3).unwrap(),
    };
    match capture(&mut tree, &root, &raw).unwrap() {
        CaptureOutcome::Captured(cap) => panel.show_quick(cap),
        CaptureOutcome::Empty => panel.hide(),
        CaptureOutcome::Ignored => {}
    }
    assert_eq!(panel.state(), PanelState::Hidden);
}

#[test]
fn submission_flow_materializes_then_comments() {
    let mut tree = MemTree::from_xml("<p>Hello world</p>").unwrap();
    let mut panel = CiteBox::new();

    panel.show_quick(Capture {
        start: 6,
        end: 11,
        text: "world".to_string(),
        screen_top: 0,
    });

    // Quick-form success callback: materialize, then move to the comment form.
    let cap = panel.anchor().cloned().unwrap();
    let marker = materialize(&mut tree, cap.start, cap.end, None);
    assert!(marker.is_some());
    panel.show_comment();
    assert_eq!(panel.state(), PanelState::CommentForm);
    assert_eq!(panel.anchor().map(|c| (c.start, c.end)), Some((6, 11)));
}
