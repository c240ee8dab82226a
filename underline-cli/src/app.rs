//! Frontend state: the document tree, the cursor, and the authoring flow.

use std::path::PathBuf;

use underline_core::{
    capture, dematerialize, materialize, offset_to_position, position_to_offset, replay,
    text_between, text_len, Annotation, AnnotationSet, CaptureOutcome, CiteBox, DocTree, MemTree,
    RawSelection,
};
use uuid::Uuid;

use crate::cursor::Cursor;

/// Editor mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Visual,
}

pub struct App {
    pub tree: MemTree,
    pub title: String,
    /// The visible text the tree renders, what the document pane shows.
    pub text: String,
    pub cursor: Cursor,
    pub mode: Mode,
    pub running: bool,
    pub dirty: bool,

    /// Offset where visual mode started.
    pub selection_anchor: Option<usize>,

    /// The citation panel driving the quick/comment forms.
    pub panel: CiteBox,
    pub annotations: AnnotationSet,
    pub sidecar: Option<PathBuf>,

    /// Comment form input.
    pub input_buffer: String,
    /// Annotation awaiting its comment.
    pending: Option<Uuid>,

    /// Range highlighted by activating a marker.
    pub active_range: Option<(usize, usize)>,

    pub status_message: Option<String>,
}

impl App {
    pub fn new() -> Self {
        Self {
            tree: MemTree::new(),
            title: "Untitled".to_string(),
            text: String::new(),
            cursor: Cursor::new(),
            mode: Mode::Normal,
            running: true,
            dirty: false,
            selection_anchor: None,
            panel: CiteBox::new(),
            annotations: AnnotationSet::new(),
            sidecar: None,
            input_buffer: String::new(),
            pending: None,
            active_range: None,
            status_message: None,
        }
    }

    /// Install a loaded document: replay in-document annotation references,
    /// materialize the sidecar's annotations, and refresh the visible text.
    pub fn load(&mut self, title: String, mut tree: MemTree, annotations: AnnotationSet) {
        let replayed = replay(&mut tree);
        let mut anchored = 0;
        for ann in &annotations.annotations {
            let data = ann.marker_data();
            if materialize(&mut tree, data.start, data.end, data.comment).is_some() {
                anchored += 1;
            }
        }

        let total = text_len(&tree, &tree.root());
        self.text = text_between(&tree, 0, total).unwrap_or_default();
        self.cursor.set_content(&self.text);
        self.tree = tree;
        self.title = title;
        self.annotations = annotations;

        if replayed + anchored > 0 {
            self.set_status(&format!("{} underline(s) anchored", replayed + anchored));
        }
    }

    pub fn enter_visual(&mut self) {
        self.mode = Mode::Visual;
        self.selection_anchor = Some(self.cursor.offset());
        self.active_range = None;
    }

    pub fn cancel_visual(&mut self) {
        self.mode = Mode::Normal;
        self.selection_anchor = None;
    }

    /// Normalized selection range for highlighting, end exclusive.
    pub fn selection(&self) -> Option<(usize, usize)> {
        let anchor = self.selection_anchor?;
        let cursor = self.cursor.offset();
        Some((anchor.min(cursor), anchor.max(cursor)))
    }

    /// Pointer-release equivalent: run the capture protocol on the visual
    /// selection and hand the result to the panel.
    pub fn capture_selection(&mut self) {
        let Some(anchor_offset) = self.selection_anchor.take() else {
            return;
        };
        self.mode = Mode::Normal;

        let focus_offset = self.cursor.offset();
        let (Ok(anchor), Ok(focus)) = (
            offset_to_position(&self.tree, anchor_offset),
            offset_to_position(&self.tree, focus_offset),
        ) else {
            // Resolver failure is local: drop this capture, keep the page.
            return;
        };

        let origin = focus.node.clone();
        let raw = RawSelection { anchor, focus };
        match capture(&mut self.tree, &origin, &raw) {
            Ok(CaptureOutcome::Captured(cap)) => self.panel.show_quick(cap),
            Ok(CaptureOutcome::Empty) => self.panel.hide(),
            Ok(CaptureOutcome::Ignored) => {}
            Err(_) => {}
        }
    }

    /// Quick-form submission: store the annotation, anchor its marker, move
    /// the panel to the comment form.
    pub fn submit_quick(&mut self) {
        let Some(cap) = self.panel.anchor().cloned() else {
            return;
        };
        if materialize(&mut self.tree, cap.start, cap.end, None).is_none() {
            self.panel.hide();
            self.set_status("Could not anchor underline");
            return;
        }
        let annotation = Annotation::new(cap.start, cap.end);
        self.pending = Some(self.annotations.add(annotation));
        self.dirty = true;
        self.input_buffer.clear();
        self.panel.show_comment();
        self.set_status("Underlined — add a comment, Esc to skip");
    }

    /// Comment-form submission: attach the typed comment to the pending
    /// annotation.
    pub fn submit_comment(&mut self) {
        if let Some(id) = self.pending.take() {
            if !self.input_buffer.is_empty() {
                self.annotations.set_comment(id, &self.input_buffer);
                self.dirty = true;
                self.set_status("Comment saved");
            }
        }
        self.input_buffer.clear();
        self.panel.hide();
    }

    /// Leave the pending annotation without a comment.
    pub fn skip_comment(&mut self) {
        self.pending = None;
        self.input_buffer.clear();
        self.panel.hide();
    }

    /// Marker activation: resolve the marker under the cursor back into a
    /// range and highlight it.
    pub fn activate_marker_at_cursor(&mut self) {
        let offset = self.cursor.offset();
        let found = self
            .tree
            .markers()
            .into_iter()
            .find(|(_, data)| data.contains(offset));
        let Some((_, data)) = found else {
            self.set_status("No underline here");
            return;
        };

        match dematerialize(&self.tree, &data) {
            Ok((start, end)) => {
                let s = position_to_offset(&self.tree, &start.node).map(|o| o + start.local);
                let e = position_to_offset(&self.tree, &end.node).map(|o| o + end.local);
                if let (Ok(s), Ok(e)) = (s, e) {
                    self.active_range = Some((s, e));
                    match &data.comment {
                        Some(comment) => self.set_status(&format!("Underline: {}", comment)),
                        None => self.set_status("Underline (no comment)"),
                    }
                }
            }
            Err(_) => self.set_status("Underline no longer resolves"),
        }
    }

    /// Offset ranges to render underlined, sorted by start.
    pub fn underline_ranges(&self) -> Vec<(usize, usize)> {
        self.annotations
            .sorted()
            .iter()
            .map(|a| (a.start, a.end))
            .collect()
    }

    pub fn set_status(&mut self, msg: &str) {
        self.status_message = Some(msg.to_string());
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use underline_core::PanelState;

    fn loaded(xml: &str) -> App {
        let mut app = App::new();
        let tree = MemTree::from_xml(xml).unwrap();
        app.load("test".to_string(), tree, AnnotationSet::new());
        app
    }

    #[test]
    fn load_renders_visible_text() {
        let app = loaded("<p>Hello <em>world</em></p>");
        assert_eq!(app.text, "Hello world");
    }

    #[test]
    fn visual_capture_opens_the_quick_form() {
        let mut app = loaded("<p>Hello world</p>");
        app.cursor.set_offset(6);
        app.enter_visual();
        app.cursor.set_offset(11);
        app.capture_selection();

        assert_eq!(app.panel.state(), PanelState::QuickForm);
        assert_eq!(app.panel.anchor().map(|c| (c.start, c.end)), Some((6, 11)));
        assert_eq!(app.panel.anchor().map(|c| c.text.as_str()), Some("world"));
    }

    #[test]
    fn empty_visual_selection_hides_the_panel() {
        let mut app = loaded("<p>Hello world</p>");
        app.cursor.set_offset(4);
        app.enter_visual();
        app.capture_selection();
        assert_eq!(app.panel.state(), PanelState::Hidden);
    }

    #[test]
    fn quick_then_comment_flow() {
        let mut app = loaded("<p>Hello world</p>");
        app.cursor.set_offset(6);
        app.enter_visual();
        app.cursor.set_offset(11);
        app.capture_selection();

        app.submit_quick();
        assert_eq!(app.panel.state(), PanelState::CommentForm);
        assert_eq!(app.annotations.len(), 1);
        assert_eq!(app.tree.markers().len(), 1);

        app.input_buffer = "nice".to_string();
        app.submit_comment();
        assert_eq!(app.panel.state(), PanelState::Hidden);
        assert_eq!(app.annotations.annotations[0].comment, "nice");
        assert!(app.dirty);
    }

    #[test]
    fn activation_highlights_the_stored_range() {
        let mut app = loaded("<p>Hello world</p>");
        app.cursor.set_offset(6);
        app.enter_visual();
        app.cursor.set_offset(11);
        app.capture_selection();
        app.submit_quick();
        app.skip_comment();

        app.cursor.set_offset(8);
        app.activate_marker_at_cursor();
        assert_eq!(app.active_range, Some((6, 11)));
    }

    #[test]
    fn sidecar_annotations_are_anchored_on_load() {
        let mut app = App::new();
        let tree = MemTree::from_xml("<p>Hello world</p>").unwrap();
        let mut set = AnnotationSet::new();
        set.add(Annotation::new(0, 5));
        app.load("test".to_string(), tree, set);

        assert_eq!(app.tree.markers().len(), 1);
        assert_eq!(app.text, "Hello world");
    }
}
