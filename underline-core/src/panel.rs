//! The citation panel state machine.
//!
//! The panel shows either the quick underline form or the comment form,
//! anchored at the capture's screen position. How a frontend swaps the two
//! sub-forms (synchronously, crossfaded) is presentation; the machine only
//! guarantees that at most one sub-form is visible in steady state.

use crate::capture::Capture;

/// Visibility state of the citation panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanelState {
    #[default]
    Hidden,
    /// The quick underline form, anchored at a capture.
    QuickForm,
    /// The comment form for the annotation just submitted.
    CommentForm,
}

/// Events driving the panel.
#[derive(Debug, Clone)]
pub enum PanelEvent {
    /// A fresh capture: show (or re-anchor) the quick form.
    ShowQuick(Capture),
    /// The quick form was submitted: switch to the comment form.
    ShowComment,
    Hide,
}

/// The citation panel: current state plus the anchored capture fields a
/// frontend renders (offsets for the hidden form inputs, excerpt text,
/// vertical screen position).
#[derive(Debug, Clone, Default)]
pub struct CiteBox {
    state: PanelState,
    anchor: Option<Capture>,
}

impl CiteBox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PanelState {
        self.state
    }

    /// The capture the panel is currently anchored to, if visible.
    pub fn anchor(&self) -> Option<&Capture> {
        self.anchor.as_ref()
    }

    pub fn is_visible(&self) -> bool {
        self.state != PanelState::Hidden
    }

    pub fn handle(&mut self, event: PanelEvent) {
        match event {
            PanelEvent::ShowQuick(capture) => {
                self.anchor = Some(capture);
                self.state = PanelState::QuickForm;
            }
            PanelEvent::ShowComment => {
                self.state = PanelState::CommentForm;
            }
            PanelEvent::Hide => {
                self.state = PanelState::Hidden;
                self.anchor = None;
            }
        }
    }

    pub fn show_quick(&mut self, capture: Capture) {
        self.handle(PanelEvent::ShowQuick(capture));
    }

    pub fn show_comment(&mut self) {
        self.handle(PanelEvent::ShowComment);
    }

    pub fn hide(&mut self) {
        self.handle(PanelEvent::Hide);
    }
}
