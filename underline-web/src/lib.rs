//! Underline Web - browser frontend for offset-anchored underlines
//!
//! Runs against a page that carries the document under `#book-text` and a
//! citation panel under `#cite-box`. The panel's two forms are owned by the
//! page; this crate positions and toggles them, and the page calls back in
//! through the exported `underlineSubmitted` / `commentSaved` /
//! `commentSkipped` functions when a form round-trip completes.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{console, Document, HtmlElement, HtmlInputElement, MouseEvent, Node};

use underline_core::{
    capture, dematerialize, materialize, replay, CaptureOutcome, CiteBox, DocTree, MarkerData,
    PanelState, Position, RawSelection,
};

mod dom;

pub use dom::DomTree;

struct WebApp {
    tree: DomTree,
    panel: CiteBox,
    /// Marker inserted by the last acknowledged quick-form submission,
    /// still waiting for its optional comment.
    pending: Option<Node>,
}

thread_local! {
    static STATE: RefCell<Option<Rc<RefCell<WebApp>>>> = RefCell::new(None);
}

/// Initialize against the current page. A page without a `#book-text`
/// element is left alone.
#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    let window = web_sys::window().ok_or("No window")?;
    let document = window.document().ok_or("No document")?;

    let Some(root) = document.get_element_by_id("book-text") else {
        return Ok(());
    };

    let mut tree = DomTree::new(document.clone(), root.into());
    let anchored = replay(&mut tree);
    console::log_1(&format!("underline: {} persisted underline(s) anchored", anchored).into());

    let state = Rc::new(RefCell::new(WebApp {
        tree,
        panel: CiteBox::new(),
        pending: None,
    }));
    STATE.with(|s| *s.borrow_mut() = Some(state.clone()));

    // Selection capture on pointer release, anywhere in the page; the
    // capture protocol itself sorts out exempt and detached origins.
    {
        let state = state.clone();
        let doc = document.clone();
        let on_mouseup = Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
            let mut app = state.borrow_mut();
            handle_mouseup(&doc, &mut app, &event);
        });
        document
            .add_event_listener_with_callback("mouseup", on_mouseup.as_ref().unchecked_ref())?;
        on_mouseup.forget();
    }

    // Delegated marker activation.
    {
        let state = state.clone();
        let doc = document.clone();
        let on_click = Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
            let app = state.borrow();
            handle_marker_click(&doc, &app, &event);
        });
        document.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
        on_click.forget();
    }

    Ok(())
}

fn handle_mouseup(document: &Document, app: &mut WebApp, event: &MouseEvent) {
    let Some(origin) = event.target().and_then(|t| t.dyn_into::<Node>().ok()) else {
        return;
    };
    let Some(raw) = read_selection() else {
        return;
    };

    match capture(&mut app.tree, &origin, &raw) {
        Ok(CaptureOutcome::Captured(cap)) => app.panel.show_quick(cap),
        Ok(CaptureOutcome::Empty) => app.panel.hide(),
        // Release inside the panel itself, or a selection that starts
        // outside the document: leave the panel as it is.
        Ok(CaptureOutcome::Ignored) | Err(_) => return,
    }
    sync_panel(document, &app.panel);
}

/// The live selection endpoints, as DOM positions.
fn read_selection() -> Option<RawSelection<Node>> {
    let selection = web_sys::window()?.get_selection().ok().flatten()?;
    let anchor = selection.anchor_node()?;
    let focus = selection.focus_node()?;
    Some(RawSelection {
        anchor: Position::new(anchor, selection.anchor_offset() as usize),
        focus: Position::new(focus, selection.focus_offset() as usize),
    })
}

fn handle_marker_click(document: &Document, app: &WebApp, event: &MouseEvent) {
    let Some(target) = event.target().and_then(|t| t.dyn_into::<Node>().ok()) else {
        return;
    };
    let Some(data) = marker_under(app, &target) else {
        return;
    };
    // A range that no longer resolves means the document changed since the
    // annotation was saved; the click does nothing.
    let Ok((start, end)) = dematerialize(&app.tree, &data) else {
        return;
    };
    apply_selection(document, &start, &end);
}

/// The marker whose element the click landed on or inside, if any.
fn marker_under(app: &WebApp, node: &Node) -> Option<MarkerData> {
    let mut cur = Some(node.clone());
    while let Some(n) = cur {
        if let Some(data) = app.tree.marker_of(&n) {
            return Some(data);
        }
        cur = app.tree.parent(&n);
    }
    None
}

/// Make the resolved range the live selection, so the reader sees the
/// annotated span highlighted natively.
fn apply_selection(document: &Document, start: &Position<Node>, end: &Position<Node>) {
    let Ok(range) = document.create_range() else {
        return;
    };
    if range.set_start(&start.node, start.local as u32).is_err() {
        return;
    }
    if range.set_end(&end.node, end.local as u32).is_err() {
        return;
    }
    let Some(window) = web_sys::window() else {
        return;
    };
    if let Ok(Some(selection)) = window.get_selection() {
        let _ = selection.remove_all_ranges();
        let _ = selection.add_range(&range);
    }
}

/// Mirror the panel state machine into the page's `#cite-box` element.
fn sync_panel(document: &Document, panel: &CiteBox) {
    let Some(el) = document.get_element_by_id("cite-box") else {
        return;
    };
    let Some(container) = el.dyn_ref::<HtmlElement>() else {
        return;
    };

    if panel.state() == PanelState::Hidden {
        let _ = container.style().set_property("display", "none");
        return;
    }

    if let Some(cap) = panel.anchor() {
        let _ = container
            .style()
            .set_property("top", &format!("{}px", cap.screen_top));
        set_input(document, "id_start", cap.start);
        set_input(document, "id_end", cap.end);
        if let Some(excerpt) = document.get_element_by_id("cite-text") {
            excerpt.set_text_content(Some(&format!("\u{ab}{}\u{bb}", cap.text)));
        }
    }

    set_visible(document, "underline-form", panel.state() == PanelState::QuickForm);
    set_visible(document, "comment-form", panel.state() == PanelState::CommentForm);
    let _ = container.style().set_property("display", "block");
}

fn set_visible(document: &Document, id: &str, visible: bool) {
    if let Some(el) = document.get_element_by_id(id) {
        if let Some(el) = el.dyn_ref::<HtmlElement>() {
            let value = if visible { "block" } else { "none" };
            let _ = el.style().set_property("display", value);
        }
    }
}

fn set_input(document: &Document, id: &str, value: usize) {
    if let Some(el) = document.get_element_by_id(id) {
        if let Some(input) = el.dyn_ref::<HtmlInputElement>() {
            input.set_value(&value.to_string());
        }
    }
}

fn with_app(f: impl FnOnce(&Document, &mut WebApp)) {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    STATE.with(|s| {
        let Some(state) = s.borrow().clone() else {
            return;
        };
        let mut app = state.borrow_mut();
        f(&document, &mut app);
    });
}

/// Called by the page once the quick form's submission is acknowledged:
/// anchors the new underline and moves the panel to the comment form.
#[wasm_bindgen(js_name = underlineSubmitted)]
pub fn underline_submitted(start: usize, end: usize) {
    with_app(|document, app| {
        let Some(marker) = materialize(&mut app.tree, start, end, None) else {
            app.panel.hide();
            sync_panel(document, &app.panel);
            return;
        };
        app.pending = Some(marker);
        app.panel.show_comment();
        sync_panel(document, &app.panel);
    });
}

/// Called by the page when the comment form is saved; attaches the comment
/// to the marker inserted by the preceding submission.
#[wasm_bindgen(js_name = commentSaved)]
pub fn comment_saved(comment: String) {
    with_app(|document, app| {
        if let Some(marker) = app.pending.take() {
            if let Some(el) = marker.dyn_ref::<web_sys::Element>() {
                let _ = el.set_attribute("title", &comment);
            }
        }
        app.panel.hide();
        sync_panel(document, &app.panel);
    });
}

/// Called by the page when the comment form is dismissed without saving.
#[wasm_bindgen(js_name = commentSkipped)]
pub fn comment_skipped() {
    with_app(|document, app| {
        app.pending = None;
        app.panel.hide();
        sync_panel(document, &app.panel);
    });
}
