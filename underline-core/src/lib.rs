//! Underline Core - annotation anchoring over a document tree
//!
//! This crate maps between linear character offsets in a document's visible
//! text and structural positions inside the markup tree that renders it, in
//! both directions, so that underline annotations persisted as plain offsets
//! can later be re-materialized as precise in-tree ranges no matter how
//! deeply the text is nested in inline markup. It's designed to work both in
//! the native CLI and WASM environments: everything is written against the
//! [`tree::DocTree`] trait, with an in-memory implementation here and a DOM
//! implementation in the web frontend.

pub mod capture;
pub mod length;
pub mod marker;
pub mod model;
pub mod panel;
pub mod resolve;
pub mod tree;

pub use capture::{capture, Capture, CaptureOutcome, RawSelection};
pub use length::text_len;
pub use marker::{annotation_refs, dematerialize, materialize, replay};
pub use model::{Annotation, AnnotationSet};
pub use panel::{CiteBox, PanelEvent, PanelState};
pub use resolve::{
    offset_to_position, offset_to_position_from, position_to_offset, text_between, ResolveError,
};
pub use tree::{DocTree, MarkerData, MemTree, NodeId, NodeKind, ParseError, Position};
