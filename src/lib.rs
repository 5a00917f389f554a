// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. persist::NoteStore)
    clippy::module_name_repetitions
)]

//! # Jotmark
//!
//! A terminal sticky-note editor with live Markdown block shortcuts.
//!
//! Notes are plain Markdown. Typing a marker such as `#`, `-`, `1.`, `>`,
//! `[]` or a code fence followed by a space turns the current block into
//! that type. Two editing surfaces share one parser and serializer:
//! - a block surface, where every line is its own typed block
//! - a flat surface, where the whole note is one text buffer
//!
//! ## Architecture
//!
//! Jotmark uses The Elm Architecture (TEA) pattern:
//! - **Model**: Application state
//! - **Message**: Events and actions
//! - **Update**: Pure state transitions
//! - **View**: Render to terminal
//!
//! ## Modules
//!
//! - [`document`]: Block model, line parser and serializer
//! - [`editor`]: Caret model and the two editing surfaces
//! - [`session`]: One note being edited, with tagged content updates
//! - [`persist`]: Note records, the JSON store and debounced saving
//! - [`preview`]: Read-only rendered preview
//! - [`app`]: Main application loop and state
//! - [`ui`]: Terminal UI components
//! - [`config`]: Flag files merged with the command line
//! - [`watcher`]: Reload on external store edits

pub mod app;
pub mod config;
pub mod document;
pub mod editor;
pub mod perf;
pub mod persist;
pub mod preview;
pub mod session;
pub mod ui;
pub mod watcher;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::{App, Message, Model};
    pub use crate::document::{Block, BlockKind};
    pub use crate::editor::{EditInput, EditingSurface, SurfaceKind};
    pub use crate::persist::{Note, NoteStore};
    pub use crate::session::Session;
}
