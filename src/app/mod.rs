//! Application state and main event loop.
//!
//! This module implements The Elm Architecture (TEA):
//! - [`Model`]: The complete application state
//! - [`Message`]: All possible events and actions
//! - [`update`]: Pure function for state transitions
//! - [`App::run`]: Main event loop with rendering

mod effects;
mod event_loop;
mod input;
mod model;
mod update;

pub use model::{Model, Prompt, PromptOutcome, PromptStage, ToastLevel};
pub use update::{Message, update};

use std::path::PathBuf;

use ratatui::Frame;

use crate::editor::SurfaceKind;
use crate::persist::DEFAULT_DEBOUNCE_MS;

/// Main application struct that owns the terminal and runs the event loop.
pub struct App {
    store_path: PathBuf,
    surface: SurfaceKind,
    debounce_ms: u64,
    preview_visible: bool,
    initial_note: Option<String>,
    watch_enabled: bool,
}

impl App {
    /// Create a new application over the notes file at `store_path`.
    pub fn new(store_path: PathBuf) -> Self {
        Self {
            store_path,
            surface: SurfaceKind::default(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            preview_visible: false,
            initial_note: None,
            watch_enabled: true,
        }
    }

    /// Choose the editing surface.
    pub const fn with_surface(mut self, surface: SurfaceKind) -> Self {
        self.surface = surface;
        self
    }

    /// Set the quiet period before an edit is saved.
    pub const fn with_debounce_ms(mut self, debounce_ms: u64) -> Self {
        self.debounce_ms = debounce_ms;
        self
    }

    /// Set initial preview visibility.
    pub const fn with_preview_visible(mut self, visible: bool) -> Self {
        self.preview_visible = visible;
        self
    }

    /// Open the note with this id instead of the newest one.
    pub fn with_initial_note(mut self, id: Option<String>) -> Self {
        self.initial_note = id;
        self
    }

    /// Enable or disable reloading when the store file changes.
    pub const fn with_watch(mut self, enabled: bool) -> Self {
        self.watch_enabled = enabled;
        self
    }

    fn view(model: &mut Model, frame: &mut Frame) {
        crate::ui::render(model, frame);
    }
}
