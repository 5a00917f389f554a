use std::time::{Duration, Instant};

use crate::editor::{EditInput, SurfaceKind};
use crate::persist::{DEFAULT_DEBOUNCE_MS, Note};
use crate::preview::{ComrakPreview, PreviewLine, PreviewRenderer};
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
struct Toast {
    level: ToastLevel,
    message: String,
    expires_at: Instant,
}

/// Which field the prompt line is collecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptStage {
    LinkUrl,
    LinkText,
    Title,
}

/// What accepting a prompt field led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptOutcome {
    /// Deliver this edit to the surface.
    Edit(EditInput),
    /// Rename the note.
    Rename(String),
    /// Keep prompting for the next field.
    Next(Prompt),
    /// Nothing to do.
    Cancel,
}

/// Single-line prompt shown above the status bar. Insert-link takes two
/// steps, URL then text; rename takes one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub stage: PromptStage,
    pub url: String,
    pub text: String,
}

impl Prompt {
    pub const fn link() -> Self {
        Self {
            stage: PromptStage::LinkUrl,
            url: String::new(),
            text: String::new(),
        }
    }

    pub fn title(current: &str) -> Self {
        Self {
            stage: PromptStage::Title,
            url: String::new(),
            text: current.to_string(),
        }
    }

    pub fn input(&self) -> &str {
        match self.stage {
            PromptStage::LinkUrl => &self.url,
            PromptStage::LinkText | PromptStage::Title => &self.text,
        }
    }

    pub fn set_input(&mut self, value: String) {
        match self.stage {
            PromptStage::LinkUrl => self.url = value,
            PromptStage::LinkText | PromptStage::Title => self.text = value,
        }
    }

    pub const fn label(&self) -> &'static str {
        match self.stage {
            PromptStage::LinkUrl => "Link URL",
            PromptStage::LinkText => "Link text (empty keeps selection)",
            PromptStage::Title => "Title",
        }
    }

    /// Accept the current field. An empty URL or title cancels.
    pub fn submit(mut self) -> PromptOutcome {
        match self.stage {
            PromptStage::LinkUrl | PromptStage::Title if self.input().trim().is_empty() => {
                PromptOutcome::Cancel
            }
            PromptStage::LinkUrl => {
                self.stage = PromptStage::LinkText;
                PromptOutcome::Next(self)
            }
            PromptStage::LinkText => PromptOutcome::Edit(EditInput::InsertLink {
                url: self.url.trim().to_string(),
                text: self.text,
            }),
            PromptStage::Title => PromptOutcome::Rename(self.text.trim().to_string()),
        }
    }
}

/// The complete application state.
///
/// All state lives here - no global or scattered state.
#[derive(Debug)]
pub struct Model {
    /// Every note, newest first. The active one is `notes[current]`, though
    /// its live copy is the one inside `session`.
    pub notes: Vec<Note>,
    pub current: usize,
    pub session: Session,
    pub surface_kind: SurfaceKind,
    pub debounce_ms: u64,
    pub preview_visible: bool,
    pub preview: Vec<PreviewLine>,
    pub prompt: Option<Prompt>,
    /// First editor row shown.
    pub scroll_offset: usize,
    pub width: u16,
    pub height: u16,
    /// Milliseconds since the event loop started, stamped before each
    /// message is handled.
    pub now_ms: u64,
    pub should_quit: bool,
    toast: Option<Toast>,
}

impl Model {
    /// Build a model over `notes` and open the first one. An empty list gets
    /// a single blank note.
    pub fn new(
        mut notes: Vec<Note>,
        surface_kind: SurfaceKind,
        debounce_ms: u64,
        size: (u16, u16),
    ) -> Self {
        if notes.is_empty() {
            notes.push(Note::default());
        }
        let session = Session::open(notes[0].clone(), surface_kind, debounce_ms);
        Self {
            notes,
            current: 0,
            session,
            surface_kind,
            debounce_ms,
            preview_visible: false,
            preview: Vec::new(),
            prompt: None,
            scroll_offset: 0,
            width: size.0,
            height: size.1,
            now_ms: 0,
            should_quit: false,
            toast: None,
        }
    }

    /// Start a session on `notes[index]`.
    pub fn open_note(&mut self, index: usize) {
        self.current = index.min(self.notes.len().saturating_sub(1));
        let note = self.notes.get(self.current).cloned().unwrap_or_default();
        self.session = Session::open(note, self.surface_kind, self.debounce_ms);
        self.scroll_offset = 0;
        self.prompt = None;
        self.refresh_preview();
    }

    /// Open the note with `id`. Returns false if there is none.
    pub fn open_note_by_id(&mut self, id: &str) -> bool {
        let Some(index) = self.notes.iter().position(|n| n.id == id) else {
            return false;
        };
        self.open_note(index);
        true
    }

    /// Copy the session's live note back into the note list.
    pub fn sync_current(&mut self) {
        if let Some(slot) = self.notes.get_mut(self.current) {
            slot.clone_from(self.session.note());
        }
    }

    pub fn refresh_preview(&mut self) {
        if self.preview_visible {
            self.preview = ComrakPreview.render(&self.session.note().content);
        } else {
            self.preview.clear();
        }
    }

    /// Rows available to the editor, after the status bar and any toast or
    /// prompt line.
    pub fn editor_rows(&self) -> usize {
        let footer = 1 + u16::from(self.toast.is_some() || self.prompt.is_some());
        usize::from(self.height.saturating_sub(footer))
    }

    /// Scroll just enough to keep the caret row on screen.
    pub fn ensure_caret_visible(&mut self) {
        let rows = self.editor_rows().max(1);
        let caret_row = self.session.caret_row();
        if caret_row < self.scroll_offset {
            self.scroll_offset = caret_row;
        } else if caret_row >= self.scroll_offset + rows {
            self.scroll_offset = caret_row + 1 - rows;
        }
    }

    pub(super) fn show_toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.toast = Some(Toast {
            level,
            message: message.into(),
            expires_at: Instant::now() + Duration::from_secs(4),
        });
    }

    pub(super) fn expire_toast(&mut self, now: Instant) -> bool {
        if self
            .toast
            .as_ref()
            .is_some_and(|toast| toast.expires_at <= now)
        {
            self.toast = None;
            return true;
        }
        false
    }

    pub fn active_toast(&self) -> Option<(&str, ToastLevel)> {
        self.toast
            .as_ref()
            .map(|toast| (toast.message.as_str(), toast.level))
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new(Vec::new(), SurfaceKind::default(), DEFAULT_DEBOUNCE_MS, (80, 24))
    }
}
