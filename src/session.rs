//! One editing session over a single note.
//!
//! The session owns the active surface, the note it edits, and the notifier
//! that schedules saves. Every content update is tagged with where it came
//! from: text loaded from outside is parsed into the surface, text the
//! surface produced itself is only recorded. Nothing the session writes is
//! ever fed back through the parser.

use std::fmt;

use chrono::Utc;

use crate::editor::{EditInput, EditOutcome, EditingSurface, SurfaceKind, ViewLine, surface_for};
use crate::persist::{ChangeNotifier, DEFAULT_DEBOUNCE_MS, Note, NoteStore, StoreError, persist};

/// Where a content update originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateSource {
    /// Text from outside the session: note switch or store reload.
    ExternalLoad,
    /// Text the active surface just serialized.
    SelfSerialize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentUpdate {
    pub source: UpdateSource,
    pub text: String,
}

impl ContentUpdate {
    pub fn external(text: impl Into<String>) -> Self {
        Self {
            source: UpdateSource::ExternalLoad,
            text: text.into(),
        }
    }

    pub fn serialized(text: impl Into<String>) -> Self {
        Self {
            source: UpdateSource::SelfSerialize,
            text: text.into(),
        }
    }
}

pub struct Session {
    note: Note,
    surface: Box<dyn EditingSurface>,
    notifier: ChangeNotifier,
}

impl Session {
    /// Start editing `note` on a fresh surface of `kind`.
    pub fn open(note: Note, kind: SurfaceKind, debounce_ms: u64) -> Self {
        let surface = surface_for(kind, &note.content);
        crate::perf::log_event(
            "session.open",
            format!("id={} surface={kind:?} chars={}", note.id, note.char_count()),
        );
        Self {
            note,
            surface,
            notifier: ChangeNotifier::new(debounce_ms),
        }
    }

    pub const fn note(&self) -> &Note {
        &self.note
    }

    pub fn surface_kind(&self) -> SurfaceKind {
        self.surface.kind()
    }

    pub fn view(&self) -> Vec<ViewLine> {
        self.surface.view()
    }

    pub fn caret_row(&self) -> usize {
        self.surface.caret_row()
    }

    pub fn caret_pending(&self) -> bool {
        self.surface.caret_pending()
    }

    /// Whether an edit is waiting for its save.
    pub const fn has_unsaved_changes(&self) -> bool {
        self.notifier.is_pending()
    }

    /// Record a content update. Returns true when the surface was rebuilt.
    pub fn apply(&mut self, update: ContentUpdate) -> bool {
        match update.source {
            UpdateSource::ExternalLoad => {
                tracing::debug!(id = %self.note.id, chars = update.text.len(), "external load");
                self.surface.load(&update.text);
                self.note.content = update.text;
                true
            }
            UpdateSource::SelfSerialize => {
                self.note.touch(update.text, Utc::now());
                false
            }
        }
    }

    /// Feed one input to the surface. Changes bump `updated_at` and schedule
    /// a save `now_ms`-relative.
    pub fn input(&mut self, input: EditInput, now_ms: u64) -> EditOutcome {
        let outcome = self.surface.handle(input);
        if outcome.is_change() {
            let text = self.surface.text();
            self.apply(ContentUpdate::serialized(text));
            self.notifier.schedule(self.note.clone(), now_ms);
        }
        outcome
    }

    /// Change the note title. Titles are pass-through, but still saved.
    pub fn set_title(&mut self, title: impl Into<String>, now_ms: u64) {
        self.note.title = title.into();
        self.note.updated_at = Utc::now();
        self.notifier.schedule(self.note.clone(), now_ms);
    }

    /// Apply deferred caret work.
    pub fn commit_caret(&mut self) {
        self.surface.commit_caret();
    }

    /// Periodic work: commit the caret, then run a save whose window has
    /// passed. Returns the save result if one ran.
    pub fn tick(&mut self, now_ms: u64, store: &dyn NoteStore) -> Option<Result<(), StoreError>> {
        self.surface.commit_caret();
        let note = self.notifier.take_ready(now_ms)?;
        Some(persist(store, &note))
    }

    /// Explicit save: persist the current note now, skipping the window.
    ///
    /// # Errors
    /// Returns the store error; the note stays in memory and editing goes on.
    pub fn save_now(&mut self, store: &dyn NoteStore) -> Result<(), StoreError> {
        self.notifier.cancel();
        persist(store, &self.note)
    }

    /// Flush a pending save before the session goes away.
    pub fn teardown(&mut self, store: &dyn NoteStore) -> Option<Result<(), StoreError>> {
        let note = self.notifier.take_now()?;
        Some(persist(store, &note))
    }

    /// Take in a stored copy of this note that changed outside the session.
    ///
    /// Returns false when nothing was reloaded: the copy is our own save
    /// coming back, or local edits are still waiting to be written.
    pub fn reload(&mut self, stored: Note) -> bool {
        if stored.id != self.note.id || self.notifier.is_pending() {
            return false;
        }
        if stored.content == self.note.content {
            self.note = stored;
            return false;
        }
        let text = stored.content.clone();
        self.note = stored;
        self.apply(ContentUpdate::external(text))
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::open(Note::default(), SurfaceKind::default(), DEFAULT_DEBOUNCE_MS)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("note", &self.note.id)
            .field("surface", &self.surface.kind())
            .field("notifier", &self.notifier)
            .finish()
    }
}
