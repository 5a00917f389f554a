use std::path::Path;
use std::time::Duration;

use chrono::Utc;

use crate::app::{App, Message, Model, ToastLevel};
use crate::persist::{Note, NoteStore, StoreError};
use crate::watcher::StoreWatcher;

impl App {
    pub(super) fn make_store_watcher(path: &Path) -> notify::Result<StoreWatcher> {
        StoreWatcher::new(path, Duration::from_millis(200))
    }

    /// Store work that follows a message. `update` has already run.
    pub(super) fn handle_message_side_effects(
        model: &mut Model,
        store: &dyn NoteStore,
        msg: &Message,
    ) {
        match msg {
            Message::Save => match model.session.save_now(store) {
                Ok(()) => {
                    model.sync_current();
                    model.show_toast(ToastLevel::Info, "Saved");
                }
                Err(err) => report_save_error(model, &err),
            },
            Message::NewNote => {
                flush(model, store);
                let note = Note::new_untitled(Utc::now());
                if let Err(err) = store.save(&note) {
                    report_save_error(model, &err);
                }
                model.notes.insert(0, note);
                model.open_note(0);
                model.show_toast(ToastLevel::Info, "New note");
            }
            Message::DeleteNote => delete_current(model, store),
            Message::NextNote | Message::PrevNote => {
                if model.notes.len() < 2 {
                    return;
                }
                flush(model, store);
                let len = model.notes.len();
                let next = if matches!(msg, Message::NextNote) {
                    (model.current + 1) % len
                } else {
                    (model.current + len - 1) % len
                };
                model.open_note(next);
            }
            Message::StoreChanged => reload_from_store(model, store),
            Message::Quit => flush(model, store),
            _ => {}
        }
    }

    /// Periodic work between events: deferred caret commits and any save
    /// whose debounce window has passed.
    pub(super) fn tick(model: &mut Model, store: &dyn NoteStore, now_ms: u64) -> bool {
        let caret_pending = model.session.caret_pending();
        let Some(result) = model.session.tick(now_ms, store) else {
            return caret_pending;
        };
        match result {
            Ok(()) => model.sync_current(),
            Err(err) => report_save_error(model, &err),
        }
        true
    }
}

/// Write out a pending edit before the session changes hands.
fn flush(model: &mut Model, store: &dyn NoteStore) {
    if let Some(Err(err)) = model.session.teardown(store) {
        report_save_error(model, &err);
    }
    model.sync_current();
}

fn delete_current(model: &mut Model, store: &dyn NoteStore) {
    let id = model.session.note().id.clone();
    match store.delete(&id) {
        Ok(()) | Err(StoreError::NotFound(_)) => {}
        Err(err) => {
            tracing::warn!(%id, error = %err, "delete failed");
            model.show_toast(ToastLevel::Error, format!("Delete failed: {err}"));
            return;
        }
    }
    crate::perf::log_event("note.delete", format!("id={id}"));
    model.notes.retain(|n| n.id != id);
    if model.notes.is_empty() {
        let note = Note::new_untitled(Utc::now());
        if let Err(err) = store.save(&note) {
            report_save_error(model, &err);
        }
        model.notes.push(note);
    }
    // The note after the deleted one slid into its slot.
    let index = model.current.min(model.notes.len() - 1);
    model.open_note(index);
    model.show_toast(ToastLevel::Info, "Note deleted");
}

fn reload_from_store(model: &mut Model, store: &dyn NoteStore) {
    let notes = match store.load_all() {
        Ok(notes) => notes,
        Err(err) => {
            tracing::warn!(error = %err, "reload failed");
            crate::perf::log_event("store.reload.error", err.to_string());
            model.show_toast(ToastLevel::Warning, format!("Reload failed: {err}"));
            return;
        }
    };
    let id = model.session.note().id.clone();
    let stored = notes.iter().find(|n| n.id == id).cloned();
    // Keep the in-memory copy of the open note; the stored list may not have
    // it yet if its first save is still pending.
    let live = model.session.note().clone();
    model.notes = notes;
    match model.notes.iter().position(|n| n.id == id) {
        Some(index) => model.current = index,
        None => {
            model.notes.insert(0, live);
            model.current = 0;
        }
    }
    if let Some(stored) = stored
        && model.session.reload(stored)
    {
        model.sync_current();
        model.refresh_preview();
        model.show_toast(ToastLevel::Info, "Reloaded from store");
    }
}

fn report_save_error(model: &mut Model, err: &StoreError) {
    model.show_toast(ToastLevel::Error, format!("Save failed: {err}"));
}
