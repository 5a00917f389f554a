//! Debounced persistence scheduling.

use super::note::Note;
use super::store::{NoteStore, StoreError};

/// Default quiet period before a scheduled save runs.
pub const DEFAULT_DEBOUNCE_MS: u64 = 1000;

/// Coalesces bursts of edits into a single save.
///
/// Each `schedule` replaces the pending note and restarts the window, so
/// the save that eventually runs carries the value of the last mutation.
#[derive(Debug)]
pub struct ChangeNotifier {
    delay_ms: u64,
    pending: Option<(Note, u64)>,
}

impl ChangeNotifier {
    pub const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    pub const fn delay_ms(&self) -> u64 {
        self.delay_ms
    }

    pub fn schedule(&mut self, note: Note, now_ms: u64) {
        self.pending = Some((note, now_ms));
    }

    /// The pending note, once the window has passed since the last
    /// `schedule`.
    pub fn take_ready(&mut self, now_ms: u64) -> Option<Note> {
        let (_, queued_at) = self.pending.as_ref()?;
        if now_ms.saturating_sub(*queued_at) >= self.delay_ms {
            self.pending.take().map(|(note, _)| note)
        } else {
            None
        }
    }

    /// The pending note regardless of the window, for explicit saves and
    /// teardown.
    pub fn take_now(&mut self) -> Option<Note> {
        self.pending.take().map(|(note, _)| note)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_MS)
    }
}

/// Write `note` through `store`. Failures are logged and handed back for
/// display; they are never retried.
pub fn persist(store: &dyn NoteStore, note: &Note) -> Result<(), StoreError> {
    let _scope = crate::perf::scope("persist.save");
    match store.save(note) {
        Ok(()) => {
            crate::perf::log_event(
                "persist.saved",
                format!("id={} chars={}", note.id, note.char_count()),
            );
            Ok(())
        }
        Err(err) => {
            tracing::warn!(id = %note.id, error = %err, "failed to save note");
            crate::perf::log_event("persist.error", format!("id={} error={err}", note.id));
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::MemoryStore;

    fn note_with(content: &str) -> Note {
        Note {
            content: content.to_string(),
            ..Note::default()
        }
    }

    #[test]
    fn test_burst_within_window_saves_once_with_last_value() {
        let store = MemoryStore::new();
        let mut notifier = ChangeNotifier::new(1000);
        for (i, now) in [0u64, 100, 250, 600, 900].into_iter().enumerate() {
            notifier.schedule(note_with(&format!("v{i}")), now);
            assert!(notifier.take_ready(now).is_none());
        }
        // Window is measured from the last mutation at 900.
        assert!(notifier.take_ready(1500).is_none());
        let ready = notifier.take_ready(1900).unwrap();
        persist(&store, &ready).unwrap();

        let saves = store.saves();
        assert_eq!(saves.len(), 1);
        assert_eq!(saves[0].content, "v4");
        assert!(!notifier.is_pending());
    }

    #[test]
    fn test_take_now_bypasses_window() {
        let mut notifier = ChangeNotifier::default();
        notifier.schedule(note_with("x"), 0);
        assert_eq!(notifier.take_now().unwrap().content, "x");
        assert!(notifier.take_now().is_none());
    }

    #[test]
    fn test_nothing_ready_without_schedule() {
        let mut notifier = ChangeNotifier::new(10);
        assert!(notifier.take_ready(u64::MAX).is_none());
    }

    #[test]
    fn test_persist_failure_is_returned_not_retried() {
        let store = MemoryStore::new();
        store.set_failing(true);
        assert!(persist(&store, &note_with("x")).is_err());
        store.set_failing(false);
        assert!(store.saves().is_empty());
    }
}
