//! Watching the note store for edits made outside this process.
//!
//! Saves made by jotmark itself trigger events too; telling those apart is
//! left to the session, which skips reloads whose content it already holds.
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};

/// Watches the store file and reports debounced changes.
pub struct StoreWatcher {
    _watcher: RecommendedWatcher,
    rx: Receiver<notify::Result<Event>>,
    watch_root: PathBuf,
    store_path: PathBuf,
    store_name: Option<OsString>,
    debounce: Duration,
    pending_since: Option<Instant>,
}

impl StoreWatcher {
    /// Watch the store at `path`. The file does not need to exist yet; its
    /// parent directory does.
    ///
    /// # Errors
    /// Returns an error if the watcher cannot be created or the directory
    /// cannot be watched.
    pub fn new(path: impl AsRef<Path>, debounce: Duration) -> notify::Result<Self> {
        // Event paths from the OS are canonical; match them against a
        // canonical store path.
        let path = path.as_ref();
        let store_path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        let store_name = store_path.file_name().map(std::ffi::OsStr::to_os_string);
        let watch_root = watch_root_for(&store_path);

        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        })?;
        watcher.watch(&watch_root, RecursiveMode::NonRecursive)?;

        Ok(Self {
            _watcher: watcher,
            rx,
            watch_root,
            store_path,
            store_name,
            debounce,
            pending_since: None,
        })
    }

    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    /// Drain pending events. Returns true once the store has been quiet for
    /// the debounce period after a relevant change.
    pub fn take_change_ready(&mut self) -> bool {
        let mut relevant = 0u32;
        let mut ignored = 0u32;
        while let Ok(event) = self.rx.try_recv() {
            match event {
                Ok(ev) if self.is_relevant(&ev) => relevant += 1,
                Ok(_) => ignored += 1,
                Err(err) => {
                    tracing::debug!(error = %err, "store watcher error");
                    crate::perf::log_event("watcher.error", format!("{err}"));
                }
            }
        }

        if relevant + ignored > 0 {
            crate::perf::log_event(
                "watcher.poll",
                format!(
                    "relevant={relevant} ignored={ignored} store={}",
                    self.store_path.display()
                ),
            );
        }
        if relevant > 0 {
            self.pending_since = Some(Instant::now());
        }

        match self.pending_since {
            Some(since) if since.elapsed() >= self.debounce => {
                self.pending_since = None;
                true
            }
            _ => false,
        }
    }

    fn is_relevant(&self, event: &Event) -> bool {
        event.paths.iter().any(|path| {
            path == &self.watch_root
                || path == &self.store_path
                || self
                    .store_name
                    .as_ref()
                    .is_some_and(|name| path.file_name().is_some_and(|f| f == name))
        })
    }
}

fn watch_root_for(path: &Path) -> PathBuf {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}
