//! Note storage: a JSON file of notes, plus an in-memory store for tests.

use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::note::Note;

/// Version written into export files.
pub const EXPORT_VERSION: &str = "1.0.0";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed note data in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("note {0} not found")]
    NotFound(String),
    #[error("import has no notes array")]
    InvalidImport,
}

/// The persistence collaborator an editing session writes through.
pub trait NoteStore {
    /// Insert `note`, or replace the stored note with the same id.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read or written.
    fn save(&self, note: &Note) -> Result<(), StoreError>;

    /// All notes, newest first.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read.
    fn load_all(&self) -> Result<Vec<Note>, StoreError>;

    /// Remove the note with `id`.
    ///
    /// # Errors
    /// Returns [`StoreError::NotFound`] if no such note exists, or an I/O
    /// error if the store cannot be updated.
    fn delete(&self, id: &str) -> Result<(), StoreError>;
}

/// Replace-by-id, otherwise insert at the front.
fn upsert(notes: &mut Vec<Note>, note: &Note) {
    if let Some(existing) = notes.iter_mut().find(|n| n.id == note.id) {
        *existing = note.clone();
    } else {
        notes.insert(0, note.clone());
    }
}

fn remove(notes: &mut Vec<Note>, id: &str) -> Result<(), StoreError> {
    let before = notes.len();
    notes.retain(|n| n.id != id);
    if notes.len() == before {
        return Err(StoreError::NotFound(id.to_string()));
    }
    Ok(())
}

/// All stored notes, or a freshly saved welcome note when the store is empty.
///
/// # Errors
/// Returns an error if the store cannot be read or the welcome note cannot
/// be written.
pub fn load_or_welcome(store: &dyn NoteStore, now: DateTime<Utc>) -> Result<Vec<Note>, StoreError> {
    let notes = store.load_all()?;
    if !notes.is_empty() {
        return Ok(notes);
    }
    let welcome = Note::welcome(now);
    store.save(&welcome)?;
    tracing::debug!("created welcome note");
    Ok(vec![welcome])
}

/// Envelope written by [`JsonFileStore::export`].
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExportEnvelope {
    version: String,
    export_date: DateTime<Utc>,
    notes: Vec<Note>,
}

/// All notes kept as one JSON array in a single file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default store location under the user's data directory.
    pub fn default_path() -> PathBuf {
        if let Some(xdg) = std::env::var_os("XDG_DATA_HOME") {
            return PathBuf::from(xdg).join("jotmark").join("notes.json");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join(".local")
                .join("share")
                .join("jotmark")
                .join("notes.json");
        }
        PathBuf::from("jotmark-notes.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn read(&self) -> Result<Vec<Note>, StoreError> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(self.io_error(err)),
        };
        if data.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&data).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })
    }

    fn write(&self, notes: &[Note]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|err| self.io_error(err))?;
        }
        let json = serde_json::to_string_pretty(notes).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, json).map_err(|err| self.io_error(err))
    }

    /// All notes wrapped in a versioned envelope with the export time.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read.
    pub fn export(&self, now: DateTime<Utc>) -> Result<String, StoreError> {
        let envelope = ExportEnvelope {
            version: EXPORT_VERSION.to_string(),
            export_date: now,
            notes: self.read()?,
        };
        serde_json::to_string_pretty(&envelope).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })
    }

    /// Replace every stored note with the notes of an export envelope.
    /// Returns how many notes were imported.
    ///
    /// # Errors
    /// Returns [`StoreError::InvalidImport`] if `json` has no `notes` array.
    pub fn import(&self, json: &str) -> Result<usize, StoreError> {
        #[derive(Deserialize)]
        struct Incoming {
            notes: Option<Vec<Note>>,
        }
        let incoming: Incoming = serde_json::from_str(json).map_err(|_| StoreError::InvalidImport)?;
        let notes = incoming.notes.ok_or(StoreError::InvalidImport)?;
        self.write(&notes)?;
        Ok(notes.len())
    }
}

impl NoteStore for JsonFileStore {
    fn save(&self, note: &Note) -> Result<(), StoreError> {
        let mut notes = self.read()?;
        upsert(&mut notes, note);
        self.write(&notes)
    }

    fn load_all(&self) -> Result<Vec<Note>, StoreError> {
        self.read()
    }

    fn delete(&self, id: &str) -> Result<(), StoreError> {
        let mut notes = self.read()?;
        remove(&mut notes, id)?;
        self.write(&notes)
    }
}

/// A store held in memory. Every save is recorded so tests can count
/// persistence calls.
#[derive(Debug, Default)]
pub struct MemoryStore {
    notes: RefCell<Vec<Note>>,
    saves: RefCell<Vec<Note>>,
    fail: RefCell<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_notes(notes: Vec<Note>) -> Self {
        Self {
            notes: RefCell::new(notes),
            ..Self::default()
        }
    }

    /// Every note passed to `save`, in call order.
    pub fn saves(&self) -> Vec<Note> {
        self.saves.borrow().clone()
    }

    /// Make every following call fail with an I/O error.
    pub fn set_failing(&self, fail: bool) {
        *self.fail.borrow_mut() = fail;
    }

    fn check(&self) -> Result<(), StoreError> {
        if *self.fail.borrow() {
            return Err(StoreError::Io {
                path: PathBuf::from("<memory>"),
                source: io::Error::other("store unavailable"),
            });
        }
        Ok(())
    }
}

impl NoteStore for MemoryStore {
    fn save(&self, note: &Note) -> Result<(), StoreError> {
        self.check()?;
        self.saves.borrow_mut().push(note.clone());
        upsert(&mut self.notes.borrow_mut(), note);
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<Note>, StoreError> {
        self.check()?;
        Ok(self.notes.borrow().clone())
    }

    fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.check()?;
        remove(&mut self.notes.borrow_mut(), id)
    }
}
