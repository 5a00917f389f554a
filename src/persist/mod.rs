//! Note records, the store they live in, and debounced saving.

mod note;
mod notifier;
mod store;

pub use note::Note;
pub use notifier::{ChangeNotifier, DEFAULT_DEBOUNCE_MS, persist};
pub use store::{
    EXPORT_VERSION, JsonFileStore, MemoryStore, NoteStore, StoreError, load_or_welcome,
};
