use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const WELCOME_CONTENT: &str = "# Welcome to jotmark

Notes are plain Markdown. Type a marker and press space to format a line:

- `#` to `######` then space for headings
- `-`, `*` or `+` then space for a list
- `1.` then space for a numbered list
- `[]` then space for a to-do
- `>` then space for a quote

Press Ctrl+N for a new note and Ctrl+P to preview.";

/// A note as stored. Only `content` and `updated_at` are touched while
/// editing; the rest passes through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// An empty note titled "Untitled", identified by the creation time in
    /// milliseconds.
    pub fn new_untitled(now: DateTime<Utc>) -> Self {
        Self {
            id: now.timestamp_millis().to_string(),
            title: "Untitled".to_string(),
            content: String::new(),
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// The note created on first launch, when the store is empty.
    pub fn welcome(now: DateTime<Utc>) -> Self {
        Self {
            id: "welcome".to_string(),
            title: "Welcome to jotmark".to_string(),
            content: WELCOME_CONTENT.to_string(),
            tags: vec!["welcome".to_string()],
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the content and record the modification time.
    pub fn touch(&mut self, content: String, now: DateTime<Utc>) {
        self.content = content;
        self.updated_at = now;
    }

    /// Character count shown in the status line.
    pub fn char_count(&self) -> usize {
        self.content.chars().count()
    }
}

impl Default for Note {
    fn default() -> Self {
        Self::new_untitled(DateTime::<Utc>::default())
    }
}
