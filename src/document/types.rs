//! Core block types.

use std::fmt;

/// Identifier assigned to a block when it is created.
///
/// Parsing numbers blocks by sequence position; blocks created while
/// editing draw from the owning editor's counter. Identifiers never
/// survive a full re-parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub u64);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "block-{}", self.0)
    }
}

/// The structural type of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Paragraph,
    /// Heading level, always within `1..=6`.
    Heading(u8),
    UnorderedList,
    OrderedList,
    Quote,
    CodeBlock,
    Todo,
}

impl BlockKind {
    /// Heading kind for `level`, or `None` outside `1..=6`.
    pub const fn heading(level: usize) -> Option<Self> {
        if level >= 1 && level <= 6 {
            #[allow(clippy::cast_possible_truncation)]
            Some(Self::Heading(level as u8))
        } else {
            None
        }
    }

    /// Kinds whose leading whitespace is tracked as `indent`.
    pub const fn is_indentable(self) -> bool {
        matches!(self, Self::UnorderedList | Self::OrderedList | Self::Todo)
    }

    /// Stable kebab-case name, e.g. `heading2` or `unordered-list`.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Paragraph => "paragraph",
            Self::Heading(1) => "heading1",
            Self::Heading(2) => "heading2",
            Self::Heading(3) => "heading3",
            Self::Heading(4) => "heading4",
            Self::Heading(5) => "heading5",
            Self::Heading(_) => "heading6",
            Self::UnorderedList => "unordered-list",
            Self::OrderedList => "ordered-list",
            Self::Quote => "quote",
            Self::CodeBlock => "code-block",
            Self::Todo => "todo",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single classified line of a note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub id: BlockId,
    pub kind: BlockKind,
    /// Canonical Markdown text for this block, marker included.
    pub content: String,
    /// Marker-stripped text the user edits directly.
    pub display: String,
    /// Leading whitespace width for list and todo blocks.
    pub indent: usize,
    /// List bullet or number token as it was parsed (`-`, `*`, `+`, `3.`).
    pub marker: Option<String>,
    /// Todo completion state.
    pub checked: bool,
    /// Fence language tag for code blocks.
    pub language: Option<String>,
}

impl Block {
    /// A paragraph whose content and display text are both `text`.
    pub fn paragraph(id: BlockId, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            id,
            kind: BlockKind::Paragraph,
            content: text.clone(),
            display: text,
            indent: 0,
            marker: None,
            checked: false,
            language: None,
        }
    }

    /// An empty paragraph.
    pub fn empty(id: BlockId) -> Self {
        Self::paragraph(id, String::new())
    }

    /// Change the block's kind, dropping any fields that the new kind does
    /// not carry.
    pub fn set_kind(&mut self, kind: BlockKind) {
        self.kind = kind;
        if !kind.is_indentable() {
            self.indent = 0;
            self.marker = None;
        }
        if kind != BlockKind::Todo {
            self.checked = false;
        }
        if kind != BlockKind::CodeBlock {
            self.language = None;
        }
    }

    /// Display text length in characters.
    pub fn display_len(&self) -> usize {
        self.display.chars().count()
    }
}
