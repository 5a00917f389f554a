//! Editing surfaces for a single note.
//!
//! Two surfaces share the block parser, serializer and caret model but each
//! owns its own keystroke rules:
//! - [`BlockEditor`]: one input per block, Markdown shorthand converts the
//!   block's type in place.
//! - [`FlatEditor`]: one rope-backed buffer for the whole note, shorthand
//!   rewrites the current line.
//!
//! Both implement [`EditingSurface`], which is all a session needs.

mod blocks;
mod buffer;
pub mod caret;
mod flat;

pub use blocks::BlockEditor;
pub use buffer::{Direction, TextBuffer};
pub use caret::Caret;
pub use flat::FlatEditor;

use crate::document::BlockKind;

/// Inline formatting wrapped around a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InlineFormat {
    Bold,
    Italic,
    Code,
}

impl InlineFormat {
    /// The marker written on each side of the selection.
    pub const fn marker(self) -> &'static str {
        match self {
            Self::Bold => "**",
            Self::Italic => "*",
            Self::Code => "`",
        }
    }
}

/// One input event delivered to a surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditInput {
    /// A typed character. Space may trigger a shortcut.
    Char(char),
    Enter,
    Backspace,
    Delete,
    /// Tab.
    Indent,
    /// Shift+Tab.
    Outdent,
    /// Clipboard contents; `None` when the clipboard held no text.
    Paste(Option<String>),
    Format(InlineFormat),
    InsertLink { url: String, text: String },
    ToggleTodo,
    Move { direction: Direction, extend: bool },
    Home,
    End,
}

/// What handling an input did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// No rule applied and nothing changed.
    Ignored,
    /// Only the caret or selection moved.
    CaretMoved,
    /// The note text changed.
    Changed,
}

impl EditOutcome {
    pub const fn is_change(self) -> bool {
        matches!(self, Self::Changed)
    }
}

/// The surface variants a session can run.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SurfaceKind {
    #[default]
    Blocks,
    Flat,
}

/// One row of a surface, ready to draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewLine {
    pub kind: BlockKind,
    /// Text shown to the user: display text for blocks, the raw line for
    /// the flat buffer.
    pub text: String,
    pub indent: usize,
    /// Number shown for ordered-list blocks.
    pub ordinal: Option<usize>,
    pub checked: bool,
    /// Whether the renderer should draw a marker for `kind` itself.
    pub decorated: bool,
    /// Caret and selection when this row holds the caret.
    pub caret: Option<Caret>,
}

/// A keystroke-driven editor over one note's text.
pub trait EditingSurface {
    fn kind(&self) -> SurfaceKind;

    /// Apply one input. Any caret work deferred by the previous input is
    /// committed first.
    fn handle(&mut self, input: EditInput) -> EditOutcome;

    /// Canonical note text.
    fn text(&self) -> String;

    /// Replace everything with externally loaded `text`.
    fn load(&mut self, text: &str);

    /// Apply caret work scheduled by the last mutation.
    fn commit_caret(&mut self);

    /// Whether caret work is waiting for the next tick.
    fn caret_pending(&self) -> bool;

    /// Rows for rendering.
    fn view(&self) -> Vec<ViewLine>;

    /// Index of the row holding the caret.
    fn caret_row(&self) -> usize;
}

/// Build an empty surface of `kind` loaded with `text`.
pub fn surface_for(kind: SurfaceKind, text: &str) -> Box<dyn EditingSurface> {
    match kind {
        SurfaceKind::Blocks => Box::new(BlockEditor::from_text(text)),
        SurfaceKind::Flat => Box::new(FlatEditor::from_text(text)),
    }
}
