//! Block-structured surface: one editable input per block.

use crate::document::{self, Block, BlockId, BlockKind};

use super::caret::{Caret, Deferred, char_len, char_slice, splice};
use super::{Direction, EditInput, EditOutcome, EditingSurface, SurfaceKind, ViewLine};

/// Where focus and caret land once a mutation has been committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Focus {
    block: usize,
    caret: Caret,
}

/// A shorthand typed into an otherwise empty block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Conversion {
    kind: BlockKind,
    checked: bool,
}

/// Match the whole display text against the block shorthands.
fn shortcut_for(display: &str) -> Option<Conversion> {
    let kind = |kind| {
        Some(Conversion {
            kind,
            checked: false,
        })
    };
    match display {
        "-" | "*" | "+" => kind(BlockKind::UnorderedList),
        ">" => kind(BlockKind::Quote),
        "```" => kind(BlockKind::CodeBlock),
        "[]" | "[ ]" => kind(BlockKind::Todo),
        "[x]" | "[X]" => Some(Conversion {
            kind: BlockKind::Todo,
            checked: true,
        }),
        s if !s.is_empty() && s.len() <= 6 && s.bytes().all(|b| b == b'#') => {
            BlockKind::heading(s.len()).and_then(kind)
        }
        s if s.len() > 1
            && s.ends_with('.')
            && s[..s.len() - 1].bytes().all(|b| b.is_ascii_digit()) =>
        {
            kind(BlockKind::OrderedList)
        }
        _ => None,
    }
}

/// Editor over a sequence of blocks, with one focused block at a time.
///
/// Enter always starts a new block; there is no line break inside a block.
#[derive(Debug)]
pub struct BlockEditor {
    blocks: Vec<Block>,
    focus: usize,
    caret: Caret,
    pending: Deferred<Focus>,
    next_id: u64,
}

impl BlockEditor {
    /// Parse `text` into blocks and focus the first one.
    pub fn from_text(text: &str) -> Self {
        let blocks = document::parse(text);
        let next_id = blocks.len() as u64;
        Self {
            blocks,
            focus: 0,
            caret: Caret::default(),
            pending: Deferred::new(),
            next_id,
        }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Index of the focused block.
    pub const fn focus(&self) -> usize {
        self.focus
    }

    /// Caret within the focused block's display text.
    pub const fn caret(&self) -> Caret {
        self.caret
    }

    /// Focus `block` with the caret at `caret`, clamped to its text.
    pub fn set_focus(&mut self, block: usize, caret: Caret) {
        self.focus = block.min(self.blocks.len().saturating_sub(1));
        self.caret = caret.clamped(self.blocks[self.focus].display_len());
    }

    fn current(&self) -> &Block {
        &self.blocks[self.focus]
    }

    fn fresh_id(&mut self) -> BlockId {
        let id = BlockId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Store new display text for the focused block and regenerate its
    /// canonical content.
    fn set_display(&mut self, display: String) {
        let block = &mut self.blocks[self.focus];
        if block.kind == BlockKind::CodeBlock {
            let tag = display.trim();
            block.language = (!tag.is_empty()).then(|| tag.to_string());
        }
        block.display = display;
        document::retemplate(&mut self.blocks, self.focus);
    }

    /// Re-template after a structural change. Ordered-list numbering depends
    /// on every block before it.
    fn restructure(&mut self) {
        document::retemplate(&mut self.blocks, self.focus);
        document::renumber(&mut self.blocks);
    }

    fn schedule(&mut self, block: usize, caret: Caret) {
        self.pending.schedule(Focus { block, caret });
    }

    /// Replace the selection in the focused block with `text` and put the
    /// caret after it.
    fn replace_selection(&mut self, text: &str) -> EditOutcome {
        let range = self.caret.range();
        let display = splice(&self.current().display, range.clone(), text);
        self.set_display(display);
        self.schedule(self.focus, Caret::at(range.start + char_len(text)));
        EditOutcome::Changed
    }

    fn insert_char(&mut self, ch: char) -> EditOutcome {
        if ch == ' '
            && let Some(conversion) = shortcut_for(&self.current().display)
        {
            return self.convert(conversion);
        }
        let mut buf = [0u8; 4];
        self.replace_selection(ch.encode_utf8(&mut buf))
    }

    /// Turn the focused block into `conversion.kind`. The typed shorthand is
    /// consumed, never written into the block.
    fn convert(&mut self, conversion: Conversion) -> EditOutcome {
        let block = &mut self.blocks[self.focus];
        block.set_kind(conversion.kind);
        block.checked = conversion.checked;
        block.display.clear();
        if conversion.kind.is_indentable() {
            block.marker = Some(match conversion.kind {
                BlockKind::OrderedList => "1.".to_string(),
                _ => "-".to_string(),
            });
        }
        if conversion.kind == BlockKind::CodeBlock {
            block.content = document::code_entry(block);
        }
        self.restructure();
        tracing::debug!(block = %self.current().id, kind = %conversion.kind, "block shortcut");
        self.schedule(self.focus, Caret::at(0));
        EditOutcome::Changed
    }

    /// Split at the caret; the text after it moves into a new paragraph
    /// inserted right after the focused block.
    fn split(&mut self) -> EditOutcome {
        let range = self.caret.range();
        let display = self.current().display.clone();
        let head = char_slice(&display, 0..range.start).to_string();
        let tail = char_slice(&display, range.end..char_len(&display)).to_string();
        self.set_display(head);

        let id = self.fresh_id();
        self.blocks.insert(self.focus + 1, Block::paragraph(id, tail));
        document::renumber(&mut self.blocks);
        self.schedule(self.focus + 1, Caret::at(0));
        EditOutcome::Changed
    }

    fn backspace(&mut self) -> EditOutcome {
        if !self.caret.is_collapsed() {
            return self.replace_selection("");
        }
        let block = self.current();
        if block.display.is_empty() && block.kind != BlockKind::Paragraph {
            // Strip formatting; the block itself stays.
            self.blocks[self.focus].set_kind(BlockKind::Paragraph);
            self.restructure();
            self.schedule(self.focus, Caret::at(0));
            return EditOutcome::Changed;
        }
        if block.display.is_empty() && self.focus > 0 {
            // The empty block goes away. Nothing is merged into the previous one.
            self.blocks.remove(self.focus);
            document::renumber(&mut self.blocks);
            let previous = self.focus - 1;
            let end = self.blocks[previous].display_len();
            self.schedule(previous, Caret::at(end));
            return EditOutcome::Changed;
        }
        let head = self.caret.head;
        if head == 0 {
            return EditOutcome::Ignored;
        }
        self.caret = Caret::span(head - 1, head);
        self.replace_selection("")
    }

    fn delete_forward(&mut self) -> EditOutcome {
        if !self.caret.is_collapsed() {
            return self.replace_selection("");
        }
        let head = self.caret.head;
        if head >= self.current().display_len() {
            return EditOutcome::Ignored;
        }
        self.caret = Caret::span(head, head + 1);
        self.replace_selection("")
    }

    fn adjust_indent(&mut self, deeper: bool) -> EditOutcome {
        let block = &mut self.blocks[self.focus];
        if !block.kind.is_indentable() {
            return EditOutcome::Ignored;
        }
        let indent = if deeper {
            block.indent + 2
        } else {
            block.indent.saturating_sub(2)
        };
        if indent == block.indent {
            return EditOutcome::Ignored;
        }
        block.indent = indent;
        document::retemplate(&mut self.blocks, self.focus);
        self.schedule(self.focus, self.caret);
        EditOutcome::Changed
    }

    fn toggle_todo(&mut self) -> EditOutcome {
        let block = &mut self.blocks[self.focus];
        if block.kind != BlockKind::Todo {
            return EditOutcome::Ignored;
        }
        block.checked = !block.checked;
        document::retemplate(&mut self.blocks, self.focus);
        self.schedule(self.focus, self.caret);
        EditOutcome::Changed
    }

    fn insert_link(&mut self, url: &str, text: &str) -> EditOutcome {
        let selected = char_slice(&self.current().display, self.caret.range()).to_string();
        let label = [text, selected.as_str()]
            .into_iter()
            .find(|s| !s.is_empty())
            .unwrap_or("link");
        self.replace_selection(&format!("[{label}]({url})"))
    }

    fn paste(&mut self, text: Option<String>) -> EditOutcome {
        let Some(text) = text else {
            return EditOutcome::Ignored;
        };
        let text = text.replace("\r\n", "\n");
        if text.is_empty() {
            return EditOutcome::Ignored;
        }
        if !text.contains('\n') {
            return self.replace_selection(&text);
        }

        let range = self.caret.range();
        let display = self.current().display.clone();
        let head = char_slice(&display, 0..range.start);
        let tail = char_slice(&display, range.end..char_len(&display)).to_string();
        let mut lines = text.split('\n');
        let first = lines.next().unwrap_or_default();
        self.set_display(format!("{head}{first}"));

        let rest: Vec<&str> = lines.collect();
        let mut at = self.focus;
        for (i, line) in rest.iter().enumerate() {
            let line = if i + 1 == rest.len() {
                format!("{line}{tail}")
            } else {
                (*line).to_string()
            };
            at += 1;
            let id = self.fresh_id();
            self.blocks.insert(at, Block::paragraph(id, line));
        }

        // Blocks whose content spans several lines come back as several
        // blocks, so the last pasted line is found by its line number.
        let target = document::serialize(&self.blocks[..=at]).matches('\n').count();

        // Inserted lines pick up their real types from a full re-parse.
        let reparsed = document::serialize(&self.blocks);
        self.blocks = document::parse(&reparsed);
        self.next_id = self.blocks.len() as u64;
        let end = self.blocks[target].display_len().saturating_sub(char_len(&tail));
        self.schedule(target, Caret::at(end));
        EditOutcome::Changed
    }

    fn move_caret(&mut self, direction: Direction, extend: bool) -> EditOutcome {
        let len = self.current().display_len();
        let head = self.caret.head;
        let anchor = self.caret.anchor;
        match direction {
            Direction::Left if extend => self.caret = Caret::span(anchor, head.saturating_sub(1)),
            Direction::Right if extend => self.caret = Caret::span(anchor, (head + 1).min(len)),
            Direction::Left if !self.caret.is_collapsed() => {
                self.caret = Caret::at(self.caret.start());
            }
            Direction::Right if !self.caret.is_collapsed() => {
                self.caret = Caret::at(self.caret.end());
            }
            Direction::Left if head > 0 => self.caret = Caret::at(head - 1),
            Direction::Right if head < len => self.caret = Caret::at(head + 1),
            Direction::Left | Direction::Up if self.focus > 0 => {
                let col = if direction == Direction::Up {
                    head
                } else {
                    usize::MAX
                };
                self.set_focus(self.focus - 1, Caret::at(col));
            }
            Direction::Right | Direction::Down if self.focus + 1 < self.blocks.len() => {
                let col = if direction == Direction::Down { head } else { 0 };
                self.set_focus(self.focus + 1, Caret::at(col));
            }
            _ => return EditOutcome::Ignored,
        }
        EditOutcome::CaretMoved
    }
}

impl EditingSurface for BlockEditor {
    fn kind(&self) -> SurfaceKind {
        SurfaceKind::Blocks
    }

    fn handle(&mut self, input: EditInput) -> EditOutcome {
        self.commit_caret();
        match input {
            EditInput::Char(ch) => self.insert_char(ch),
            EditInput::Enter => self.split(),
            EditInput::Backspace => self.backspace(),
            EditInput::Delete => self.delete_forward(),
            EditInput::Indent => self.adjust_indent(true),
            EditInput::Outdent => self.adjust_indent(false),
            EditInput::Paste(text) => self.paste(text),
            // Inline formatting belongs to the flat buffer.
            EditInput::Format(_) => EditOutcome::Ignored,
            EditInput::InsertLink { url, text } => self.insert_link(&url, &text),
            EditInput::ToggleTodo => self.toggle_todo(),
            EditInput::Move { direction, extend } => self.move_caret(direction, extend),
            EditInput::Home => {
                self.caret = Caret::at(0);
                EditOutcome::CaretMoved
            }
            EditInput::End => {
                self.caret = Caret::at(self.current().display_len());
                EditOutcome::CaretMoved
            }
        }
    }

    fn text(&self) -> String {
        document::serialize(&self.blocks)
    }

    fn load(&mut self, text: &str) {
        self.blocks = document::parse(text);
        self.next_id = self.blocks.len() as u64;
        self.pending.take();
        let (focus, caret) = (self.focus, self.caret);
        self.set_focus(focus, caret);
    }

    fn commit_caret(&mut self) {
        if let Some(Focus { block, caret }) = self.pending.take() {
            self.set_focus(block, caret);
        }
    }

    fn caret_pending(&self) -> bool {
        self.pending.is_pending()
    }

    fn view(&self) -> Vec<ViewLine> {
        self.blocks
            .iter()
            .enumerate()
            .map(|(i, block)| ViewLine {
                kind: block.kind,
                text: block.display.clone(),
                indent: block.indent,
                ordinal: (block.kind == BlockKind::OrderedList)
                    .then(|| document::ordinal_at(&self.blocks, i)),
                checked: block.checked,
                decorated: true,
                caret: (i == self.focus).then_some(self.caret),
            })
            .collect()
    }

    fn caret_row(&self) -> usize {
        self.focus
    }
}
