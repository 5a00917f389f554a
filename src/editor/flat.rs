//! Flat-buffer surface: the whole note in one buffer, shorthand applied to
//! the line under the caret.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::document::{self, BlockId};

use super::caret::{Caret, Deferred, char_len, length_delta};
use super::{EditInput, EditOutcome, EditingSurface, InlineFormat, SurfaceKind, TextBuffer, ViewLine};

/// A line holding nothing but a shorthand token, ready for the space trigger.
static SHORTHAND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6}|>|[-*+]|\d+\.|```)$").expect("shorthand pattern"));
static TODO_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\s*)- \[([ xX])\]\s").expect("todo item pattern"));
static LIST_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\s*)([-*+]|\d+\.)\s").expect("list item pattern"));
static QUOTE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\s*>)\s").expect("quote line pattern"));
/// A line that is only a block marker plus trailing whitespace.
static BARE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(#{1,6}|>|[-*+] \[[ xX]\]|[-*+]|\d+\.)\s+$").expect("bare marker pattern")
});

/// The line holding the caret.
struct CurrentLine {
    start: usize,
    end: usize,
    text: String,
}

/// Editor over the raw note text.
pub struct FlatEditor {
    buffer: TextBuffer,
    pending: Deferred<Caret>,
}

impl FlatEditor {
    pub fn from_text(text: &str) -> Self {
        Self {
            buffer: TextBuffer::from_text(text),
            pending: Deferred::new(),
        }
    }

    pub const fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    pub const fn caret(&self) -> Caret {
        self.buffer.caret()
    }

    pub fn set_caret(&mut self, caret: Caret) {
        self.buffer.set_caret(caret);
    }

    fn current_line(&self) -> CurrentLine {
        let line = self.buffer.line_of(self.buffer.caret().start());
        CurrentLine {
            start: self.buffer.line_start(line),
            end: self.buffer.line_end(line),
            text: self.buffer.line_at(line).unwrap_or_default(),
        }
    }

    /// Replace `range` with `text` and schedule the caret at `caret`.
    fn edit(&mut self, range: Range<usize>, text: &str, caret: Caret) -> EditOutcome {
        self.buffer.replace(range, text);
        self.pending.schedule(caret);
        EditOutcome::Changed
    }

    /// Replace the selection with `text`, caret after it.
    fn insert(&mut self, text: &str) -> EditOutcome {
        let range = self.buffer.caret().range();
        let after = range.start + char_len(text);
        self.edit(range, text, Caret::at(after))
    }

    fn insert_char(&mut self, ch: char) -> EditOutcome {
        if ch == ' '
            && let Some(outcome) = self.expand_shorthand()
        {
            return outcome;
        }
        let mut buf = [0u8; 4];
        self.insert(ch.encode_utf8(&mut buf))
    }

    /// Rewrite a line holding only a shorthand token into its canonical
    /// marker. The space that triggered it is not inserted.
    fn expand_shorthand(&mut self) -> Option<EditOutcome> {
        let caret = self.buffer.caret();
        if !caret.is_collapsed() {
            return None;
        }
        let line = self.current_line();
        if caret.head != line.end {
            return None;
        }
        let caps = SHORTHAND.captures(&line.text)?;
        let token = &caps[1];
        let (replacement, offset) = if token == "```" {
            ("```\n\n```".to_string(), 4)
        } else {
            let marker = format!("{token} ");
            let len = char_len(&marker);
            (marker, len)
        };
        Some(self.edit(
            line.start..line.end,
            &replacement,
            Caret::at(line.start + offset),
        ))
    }

    fn enter(&mut self) -> EditOutcome {
        let line = self.current_line();
        let caret = self.buffer.caret();

        let continuation = if let Some(caps) = TODO_ITEM.captures(&line.text) {
            let marker = format!("- [{}]", &caps[2]);
            Some((caps[1].to_string(), marker, "- [ ]".to_string()))
        } else if let Some(caps) = LIST_ITEM.captures(&line.text) {
            let marker = caps[2].to_string();
            let next = marker
                .strip_suffix('.')
                .and_then(|n| n.parse::<u64>().ok())
                .and_then(|n| n.checked_add(1))
                .map_or_else(|| marker.clone(), |n| format!("{n}."));
            Some((caps[1].to_string(), marker, next))
        } else {
            QUOTE_LINE
                .captures(&line.text)
                .map(|caps| (String::new(), ">".to_string(), caps[1].to_string()))
        };

        let Some((indent, marker, next)) = continuation else {
            return self.insert("\n");
        };
        if line.text.trim() == marker {
            // Nothing after the marker: drop it instead of continuing.
            return self.edit(line.start..caret.start(), "", Caret::at(line.start));
        }
        let text = format!("\n{indent}{next} ");
        let after = caret.start() + char_len(&text);
        self.edit(caret.range(), &text, Caret::at(after))
    }

    fn backspace(&mut self) -> EditOutcome {
        let caret = self.buffer.caret();
        if !caret.is_collapsed() {
            return self.insert("");
        }
        let line = self.current_line();
        if caret.head == line.end && caret.head > line.start && BARE_MARKER.is_match(&line.text) {
            return self.edit(line.start..line.end, "", Caret::at(line.start));
        }
        if caret.head == 0 {
            return EditOutcome::Ignored;
        }
        self.edit(caret.head - 1..caret.head, "", Caret::at(caret.head - 1))
    }

    fn delete_forward(&mut self) -> EditOutcome {
        let caret = self.buffer.caret();
        if !caret.is_collapsed() {
            return self.insert("");
        }
        if caret.head >= self.buffer.len_chars() {
            return EditOutcome::Ignored;
        }
        self.edit(caret.head..caret.head + 1, "", caret)
    }

    fn adjust_indent(&mut self, deeper: bool) -> EditOutcome {
        let line = self.current_line();
        let Some(caps) = LIST_ITEM.captures(&line.text) else {
            return EditOutcome::Ignored;
        };
        let caret = self.buffer.caret();
        if deeper {
            return self.edit(line.start..line.start, "  ", caret.shifted(2));
        }
        let removed = char_len(&caps[1]).min(2);
        if removed == 0 {
            return EditOutcome::Ignored;
        }
        let kept: String = caps[1].chars().skip(removed).collect();
        let caret = caret.shifted(length_delta(&caps[1], &kept));
        let caret = Caret::span(caret.anchor.max(line.start), caret.head.max(line.start));
        self.edit(line.start..line.start + removed, "", caret)
    }

    /// Wrap the selection in `format`'s marker and keep it selected.
    fn wrap(&mut self, format: InlineFormat) -> EditOutcome {
        let marker = format.marker();
        let range = self.buffer.caret().range();
        let selected = self.buffer.slice(range.clone());
        let len = char_len(marker);
        let caret = Caret::span(range.start + len, range.end + len);
        self.edit(range, &format!("{marker}{selected}{marker}"), caret)
    }

    fn insert_link(&mut self, url: &str, text: &str) -> EditOutcome {
        let selected = self.buffer.slice(self.buffer.caret().range());
        let label = [text, selected.as_str()]
            .into_iter()
            .find(|s| !s.is_empty())
            .unwrap_or("link");
        self.insert(&format!("[{label}]({url})"))
    }

    fn toggle_todo(&mut self) -> EditOutcome {
        let line = self.current_line();
        let Some(caps) = TODO_ITEM.captures(&line.text) else {
            return EditOutcome::Ignored;
        };
        let mark = if caps[2].trim().is_empty() { "x" } else { " " };
        // Bracket contents sit after "- [".
        let at = line.start + char_len(&caps[1]) + 3;
        let caret = self.buffer.caret();
        self.edit(at..at + 1, mark, caret)
    }

    fn paste(&mut self, text: Option<String>) -> EditOutcome {
        match text {
            Some(text) if !text.is_empty() => self.insert(&text.replace("\r\n", "\n")),
            _ => EditOutcome::Ignored,
        }
    }
}

impl EditingSurface for FlatEditor {
    fn kind(&self) -> SurfaceKind {
        SurfaceKind::Flat
    }

    fn handle(&mut self, input: EditInput) -> EditOutcome {
        self.commit_caret();
        match input {
            EditInput::Char(ch) => self.insert_char(ch),
            EditInput::Enter => self.enter(),
            EditInput::Backspace => self.backspace(),
            EditInput::Delete => self.delete_forward(),
            EditInput::Indent => self.adjust_indent(true),
            EditInput::Outdent => self.adjust_indent(false),
            EditInput::Paste(text) => self.paste(text),
            EditInput::Format(format) => self.wrap(format),
            EditInput::InsertLink { url, text } => self.insert_link(&url, &text),
            EditInput::ToggleTodo => self.toggle_todo(),
            EditInput::Move { direction, extend } => {
                self.buffer.move_cursor(direction, extend);
                EditOutcome::CaretMoved
            }
            EditInput::Home => {
                self.buffer.move_home(false);
                EditOutcome::CaretMoved
            }
            EditInput::End => {
                self.buffer.move_end(false);
                EditOutcome::CaretMoved
            }
        }
    }

    fn text(&self) -> String {
        self.buffer.text()
    }

    fn load(&mut self, text: &str) {
        let caret = self.buffer.caret();
        self.buffer = TextBuffer::from_text(text);
        self.pending.take();
        self.buffer.set_caret(caret);
    }

    fn commit_caret(&mut self) {
        if let Some(caret) = self.pending.take() {
            self.buffer.set_caret(caret);
        }
    }

    fn caret_pending(&self) -> bool {
        self.pending.is_pending()
    }

    fn view(&self) -> Vec<ViewLine> {
        let caret = self.buffer.caret();
        let caret_line = self.buffer.line_of(caret.head);
        (0..self.buffer.line_count())
            .map(|i| {
                let text = self.buffer.line_at(i).unwrap_or_default();
                let block = document::classify_line(BlockId(i as u64), &text);
                let caret = (i == caret_line).then(|| {
                    let start = self.buffer.line_start(i);
                    let end = self.buffer.line_end(i);
                    let local = |pos: usize| pos.clamp(start, end) - start;
                    Caret::span(local(caret.anchor), local(caret.head))
                });
                ViewLine {
                    kind: block.kind,
                    text,
                    indent: block.indent,
                    ordinal: None,
                    checked: block.checked,
                    decorated: false,
                    caret,
                }
            })
            .collect()
    }

    fn caret_row(&self) -> usize {
        self.buffer.line_of(self.buffer.caret().head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::BlockKind;
    use crate::editor::Direction;

    fn editor_at_end(text: &str) -> FlatEditor {
        let mut editor = FlatEditor::from_text(text);
        editor.set_caret(Caret::at(char_len(text)));
        editor
    }

    fn press(editor: &mut FlatEditor, input: EditInput) -> EditOutcome {
        let outcome = editor.handle(input);
        editor.commit_caret();
        outcome
    }

    fn type_str(editor: &mut FlatEditor, s: &str) {
        for ch in s.chars() {
            press(editor, EditInput::Char(ch));
        }
    }

    // --- Space shorthand ---

    #[test]
    fn test_heading_shorthand_on_line() {
        let mut editor = FlatEditor::from_text("");
        type_str(&mut editor, "## Title");
        assert_eq!(editor.text(), "## Title");
        assert_eq!(editor.caret(), Caret::at(8));
    }

    #[test]
    fn test_list_markers_keep_their_token() {
        for token in ["-", "*", "+", ">", "3."] {
            let mut editor = editor_at_end(&format!("intro\n{token}"));
            press(&mut editor, EditInput::Char(' '));
            assert_eq!(editor.text(), format!("intro\n{token} "));
            assert_eq!(editor.caret(), Caret::at(6 + token.len() + 1));
        }
    }

    #[test]
    fn test_fence_shorthand_opens_code_block() {
        let mut editor = editor_at_end("```");
        press(&mut editor, EditInput::Char(' '));
        assert_eq!(editor.text(), "```\n\n```");
        assert_eq!(editor.caret(), Caret::at(4));
    }

    #[test]
    fn test_space_after_expanded_marker_is_plain() {
        let mut editor = editor_at_end("# ");
        press(&mut editor, EditInput::Char(' '));
        assert_eq!(editor.text(), "#  ");
        assert_eq!(editor.caret(), Caret::at(3));
    }

    #[test]
    fn test_shorthand_needs_caret_at_line_end() {
        let mut editor = FlatEditor::from_text("-");
        editor.set_caret(Caret::at(0));
        press(&mut editor, EditInput::Char(' '));
        assert_eq!(editor.text(), " -");
        assert_eq!(editor.caret(), Caret::at(1));
    }

    #[test]
    fn test_space_inside_text_is_plain() {
        let mut editor = editor_at_end("a#");
        press(&mut editor, EditInput::Char(' '));
        assert_eq!(editor.text(), "a# ");
    }

    // --- Enter ---

    #[test]
    fn test_enter_continues_ordered_list() {
        let mut editor = editor_at_end("1. foo");
        press(&mut editor, EditInput::Enter);
        assert_eq!(editor.text(), "1. foo\n2. ");
        assert_eq!(editor.caret(), Caret::at(10));
    }

    #[test]
    fn test_enter_at_largest_number_keeps_marker() {
        let line = format!("{}. x", u64::MAX);
        let mut editor = editor_at_end(&line);
        press(&mut editor, EditInput::Enter);
        assert_eq!(editor.text(), format!("{line}\n{}. ", u64::MAX));
    }

    #[test]
    fn test_enter_continues_indented_bullet() {
        let mut editor = editor_at_end("  * item");
        press(&mut editor, EditInput::Enter);
        assert_eq!(editor.text(), "  * item\n  * ");
    }

    #[test]
    fn test_enter_on_empty_item_strips_marker() {
        let mut editor = editor_at_end("- a\n- ");
        press(&mut editor, EditInput::Enter);
        assert_eq!(editor.text(), "- a\n");
        assert_eq!(editor.caret(), Caret::at(4));
    }

    #[test]
    fn test_enter_continues_and_ends_quote() {
        let mut editor = editor_at_end("> said");
        press(&mut editor, EditInput::Enter);
        assert_eq!(editor.text(), "> said\n> ");
        press(&mut editor, EditInput::Enter);
        assert_eq!(editor.text(), "> said\n");
    }

    #[test]
    fn test_enter_continues_todo_unchecked() {
        let mut editor = editor_at_end("- [x] done");
        press(&mut editor, EditInput::Enter);
        assert_eq!(editor.text(), "- [x] done\n- [ ] ");
        press(&mut editor, EditInput::Enter);
        assert_eq!(editor.text(), "- [x] done\n");
    }

    #[test]
    fn test_enter_in_middle_of_item_splits_text() {
        let mut editor = FlatEditor::from_text("- abcd");
        editor.set_caret(Caret::at(4));
        press(&mut editor, EditInput::Enter);
        assert_eq!(editor.text(), "- ab\n- cd");
        assert_eq!(editor.caret(), Caret::at(7));
    }

    #[test]
    fn test_plain_enter() {
        let mut editor = editor_at_end("text");
        press(&mut editor, EditInput::Enter);
        assert_eq!(editor.text(), "text\n");
    }

    // --- Backspace ---

    #[test]
    fn test_backspace_on_empty_quote_clears_line() {
        let mut editor = editor_at_end("> ");
        press(&mut editor, EditInput::Backspace);
        assert_eq!(editor.text(), "");
        let view = editor.view();
        assert_eq!(view[0].kind, BlockKind::Paragraph);
    }

    #[test]
    fn test_backspace_strips_bare_todo_marker() {
        let mut editor = editor_at_end("x\n- [ ] ");
        press(&mut editor, EditInput::Backspace);
        assert_eq!(editor.text(), "x\n");
        assert_eq!(editor.caret(), Caret::at(2));
    }

    #[test]
    fn test_backspace_deletes_char() {
        let mut editor = editor_at_end("> ab");
        press(&mut editor, EditInput::Backspace);
        assert_eq!(editor.text(), "> a");
        let mut editor = FlatEditor::from_text("x");
        assert_eq!(editor.handle(EditInput::Backspace), EditOutcome::Ignored);
    }

    // --- Indent ---

    #[test]
    fn test_tab_indents_list_line() {
        let mut editor = editor_at_end("- a");
        press(&mut editor, EditInput::Indent);
        assert_eq!(editor.text(), "  - a");
        assert_eq!(editor.caret(), Caret::at(5));
        press(&mut editor, EditInput::Outdent);
        assert_eq!(editor.text(), "- a");
        assert_eq!(editor.caret(), Caret::at(3));
        assert_eq!(editor.handle(EditInput::Outdent), EditOutcome::Ignored);
    }

    #[test]
    fn test_outdent_removes_only_available_whitespace() {
        let mut editor = FlatEditor::from_text(" - a");
        editor.set_caret(Caret::at(0));
        press(&mut editor, EditInput::Outdent);
        assert_eq!(editor.text(), "- a");
        assert_eq!(editor.caret(), Caret::at(0));
    }

    #[test]
    fn test_tab_ignored_on_plain_line() {
        let mut editor = editor_at_end("plain");
        assert_eq!(editor.handle(EditInput::Indent), EditOutcome::Ignored);
    }

    // --- Formatting ---

    #[test]
    fn test_bold_wraps_selection_and_keeps_it() {
        let mut editor = FlatEditor::from_text("make this bold");
        editor.set_caret(Caret::span(5, 9));
        press(&mut editor, EditInput::Format(InlineFormat::Bold));
        assert_eq!(editor.text(), "make **this** bold");
        assert_eq!(editor.caret(), Caret::span(7, 11));
    }

    #[test]
    fn test_code_without_selection_inserts_markers() {
        let mut editor = editor_at_end("x ");
        press(&mut editor, EditInput::Format(InlineFormat::Code));
        assert_eq!(editor.text(), "x ``");
        assert_eq!(editor.caret(), Caret::at(3));
    }

    // --- Link, todo, paste ---

    #[test]
    fn test_insert_link_at_caret() {
        let mut editor = editor_at_end("see ");
        press(
            &mut editor,
            EditInput::InsertLink {
                url: "https://a.b".to_string(),
                text: "site".to_string(),
            },
        );
        assert_eq!(editor.text(), "see [site](https://a.b)");
    }

    #[test]
    fn test_toggle_todo_flips_bracket() {
        let mut editor = FlatEditor::from_text("a\n  - [ ] task");
        editor.set_caret(Caret::at(10));
        press(&mut editor, EditInput::ToggleTodo);
        assert_eq!(editor.text(), "a\n  - [x] task");
        assert_eq!(editor.caret(), Caret::at(10));
        press(&mut editor, EditInput::ToggleTodo);
        assert_eq!(editor.text(), "a\n  - [ ] task");
    }

    #[test]
    fn test_paste_normalizes_line_endings() {
        let mut editor = FlatEditor::from_text("");
        press(&mut editor, EditInput::Paste(Some("a\r\nb".to_string())));
        assert_eq!(editor.text(), "a\nb");
        assert_eq!(editor.handle(EditInput::Paste(None)), EditOutcome::Ignored);
    }

    // --- Caret and view ---

    #[test]
    fn test_caret_is_deferred_until_commit() {
        let mut editor = editor_at_end("1. a");
        editor.handle(EditInput::Enter);
        assert!(editor.caret_pending());
        editor.commit_caret();
        assert_eq!(editor.caret_row(), 1);
    }

    #[test]
    fn test_movement_reports_caret_moved() {
        let mut editor = editor_at_end("ab\ncd");
        let outcome = editor.handle(EditInput::Move {
            direction: Direction::Up,
            extend: false,
        });
        assert_eq!(outcome, EditOutcome::CaretMoved);
        assert_eq!(editor.caret_row(), 0);
    }

    #[test]
    fn test_view_classifies_raw_lines() {
        let mut editor = FlatEditor::from_text("# T\n- [x] a\nplain");
        editor.set_caret(Caret::at(6));
        let view = editor.view();
        assert_eq!(view.len(), 3);
        assert_eq!(view[0].kind, BlockKind::Heading(1));
        assert_eq!(view[0].text, "# T");
        assert!(view[1].checked);
        assert!(!view[1].decorated);
        assert_eq!(view[1].caret, Some(Caret::at(2)));
    }

    #[test]
    fn test_load_replaces_text_and_clamps_caret() {
        let mut editor = editor_at_end("a long line");
        editor.load("ab");
        assert_eq!(editor.text(), "ab");
        assert_eq!(editor.caret(), Caret::at(2));
    }
}
