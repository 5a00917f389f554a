use std::ops::Range;

use ropey::Rope;

use super::caret::Caret;

/// Direction for caret movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// A whole-note text buffer backed by a rope.
///
/// The caret and selection are absolute character offsets into the text.
/// Line queries never include the trailing newline.
pub struct TextBuffer {
    rope: Rope,
    caret: Caret,
    /// Remembered column for vertical movement (sticky column).
    col_memory: usize,
}

impl TextBuffer {
    /// Create a new buffer from a string.
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            caret: Caret::default(),
            col_memory: 0,
        }
    }

    /// The full text content of the buffer.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Total length in characters.
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Total number of lines in the buffer.
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Get the content of a line (without trailing newline).
    pub fn line_at(&self, line_idx: usize) -> Option<String> {
        if line_idx >= self.rope.len_lines() {
            return None;
        }
        let s = self.rope.line(line_idx).to_string();
        Some(s.trim_end_matches('\n').to_string())
    }

    /// Line index containing character offset `pos`.
    pub fn line_of(&self, pos: usize) -> usize {
        self.rope.char_to_line(pos.min(self.len_chars()))
    }

    /// Character offset where `line_idx` starts.
    pub fn line_start(&self, line_idx: usize) -> usize {
        self.rope.line_to_char(line_idx.min(self.line_count()))
    }

    /// Character offset of the end of `line_idx`, before its newline.
    pub fn line_end(&self, line_idx: usize) -> usize {
        let len = self.line_at(line_idx).map_or(0, |l| l.chars().count());
        self.line_start(line_idx) + len
    }

    /// The characters in `range`.
    pub fn slice(&self, range: Range<usize>) -> String {
        let len = self.len_chars();
        self.rope
            .slice(range.start.min(len)..range.end.min(len))
            .to_string()
    }

    /// The current caret and selection.
    pub const fn caret(&self) -> Caret {
        self.caret
    }

    /// The caret as (line, column), both zero-based, column in characters.
    pub fn caret_line_col(&self) -> (usize, usize) {
        let line = self.line_of(self.caret.head);
        (line, self.caret.head - self.line_start(line))
    }

    /// Place the caret (and selection), clamped to the text.
    pub fn set_caret(&mut self, caret: Caret) {
        self.caret = caret.clamped(self.len_chars());
        self.col_memory = self.caret_line_col().1;
    }

    /// Replace the characters in `range` with `text`.
    ///
    /// The caret is only clamped here; callers decide where it goes next.
    pub fn replace(&mut self, range: Range<usize>, text: &str) {
        let len = self.len_chars();
        let start = range.start.min(len);
        let end = range.end.clamp(start, len);
        if start == end && text.is_empty() {
            return;
        }
        self.rope.remove(start..end);
        self.rope.insert(start, text);
        self.caret = self.caret.clamped(self.len_chars());
    }

    /// Move the caret, optionally extending the selection.
    pub fn move_cursor(&mut self, direction: Direction, extend: bool) {
        let head = self.caret.head;
        let line = self.line_of(head);
        let target = match direction {
            Direction::Left if !extend && !self.caret.is_collapsed() => self.caret.start(),
            Direction::Right if !extend && !self.caret.is_collapsed() => self.caret.end(),
            Direction::Left => head.saturating_sub(1),
            Direction::Right => (head + 1).min(self.len_chars()),
            Direction::Up if line > 0 => {
                let target = self.col_memory.min(self.line_end(line - 1) - self.line_start(line - 1));
                self.finish_vertical(self.line_start(line - 1) + target, extend);
                return;
            }
            Direction::Down if line + 1 < self.line_count() => {
                let target = self.col_memory.min(self.line_end(line + 1) - self.line_start(line + 1));
                self.finish_vertical(self.line_start(line + 1) + target, extend);
                return;
            }
            Direction::Up | Direction::Down => return,
        };
        self.finish_horizontal(target, extend);
    }

    /// Move caret to the beginning of the line (Home).
    pub fn move_home(&mut self, extend: bool) {
        let line = self.line_of(self.caret.head);
        self.finish_horizontal(self.line_start(line), extend);
    }

    /// Move caret to the end of the line (End).
    pub fn move_end(&mut self, extend: bool) {
        let line = self.line_of(self.caret.head);
        self.finish_horizontal(self.line_end(line), extend);
    }

    /// Move caret one word to the left (Ctrl+Left).
    pub fn move_word_left(&mut self) {
        let before: Vec<char> = self.slice(0..self.caret.head).chars().collect();
        let mut pos = before.len();
        while pos > 0 && !is_word_char(before[pos - 1]) {
            pos -= 1;
        }
        while pos > 0 && is_word_char(before[pos - 1]) {
            pos -= 1;
        }
        self.finish_horizontal(pos, false);
    }

    /// Move caret one word to the right (Ctrl+Right).
    pub fn move_word_right(&mut self) {
        let head = self.caret.head;
        let after: Vec<char> = self.slice(head..self.len_chars()).chars().collect();
        let mut pos = 0;
        while pos < after.len() && is_word_char(after[pos]) {
            pos += 1;
        }
        while pos < after.len() && !is_word_char(after[pos]) {
            pos += 1;
        }
        self.finish_horizontal(head + pos, false);
    }

    /// Move caret to a specific line and column.
    pub fn move_to(&mut self, line: usize, col: usize) {
        let line = line.min(self.line_count().saturating_sub(1));
        let pos = (self.line_start(line) + col).min(self.line_end(line));
        self.set_caret(Caret::at(pos));
    }

    fn finish_horizontal(&mut self, target: usize, extend: bool) {
        self.caret = if extend {
            Caret::span(self.caret.anchor, target)
        } else {
            Caret::at(target)
        };
        self.col_memory = self.caret_line_col().1;
    }

    fn finish_vertical(&mut self, target: usize, extend: bool) {
        self.caret = if extend {
            Caret::span(self.caret.anchor, target)
        } else {
            Caret::at(target)
        };
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

impl std::fmt::Debug for TextBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextBuffer")
            .field(
                "rope",
                &format_args!("Rope({} lines)", self.rope.len_lines()),
            )
            .field("caret", &self.caret)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- Construction and basic queries ---

    #[test]
    fn test_empty_buffer_has_one_line() {
        let buf = TextBuffer::from_text("");
        assert_eq!(buf.line_count(), 1);
        assert_eq!(buf.line_at(0), Some(String::new()));
    }

    #[test]
    fn test_from_text_trailing_newline() {
        let buf = TextBuffer::from_text("hello\n");
        assert_eq!(buf.line_count(), 2);
        assert_eq!(buf.line_at(1), Some(String::new()));
    }

    #[test]
    fn test_line_bounds_in_chars() {
        let buf = TextBuffer::from_text("héllo\nworld");
        assert_eq!(buf.line_start(1), 6);
        assert_eq!(buf.line_end(0), 5);
        assert_eq!(buf.line_end(1), 11);
        assert_eq!(buf.line_of(6), 1);
    }

    #[test]
    fn test_line_at_out_of_bounds_returns_none() {
        let buf = TextBuffer::from_text("hello");
        assert_eq!(buf.line_at(1), None);
    }

    // --- Replacement ---

    #[test]
    fn test_replace_inserts_text() {
        let mut buf = TextBuffer::from_text("hello");
        buf.replace(5..5, "!");
        assert_eq!(buf.text(), "hello!");
    }

    #[test]
    fn test_replace_clamps_caret() {
        let mut buf = TextBuffer::from_text("hello world");
        buf.set_caret(Caret::at(11));
        buf.replace(5..11, "");
        assert_eq!(buf.caret(), Caret::at(5));
    }

    // --- Caret movement ---

    #[test]
    fn test_move_left_wraps_to_prev_line() {
        let mut buf = TextBuffer::from_text("hello\nworld");
        buf.move_to(1, 0);
        buf.move_cursor(Direction::Left, false);
        assert_eq!(buf.caret_line_col(), (0, 5));
    }

    #[test]
    fn test_move_right_at_end_is_noop() {
        let mut buf = TextBuffer::from_text("hi");
        buf.move_end(false);
        buf.move_cursor(Direction::Right, false);
        assert_eq!(buf.caret(), Caret::at(2));
    }

    #[test]
    fn test_left_collapses_selection_to_start() {
        let mut buf = TextBuffer::from_text("hello");
        buf.set_caret(Caret::span(1, 4));
        buf.move_cursor(Direction::Left, false);
        assert_eq!(buf.caret(), Caret::at(1));
    }

    #[test]
    fn test_extend_selection() {
        let mut buf = TextBuffer::from_text("hello");
        buf.move_cursor(Direction::Right, true);
        buf.move_cursor(Direction::Right, true);
        assert_eq!(buf.caret(), Caret::span(0, 2));
        assert_eq!(buf.slice(buf.caret().range()), "he");
    }

    #[test]
    fn test_column_memory_across_short_line() {
        let mut buf = TextBuffer::from_text("hello\nhi\nworld");
        buf.move_to(0, 4);
        buf.move_cursor(Direction::Down, false);
        assert_eq!(buf.caret_line_col(), (1, 2));
        buf.move_cursor(Direction::Down, false);
        assert_eq!(buf.caret_line_col(), (2, 4));
    }

    #[test]
    fn test_move_up_at_first_line_is_noop() {
        let mut buf = TextBuffer::from_text("hello\nworld");
        buf.move_to(0, 3);
        buf.move_cursor(Direction::Up, false);
        assert_eq!(buf.caret_line_col(), (0, 3));
    }

    #[test]
    fn test_home_and_end() {
        let mut buf = TextBuffer::from_text("one\ntwo three");
        buf.move_to(1, 4);
        buf.move_home(false);
        assert_eq!(buf.caret(), Caret::at(4));
        buf.move_end(false);
        assert_eq!(buf.caret(), Caret::at(13));
    }

    #[test]
    fn test_word_movement() {
        let mut buf = TextBuffer::from_text("hello big world");
        buf.move_word_right();
        assert_eq!(buf.caret(), Caret::at(6));
        buf.move_to(0, 12);
        buf.move_word_left();
        assert_eq!(buf.caret(), Caret::at(10));
        buf.move_word_left();
        assert_eq!(buf.caret(), Caret::at(6));
    }

    #[test]
    fn test_move_to_clamps() {
        let mut buf = TextBuffer::from_text("hello");
        buf.move_to(100, 100);
        assert_eq!(buf.caret_line_col(), (0, 5));
    }
}
