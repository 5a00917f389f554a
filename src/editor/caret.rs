//! Caret positions and deferred caret restoration.
//!
//! Every offset here counts characters, not bytes. A mutation computes the
//! caret it wants from the exact length of the text it inserted or removed,
//! then schedules it; the surface applies the scheduled caret only once the
//! new value is in place, and always before the next input is handled.

use std::ops::Range;

/// A caret with an optional selection, as character offsets.
///
/// `anchor` is where the selection started and `head` is where the caret
/// is drawn. They are equal when nothing is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Caret {
    pub anchor: usize,
    pub head: usize,
}

impl Caret {
    /// A collapsed caret at `pos`.
    pub const fn at(pos: usize) -> Self {
        Self {
            anchor: pos,
            head: pos,
        }
    }

    /// A selection from `start` to `end`, caret drawn at `end`.
    pub const fn span(start: usize, end: usize) -> Self {
        Self {
            anchor: start,
            head: end,
        }
    }

    pub const fn start(self) -> usize {
        if self.anchor < self.head {
            self.anchor
        } else {
            self.head
        }
    }

    pub const fn end(self) -> usize {
        if self.anchor > self.head {
            self.anchor
        } else {
            self.head
        }
    }

    pub const fn range(self) -> Range<usize> {
        self.start()..self.end()
    }

    pub const fn is_collapsed(self) -> bool {
        self.anchor == self.head
    }

    /// Move both ends by `delta` characters, stopping at zero.
    pub const fn shifted(self, delta: isize) -> Self {
        Self {
            anchor: shift(self.anchor, delta),
            head: shift(self.head, delta),
        }
    }

    /// Keep both ends within `0..=len`.
    pub fn clamped(self, len: usize) -> Self {
        Self {
            anchor: self.anchor.min(len),
            head: self.head.min(len),
        }
    }
}

/// Offset `pos` by `delta`, saturating at zero.
pub const fn shift(pos: usize, delta: isize) -> usize {
    pos.saturating_add_signed(delta)
}

/// Character-length difference between the text after and before an edit.
#[allow(clippy::cast_possible_wrap)]
pub fn length_delta(before: &str, after: &str) -> isize {
    char_len(after) as isize - char_len(before) as isize
}

pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Byte index of the `char_idx`-th character, or `s.len()` past the end.
pub fn byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices().nth(char_idx).map_or(s.len(), |(i, _)| i)
}

/// The characters of `s` in `range`.
pub fn char_slice(s: &str, range: Range<usize>) -> &str {
    &s[byte_index(s, range.start)..byte_index(s, range.end)]
}

/// Replace the characters of `s` in `range` with `with`.
pub fn splice(s: &str, range: Range<usize>, with: &str) -> String {
    let start = byte_index(s, range.start);
    let end = byte_index(s, range.end.max(range.start));
    let mut out = String::with_capacity(s.len() + with.len());
    out.push_str(&s[..start]);
    out.push_str(with);
    out.push_str(&s[end..]);
    out
}

/// Caret work scheduled by a mutation and applied on the next tick.
///
/// Scheduling again before the tick replaces the earlier request: only the
/// caret for the latest committed value matters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deferred<T> {
    pending: Option<T>,
}

impl<T> Deferred<T> {
    pub const fn new() -> Self {
        Self { pending: None }
    }

    pub fn schedule(&mut self, target: T) {
        self.pending = Some(target);
    }

    pub const fn take(&mut self) -> Option<T> {
        self.pending.take()
    }

    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl<T> Default for Deferred<T> {
    fn default() -> Self {
        Self::new()
    }
}
