//! Text buffer implementation using ropey
//!
//! A [`TextBuffer`] is a value: edits never change an existing buffer, they
//! produce a new one. Rope clones share structure, so keeping the previous
//! version around is cheap. All offsets are char (unicode scalar) indices.

use ropey::Rope;
use std::fmt;
use std::ops::Range;

/// Immutable-per-edit markdown source buffer
#[derive(Debug, Clone, Default)]
pub struct TextBuffer {
    /// The underlying rope data structure
    rope: Rope,

    /// Version number, incremented for every derived buffer
    version: u64,
}

impl TextBuffer {
    /// Create an empty text buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a buffer from a string
    pub fn from_str(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            version: 0,
        }
    }

    /// Get the version number
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Get total character count
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Get a slice of the buffer as a string, clamped to the buffer
    pub fn slice(&self, range: Range<usize>) -> String {
        let start = range.start.min(self.rope.len_chars());
        let end = range.end.min(self.rope.len_chars());
        if start >= end {
            return String::new();
        }
        self.rope.slice(start..end).to_string()
    }

    /// Offset of the first character of the line containing `char_idx`.
    ///
    /// Only `\n` separates lines here; this is the offset right after the
    /// nearest preceding newline, or 0.
    pub fn line_start(&self, char_idx: usize) -> usize {
        let char_idx = char_idx.min(self.rope.len_chars());
        let mut chars = self.rope.chars_at(char_idx);
        let mut start = char_idx;
        while let Some(ch) = chars.prev() {
            if ch == '\n' {
                break;
            }
            start -= 1;
        }
        start
    }

    /// Derive a new buffer with `range` replaced by `text`
    pub fn splice(&self, range: Range<usize>, text: &str) -> TextBuffer {
        let len = self.rope.len_chars();
        let start = range.start.min(len);
        let end = range.end.clamp(start, len);

        let mut rope = self.rope.clone();
        if start < end {
            rope.remove(start..end);
        }
        if !text.is_empty() {
            rope.insert(start, text);
        }

        TextBuffer {
            rope,
            version: self.version + 1,
        }
    }
}

impl fmt::Display for TextBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for chunk in self.rope.chunks() {
            f.write_str(chunk)?;
        }
        Ok(())
    }
}
