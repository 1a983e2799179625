//! Buffer plus selection as a plain value
//!
//! The host text input owns the live widget; the engine only ever sees an
//! [`EditorView`]: the text and the `(start, end)` selection reported
//! against it. Commands take a view and return the next one.

use crate::editor::buffer::TextBuffer;
use crate::error::{EditorError, EditorResult};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Selection as char offsets, `start <= end`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    /// Create a selection; the offsets are put in order
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    /// Create a collapsed selection (caret with no selected text)
    pub fn collapsed(position: usize) -> Self {
        Self {
            start: position,
            end: position,
        }
    }

    /// Check if selection is collapsed (no text selected)
    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// A buffer version together with the selection computed against it
#[derive(Debug, Clone, Default)]
pub struct EditorView {
    buffer: TextBuffer,
    selection: Selection,
}

impl EditorView {
    /// Pair a buffer with a selection, rejecting offsets past the end
    pub fn new(buffer: TextBuffer, selection: Selection) -> EditorResult<Self> {
        let len = buffer.len_chars();
        if selection.start > selection.end || selection.end > len {
            return Err(EditorError::InvalidSelection {
                start: selection.start,
                end: selection.end,
                len,
            });
        }
        Ok(Self { buffer, selection })
    }

    /// Build a view from raw host values, validating the selection
    pub fn from_parts(text: &str, start: usize, end: usize) -> EditorResult<Self> {
        let buffer = TextBuffer::from_str(text);
        let len = buffer.len_chars();
        if start > end || end > len {
            return Err(EditorError::InvalidSelection { start, end, len });
        }
        Ok(Self {
            buffer,
            selection: Selection { start, end },
        })
    }

    /// View with the caret at the end of the text
    pub fn at_end(text: &str) -> Self {
        let buffer = TextBuffer::from_str(text);
        let end = buffer.len_chars();
        Self {
            buffer,
            selection: Selection::collapsed(end),
        }
    }

    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Full buffer contents
    pub fn text(&self) -> String {
        self.buffer.to_string()
    }

    /// Currently selected text (empty when collapsed)
    pub fn selected_text(&self) -> String {
        self.buffer.slice(self.selection.range())
    }

    /// Replace the selection range with `text` and select `selected` afterwards.
    ///
    /// `selected` is given relative to the start of the replaced range.
    pub(crate) fn replace_selection(&self, text: &str, selected: Range<usize>) -> EditorView {
        self.replace(self.selection.range(), text, selected)
    }

    /// Replace `range` with `text`; `selected` is relative to `range.start`
    pub(crate) fn replace(
        &self,
        range: Range<usize>,
        text: &str,
        selected: Range<usize>,
    ) -> EditorView {
        let buffer = self.buffer.splice(range.clone(), text);
        let len = buffer.len_chars();
        let selection = Selection::new(
            (range.start + selected.start).min(len),
            (range.start + selected.end).min(len),
        );
        EditorView { buffer, selection }
    }
}
