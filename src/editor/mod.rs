//! Editor module for Writeup Notebook
//!
//! Contains the authoring side of the engine:
//! - Immutable text buffer (using ropey)
//! - Buffer + selection value type handed over by the host text input
//! - Toolbar/shortcut edit commands
//! - Keyboard shortcut dispatch
//! - Pasted image ingestion

pub mod buffer;
pub mod commands;
pub mod image;
pub mod keymap;
pub mod view;

pub use buffer::TextBuffer;
pub use commands::{
    insert_at_line_start, insert_literal, toolbar, wrap_selection, CommandAction, EditCommand,
    ToolbarButton,
};
pub use image::{ClipboardPayload, ImageFormat, ImageIngestor, PasteEvent};
pub use keymap::{Key, KeyBind, KeyOutcome, KeyPress, Keymap, Modifier};
pub use view::{EditorView, Selection};
