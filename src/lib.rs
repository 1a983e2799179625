//! Writeup Notebook - markdown authoring and navigation engine
//!
//! The engine behind a private writeup notebook's editor screen: formatting
//! commands over a buffer and selection, inline image pasting, a heading
//! outline kept in sync with the rendered preview, and debounced autosave.

pub mod config;
pub mod document;
pub mod editor;
pub mod error;
pub mod markdown;
pub mod persistence;
pub mod state;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use state::AuthoringSession;
