//! State management module for Writeup Notebook
//!
//! This module contains the per-document editing state organized by concern:
//! - `outline_state`: Outline panel tree, expansion and active heading
//! - `viewport`: Which preview heading sits in the observation band
//! - `session`: One open document tying editor, outline and autosave together

mod outline_state;
mod session;
mod viewport;

pub use outline_state::*;
pub use session::*;
pub use viewport::*;
