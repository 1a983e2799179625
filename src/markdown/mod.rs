//! Markdown module for Writeup Notebook
//!
//! Handles the structural side of markdown:
//! - Heading identifier generation shared by every view
//! - Heading outline extraction and nesting
//! - HTML preview rendering with heading anchors

pub mod outline;
pub mod preview;
pub mod slug;

pub use outline::{
    build_outline, clean_heading_text, match_heading_line, parse_headings, parse_outline,
    HeadingRecord, OutlineNode,
};
pub use preview::PreviewRenderer;
pub use slug::{generate, HeadingIdSequence};
