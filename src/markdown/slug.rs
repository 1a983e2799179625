//! Heading identifier generation
//!
//! The preview renderer and the outline parser both walk a document top to
//! bottom and must hand out the same anchor for the same heading. They share
//! [`generate`] and number headings with a fresh [`HeadingIdSequence`] per
//! pass, so two passes over the same text always agree.

/// Prefix of every generated heading identifier
pub const HEADING_ID_PREFIX: &str = "heading";

/// Build the identifier for the `occurrence_index`-th heading of a pass.
///
/// The text is lower-cased, every run of characters outside `[a-z0-9]`
/// becomes one hyphen, and leading/trailing hyphens are trimmed. The numeric
/// prefix keeps the id unique and non-empty even when the text is empty.
pub fn generate(occurrence_index: usize, text: &str) -> String {
    format!("{}-{}-{}", HEADING_ID_PREFIX, occurrence_index, slugify(text))
}

/// Reduce text to lowercase ASCII alphanumerics separated by single hyphens
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;

    for ch in text.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch);
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// Per-pass heading counter.
///
/// Create one at the start of every parse or render pass; never keep one
/// between passes.
#[derive(Debug, Default)]
pub struct HeadingIdSequence {
    next: usize,
}

impl HeadingIdSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign the next identifier in document order
    pub fn next_id(&mut self, text: &str) -> String {
        let id = generate(self.next, text);
        self.next += 1;
        id
    }

    /// Number of identifiers handed out so far
    pub fn count(&self) -> usize {
        self.next
    }
}
