//! Document fields handed to the persistence collaborator
//!
//! Derives the stored representation of a writeup from what the author
//! typed: URL slug, plain-text excerpt, reading time and tag list.

use crate::config::MAX_TAGS;
use crate::error::ValidationError;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use unicode_normalization::UnicodeNormalization;

/// Default excerpt length in characters
pub const EXCERPT_LENGTH: usize = 160;

/// Reading speed used for the read time estimate
pub const WORDS_PER_MINUTE: usize = 200;

/// Publication state of a writeup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    #[default]
    Draft,
    Published,
}

/// Tags attached to a writeup: lowercase, unique, at most [`MAX_TAGS`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tags(Vec<String>);

impl Tags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tag from user input. Returns false when it was rejected.
    pub fn add(&mut self, input: &str) -> bool {
        let tag = input.trim().to_lowercase();
        if tag.is_empty() || self.0.contains(&tag) || self.0.len() >= MAX_TAGS {
            return false;
        }
        self.0.push(tag);
        true
    }

    pub fn remove(&mut self, tag: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|t| t != tag);
        self.0.len() != before
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Fields written on save
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentFields {
    pub title: String,
    /// Only rewritten by an explicit save
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    pub content: String,
    pub excerpt: String,
    pub tags: Tags,
    /// Only rewritten by an explicit save
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<DocumentStatus>,
    pub read_time: usize,
    pub updated_at: DateTime<Utc>,
}

impl DocumentFields {
    /// Fields for an explicit save or publish
    pub fn for_save(title: &str, content: &str, tags: &Tags, status: DocumentStatus) -> Self {
        Self {
            slug: Some(generate_slug(title)),
            status: Some(status),
            ..Self::for_autosave(title, content, tags)
        }
    }

    /// Fields for a background autosave; slug and status stay as stored
    pub fn for_autosave(title: &str, content: &str, tags: &Tags) -> Self {
        Self {
            title: title.trim().to_string(),
            slug: None,
            content: content.to_string(),
            excerpt: generate_excerpt(content, EXCERPT_LENGTH),
            tags: tags.clone(),
            status: None,
            read_time: calculate_read_time(content),
            updated_at: Utc::now(),
        }
    }
}

/// Check the fields an explicit save requires
pub fn validate_draft(title: &str, content: &str, tags: &Tags) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    if content.trim().is_empty() {
        return Err(ValidationError::EmptyContent);
    }
    if tags.len() > MAX_TAGS {
        return Err(ValidationError::TooManyTags { max: MAX_TAGS });
    }
    Ok(())
}

/// URL slug from a title: accents folded, punctuation dropped, hyphen separated
pub fn generate_slug(title: &str) -> String {
    let folded: String = title
        .to_lowercase()
        .nfd()
        .filter(|c| !('\u{0300}'..='\u{036f}').contains(c))
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() || *c == '-')
        .collect();

    let mut slug = String::with_capacity(folded.len());
    for ch in folded.chars() {
        let ch = if ch.is_whitespace() { '-' } else { ch };
        if ch == '-' && slug.ends_with('-') {
            continue;
        }
        slug.push(ch);
    }

    slug.trim_matches('-').to_string()
}

fn excerpt_rules() -> &'static [(Regex, &'static str)] {
    static RULES: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    RULES.get_or_init(|| {
        [
            (r"(?s)```.*?```", ""),
            (r"`[^`]+`", ""),
            (r"#+\s", ""),
            (r"\*\*([^*]+)\*\*", "$1"),
            (r"\*([^*]+)\*", "$1"),
            (r"!\[([^\]]*)\]\([^)]+\)", ""),
            (r"\[([^\]]+)\]\([^)]+\)", "$1"),
            (r">\s", ""),
            (r"[-*]\s", ""),
            (r"\n+", " "),
        ]
        .into_iter()
        .map(|(pattern, replacement)| {
            (Regex::new(pattern).expect("valid excerpt regex"), replacement)
        })
        .collect()
    })
}

/// Plain-text excerpt of markdown content, at most `max_length` characters
/// plus an ellipsis
pub fn generate_excerpt(content: &str, max_length: usize) -> String {
    let plain = excerpt_rules()
        .iter()
        .fold(content.to_string(), |acc, (re, replacement)| {
            re.replace_all(&acc, *replacement).into_owned()
        });
    let plain = plain.trim();

    if plain.chars().count() <= max_length {
        return plain.to_string();
    }

    let cut: String = plain.chars().take(max_length).collect();
    format!("{}...", cut.trim())
}

/// Estimated reading time in whole minutes, at least one
pub fn calculate_read_time(content: &str) -> usize {
    let words = content.split_whitespace().count();
    words.div_ceil(WORDS_PER_MINUTE).max(1)
}
