//! Error types for Writeup Notebook
//!
//! This module defines all custom error types used throughout the engine.
//! Error types are organized by category so callers can decide which ones
//! are surfaced to the user and which ones are only logged.

use std::path::PathBuf;
use thiserror::Error;

/// Main application error type encompassing all error categories
#[derive(Error, Debug)]
pub enum AppError {
    /// Editor operation errors
    #[error(transparent)]
    Editor(#[from] EditorError),

    /// Pasted image errors
    #[error(transparent)]
    Image(#[from] ImageError),

    /// Document validation errors
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Persistence collaborator errors
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Editor operation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    /// Selection offsets are inverted or past the end of the buffer
    #[error("Invalid selection range: {start} to {end} (buffer length {len})")]
    InvalidSelection { start: usize, end: usize, len: usize },
}

/// Errors raised while ingesting a pasted image
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    /// Payload exceeds the embeddable ceiling
    #[error("Image is too large ({size} bytes). Maximum size is {max} bytes")]
    TooLarge { size: usize, max: usize },

    /// Payload media type is not an image
    #[error("Clipboard payload is not an image: {mime_type}")]
    NotAnImage { mime_type: String },

    /// Media type is not a well-formed `type/subtype` token pair
    #[error("Malformed image media type: {mime_type:?}")]
    MalformedMime { mime_type: String },

    /// Binary-to-text conversion failed
    #[error("Could not encode image: {0}")]
    Encoding(String),
}

/// Document validation errors raised by an explicit save
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Title must not be empty")]
    EmptyTitle,

    #[error("Content must not be empty")]
    EmptyContent,

    #[error("A document may carry at most {max} tags")]
    TooManyTags { max: usize },
}

/// Errors reported by the persistence collaborator
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// Error writing the document record
    #[error("Could not save document {document_id}: {path}")]
    WriteError {
        document_id: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error reading the stored record before merging
    #[error("Could not read stored document: {path}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error renaming the temporary file over the target
    #[error("Could not complete save (rename failed): {path}")]
    RenameError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error serializing the document fields
    #[error("Could not serialize document {document_id}")]
    Serialize {
        document_id: String,
        #[source]
        source: serde_json::Error,
    },

    /// Document id cannot be used as a record name
    #[error("Invalid document id: {0:?}")]
    InvalidId(String),

    /// Backend rejected the request
    #[error("Save rejected: {0}")]
    Rejected(String),
}

/// Configuration related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Error reading configuration file
    #[error("Could not load configuration: {path}")]
    LoadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error parsing configuration
    #[error("Invalid configuration format: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Invalid configuration value
    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    /// Configuration directory error
    #[error("Could not access configuration directory")]
    DirectoryError,
}

/// Result type alias for editor operations
pub type EditorResult<T> = Result<T, EditorError>;

/// Result type alias for image ingestion
pub type ImageResult<T> = Result<T, ImageError>;

/// Result type alias for persistence operations
pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type alias for general application operations
pub type AppResult<T> = Result<T, AppError>;
