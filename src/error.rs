//! Error types for the semtok library.
//!
//! All fallible operations return [`Result`], whose error type is the
//! [`SemtokError`] enum. Configuration and persistence errors are fatal for
//! a run; per-file and per-token corpus errors are handled locally by the
//! corpus reader and never surface through this type.

use std::io;

use thiserror::Error;

/// The main error type for semtok operations.
#[derive(Error, Debug)]
pub enum SemtokError {
    /// I/O errors (file operations, directory creation, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Configuration errors (missing file, invalid values, failed validation)
    #[error("Config error: {0}")]
    Config(String),

    /// YAML parse errors while loading the config document
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Conversion-map entries disagree about a raw label
    #[error("label conflict: raw label {raw} mapped to both {first} and {second}")]
    LabelConflict { raw: i32, first: i32, second: i32 },

    /// Corpus-level errors (unreadable directory, etc.)
    #[error("Corpus error: {0}")]
    Corpus(String),

    /// Training errors (insufficient data, degenerate splits, etc.)
    #[error("Training error: {0}")]
    Training(String),

    /// Artifact persistence errors
    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl SemtokError {
    /// Create a configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        SemtokError::Config(message.into())
    }

    /// Create a corpus error.
    pub fn corpus<S: Into<String>>(message: S) -> Self {
        SemtokError::Corpus(message.into())
    }

    /// Create a training error.
    pub fn training<S: Into<String>>(message: S) -> Self {
        SemtokError::Training(message.into())
    }

    /// Create a persistence error.
    pub fn persistence<S: Into<String>>(message: S) -> Self {
        SemtokError::Persistence(message.into())
    }
}

/// A specialized `Result` type for semtok operations.
pub type Result<T> = std::result::Result<T, SemtokError>;
