//! Error types for ManualQA

use std::time::Duration;
use thiserror::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for the ManualQA system
///
/// Only [`Error::Configuration`] and [`Error::InvalidInput`] are fatal. Every
/// other variant is recovered at the stage boundary where it occurs and
/// degrades the answer towards the extractive fallback.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Embedding service error: {0}")]
    Embedding(String),

    #[error("Index collection '{collection}' unavailable: {reason}")]
    IndexUnavailable { collection: String, reason: String },

    #[error("Generation timed out after {0:?}")]
    GenerationTimeout(Duration),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for an [`Error::IndexUnavailable`] on one collection.
    pub fn index_unavailable(collection: impl Into<String>, reason: impl ToString) -> Self {
        Error::IndexUnavailable {
            collection: collection.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether the error must surface to the caller instead of degrading
    /// to a fallback answer.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Configuration(_) | Error::InvalidInput(_))
    }
}
