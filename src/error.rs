//! Error types for the `docqa` crate.

use thiserror::Error;

/// Errors that can occur while ingesting documents or answering questions.
#[derive(Debug, Error)]
pub enum QaError {
    /// The document bytes could not be parsed as a PDF.
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// A chunk was empty or otherwise malformed.
    #[error("Invalid chunk: {0}")]
    InvalidChunk(String),

    /// An embedding did not match the index dimensionality.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimensionality the index was created with.
        expected: usize,
        /// Dimensionality of the offending embedding.
        actual: usize,
    },

    /// The embedding provider failed.
    #[error("Embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The answer generation provider failed.
    #[error("Generation error ({provider}): {message}")]
    Generation {
        /// The answering provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The vector index backend is unreachable or failed.
    #[error("Index unavailable ({backend}): {message}")]
    IndexUnavailable {
        /// The index backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// A convenience result type for docqa operations.
pub type Result<T> = std::result::Result<T, QaError>;
