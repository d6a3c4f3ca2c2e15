//! Error types for reviewharvest.
//!
//! All crates in the workspace use [`ReviewHarvestError`] via `thiserror`.
//! `NotFound` is a distinct variant so callers can branch on "no such item"
//! versus a genuine transport failure.

use std::path::PathBuf;

/// Top-level error type for all reviewharvest operations.
#[derive(Debug, thiserror::Error)]
pub enum ReviewHarvestError {
    /// Network/connection failure or non-success HTTP status from either
    /// storefront endpoint.
    #[error("transport error: {0}")]
    Transport(String),

    /// Response body does not parse as the expected JSON or HTML shape.
    #[error("decode error: {message}")]
    Decode { message: String },

    /// Identifier resolution matched zero search result entries.
    #[error("no catalog entry found for {query:?}")]
    NotFound { query: String },

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Data validation error (malformed identifier, bad option value, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ReviewHarvestError>;

impl ReviewHarvestError {
    /// Create a decode error from any displayable message.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode {
            message: msg.into(),
        }
    }

    /// Create a not-found error for the given search query.
    pub fn not_found(query: impl Into<String>) -> Self {
        Self::NotFound {
            query: query.into(),
        }
    }

    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error came from the transport layer (and a retry of an
    /// idempotent GET may succeed).
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
