//! Core error types (renderer-agnostic).

use thiserror::Error;

/// Reasons a texture load can fail. Always terminal for that one attempt.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LoadError {
    #[error("texture not found: {path}")]
    NotFound { path: String },
    #[error("failed to decode texture {path}: {reason}")]
    Decode { path: String, reason: String },
    #[error("texture loader is no longer running")]
    Disconnected,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("expected 3 or 6 hex digits, got {0:?}")]
    Length(String),
    #[error("invalid hex digit in {0:?}")]
    Digit(String),
}
