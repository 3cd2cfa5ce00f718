//! Error types for path navigation and diff application.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// A parent along the path does not exist.
    #[error("Path not found: {path}")]
    PathNotFound { path: String },

    /// A segment addressed into a scalar, or a key into an array (or vice versa).
    #[error("Value at '{path}' cannot hold a child of that kind")]
    NotAContainer { path: String },

    /// An array index points past the end (appending at `len` is allowed).
    #[error("Index {index} out of bounds at '{path}' (length {len})")]
    IndexOutOfBounds {
        path: String,
        index: usize,
        len: usize,
    },

    /// Path text could not be parsed.
    #[error("Invalid path '{0}'")]
    InvalidPath(String),
}
