//! Error types for editing sessions.
//!
//! Every variant is recoverable by the user: retry a load or save, fix an
//! input, or discard the draft. Nothing here is fatal to the session.

use keel_core::CoreError;
use thiserror::Error;

/// Failure reported by a caller-supplied adapter (file, network, keychain).
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The storage layer refused the document; the message is shown verbatim.
    #[error("{0}")]
    Rejected(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Errors raised by [`crate::DraftManager`] and the side channels.
#[derive(Debug, Error)]
pub enum DraftError {
    /// Schema, settings, or a side-channel document could not be fetched.
    #[error("failed to load {document}: {source}")]
    LoadFailed {
        document: String,
        #[source]
        source: AdapterError,
    },

    /// An empty or whitespace-only key was submitted.
    #[error("key must not be blank in {document}")]
    BlankKey { document: String },

    /// The key is already present; nothing was changed.
    #[error("duplicate key '{key}' in {document}")]
    DuplicateKey { document: String, key: String },

    /// A value that looks like JSON did not parse.
    #[error("invalid JSON value for '{key}' in {document}: {reason}")]
    ValueParse {
        document: String,
        key: String,
        reason: String,
    },

    /// A fixed-shape document was asked for a field it does not declare.
    #[error("unknown field '{field}' in {document}")]
    UnknownField { document: String, field: String },

    /// The adapter rejected a save. The draft is kept and the save may be retried.
    #[error("failed to save {document}: {source}")]
    SaveFailed {
        document: String,
        #[source]
        source: AdapterError,
    },

    /// Editing was attempted before a successful load.
    #[error("settings are not loaded (state: {state})")]
    NotReady { state: String },

    /// `confirm_save` without a preceding `request_save`.
    #[error("no save is awaiting confirmation")]
    NoPendingSave,

    #[error(transparent)]
    Path(#[from] CoreError),
}
