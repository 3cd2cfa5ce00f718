//! # keel-draft
//!
//! Editing sessions for schema-backed settings documents.
//!
//! A [`DraftManager`] owns the `{original, draft}` pair of one tool's primary
//! settings document plus any number of [`SideChannel`] documents (auth
//! token, environment file, free-form key/value file). Edits only touch
//! drafts. A save is a two-step affair:
//!
//! 1. [`DraftManager::request_save`] merges the primary diff with every side
//!    channel's diff into one list for the user to confirm.
//! 2. [`DraftManager::confirm_save`] persists every draft through the
//!    caller's adapters; only a fully successful save rebases the originals.
//!
//! # Usage
//!
//! ```no_run
//! use keel_draft::{AddKey, DraftManager, SaveRequest};
//! use keel_draft::memory::MemoryAdapter;
//! use serde_json::json;
//!
//! # async fn demo() -> Result<(), keel_draft::DraftError> {
//! let adapter = MemoryAdapter::new("demo", json!({"properties": {}}), serde_json::Map::new());
//! let mut manager = DraftManager::new(adapter);
//! manager.load(false).await?;
//! manager.add_key("timeout", AddKey::default())?;
//! if let SaveRequest::Confirm { diffs } = manager.request_save()? {
//!     println!("{} change(s) pending", diffs.len());
//!     manager.confirm_save().await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod document;
pub mod error;
pub mod manager;
pub mod memory;
pub mod save;
pub mod side_channel;

pub use adapter::{DocumentIo, SettingsAdapter};
pub use document::{DocumentState, PRIMARY_DOCUMENT};
pub use error::{AdapterError, DraftError};
pub use manager::{AddKey, DraftManager, LoadState};
pub use save::SaveRequest;
pub use side_channel::{EnvChannel, FreeFormChannel, FreeFormEntry, SecretChannel, SideChannel};
