//! Contracts the caller implements for each tool.
//!
//! The engine never touches storage directly. Where a document lives, which
//! format it is in, and how it is written are all behind these traits.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::AdapterError;

/// Load/save access to one tool's schema and primary settings document.
#[async_trait]
pub trait SettingsAdapter: Send + Sync {
    /// Tool name, used in logs.
    fn name(&self) -> &str;

    /// Fetch the JSON Schema. The manager caches it across reloads unless a
    /// refetch is forced.
    async fn load_schema(&self) -> Result<Value, AdapterError>;

    /// Fetch the persisted settings document.
    async fn load_settings(&self) -> Result<Map<String, Value>, AdapterError>;

    /// Persist the full settings document.
    async fn save_settings(&self, next: &Map<String, Value>) -> Result<(), AdapterError>;
}

/// Read/write access to one auxiliary document of shape `T`.
#[async_trait]
pub trait DocumentIo<T: Send + Sync>: Send + Sync {
    async fn read(&self) -> Result<T, AdapterError>;

    async fn write(&self, value: &T) -> Result<(), AdapterError>;
}
