//! File-backed adapters for the documents a tool profile names.
//!
//! A missing file reads as an empty document, so a tool can be configured
//! before it has ever written its settings.

mod env_file;
mod json_object;
mod secret;
mod settings;

pub use env_file::EnvFile;
pub use json_object::JsonObjectFile;
pub use secret::SecretFile;
pub use settings::FileSettings;

use std::io::ErrorKind;
use std::path::Path;

use keel_draft::AdapterError;

/// Read a file, treating "not found" as `None`.
async fn read_optional(path: &Path) -> Result<Option<String>, AdapterError> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => Ok(Some(text)),
        Err(error) if error.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "document missing; treating as empty");
            Ok(None)
        }
        Err(error) => Err(AdapterError::Rejected(format!("read {}: {error}", path.display()))),
    }
}

/// Write a file, creating parent directories first.
async fn write_creating_dirs(path: &Path, contents: &str) -> Result<(), AdapterError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| AdapterError::Rejected(format!("mkdir {}: {e}", parent.display())))?;
    }
    tokio::fs::write(path, contents)
        .await
        .map_err(|e| AdapterError::Rejected(format!("write {}: {e}", path.display())))
}
