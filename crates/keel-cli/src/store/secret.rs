use std::path::PathBuf;

use async_trait::async_trait;
use keel_draft::{AdapterError, DocumentIo};

use super::{read_optional, write_creating_dirs};

/// A single secret stored as the whole contents of a file.
///
/// The file is written with mode 0600 on Unix. Saving an empty secret
/// removes the file.
#[derive(Debug, Clone)]
pub struct SecretFile {
    path: PathBuf,
}

impl SecretFile {
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl DocumentIo<String> for SecretFile {
    async fn read(&self) -> Result<String, AdapterError> {
        Ok(read_optional(&self.path)
            .await?
            .map(|text| text.trim().to_string())
            .unwrap_or_default())
    }

    async fn write(&self, value: &String) -> Result<(), AdapterError> {
        if value.is_empty() {
            return match tokio::fs::remove_file(&self.path).await {
                Ok(()) => Ok(()),
                Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(error) => Err(AdapterError::Rejected(format!(
                    "delete {}: {error}",
                    self.path.display()
                ))),
            };
        }

        write_creating_dirs(&self.path, value).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))
                .await
                .map_err(|e| {
                    AdapterError::Rejected(format!("chmod {}: {e}", self.path.display()))
                })?;
        }

        Ok(())
    }
}
