use std::path::PathBuf;

use async_trait::async_trait;
use keel_draft::{AdapterError, DocumentIo};
use serde_json::{Map, Value};

use super::{read_optional, write_creating_dirs};

/// A flat JSON object file, used for free-form key/value documents.
#[derive(Debug, Clone)]
pub struct JsonObjectFile {
    path: PathBuf,
}

impl JsonObjectFile {
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl DocumentIo<Map<String, Value>> for JsonObjectFile {
    async fn read(&self) -> Result<Map<String, Value>, AdapterError> {
        let Some(text) = read_optional(&self.path).await? else {
            return Ok(Map::new());
        };
        if text.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str(&text)? {
            Value::Object(document) => Ok(document),
            _ => Err(AdapterError::Rejected(format!(
                "{} must hold a JSON object",
                self.path.display()
            ))),
        }
    }

    async fn write(&self, value: &Map<String, Value>) -> Result<(), AdapterError> {
        let mut text = serde_json::to_string_pretty(value)?;
        text.push('\n');
        write_creating_dirs(&self.path, &text).await
    }
}
