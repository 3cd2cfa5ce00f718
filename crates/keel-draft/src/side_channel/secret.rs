use std::any::Any;

use async_trait::async_trait;
use keel_core::{DiffEntry, JsonPath, diff_text};
use serde_json::Value;

use super::SideChannel;
use crate::adapter::DocumentIo;
use crate::error::DraftError;

/// A single secret string, such as a bearer token. Empty means unset.
pub struct SecretChannel {
    document: String,
    field: String,
    io: Box<dyn DocumentIo<String>>,
    original: String,
    draft: String,
}

impl SecretChannel {
    /// `document` and `field` form the diff path, e.g. `auth` + `TOKEN`.
    pub fn new(
        document: impl Into<String>,
        field: impl Into<String>,
        io: impl DocumentIo<String> + 'static,
    ) -> Self {
        Self {
            document: document.into(),
            field: field.into(),
            io: Box::new(io),
            original: String::new(),
            draft: String::new(),
        }
    }

    pub fn value(&self) -> &str {
        &self.draft
    }

    pub fn set(&mut self, value: impl Into<String>) {
        self.draft = value.into();
    }

    pub fn clear(&mut self) {
        self.draft.clear();
    }

    pub fn path(&self) -> JsonPath {
        JsonPath::key(self.document.as_str()).child_key(self.field.as_str())
    }
}

#[async_trait]
impl SideChannel for SecretChannel {
    fn name(&self) -> &str {
        &self.document
    }

    async fn load(&mut self) -> Result<Value, DraftError> {
        let secret = self
            .io
            .read()
            .await
            .map_err(|source| DraftError::LoadFailed {
                document: self.document.clone(),
                source,
            })?;
        self.draft.clone_from(&secret);
        self.original = secret;
        Ok(Value::String(self.original.clone()))
    }

    fn compute_diffs(&self) -> Result<Vec<DiffEntry>, DraftError> {
        Ok(diff_text(self.path(), &self.original, &self.draft)
            .into_iter()
            .collect())
    }

    fn reset(&mut self) {
        self.draft.clone_from(&self.original);
    }

    fn unload(&mut self) {
        self.original.clear();
        self.draft.clear();
    }

    fn is_dirty(&self) -> bool {
        self.draft != self.original
    }

    async fn save(&self) -> Result<(), DraftError> {
        self.io
            .write(&self.draft)
            .await
            .map_err(|source| DraftError::SaveFailed {
                document: self.document.clone(),
                source,
            })
    }

    fn mark_saved(&mut self) {
        self.original.clone_from(&self.draft);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
