use std::any::Any;
use std::collections::BTreeMap;

use async_trait::async_trait;
use keel_core::{DiffEntry, JsonPath, diff_text};
use serde_json::{Map, Value};

use super::SideChannel;
use crate::adapter::DocumentIo;
use crate::error::DraftError;

/// Fixed set of named environment fields. A missing field reads as empty.
pub struct EnvChannel {
    document: String,
    fields: Vec<String>,
    io: Box<dyn DocumentIo<BTreeMap<String, String>>>,
    original: BTreeMap<String, String>,
    draft: BTreeMap<String, String>,
}

impl EnvChannel {
    pub fn new<I, S>(
        document: impl Into<String>,
        fields: I,
        io: impl DocumentIo<BTreeMap<String, String>> + 'static,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            document: document.into(),
            fields: fields.into_iter().map(Into::into).collect(),
            io: Box::new(io),
            original: BTreeMap::new(),
            draft: BTreeMap::new(),
        }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn get(&self, field: &str) -> &str {
        self.draft.get(field).map_or("", String::as_str)
    }

    /// # Errors
    ///
    /// [`DraftError::UnknownField`] when `field` is not declared.
    pub fn set(&mut self, field: &str, value: impl Into<String>) -> Result<(), DraftError> {
        if !self.fields.iter().any(|declared| declared == field) {
            return Err(DraftError::UnknownField {
                document: self.document.clone(),
                field: field.to_string(),
            });
        }
        let value = value.into();
        if value.is_empty() {
            self.draft.remove(field);
        } else {
            self.draft.insert(field.to_string(), value);
        }
        Ok(())
    }

    fn read(map: &BTreeMap<String, String>, field: &str) -> String {
        map.get(field).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl SideChannel for EnvChannel {
    fn name(&self) -> &str {
        &self.document
    }

    async fn load(&mut self) -> Result<Value, DraftError> {
        let mut loaded = self
            .io
            .read()
            .await
            .map_err(|source| DraftError::LoadFailed {
                document: self.document.clone(),
                source,
            })?;
        loaded.retain(|key, value| !value.is_empty() && self.fields.contains(key));
        self.draft.clone_from(&loaded);
        self.original = loaded;
        let record: Map<String, Value> = self
            .fields
            .iter()
            .map(|field| (field.clone(), Value::String(Self::read(&self.original, field))))
            .collect();
        Ok(Value::Object(record))
    }

    fn compute_diffs(&self) -> Result<Vec<DiffEntry>, DraftError> {
        let base = JsonPath::key(self.document.as_str());
        Ok(self
            .fields
            .iter()
            .filter_map(|field| {
                diff_text(
                    base.child_key(field.as_str()),
                    &Self::read(&self.original, field),
                    &Self::read(&self.draft, field),
                )
            })
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryDocument;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn stored(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn channel(pairs: &[(&str, &str)]) -> EnvChannel {
        EnvChannel::new(
            "env",
            ["API_KEY", "BASE_URL", "MODEL"],
            MemoryDocument::new(stored(pairs)),
        )
    }

    #[tokio::test]
    async fn load_keeps_declared_fields_only() {
        let mut env = channel(&[("API_KEY", "k"), ("PATH", "/bin")]);
        let loaded = env.load().await.unwrap();
        assert_eq!(loaded, json!({"API_KEY": "k", "BASE_URL": "", "MODEL": ""}));
        assert_eq!(env.get("PATH"), "");
        assert!(!env.is_dirty());
    }

    #[tokio::test]
    async fn fields_diff_in_declaration_order() {
        let mut env = channel(&[("API_KEY", "old"), ("MODEL", "m1")]);
        env.load().await.unwrap();
        env.set("MODEL", "").unwrap();
        env.set("BASE_URL", "https://example.test").unwrap();
        env.set("API_KEY", "new").unwrap();

        assert_eq!(
            env.compute_diffs().unwrap(),
            vec![
                DiffEntry::changed("env.API_KEY".parse().unwrap(), json!("old"), json!("new")),
                DiffEntry::added("env.BASE_URL".parse().unwrap(), json!("https://example.test")),
                DiffEntry::removed("env.MODEL".parse().unwrap(), json!("m1")),
            ]
        );
    }

    #[test]
    fn undeclared_fields_are_rejected() {
        let mut env = channel(&[]);
        assert!(matches!(
            env.set("HOME", "/root"),
            Err(DraftError::UnknownField { ref field, .. }) if field == "HOME"
        ));
    }

    #[tokio::test]
    async fn clearing_a_value_back_to_empty_is_not_dirty() {
        let mut env = channel(&[]);
        env.load().await.unwrap();
        env.set("MODEL", "m").unwrap();
        env.set("MODEL", "").unwrap();
        assert!(!env.is_dirty());
        assert!(env.compute_diffs().unwrap().is_empty());
    }
}
