use std::any::Any;
use std::collections::HashSet;

use async_trait::async_trait;
use keel_core::{DiffEntry, JsonPath, diff_at, json_map_equal};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{SideChannel, parse_text_value, render_text_value};
use crate::adapter::DocumentIo;
use crate::error::DraftError;

/// One editable row of a free-form document. `value` is the raw text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeFormEntry {
    pub key: String,
    pub value: String,
}

impl FreeFormEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Flat key/value document whose values are typed as text.
pub struct FreeFormChannel {
    name: String,
    io: Box<dyn DocumentIo<Map<String, Value>>>,
    original: Map<String, Value>,
    entries: Vec<FreeFormEntry>,
}

impl FreeFormChannel {
    pub fn new(name: impl Into<String>, io: impl DocumentIo<Map<String, Value>> + 'static) -> Self {
        Self {
            name: name.into(),
            io: Box::new(io),
            original: Map::new(),
            entries: Vec::new(),
        }
    }

    pub const fn original(&self) -> &Map<String, Value> {
        &self.original
    }

    pub fn entries(&self) -> &[FreeFormEntry] {
        &self.entries
    }

    /// Replace every row at once, as a table editor would.
    pub fn set_entries(&mut self, entries: Vec<FreeFormEntry>) {
        self.entries = entries;
    }

    /// Append a row.
    ///
    /// # Errors
    ///
    /// [`DraftError::BlankKey`] or [`DraftError::DuplicateKey`]; rows are left
    /// unchanged.
    pub fn add_entry(&mut self, key: &str, value: impl Into<String>) -> Result<(), DraftError> {
        let key = key.trim();
        if key.is_empty() {
            return Err(DraftError::BlankKey {
                document: self.name.clone(),
            });
        }
        if self.entries.iter().any(|entry| entry.key == key) {
            return Err(DraftError::DuplicateKey {
                document: self.name.clone(),
                key: key.to_string(),
            });
        }
        self.entries.push(FreeFormEntry::new(key, value));
        Ok(())
    }

    /// Overwrite the row for `key`, appending it if absent.
    pub fn set_entry(&mut self, key: &str, value: impl Into<String>) {
        let key = self.existing_key(key);
        let value = value.into();
        match self.entries.iter_mut().find(|entry| entry.key == key) {
            Some(entry) => entry.value = value,
            None => self.entries.push(FreeFormEntry::new(key, value)),
        }
    }

    /// Drop every row for `key`. Returns whether one existed.
    pub fn remove_entry(&mut self, key: &str) -> bool {
        let key = self.existing_key(key);
        let before = self.entries.len();
        self.entries.retain(|entry| entry.key != key);
        self.entries.len() != before
    }

    /// `key` as typed when a row already uses it verbatim, otherwise trimmed.
    fn existing_key<'a>(&self, key: &'a str) -> &'a str {
        if self.entries.iter().any(|entry| entry.key == key) {
            key
        } else {
            key.trim()
        }
    }

    /// Key a row is written under. Loaded keys are kept verbatim; other keys
    /// are trimmed, and rows left blank are skipped.
    fn row_key<'a>(&self, entry: &'a FreeFormEntry) -> Option<&'a str> {
        if self.original.contains_key(&entry.key) {
            return Some(&entry.key);
        }
        let key = entry.key.trim();
        (!key.is_empty()).then_some(key)
    }

    /// Turn the rows into the document that would be written.
    ///
    /// # Errors
    ///
    /// [`DraftError::DuplicateKey`] for a repeated key and
    /// [`DraftError::ValueParse`] for JSON-looking text that does not parse.
    pub fn build(&self) -> Result<Map<String, Value>, DraftError> {
        let mut seen = HashSet::new();
        let mut document = Map::new();
        for entry in &self.entries {
            let Some(key) = self.row_key(entry) else {
                continue;
            };
            if !seen.insert(key) {
                return Err(DraftError::DuplicateKey {
                    document: self.name.clone(),
                    key: key.to_string(),
                });
            }
            let value = parse_text_value(&entry.value).map_err(|error| DraftError::ValueParse {
                document: self.name.clone(),
                key: key.to_string(),
                reason: error.to_string(),
            })?;
            document.insert(key.to_string(), value);
        }
        Ok(document)
    }

    fn render(document: &Map<String, Value>) -> Vec<FreeFormEntry> {
        document
            .iter()
            .map(|(key, value)| FreeFormEntry::new(key.as_str(), render_text_value(value)))
            .collect()
    }
}

#[async_trait]
impl SideChannel for FreeFormChannel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn load(&mut self) -> Result<Value, DraftError> {
        let document = self
            .io
            .read()
            .await
            .map_err(|source| DraftError::LoadFailed {
                document: self.name.clone(),
                source,
            })?;
        self.entries = Self::render(&document);
        self.original = document;
        Ok(Value::Object(self.original.clone()))
    }

    fn compute_diffs(&self) -> Result<Vec<DiffEntry>, DraftError> {
        let draft = Value::Object(self.build()?);
        let original = Value::Object(self.original.clone());
        Ok(diff_at(&JsonPath::key(self.name.as_str()), Some(&original), Some(&draft)))
    }

    fn reset(&mut self) {
        self.entries = Self::render(&self.original);
    }

    fn unload(&mut self) {
        self.original.clear();
        self.entries.clear();
    }

    fn is_dirty(&self) -> bool {
        !self
            .build()
            .is_ok_and(|draft| json_map_equal(&draft, &self.original))
    }

    async fn save(&self) -> Result<(), DraftError> {
        let document = self.build()?;
        self.io
            .write(&document)
            .await
            .map_err(|source| DraftError::SaveFailed {
                document: self.name.clone(),
                source,
            })
    }

    fn mark_saved(&mut self) {
        if let Ok(document) = self.build() {
            self.entries = Self::render(&document);
            self.original = document;
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
