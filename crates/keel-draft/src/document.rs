//! The `{original, draft}` pair of the primary settings document.
//!
//! Updates are pure: each helper takes the current draft and returns the next
//! one, so "has changes" stays a plain structural comparison.

use std::collections::BTreeSet;

use keel_core::{CoreError, DiffEntry, JsonPath, diff_at, json_map_equal, set_at};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::DraftError;

/// Document label used in errors about the primary settings document.
pub const PRIMARY_DOCUMENT: &str = "settings";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentState {
    pub original: Map<String, Value>,
    pub draft: Map<String, Value>,
}

impl DocumentState {
    /// Fresh state where draft and original are both the loaded document.
    #[must_use]
    pub fn new(loaded: Map<String, Value>) -> Self {
        Self {
            draft: loaded.clone(),
            original: loaded,
        }
    }

    #[must_use]
    pub fn has_changes(&self) -> bool {
        !json_map_equal(&self.original, &self.draft)
    }

    /// Diff between original and draft, one top-level key at a time.
    #[must_use]
    pub fn diff(&self) -> Vec<DiffEntry> {
        let keys: BTreeSet<&String> = self.original.keys().chain(self.draft.keys()).collect();
        keys.into_iter()
            .flat_map(|key| {
                diff_at(
                    &JsonPath::key(key.as_str()),
                    self.original.get(key.as_str()),
                    self.draft.get(key.as_str()),
                )
            })
            .collect()
    }

    /// Discard edits.
    pub fn reset(&mut self) {
        self.draft = self.original.clone();
    }

    /// Accept the draft as the new persisted state.
    pub fn rebase(&mut self) {
        self.original = self.draft.clone();
    }
}

/// `draft` plus a new top-level key. Existing keys are never overwritten.
///
/// # Errors
///
/// [`DraftError::BlankKey`] for an empty key, [`DraftError::DuplicateKey`]
/// when the key is already present.
pub fn with_key_added(
    draft: &Map<String, Value>,
    key: &str,
    value: Value,
) -> Result<Map<String, Value>, DraftError> {
    if key.trim().is_empty() {
        return Err(DraftError::BlankKey {
            document: PRIMARY_DOCUMENT.to_string(),
        });
    }
    if draft.contains_key(key) {
        return Err(DraftError::DuplicateKey {
            document: PRIMARY_DOCUMENT.to_string(),
            key: key.to_string(),
        });
    }
    let mut next = draft.clone();
    next.insert(key.to_string(), value);
    Ok(next)
}

/// `draft` without `key`.
#[must_use]
pub fn without_key(draft: &Map<String, Value>, key: &str) -> Map<String, Value> {
    let mut next = draft.clone();
    next.remove(key);
    next
}

/// `draft` with `value` written at `path`.
///
/// # Errors
///
/// [`DraftError::Path`] when `path` is the root or its parent does not exist.
pub fn with_value_at(
    draft: &Map<String, Value>,
    path: &JsonPath,
    value: Value,
) -> Result<Map<String, Value>, DraftError> {
    if path.top_level_key().is_none() {
        return Err(CoreError::InvalidPath(path.to_string()).into());
    }
    let mut root = Value::Object(draft.clone());
    set_at(&mut root, path, value)?;
    match root {
        Value::Object(next) => Ok(next),
        _ => Err(CoreError::NotAContainer {
            path: JsonPath::root().to_string(),
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().cloned().expect("object")
    }

    #[test]
    fn new_state_has_no_changes() {
        let state = DocumentState::new(map(json!({"a": 1})));
        assert!(!state.has_changes());
        assert!(state.diff().is_empty());
    }

    #[test]
    fn numeric_reformatting_is_not_a_change() {
        let mut state = DocumentState::new(map(json!({"a": 1})));
        state.draft.insert("a".into(), json!(1.0));
        assert!(!state.has_changes());
        assert!(state.diff().is_empty());
    }

    #[test]
    fn diff_paths_start_at_top_level_keys() {
        let mut state = DocumentState::new(map(json!({"timeout": 30, "old": true})));
        state.draft = map(json!({"timeout": 60, "retry": {"max": 3}}));
        let paths: Vec<String> = state.diff().iter().map(|e| e.path.to_string()).collect();
        assert_eq!(paths, vec!["old", "retry", "timeout"]);
    }

    #[test]
    fn reset_and_rebase() {
        let mut state = DocumentState::new(map(json!({"a": 1})));
        state.draft.insert("b".into(), json!(2));
        state.reset();
        assert!(!state.has_changes());

        state.draft.insert("b".into(), json!(2));
        state.rebase();
        assert!(!state.has_changes());
        assert_eq!(state.original, map(json!({"a": 1, "b": 2})));
    }

    #[test]
    fn adding_a_key_leaves_input_untouched() {
        let draft = map(json!({"a": 1}));
        let next = with_key_added(&draft, "b", json!(false)).unwrap();
        assert_eq!(draft, map(json!({"a": 1})));
        assert_eq!(next, map(json!({"a": 1, "b": false})));
    }

    #[test]
    fn duplicate_and_blank_keys_are_rejected() {
        let draft = map(json!({"a": 1}));
        assert!(matches!(
            with_key_added(&draft, "a", json!(2)),
            Err(DraftError::DuplicateKey { key, .. }) if key == "a"
        ));
        assert!(matches!(
            with_key_added(&draft, "  ", json!(2)),
            Err(DraftError::BlankKey { .. })
        ));
    }

    #[test]
    fn removing_a_key() {
        let draft = map(json!({"a": 1, "b": 2}));
        assert_eq!(without_key(&draft, "a"), map(json!({"b": 2})));
        assert_eq!(without_key(&draft, "zz"), draft);
    }

    #[test]
    fn writing_nested_values() {
        let draft = map(json!({"servers": [{"host": "a"}]}));
        let path: JsonPath = "servers[0].host".parse().unwrap();
        let next = with_value_at(&draft, &path, json!("b")).unwrap();
        assert_eq!(next, map(json!({"servers": [{"host": "b"}]})));
    }

    #[test]
    fn writing_the_root_is_rejected() {
        let draft = map(json!({}));
        assert!(matches!(
            with_value_at(&draft, &JsonPath::root(), json!(1)),
            Err(DraftError::Path(CoreError::InvalidPath(_)))
        ));
        let leading_index: JsonPath = "[0]".parse().unwrap();
        assert!(with_value_at(&draft, &leading_index, json!(1)).is_err());
    }
}
