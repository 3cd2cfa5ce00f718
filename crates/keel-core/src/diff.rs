//! Coarsest-first structural diff.
//!
//! Walks original and draft together and reports every difference as a flat
//! list of [`DiffEntry`]s. A subtree that exists on only one side is reported
//! once, at its root, never per leaf underneath it: a user adding a whole new
//! nested object sees one line in the confirmation view.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::equal::json_equal;
use crate::path::JsonPath;

/// One reported difference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffEntry {
    pub path: JsonPath,
    #[serde(flatten)]
    pub change: Change,
}

/// The before/after payload of a [`DiffEntry`].
///
/// Serialized with a `type` tag, so an added entry reads
/// `{"path": "retry", "type": "added", "after": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Change {
    Added { after: Value },
    Removed { before: Value },
    Changed { before: Value, after: Value },
}

/// Payload-free classification of a [`Change`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffKind {
    Added,
    Removed,
    Changed,
}

impl DiffKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Removed => "removed",
            Self::Changed => "changed",
        }
    }
}

impl DiffEntry {
    #[must_use]
    pub const fn added(path: JsonPath, after: Value) -> Self {
        Self {
            path,
            change: Change::Added { after },
        }
    }

    #[must_use]
    pub const fn removed(path: JsonPath, before: Value) -> Self {
        Self {
            path,
            change: Change::Removed { before },
        }
    }

    #[must_use]
    pub const fn changed(path: JsonPath, before: Value, after: Value) -> Self {
        Self {
            path,
            change: Change::Changed { before, after },
        }
    }

    #[must_use]
    pub const fn kind(&self) -> DiffKind {
        match self.change {
            Change::Added { .. } => DiffKind::Added,
            Change::Removed { .. } => DiffKind::Removed,
            Change::Changed { .. } => DiffKind::Changed,
        }
    }

    #[must_use]
    pub const fn before(&self) -> Option<&Value> {
        match &self.change {
            Change::Added { .. } => None,
            Change::Removed { before } | Change::Changed { before, .. } => Some(before),
        }
    }

    #[must_use]
    pub const fn after(&self) -> Option<&Value> {
        match &self.change {
            Change::Removed { .. } => None,
            Change::Added { after } | Change::Changed { after, .. } => Some(after),
        }
    }
}

/// Diff two documents from the root.
#[must_use]
pub fn diff(original: &Value, draft: &Value) -> Vec<DiffEntry> {
    diff_at(&JsonPath::root(), Some(original), Some(draft))
}

/// Diff two optional values rooted at `base`.
///
/// `None` means "absent at this path", which is distinct from JSON `null`.
#[must_use]
pub fn diff_at(base: &JsonPath, original: Option<&Value>, draft: Option<&Value>) -> Vec<DiffEntry> {
    let mut entries = Vec::new();
    walk(base, original, draft, &mut entries);
    entries
}

fn walk(
    path: &JsonPath,
    original: Option<&Value>,
    draft: Option<&Value>,
    out: &mut Vec<DiffEntry>,
) {
    match (original, draft) {
        (None, None) => {}
        (None, Some(after)) => out.push(DiffEntry::added(path.clone(), after.clone())),
        (Some(before), None) => out.push(DiffEntry::removed(path.clone(), before.clone())),
        (Some(Value::Object(before)), Some(Value::Object(after))) => {
            let keys: BTreeSet<&String> = before.keys().chain(after.keys()).collect();
            for key in keys {
                walk(
                    &path.child_key(key.as_str()),
                    before.get(key.as_str()),
                    after.get(key.as_str()),
                    out,
                );
            }
        }
        (Some(Value::Array(before)), Some(Value::Array(after))) => {
            for index in 0..before.len().max(after.len()) {
                walk(&path.child_index(index), before.get(index), after.get(index), out);
            }
        }
        (Some(before), Some(after)) => {
            if !json_equal(before, after) {
                out.push(DiffEntry::changed(path.clone(), before.clone(), after.clone()));
            }
        }
    }
}

/// Classify a change to a single text field where empty means "unset".
///
/// Empty to non-empty is `added`, non-empty to empty is `removed`, any other
/// difference is `changed`. Equal text yields nothing.
#[must_use]
pub fn diff_text(path: JsonPath, before: &str, after: &str) -> Option<DiffEntry> {
    if before == after {
        return None;
    }
    let entry = match (before.is_empty(), after.is_empty()) {
        (true, _) => DiffEntry::added(path, Value::from(after)),
        (_, true) => DiffEntry::removed(path, Value::from(before)),
        _ => DiffEntry::changed(path, Value::from(before), Value::from(after)),
    };
    Some(entry)
}
