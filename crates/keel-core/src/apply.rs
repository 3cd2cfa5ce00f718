//! Path navigation and diff replay.

use serde_json::Value;

use crate::diff::{Change, DiffEntry};
use crate::error::CoreError;
use crate::path::{JsonPath, PathSegment};

/// Borrow the value at `path`, if every segment exists.
#[must_use]
pub fn value_at<'a>(root: &'a Value, path: &JsonPath) -> Option<&'a Value> {
    path.segments()
        .iter()
        .try_fold(root, |current, segment| match (segment, current) {
            (PathSegment::Key(key), Value::Object(map)) => map.get(key),
            (PathSegment::Index(index), Value::Array(items)) => items.get(*index),
            _ => None,
        })
}

fn value_at_mut<'a>(root: &'a mut Value, path: &JsonPath) -> Result<&'a mut Value, CoreError> {
    let mut current = root;
    let mut walked = JsonPath::root();
    for segment in path.segments() {
        walked = match segment {
            PathSegment::Key(key) => walked.child_key(key.as_str()),
            PathSegment::Index(index) => walked.child_index(*index),
        };
        current = match (segment, current) {
            (PathSegment::Key(key), Value::Object(map)) => map.get_mut(key),
            (PathSegment::Index(index), Value::Array(items)) => items.get_mut(*index),
            _ => None,
        }
        .ok_or_else(|| CoreError::PathNotFound {
            path: walked.to_string(),
        })?;
    }
    Ok(current)
}

/// Write `value` at `path`, replacing what is there.
///
/// The parent must exist. Object keys are inserted as needed; array indices
/// may replace an element or append at exactly `len`.
///
/// # Errors
///
/// Returns [`CoreError`] when the parent is missing, has the wrong kind, or
/// the index is past the end.
pub fn set_at(root: &mut Value, path: &JsonPath, value: Value) -> Result<(), CoreError> {
    let Some((parent_path, last)) = path.split_last() else {
        *root = value;
        return Ok(());
    };
    let parent = value_at_mut(root, &parent_path)?;
    match (last, parent) {
        (PathSegment::Key(key), Value::Object(map)) => {
            map.insert(key.clone(), value);
            Ok(())
        }
        (PathSegment::Index(index), Value::Array(items)) => {
            let len = items.len();
            if *index < len {
                items[*index] = value;
                Ok(())
            } else if *index == len {
                items.push(value);
                Ok(())
            } else {
                Err(CoreError::IndexOutOfBounds {
                    path: path.to_string(),
                    index: *index,
                    len,
                })
            }
        }
        _ => Err(CoreError::NotAContainer {
            path: parent_path.to_string(),
        }),
    }
}

/// Remove and return the value at `path`. Removing the root is not possible.
#[must_use]
pub fn remove_at(root: &mut Value, path: &JsonPath) -> Option<Value> {
    let (parent_path, last) = path.split_last()?;
    let parent = value_at_mut(root, &parent_path).ok()?;
    match (last, parent) {
        (PathSegment::Key(key), Value::Object(map)) => map.remove(key),
        (PathSegment::Index(index), Value::Array(items)) if *index < items.len() => {
            Some(items.remove(*index))
        }
        _ => None,
    }
}

/// Replay `entries` (as produced by [`crate::diff`]) onto a copy of `base`.
///
/// Changes and additions are applied in order; removals are applied last, in
/// reverse, so trailing array removals never shift an index still pending.
///
/// # Errors
///
/// Returns [`CoreError`] if an entry addresses a location that does not
/// exist in the partially patched value.
pub fn apply(base: &Value, entries: &[DiffEntry]) -> Result<Value, CoreError> {
    let mut result = base.clone();
    for entry in entries {
        match &entry.change {
            Change::Added { after } | Change::Changed { after, .. } => {
                set_at(&mut result, &entry.path, after.clone())?;
            }
            Change::Removed { .. } => {}
        }
    }
    for entry in entries.iter().rev() {
        if let Change::Removed { .. } = entry.change {
            if entry.path.is_root() {
                result = Value::Null;
                continue;
            }
            remove_at(&mut result, &entry.path).ok_or_else(|| CoreError::PathNotFound {
                path: entry.path.to_string(),
            })?;
        }
    }
    Ok(result)
}
