//! `$ref` resolution.
//!
//! Only local refs (`#` or `#/a/b`) into the root schema document are
//! followed, and only one hop: the referenced node is not itself resolved
//! again, so a self-referential schema cannot loop. Resolution is best
//! effort. An unresolvable ref leaves the node exactly as it was.

use serde_json::Value;

use crate::view::SchemaView;

/// Look up a local JSON-Pointer ref (`#/definitions/Foo`) in `root`.
///
/// Segments are unescaped per RFC 6901 (`~1` is `/`, `~0` is `~`).
#[must_use]
pub fn resolve_pointer<'a>(root: &'a Value, reference: &str) -> Option<&'a Value> {
    let pointer = reference.strip_prefix('#')?;
    if !pointer.is_empty() && !pointer.starts_with('/') {
        return None;
    }
    root.pointer(pointer)
}

/// Resolve `schema` against `root`.
///
/// With a resolvable `$ref` the result is the referenced node with every
/// sibling key of the ref node (except `$ref`) laid over it, so local keys
/// such as `description` or `default` win over the definition.
#[must_use]
pub fn resolve(schema: Option<&Value>, root: Option<&Value>) -> Option<Value> {
    let schema = schema?;
    let (Some(reference), Some(root)) = (SchemaView::new(schema).reference(), root) else {
        return Some(schema.clone());
    };
    let Some(target) = resolve_pointer(root, reference) else {
        return Some(schema.clone());
    };

    let mut resolved = target.clone();
    if let (Value::Object(merged), Value::Object(local)) = (&mut resolved, schema) {
        for (key, value) in local {
            if key != "$ref" {
                merged.insert(key.clone(), value.clone());
            }
        }
    }
    Some(resolved)
}

/// Resolved schema of the top-level property `key` of `root`.
#[must_use]
pub fn property_schema(root: &Value, key: &str) -> Option<Value> {
    let node = SchemaView::new(root).properties()?.get(key)?;
    resolve(Some(node), Some(root))
}
