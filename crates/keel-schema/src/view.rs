//! Lenient typed access to a schema node.

use serde_json::{Map, Value};

/// Borrowed view over one schema node.
///
/// Every accessor returns `None` when the key is missing or has an
/// unexpected shape, so a malformed schema degrades to "no information"
/// instead of an error.
#[derive(Debug, Clone, Copy)]
pub struct SchemaView<'a>(&'a Value);

impl<'a> SchemaView<'a> {
    #[must_use]
    pub const fn new(node: &'a Value) -> Self {
        Self(node)
    }

    #[must_use]
    pub const fn raw(&self) -> &'a Value {
        self.0
    }

    fn get(&self, key: &str) -> Option<&'a Value> {
        self.0.as_object().and_then(|map| map.get(key))
    }

    /// The declared type name; the first entry when `type` is an array.
    #[must_use]
    pub fn type_name(&self) -> Option<&'a str> {
        match self.get("type")? {
            Value::String(name) => Some(name),
            Value::Array(names) => names.first().and_then(Value::as_str),
            _ => None,
        }
    }

    #[must_use]
    pub fn reference(&self) -> Option<&'a str> {
        self.get("$ref").and_then(Value::as_str)
    }

    #[must_use]
    pub fn default(&self) -> Option<&'a Value> {
        self.get("default")
    }

    #[must_use]
    pub fn enum_values(&self) -> Option<&'a [Value]> {
        self.get("enum").and_then(Value::as_array).map(Vec::as_slice)
    }

    #[must_use]
    pub fn description(&self) -> Option<&'a str> {
        self.get("description").and_then(Value::as_str)
    }

    #[must_use]
    pub fn properties(&self) -> Option<&'a Map<String, Value>> {
        self.get("properties").and_then(Value::as_object)
    }
}
