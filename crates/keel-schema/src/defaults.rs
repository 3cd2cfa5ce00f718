//! Starting values for newly added fields.

use serde_json::{Map, Value, json};

use crate::types::FieldType;
use crate::view::SchemaView;

/// Value a new field starts with.
///
/// Order of preference: the schema's `default`, then an empty value of the
/// declared primitive type, then the first `enum` entry, then `""`. Never
/// fails; a schema with no usable information yields an empty string.
#[must_use]
pub fn default_value(schema: Option<&Value>) -> Value {
    let Some(schema) = schema else {
        return Value::String(String::new());
    };
    let view = SchemaView::new(schema);
    if let Some(default) = view.default() {
        return default.clone();
    }
    match view.type_name().and_then(|name| name.parse::<FieldType>().ok()) {
        Some(FieldType::Object) => return Value::Object(Map::new()),
        Some(FieldType::Array) => return Value::Array(Vec::new()),
        Some(FieldType::Boolean) => return Value::Bool(false),
        Some(FieldType::Number | FieldType::Integer) => return Value::from(0),
        _ => {}
    }
    view.enum_values()
        .and_then(<[Value]>::first)
        .cloned()
        .unwrap_or_else(|| Value::String(String::new()))
}

/// Minimal schema standing in for a type the user picked by hand.
#[must_use]
pub fn synthetic_schema(field_type: FieldType) -> Value {
    json!({ "type": field_type.as_str() })
}
