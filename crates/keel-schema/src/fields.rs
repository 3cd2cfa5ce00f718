//! Field descriptors for the top-level keys of a settings document.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::resolver::property_schema;
use crate::types::{FieldType, display_type, is_compound_field};
use crate::view::SchemaView;

/// One top-level key present in the draft, with its resolved schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDescriptor {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
    pub field_type: FieldType,
    pub compound: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A field the root schema knows about, offered when adding a key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaOption {
    pub key: String,
    pub field_type: FieldType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub schema: Value,
}

/// Describe every top-level key of `draft`, sorted by key.
#[must_use]
pub fn describe_fields(draft: &Map<String, Value>, root: Option<&Value>) -> Vec<FieldDescriptor> {
    let mut fields: Vec<FieldDescriptor> = draft
        .iter()
        .map(|(key, value)| {
            let schema = root.and_then(|root| property_schema(root, key));
            let description = schema
                .as_ref()
                .and_then(|node| SchemaView::new(node).description())
                .map(ToString::to_string);
            FieldDescriptor {
                key: key.clone(),
                field_type: display_type(schema.as_ref(), Some(value)),
                compound: is_compound_field(schema.as_ref(), Some(value)),
                description,
                schema,
            }
        })
        .collect();
    fields.sort_by(|a, b| a.key.cmp(&b.key));
    fields
}

/// Every property declared by the root schema, sorted by key.
#[must_use]
pub fn schema_options(root: &Value) -> Vec<SchemaOption> {
    let Some(properties) = SchemaView::new(root).properties() else {
        return Vec::new();
    };
    let mut options: Vec<SchemaOption> = properties
        .keys()
        .filter_map(|key| {
            let schema = property_schema(root, key)?;
            let view = SchemaView::new(&schema);
            Some(SchemaOption {
                key: key.clone(),
                field_type: display_type(Some(&schema), None),
                description: view.description().map(ToString::to_string),
                schema,
            })
        })
        .collect();
    options.sort_by(|a, b| a.key.cmp(&b.key));
    options
}

/// Schema options whose key is not yet present in `draft`.
#[must_use]
pub fn available_options(root: &Value, draft: &Map<String, Value>) -> Vec<SchemaOption> {
    schema_options(root)
        .into_iter()
        .filter(|option| !draft.contains_key(&option.key))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn root() -> Value {
        json!({
            "type": "object",
            "properties": {
                "timeout": {"type": "integer", "description": "Seconds"},
                "servers": {"$ref": "#/definitions/Servers"},
                "theme": {"enum": ["dark", "light"]}
            },
            "definitions": {
                "Servers": {"type": "array", "description": "Upstreams"}
            }
        })
    }

    fn draft() -> Map<String, Value> {
        json!({"timeout": 30, "servers": [], "custom": {"a": 1}, "flag": true})
            .as_object()
            .cloned()
            .unwrap()
    }

    #[test]
    fn fields_carry_resolved_schema_and_type() {
        let root = root();
        let fields = describe_fields(&draft(), Some(&root));
        let keys: Vec<&str> = fields.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, vec!["custom", "flag", "servers", "timeout"]);

        let servers = &fields[2];
        assert_eq!(servers.field_type, FieldType::Array);
        assert!(servers.compound);
        assert_eq!(servers.description.as_deref(), Some("Upstreams"));

        let custom = &fields[0];
        assert_eq!(custom.schema, None);
        assert_eq!(custom.field_type, FieldType::Object);
        assert!(custom.compound);

        let timeout = &fields[3];
        assert_eq!(timeout.field_type, FieldType::Integer);
        assert!(!timeout.compound);
    }

    #[test]
    fn fields_without_schema_are_inferred() {
        let fields = describe_fields(&draft(), None);
        assert!(fields.iter().all(|f| f.schema.is_none()));
        assert_eq!(fields[1].field_type, FieldType::Boolean);
    }

    #[test]
    fn options_list_every_property() {
        let options = schema_options(&root());
        let keys: Vec<&str> = options.iter().map(|o| o.key.as_str()).collect();
        assert_eq!(keys, vec!["servers", "theme", "timeout"]);
        assert_eq!(options[1].field_type, FieldType::String);
    }

    #[test]
    fn available_options_skip_present_keys() {
        let options = available_options(&root(), &draft());
        let keys: Vec<&str> = options.iter().map(|o| o.key.as_str()).collect();
        assert_eq!(keys, vec!["theme"]);
    }

    #[test]
    fn schema_without_properties_offers_nothing() {
        assert!(schema_options(&json!({"type": "object"})).is_empty());
    }
}
