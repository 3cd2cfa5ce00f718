//! Effective field types.
//!
//! A schema-declared type always wins. Without one the type is inferred from
//! the current value. Every "is this compound" decision in the workspace goes
//! through [`is_compound_field`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::view::SchemaView;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Integer,
    Boolean,
    Object,
    Array,
    Null,
}

impl FieldType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
            Self::Null => "null",
        }
    }

    #[must_use]
    pub const fn is_compound(self) -> bool {
        matches!(self, Self::Object | Self::Array)
    }

    /// Runtime shape of a value. `null` carries no usable type.
    #[must_use]
    pub const fn of_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(_) => Some(Self::Boolean),
            Value::Number(_) => Some(Self::Number),
            Value::String(_) => Some(Self::String),
            Value::Array(_) => Some(Self::Array),
            Value::Object(_) => Some(Self::Object),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown type name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFieldType(pub String);

impl fmt::Display for UnknownFieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown field type '{}'", self.0)
    }
}

impl std::error::Error for UnknownFieldType {}

impl FromStr for FieldType {
    type Err = UnknownFieldType;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_ascii_lowercase().as_str() {
            "string" => Ok(Self::String),
            "number" => Ok(Self::Number),
            "integer" => Ok(Self::Integer),
            "boolean" | "bool" => Ok(Self::Boolean),
            "object" => Ok(Self::Object),
            "array" => Ok(Self::Array),
            "null" => Ok(Self::Null),
            _ => Err(UnknownFieldType(name.to_string())),
        }
    }
}

/// Schema-declared type if understood, else the value's runtime type.
#[must_use]
pub fn effective_type(schema: Option<&Value>, value: Option<&Value>) -> Option<FieldType> {
    schema
        .and_then(|node| SchemaView::new(node).type_name())
        .and_then(|name| name.parse::<FieldType>().ok())
        .or_else(|| value.and_then(FieldType::of_value))
}

/// Type used for display and editing; unknown falls back to string.
#[must_use]
pub fn display_type(schema: Option<&Value>, value: Option<&Value>) -> FieldType {
    effective_type(schema, value).unwrap_or(FieldType::String)
}

/// Compound fields (objects, arrays) get a nested editor; scalars edit inline.
#[must_use]
pub fn is_compound_field(schema: Option<&Value>, value: Option<&Value>) -> bool {
    effective_type(schema, value).is_some_and(FieldType::is_compound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn declared_type_wins_over_value() {
        let schema = json!({"type": "integer"});
        assert_eq!(
            effective_type(Some(&schema), Some(&json!("text"))),
            Some(FieldType::Integer)
        );
    }

    #[test]
    fn first_of_type_array_is_used() {
        let schema = json!({"type": ["array", "null"]});
        assert_eq!(effective_type(Some(&schema), None), Some(FieldType::Array));
    }

    #[rstest]
    #[case(json!([1]), Some(FieldType::Array))]
    #[case(json!({"a": 1}), Some(FieldType::Object))]
    #[case(json!(true), Some(FieldType::Boolean))]
    #[case(json!(1.5), Some(FieldType::Number))]
    #[case(json!("s"), Some(FieldType::String))]
    #[case(json!(null), None)]
    fn inferred_from_value(#[case] value: Value, #[case] expected: Option<FieldType>) {
        assert_eq!(effective_type(None, Some(&value)), expected);
    }

    #[test]
    fn unrecognised_declared_type_falls_back_to_value() {
        let schema = json!({"type": "widget"});
        assert_eq!(
            effective_type(Some(&schema), Some(&json!([]))),
            Some(FieldType::Array)
        );
    }

    #[test]
    fn display_defaults_to_string() {
        assert_eq!(display_type(None, None), FieldType::String);
        assert_eq!(display_type(None, Some(&json!(null))), FieldType::String);
    }

    #[rstest]
    #[case(Some(json!({"type": "object"})), None, true)]
    #[case(None, Some(json!([])), true)]
    #[case(Some(json!({"type": "string"})), Some(json!({})), false)]
    #[case(None, None, false)]
    #[case(None, Some(json!(null)), false)]
    fn compound_classification(
        #[case] schema: Option<Value>,
        #[case] value: Option<Value>,
        #[case] expected: bool,
    ) {
        assert_eq!(is_compound_field(schema.as_ref(), value.as_ref()), expected);
    }

    #[test]
    fn type_names_parse() {
        assert_eq!("Boolean".parse::<FieldType>(), Ok(FieldType::Boolean));
        assert_eq!("bool".parse::<FieldType>(), Ok(FieldType::Boolean));
        assert!("widget".parse::<FieldType>().is_err());
    }
}
