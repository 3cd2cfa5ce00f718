//! # keel-schema
//!
//! Schema utilities for the Keel settings editor.
//!
//! Schemas are kept as raw [`serde_json::Value`]s and read through
//! [`SchemaView`], which never fails on keys it does not understand. Only
//! `$ref` and `type` are interpreted structurally; composition keywords and
//! value constraints are ignored.
//!
//! - [`resolver`]: one-hop `$ref` resolution with sibling overrides
//! - [`types`]: the effective type of a field
//! - [`defaults`]: starting values for newly added fields
//! - [`fields`]: field descriptors and "known field" options for a document

pub mod defaults;
pub mod fields;
pub mod resolver;
pub mod types;
pub mod view;

pub use defaults::{default_value, synthetic_schema};
pub use fields::{FieldDescriptor, SchemaOption, available_options, describe_fields, schema_options};
pub use resolver::{property_schema, resolve, resolve_pointer};
pub use types::{FieldType, display_type, effective_type, is_compound_field};
pub use view::SchemaView;
