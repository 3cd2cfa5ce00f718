//! # keel-core
//!
//! Structural primitives shared by every Keel crate:
//! - [`JsonPath`]: dotted/bracketed addressing into a JSON tree
//! - [`json_equal`]: the one notion of JSON equality used across the workspace
//! - [`diff`]: coarsest-first structural diff between an original and a draft
//! - [`apply`]: replaying diff entries onto a base value
//!
//! JSON values are plain [`serde_json::Value`]s. Nothing here performs I/O.

pub mod apply;
pub mod diff;
pub mod equal;
pub mod error;
pub mod path;

pub use apply::{apply, remove_at, set_at, value_at};
pub use diff::{Change, DiffEntry, DiffKind, diff, diff_at, diff_text};
pub use equal::{json_equal, json_map_equal};
pub use error::CoreError;
pub use path::{JsonPath, PathSegment, ROOT_MARKER};
