//! Auxiliary documents edited and saved alongside the primary settings.
//!
//! Side channels are schema-less. Each keeps its own original/draft pair and
//! joins the save pipeline only through [`SideChannel`].

mod env;
mod free_form;
mod secret;

use std::any::Any;

use async_trait::async_trait;
use keel_core::DiffEntry;
use serde_json::Value;

use crate::error::DraftError;

pub use env::EnvChannel;
pub use free_form::{FreeFormChannel, FreeFormEntry};
pub use secret::SecretChannel;

/// One auxiliary document in an editing session.
///
/// The manager drives `load`, `compute_diffs`, `reset`, and `is_dirty` while
/// diffing, then `save` and `mark_saved` once the user confirms. A failed
/// joint load calls `unload` on every channel.
#[async_trait]
pub trait SideChannel: Send + Sync {
    /// Document name; also the first segment of every diff path it emits.
    fn name(&self) -> &str;

    /// Fetch the persisted document, replacing both original and draft.
    /// Returns the loaded document as JSON.
    async fn load(&mut self) -> Result<Value, DraftError>;

    /// Entries describing how the draft differs from the original.
    fn compute_diffs(&self) -> Result<Vec<DiffEntry>, DraftError>;

    /// Discard edits.
    fn reset(&mut self);

    /// Forget both original and draft, as before the first load.
    fn unload(&mut self);

    fn is_dirty(&self) -> bool;

    /// Persist the draft. The original is left alone until [`Self::mark_saved`].
    async fn save(&self) -> Result<(), DraftError>;

    /// Accept the draft as the new original.
    fn mark_saved(&mut self);

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Whether free-form text should be read as JSON rather than stored verbatim.
///
/// Only the first character is inspected, so `42 apples` counts as JSON and
/// fails to parse.
#[must_use]
pub fn looks_like_json(text: &str) -> bool {
    let text = text.trim();
    matches!(text, "true" | "false" | "null")
        || text
            .chars()
            .next()
            .is_some_and(|first| matches!(first, '{' | '[' | '"' | '-') || first.is_ascii_digit())
}

/// Interpret a free-form value.
///
/// # Errors
///
/// Returns the parser error when the text looks like JSON but is not.
pub fn parse_text_value(text: &str) -> Result<Value, serde_json::Error> {
    if looks_like_json(text) {
        serde_json::from_str(text.trim())
    } else {
        Ok(Value::String(text.to_string()))
    }
}

/// Render a stored value as editable text; the inverse of [`parse_text_value`].
///
/// Strings come back verbatim unless they would be misread as JSON, in which
/// case they are quoted.
#[must_use]
pub fn render_text_value(value: &Value) -> String {
    match value {
        Value::String(text) if !looks_like_json(text) => text.clone(),
        other => other.to_string(),
    }
}
