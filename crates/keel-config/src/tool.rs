//! Per-tool document locations.

use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

fn default_token_field() -> String {
    "TOKEN".to_string()
}

/// Where one tool keeps its settings and auxiliary documents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct ToolProfile {
    /// Primary settings document (`.json` or `.toml`).
    #[serde(default)]
    pub settings: String,

    /// JSON Schema for the settings. Defaults to `<stem>-schema.json` next to
    /// the settings file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Free-form key/value JSON document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<EnvConfig>,
}

/// Single-secret file, such as an API token.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct AuthConfig {
    pub path: String,

    /// Name shown for the secret in diffs (`auth.<field>`).
    #[serde(default = "default_token_field")]
    pub field: String,
}

/// Dotenv-style file restricted to a fixed set of variables.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct EnvConfig {
    pub path: String,

    #[serde(default)]
    pub fields: Vec<String>,
}

impl ToolProfile {
    pub fn settings_path(&self) -> PathBuf {
        expand_path(&self.settings)
    }

    pub fn schema_path(&self) -> PathBuf {
        if let Some(schema) = &self.schema {
            return expand_path(schema);
        }
        let settings = self.settings_path();
        let stem = settings
            .file_stem()
            .map_or_else(|| "settings".into(), |stem| stem.to_string_lossy());
        settings.with_file_name(format!("{stem}-schema.json"))
    }

    pub fn extra_path(&self) -> Option<PathBuf> {
        self.extra.as_deref().map(expand_path)
    }

    /// Check the profile of tool `name` for values that cannot work.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidValue`] naming the offending field.
    pub fn validate(&self, name: &str) -> Result<(), ConfigError> {
        let invalid = |field: &str, reason: &str| ConfigError::InvalidValue {
            field: format!("tools.{name}.{field}"),
            reason: reason.to_string(),
        };
        if self.settings.trim().is_empty() {
            return Err(invalid("settings", "a settings path is required"));
        }
        if let Some(auth) = &self.auth {
            if auth.path.trim().is_empty() {
                return Err(invalid("auth.path", "must not be empty"));
            }
            if auth.field.trim().is_empty() {
                return Err(invalid("auth.field", "must not be empty"));
            }
        }
        if let Some(env) = &self.env {
            if env.path.trim().is_empty() {
                return Err(invalid("env.path", "must not be empty"));
            }
            for (index, field) in env.fields.iter().enumerate() {
                if field.trim().is_empty() {
                    return Err(invalid("env.fields", "field names must not be empty"));
                }
                if env.fields[..index].contains(field) {
                    return Err(invalid("env.fields", &format!("'{field}' is listed twice")));
                }
            }
        }
        Ok(())
    }
}

impl AuthConfig {
    pub fn path(&self) -> PathBuf {
        expand_path(&self.path)
    }
}

impl EnvConfig {
    pub fn path(&self) -> PathBuf {
        expand_path(&self.path)
    }
}

/// Expand a leading `~` to the home directory.
pub fn expand_path(raw: &str) -> PathBuf {
    let home = || dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    match raw.strip_prefix('~') {
        Some("") => home(),
        Some(rest) if rest.starts_with('/') || rest.starts_with('\\') => home().join(&rest[1..]),
        _ => Path::new(raw).to_path_buf(),
    }
}
