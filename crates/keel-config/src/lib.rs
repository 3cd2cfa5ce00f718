//! # keel-config
//!
//! Layered configuration loading for Keel using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`KEEL_*` prefix, `__` as separator)
//! 2. Project-level `.keel/config.toml`
//! 3. User-level `~/.config/keel/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `KEEL_GENERAL__ASSUME_YES` -> `general.assume_yes` and
//! `KEEL_TOOLS__MYTOOL__SETTINGS` -> `tools.mytool.settings`.
//!
//! # Usage
//!
//! ```no_run
//! use keel_config::KeelConfig;
//!
//! let config = KeelConfig::load_with_dotenv().expect("config");
//! for (name, tool) in &config.tools {
//!     println!("{name}: {}", tool.settings_path().display());
//! }
//! ```

mod error;
mod general;
mod tool;

pub use error::ConfigError;
pub use general::GeneralConfig;
pub use tool::{AuthConfig, EnvConfig, ToolProfile, expand_path};

use std::collections::BTreeMap;
use std::path::PathBuf;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use schemars::{JsonSchema, Schema, schema_for};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct KeelConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    /// Editable tools, keyed by the name used on the command line.
    #[serde(default)]
    pub tools: BTreeMap<String, ToolProfile>,
}

impl KeelConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env` loading.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Figment`] when a source is malformed.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// Load configuration after reading `.env` from the current directory.
    ///
    /// # Errors
    ///
    /// See [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        if let Err(error) = dotenvy::dotenv() {
            if !error.not_found() {
                return Err(ConfigError::InvalidValue {
                    field: ".env".to_string(),
                    reason: error.to_string(),
                });
            }
        }
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment directly or add providers on top.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(".keel/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("KEEL_").split("__"))
    }

    /// Path to the user-global config file.
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("keel").join("config.toml"))
    }

    /// Look up and validate the profile for `name`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::UnknownTool`] or the profile's validation error.
    pub fn tool(&self, name: &str) -> Result<&ToolProfile, ConfigError> {
        let profile = self.tools.get(name).ok_or_else(|| ConfigError::UnknownTool {
            name: name.to_string(),
            known: if self.tools.is_empty() {
                "none".to_string()
            } else {
                self.tools.keys().cloned().collect::<Vec<_>>().join(", ")
            },
        })?;
        profile.validate(name)?;
        Ok(profile)
    }

    /// JSON Schema describing this configuration file.
    pub fn json_schema() -> Schema {
        schema_for!(Self)
    }
}
