//! General application configuration.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct GeneralConfig {
    /// Save without asking for confirmation, as if `--yes` were always passed.
    #[serde(default)]
    pub assume_yes: bool,
}
