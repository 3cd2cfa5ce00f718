use keel_config::{KeelConfig, ToolProfile};
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::output::output;
use crate::session::{AUTH_DOCUMENT, ENV_DOCUMENT, EXTRA_DOCUMENT};

#[derive(Debug, Serialize)]
struct ToolRow {
    name: String,
    settings: String,
    schema: String,
    side_channels: Vec<&'static str>,
}

fn row(name: &str, profile: &ToolProfile) -> ToolRow {
    let side_channels = [
        profile.auth.is_some().then_some(AUTH_DOCUMENT),
        profile.extra.is_some().then_some(EXTRA_DOCUMENT),
        profile.env.is_some().then_some(ENV_DOCUMENT),
    ]
    .into_iter()
    .flatten()
    .collect();
    ToolRow {
        name: name.to_string(),
        settings: profile.settings_path().display().to_string(),
        schema: profile.schema_path().display().to_string(),
        side_channels,
    }
}

/// Handle `keel tools`.
pub fn handle(config: &KeelConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    let rows: Vec<ToolRow> = config
        .tools
        .iter()
        .map(|(name, profile)| row(name, profile))
        .collect();
    output(&rows, flags.format)
}

#[cfg(test)]
mod tests {
    use keel_config::{AuthConfig, ToolProfile};
    use pretty_assertions::assert_eq;

    use super::row;

    #[test]
    fn rows_list_configured_side_channels() {
        let profile = ToolProfile {
            settings: "/etc/t/settings.json".into(),
            extra: Some("/etc/t/extra.json".into()),
            auth: Some(AuthConfig {
                path: "/etc/t/auth".into(),
                field: "TOKEN".into(),
            }),
            ..ToolProfile::default()
        };
        let row = row("t", &profile);
        assert_eq!(row.side_channels, vec!["auth", "extra"]);
        assert_eq!(row.schema, "/etc/t/settings-schema.json");
    }
}
