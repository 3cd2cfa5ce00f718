use keel_config::KeelConfig;
use keel_schema::FieldType;
use serde::Serialize;

use crate::cli::{GlobalFlags, OutputFormat, ToolArgs};
use crate::output::output;

#[derive(Debug, Serialize)]
struct OptionRow<'a> {
    key: &'a str,
    #[serde(rename = "type")]
    field_type: FieldType,
    description: &'a str,
}

/// Handle `keel options <tool>`.
pub async fn handle(
    args: &ToolArgs,
    config: &KeelConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let manager = super::load_session(&args.tool, config).await?;
    let options = manager.available_options();
    match flags.format {
        OutputFormat::Json => output(&options, flags.format),
        OutputFormat::Table => {
            let rows: Vec<OptionRow<'_>> = options
                .iter()
                .map(|option| OptionRow {
                    key: &option.key,
                    field_type: option.field_type,
                    description: option.description.as_deref().unwrap_or_default(),
                })
                .collect();
            output(&rows, flags.format)
        }
    }
}
