use keel_config::KeelConfig;
use keel_schema::{FieldDescriptor, FieldType};
use serde::Serialize;

use crate::cli::{GlobalFlags, OutputFormat, ToolArgs};
use crate::output::output;

#[derive(Debug, Serialize)]
struct FieldRow<'a> {
    key: &'a str,
    #[serde(rename = "type")]
    field_type: FieldType,
    compound: bool,
    description: &'a str,
}

impl<'a> From<&'a FieldDescriptor> for FieldRow<'a> {
    fn from(field: &'a FieldDescriptor) -> Self {
        Self {
            key: &field.key,
            field_type: field.field_type,
            compound: field.compound,
            description: field.description.as_deref().unwrap_or_default(),
        }
    }
}

/// Handle `keel fields <tool>`.
pub async fn handle(
    args: &ToolArgs,
    config: &KeelConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let manager = super::load_session(&args.tool, config).await?;
    let fields = manager.fields();
    match flags.format {
        OutputFormat::Json => output(&fields, flags.format),
        OutputFormat::Table => {
            let rows: Vec<FieldRow<'_>> = fields.iter().map(FieldRow::from).collect();
            output(&rows, flags.format)
        }
    }
}
