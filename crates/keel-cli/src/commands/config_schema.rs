use keel_config::KeelConfig;

/// Handle `keel config-schema`.
pub fn handle() -> anyhow::Result<()> {
    let schema = serde_json::to_string_pretty(&KeelConfig::json_schema())?;
    println!("{schema}");
    Ok(())
}
