pub mod config_schema;
pub mod edit;
pub mod fields;
pub mod options;
pub mod tools;

use anyhow::Context;
use keel_config::KeelConfig;
use keel_draft::DraftManager;

use crate::cli::{Commands, GlobalFlags};
use crate::session;
use crate::store::FileSettings;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(
    command: Commands,
    config: &KeelConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match command {
        Commands::Tools => tools::handle(config, flags),
        Commands::Fields(args) => fields::handle(&args, config, flags).await,
        Commands::Options(args) => options::handle(&args, config, flags).await,
        Commands::Edit(args) => edit::handle(&args, config, flags).await,
        Commands::ConfigSchema => config_schema::handle(),
    }
}

/// Open and load the session for `tool`.
async fn load_session(
    tool: &str,
    config: &KeelConfig,
) -> anyhow::Result<DraftManager<FileSettings>> {
    let profile = config.tool(tool)?;
    let mut manager = session::open(tool, profile);
    manager
        .load(false)
        .await
        .with_context(|| format!("failed to load settings for '{tool}'"))?;
    Ok(manager)
}
