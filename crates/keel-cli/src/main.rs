use anyhow::Context;
use clap::Parser;
use keel_config::KeelConfig;

mod cli;
mod commands;
mod output;
mod session;
mod store;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("keel error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;
    let flags = cli.global_flags();

    if matches!(cli.command, cli::Commands::ConfigSchema) {
        return commands::config_schema::handle();
    }

    let config = KeelConfig::load_with_dotenv().context("failed to load keel configuration")?;
    tracing::debug!(tools = config.tools.len(), "configuration loaded");

    commands::dispatch(cli.command, &config, &flags).await
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("KEEL_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
