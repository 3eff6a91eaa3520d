use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ammarb::application::{Cli, CommandExecutor};
use ammarb::shared::config::ConfigLoader;

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    let cli = Cli::parse();

    let config = ConfigLoader::load(&cli.config)
        .with_context(|| format!("loading pool config from {}", cli.config))?;

    CommandExecutor::execute(cli.command, config).await?;

    Ok(())
}
