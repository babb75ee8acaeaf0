mod app;
mod config;
mod report;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use routeswap::application::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let cli = Cli::parse();

    // Priority: CLI args > Config file > Defaults
    let cfg = config::Config::from_file(&cli.config)?;
    let simulate_only = matches!(cli.command, Commands::Swap { simulate_only: true, .. });
    let mut app_cfg = app::AppCfg::from_config(cfg, simulate_only)?;

    if let Some(rpc_url) = cli.rpc_url {
        app_cfg.rpc_url = rpc_url;
    }
    if let Some(amount) = cli.command.amount_override() {
        app_cfg.amount = amount.to_string();
    }

    app::run(app_cfg, cli.command).await
}
