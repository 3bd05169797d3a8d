use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use futarchy_tvl::app::{self, AppCfg};
use futarchy_tvl::config::Config;
use futarchy_tvl::Adapter;

#[derive(Parser, Debug)]
#[command(version, about = "TVL snapshots for the Futarchy AMM and Futarchy DAO treasuries on Solana")]
struct Args {
    /// Path to config file (optional)
    #[arg(long)]
    config: Option<PathBuf>,

    /// RPC endpoint URL (overrides config)
    #[arg(long)]
    rpc_url: Option<String>,

    /// Write the JSON report here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// Futarchy AMM base and quote vault balances
    Amm,
    /// Futarchy DAO treasuries and DAO-owned LP positions
    Treasuries,
    /// Both adapters
    All,
}

impl From<Command> for Adapter {
    fn from(command: Command) -> Self {
        match command {
            Command::Amm => Adapter::Amm,
            Command::Treasuries => Adapter::Treasuries,
            Command::All => Adapter::All,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    // Priority: CLI args > Config file > Defaults
    let cfg = match &args.config {
        Some(path) => Config::from_file(path).with_context(|| format!("Failed to load {}", path.display()))?,
        None => Config::default(),
    };

    let mut app_cfg = AppCfg::from_config(cfg).context("Invalid configuration")?;
    if let Some(rpc_url) = args.rpc_url {
        app_cfg.rpc_url = rpc_url;
    }
    app_cfg.output = args.output;

    app::run(app_cfg, args.command.into()).await?;
    Ok(())
}
