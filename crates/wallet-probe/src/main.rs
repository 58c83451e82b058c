//! Wallet probe binary.
//!
//! Sends one balance request and prints the JSON body to stdout.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use wallet_probe::{Probe, ProbeConfig};

#[derive(Parser)]
#[command(name = "wallet-probe")]
#[command(version, about = "Probe a wallet service balance endpoint", long_about = None)]
struct Cli {
    /// Wallet service origin (overrides WALLET_PROBE_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// User id to probe (overrides WALLET_PROBE_USER_ID)
    #[arg(short, long)]
    user_id: Option<u64>,

    /// Bearer token (overrides WALLET_PROBE_TOKEN)
    #[arg(long)]
    token: Option<String>,

    /// Request timeout in seconds (overrides WALLET_PROBE_TIMEOUT_SECS)
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Print status and headers along with the body
    #[arg(long)]
    full: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(env_filter(None))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    tracing::debug!(config = ?config, "Probe configuration loaded");

    let response = Probe::new().execute(&config).await?;

    let output = if cli.full {
        serde_json::to_string_pretty(&response)?
    } else {
        serde_json::to_string_pretty(&response.body)?
    };
    println!("{output}");

    Ok(())
}

/// Load `.env` first so `RUST_LOG` may come from it, then build the log filter.
fn env_filter(dotenv_path: Option<&Path>) -> EnvFilter {
    if let Some(path) = dotenv_path {
        dotenvy::from_path(path).ok();
    } else {
        dotenvy::dotenv().ok();
    }

    EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,wallet_probe=debug".into())
}

/// Environment first, flags on top.
fn load_config(cli: &Cli) -> Result<ProbeConfig> {
    let overrides = [
        ("WALLET_PROBE_BASE_URL", cli.base_url.clone()),
        ("WALLET_PROBE_USER_ID", cli.user_id.map(|id| id.to_string())),
        ("WALLET_PROBE_TOKEN", cli.token.clone()),
        ("WALLET_PROBE_TIMEOUT_SECS", cli.timeout_secs.map(|s| s.to_string())),
    ];

    let config = ProbeConfig::from_lookup(|key| {
        overrides
            .iter()
            .find(|(name, _)| *name == key)
            .and_then(|(_, value)| value.clone())
            .or_else(|| std::env::var(key).ok())
    })
    .inspect_err(|e| tracing::error!(kind = e.kind(), error = %e, "Invalid probe configuration"))
    .context("Failed to load probe configuration")?;

    Ok(config)
}
