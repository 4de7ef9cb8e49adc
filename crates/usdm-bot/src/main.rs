//! Signal execution bot - entry point.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use usdm_bot::{Application, BotConfig};

/// Signal execution bot for Binance USDM futures
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via USDM_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Execute stored signals by id
    Process {
        /// Signal ids to process
        #[arg(required = true)]
        ids: Vec<i64>,
    },
    /// Delete signals past their validity window
    SweepExpired,
    /// Force-refresh the cached symbol trading rules
    RefreshRules,
    /// List signals with their recorded order attempts
    Signals,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    usdm_bot::init_logging();

    info!("Starting usdm-bot v{}", env!("CARGO_PKG_VERSION"));

    let config_path = args
        .config
        .or_else(|| std::env::var("USDM_CONFIG").ok())
        .unwrap_or_else(|| "config/default.toml".to_string());

    info!(config_path = %config_path, "Loading configuration");
    let config = BotConfig::load(&config_path)?;
    info!(base_url = %config.base_url, database = %config.database, "Configuration loaded");

    let app = Application::new(config).await?;

    match args.command {
        Command::Process { ids } => {
            app.process(&ids).await;
        }
        Command::SweepExpired => {
            let deleted = app.sweep_expired().await?;
            println!("Deleted {deleted} expired signal(s)");
        }
        Command::RefreshRules => {
            let snapshot = app.refresh_rules().await?;
            let mut symbols: Vec<_> = snapshot.rules.iter().collect();
            symbols.sort_by_key(|(symbol, _)| symbol.to_string());
            for (symbol, rule) in symbols {
                println!(
                    "{symbol:<14} price_step={:<12} quantity_step={}",
                    rule.price_step, rule.quantity_step
                );
            }
            println!("Refreshed trading rules for {} symbol(s)", snapshot.rules.len());
        }
        Command::Signals => {
            for listing in app.list_signals().await? {
                let attempt = match &listing.attempt {
                    Some(attempt) => format!("{}", attempt.status),
                    None => "-".to_string(),
                };
                println!(
                    "#{:<5} {:<12} {:<12} {:<5} {:<11} {:>14.4}  {}",
                    listing.signal.id,
                    listing.account.name,
                    listing.signal.symbol,
                    listing.signal.side,
                    listing.signal.intent,
                    listing.signal.price,
                    attempt,
                );
            }
        }
    }

    Ok(())
}
