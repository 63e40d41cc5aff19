//! ETF/futures market maker - event replay entry point.

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Parser;
use rtg_bot::{spawn_reader, AppConfig, Application, LoggingGateway};
use rtg_telemetry::Metrics;
use tokio::sync::mpsc;
use tracing::info;

/// ETF/futures market maker
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via RTG_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,

    /// JSON-lines event file (overrides replay.events_path)
    #[arg(short, long)]
    events: Option<String>,

    /// Print Prometheus metrics after the session
    #[arg(long)]
    metrics: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    rtg_telemetry::init_logging()?;

    info!("Starting rtg-bot v{}", env!("CARGO_PKG_VERSION"));

    // CLI arg > RTG_CONFIG env var > default
    let config_path = args
        .config
        .or_else(|| std::env::var("RTG_CONFIG").ok())
        .unwrap_or_else(|| "config/default.toml".to_string());

    info!(config_path = %config_path, "Loading configuration");
    let config = AppConfig::from_file(&config_path)?;

    let events_path = args
        .events
        .or_else(|| config.replay.events_path.clone())
        .ok_or_else(|| anyhow!("No event file: pass --events or set replay.events_path"))?;

    let (tx, rx) = mpsc::channel(config.replay.channel_capacity);
    let reader = spawn_reader(PathBuf::from(&events_path), tx);

    let app = Application::new(config, LoggingGateway::new())?;
    let summary = app.run(rx).await?;
    let report = reader.await??;

    info!(
        events = report.events,
        decode_errors = report.decode_errors,
        "Replay finished"
    );
    println!("{}", serde_json::to_string_pretty(&summary)?);

    if args.metrics {
        println!("{}", Metrics::encode_text()?);
    }

    Ok(())
}
