//! One-shot signal generation from the command line.
//!
//! Runs the same pipeline as `GET /api/signals` and prints each signal.

use anyhow::{bail, Result};
use clap::Parser;
use signalcast::api::signals::SignalsQuery;
use signalcast::config::Config;
use signalcast::services::ReplayOrchestrator;
use signalcast::sources::{DeepSeekClient, KrakenClient};
use signalcast::types::SignalRecord;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "signal", about = "Generate trading signals from Kraken candles")]
struct Cli {
    /// Trading pair or short symbol (e.g., XBTUSD, btc). Defaults to DEFAULT_SYMBOL.
    #[arg(long)]
    symbol: Option<String>,

    /// Candle interval in minutes. Defaults to DEFAULT_INTERVAL.
    #[arg(long)]
    interval: Option<u32>,

    /// ISO-8601 date to replay signals from (e.g., 2024-01-15T12:00:00Z).
    #[arg(long)]
    date: Option<String>,

    /// Print the raw JSON response instead of a summary.
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "signalcast=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    if config.deepseek.api_key.is_none() {
        bail!("DEEPSEEK_API_KEY is not set");
    }

    let request = SignalsQuery {
        symbol: cli.symbol,
        interval: cli.interval.map(|i| i.to_string()),
        date: cli.date,
    }
    .into_request(&config.default_symbol, config.default_interval)?;

    let timeout = Duration::from_secs(config.http_timeout_secs);
    let orchestrator = ReplayOrchestrator::new(
        Arc::new(KrakenClient::new(
            config.kraken_api_url.clone(),
            config.kraken_api_key.clone(),
            timeout,
        )),
        Arc::new(DeepSeekClient::new(config.deepseek.clone(), timeout)),
    );

    let response = orchestrator.get_signals(&request).await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    println!(
        "{} @ {}m: {} candles, {} signal(s)",
        response.symbol,
        response.interval,
        response.total_candles,
        response.signals.len()
    );
    for record in &response.signals {
        print_record(record);
    }

    Ok(())
}

fn print_record(record: &SignalRecord) {
    let rec = &record.recommendation;
    let fmt = |v: Option<f64>| v.map_or_else(|| "N/A".to_string(), |v| format!("{:.2}", v));

    println!("{}", "=".repeat(50));
    println!("{}  {}", record.derived_datetime, rec.signal);
    println!("{}", "=".repeat(50));
    println!("Price:        {:.2}", record.price);
    println!("Stop Price:   {}", fmt(rec.stop_price));
    println!("Target Price: {}", fmt(rec.target_price));
    println!("Confidence:   {}%", fmt(rec.confidence));
    println!("Timeframe:    {}", rec.timeframe.as_deref().unwrap_or("N/A"));
    println!("\nReasoning: {}\n", rec.reasoning);
}
