mod http;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use http::HttpStoreGateway;
use roadsense_core::{
    BatchSink, NullBroadcaster, RetryPolicy, SensorSession, StreamPipeline, DEFAULT_BATCH_SIZE,
};
use roadsense_parser::FrameReader;
use tracing::{info, Level};

/// Replays vehicle sensor files through the road-state pipeline and ships
/// classified batches to the store service.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Accelerometer CSV (header, then x,y,z per line).
    #[arg(long)]
    accelerometer: PathBuf,

    /// GPS CSV (header, then latitude,longitude per line).
    #[arg(long)]
    gps: PathBuf,

    /// Parking CSV (header, then empty_count,latitude,longitude per line).
    #[arg(long)]
    parking: PathBuf,

    /// Base URL of the store service; falls back to ROADSENSE_API_URL.
    #[arg(long)]
    api_url: Option<String>,

    /// Records per batch.
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Milliseconds to sleep between ticks, for live-paced replay.
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Store attempts per batch before the session faults.
    #[arg(long, default_value_t = 3)]
    retry_attempts: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let api_url = cli
        .api_url
        .or_else(|| std::env::var("ROADSENSE_API_URL").ok())
        .unwrap_or_else(|| "http://localhost:8000".to_string());

    let reader = FrameReader::open(&cli.accelerometer, &cli.gps, &cli.parking)
        .context("failed to open sensor sources")?;

    let retry = RetryPolicy {
        max_attempts: cli.retry_attempts.max(1),
        ..RetryPolicy::default()
    };
    // Live fan-out happens on the store service side, after it persists.
    let sink = BatchSink::new(HttpStoreGateway::new(&api_url), NullBroadcaster, retry);

    let mut session = SensorSession::new(reader, StreamPipeline::new(cli.batch_size), sink);
    if let Some(ms) = cli.interval_ms {
        session = session.with_tick_interval(Duration::from_millis(ms));
    }

    let summary = session.run().await?;
    info!(
        frames = summary.frames,
        batches = summary.batches,
        "agent session finished"
    );

    Ok(())
}
