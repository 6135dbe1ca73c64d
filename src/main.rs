//! qr-intake - QR scan station for structured intake labels
//!
//! Decodes QR payloads from a frame stream, extracts the label fields,
//! deduplicates repeated scans and appends each unique record to a CSV
//! store while emitting render annotations.
//!
//! Module structure:
//! - `domain/` - Core scan types (RawDetection, ParsedRecord, Annotation)
//! - `io/` - External interfaces (capture traits, replay source, CSV sink)
//! - `services/` - Scan logic (parser, dedupe, pipeline, loop driver)
//! - `infra/` - Infrastructure (Config)

use anyhow::Context;
use clap::Parser;
use qr_intake::infra::Config;
use qr_intake::io::{LogDisplay, RecordSink, ReplayDecoder, ReplayFrameSource};
use qr_intake::services::{PayloadParser, ScanPipeline, ScanRunner};
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;

/// qr-intake - QR label scan and record extraction station
#[derive(Parser, Debug)]
#[command(name = "qr-intake", version, about)]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "config/dev.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging with configurable level via RUST_LOG env var
    // Default: INFO, use RUST_LOG=debug for per-detection visibility
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(UtcTime::rfc_3339())
        .with_target(false)
        .init();

    info!("qr-intake starting");

    let args = Args::parse();
    let config = Config::load_from_path(&args.config);

    info!(
        config_file = %config.config_file(),
        station = %config.station_id(),
        convention = ?config.payload_convention(),
        replay_file = %config.replay_file(),
        sink_file = %config.sink_file(),
        max_frames = %config.max_frames(),
        "config_loaded"
    );

    // Header written once; an existing store is appended to, never rewritten
    let sink = RecordSink::new(config.sink_file());
    sink.ensure_initialized()
        .with_context(|| format!("failed to initialize record sink {}", config.sink_file()))?;

    let parser = PayloadParser::new(config.payload_convention());
    let pipeline = ScanPipeline::new(parser, sink);

    // A failed open is the one startup error with a non-zero exit contract
    let source = ReplayFrameSource::open(config.replay_file())
        .with_context(|| format!("failed to open frame source {}", config.replay_file()))?;

    // Create shutdown signal
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Handle shutdown on Ctrl+C
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("shutdown_signal_received");
        let _ = shutdown_tx.send(true);
    });

    let runner = ScanRunner::new(
        source,
        ReplayDecoder::new(),
        LogDisplay::new(),
        pipeline,
        shutdown_rx,
        config.max_frames(),
    );

    // The loop is synchronous and frame-driven; run it on a blocking task
    let outcome = tokio::task::spawn_blocking(move || runner.run())
        .await
        .context("scan loop task failed")?;

    info!(frames = outcome.frames, reason = ?outcome.reason, "qr-intake shutdown complete");
    Ok(())
}
