//! # Weather Sensor RX
//!
//! Receive Bresser 868 MHz weather sensor messages from a radio bridge (or a
//! capture file), decode them and log the readings.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, trace, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use weather_sensor_rx::config::{Config, LoggingConfig};
use weather_sensor_rx::decoder::{sensor_type_name, DecodeStatus, DecoderChain, TracingSink};
use weather_sensor_rx::receiver::{extract_payload, open_source, RxStatus};
use weather_sensor_rx::telemetry::TelemetryLogger;

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Frame counters reported at shutdown
#[derive(Debug, Default)]
struct Stats {
    decoded: u64,
    failed: u64,
    faults: u64,
}

/// Main entry point for the receiver
///
/// # Control Flow
///
/// 1. Load configuration (first argument, or `config/default.toml`)
/// 2. Set up logging and open the packet source
/// 3. Receive, strip the sync word, decode and log each packet
/// 4. Stop on Ctrl+C or when the source is exhausted
///
/// # Errors
///
/// Returns error if the configuration is invalid or the packet source or
/// telemetry log cannot be opened
///
/// # Examples
///
/// ```bash
/// cargo run --release -- config/default.toml
/// ```
#[tokio::main]
async fn main() -> Result<()> {
    let (config, config_path) = load_config()?;
    let _log_guard = init_logging(&config.logging);

    info!("Weather Sensor RX v{} starting...", env!("CARGO_PKG_VERSION"));
    match config_path {
        Some(path) => info!("Configuration loaded from {}", path.display()),
        None => warn!("{} not found, using default configuration", DEFAULT_CONFIG_PATH),
    }

    let chain = DecoderChain::with_families(&config.decoder.enabled);
    let diag = TracingSink::new(config.decoder.log_failures);
    info!("Decoders: {:?}", chain.families());

    let mut source = open_source(&config.receiver)
        .await
        .context("Failed to open packet source")?;

    let mut telemetry = if config.telemetry.enabled {
        let logger = TelemetryLogger::new(&config.telemetry)
            .context("Failed to open telemetry log")?;
        Some(logger)
    } else {
        None
    };

    info!("Listening (press Ctrl+C to exit)");

    let mut stats = Stats::default();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            (status, data) = source.receive(config.receiver.packet_length) => {
                if status == RxStatus::Closed {
                    info!("Packet source closed");
                    break;
                }

                let Some(payload) = accept_packet(&status, &data, config.receiver.sync_word, &mut stats) else {
                    continue;
                };

                match DecodeStatus::of(chain.decode(payload, &diag)) {
                    (_, Some(reading)) => {
                        stats.decoded += 1;
                        info!(
                            family = %reading.family,
                            "[{}] {}",
                            sensor_type_name(reading.sensor_type),
                            reading
                        );

                        if let Some(logger) = telemetry.as_mut() {
                            if let Err(e) = logger.log(&reading) {
                                warn!("Failed to write telemetry: {}", e);
                            }
                        }
                    }
                    (status, None) => {
                        stats.failed += 1;
                        debug!("Decoding failed: {}", status);
                    }
                }
            }

            _ = &mut ctrl_c => {
                info!("Received Ctrl+C, shutting down...");
                break;
            }
        }
    }

    if let Some(mut logger) = telemetry.take() {
        logger.close()?;
    }

    info!(
        "Decoded {} frames, {} failed, {} receive errors",
        stats.decoded, stats.failed, stats.faults
    );
    Ok(())
}

/// Load the configuration named on the command line
///
/// Without an argument the default path is tried; if that file does not
/// exist, built-in defaults are used and `None` is returned as the path.
fn load_config() -> Result<(Config, Option<PathBuf>)> {
    let (path, explicit) = match std::env::args().nth(1) {
        Some(arg) => (PathBuf::from(arg), true),
        None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
    };

    if !explicit && !path.exists() {
        return Ok((Config::default(), None));
    }

    let config = Config::load(&path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    Ok((config, Some(path)))
}

/// Install the tracing subscriber
///
/// `RUST_LOG` overrides the configured level. The returned guard flushes
/// the log file and must be kept alive.
fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    let (file_layer, guard) = if config.file.is_empty() {
        (None, None)
    } else {
        let path = Path::new(&config.file);
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let name = path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "weather-sensor-rx.log".into());

        let appender = tracing_appender::rolling::daily(dir, name);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = fmt::layer().with_writer(writer).with_ansi(false);
        (Some(layer), Some(guard))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .init();

    guard
}

/// Payload of a packet worth decoding
fn accept_packet<'a>(
    status: &RxStatus,
    data: &'a [u8],
    sync_word: u8,
    stats: &mut Stats,
) -> Option<&'a [u8]> {
    match status {
        RxStatus::None => {}
        RxStatus::Timeout => {
            trace!("Receive timeout");
            return None;
        }
        RxStatus::Fault(e) => {
            stats.faults += 1;
            warn!("Receive failed: {}", e);
            return None;
        }
        other => {
            stats.faults += 1;
            match other.decode_status() {
                Some(s) => debug!("Receive: {}", s),
                None => debug!("Receive: {:?} ({} bytes)", other, data.len()),
            }
            return None;
        }
    }

    let payload = extract_payload(status, data, sync_word);
    if payload.is_none() {
        debug!("Sync word mismatch: [{:02X?}]", data.first());
    }
    payload
}
