//! # Telemetry Module
//!
//! Handles logging of decoded readings to JSONL files with rotation.
//!
//! This module handles:
//! - Formatting readings as JSONL (JSON Lines) with a UTC timestamp
//! - Writing to rotating log files (max N records per file)
//! - Retaining only the last M files

pub mod logger;
pub mod types;

pub use logger::TelemetryLogger;
pub use types::TelemetryRecord;
