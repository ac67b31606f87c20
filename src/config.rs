//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! Every section and field is optional; missing values take the defaults
//! below, so an empty file yields [`Config::default()`].

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::decoder::protocol::{SensorFamily, SYNC_WORD};
use crate::error::{Result, RxError};

/// Smallest receive length: sync byte plus the shortest payload (leakage)
pub const MIN_PACKET_LENGTH: usize = 9;

/// Largest receive length, matching the radio FIFO size
pub const MAX_PACKET_LENGTH: usize = 64;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub receiver: ReceiverConfig,
    pub decoder: DecoderConfig,
    pub telemetry: TelemetryConfig,
    pub logging: LoggingConfig,
}

/// Where received packets come from
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Radio bridge on a serial port
    #[default]
    Serial,
    /// Captured frames from a hex text file
    Replay,
}

/// Receiver configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ReceiverConfig {
    pub source: SourceKind,

    #[serde(default = "default_serial_port")]
    pub port: String,

    /// Ports tried in order when `port` cannot be opened
    pub fallback_ports: Vec<String>,

    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Bytes requested per receive, sync byte included
    #[serde(default = "default_packet_length")]
    pub packet_length: usize,

    #[serde(default = "default_sync_word")]
    pub sync_word: u8,

    pub replay_file: PathBuf,
}

/// Decoder chain configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DecoderConfig {
    /// Enabled frame families; dispatch order is fixed regardless of list order
    #[serde(default = "default_enabled_decoders")]
    pub enabled: Vec<SensorFamily>,

    /// Report per-decoder rejections at debug level
    pub log_failures: bool,
}

/// Telemetry configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TelemetryConfig {
    #[serde(default = "default_telemetry_enabled")]
    pub enabled: bool,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default = "default_max_records_per_file")]
    pub max_records_per_file: usize,

    #[serde(default = "default_max_files_to_keep")]
    pub max_files_to_keep: usize,
}

/// Application log configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Daily-rolling log file; empty logs to stderr only
    pub file: String,
}

// Default value functions
fn default_serial_port() -> String { "/dev/ttyUSB0".to_string() }
fn default_baud_rate() -> u32 { 115200 }
fn default_timeout_ms() -> u64 { 500 }
fn default_packet_length() -> usize { 27 }
fn default_sync_word() -> u8 { SYNC_WORD }

fn default_enabled_decoders() -> Vec<SensorFamily> { SensorFamily::PRIORITY.to_vec() }

fn default_telemetry_enabled() -> bool { true }
fn default_log_dir() -> String { "./logs".to_string() }
fn default_max_records_per_file() -> usize { 10000 }
fn default_max_files_to_keep() -> usize { 10 }

fn default_log_level() -> String { "info".to_string() }

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            source: SourceKind::default(),
            port: default_serial_port(),
            fallback_ports: Vec::new(),
            baud_rate: default_baud_rate(),
            timeout_ms: default_timeout_ms(),
            packet_length: default_packet_length(),
            sync_word: default_sync_word(),
            replay_file: PathBuf::new(),
        }
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled_decoders(),
            log_failures: false,
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: default_telemetry_enabled(),
            log_dir: default_log_dir(),
            max_records_per_file: default_max_records_per_file(),
            max_files_to_keep: default_max_files_to_keep(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: String::new(),
        }
    }
}

fn invalid(message: impl std::fmt::Display) -> RxError {
    RxError::Config(toml::de::Error::custom(message))
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use weather_sensor_rx::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        let rx = &self.receiver;

        if rx.source == SourceKind::Serial && rx.port.is_empty() {
            return Err(invalid("serial port cannot be empty"));
        }

        if rx.fallback_ports.iter().any(|p| p.is_empty()) {
            return Err(invalid("fallback_ports cannot contain an empty path"));
        }

        if rx.source == SourceKind::Replay && rx.replay_file.as_os_str().is_empty() {
            return Err(invalid("replay_file is required when source is 'replay'"));
        }

        if rx.baud_rate == 0 {
            return Err(invalid("baud_rate must be greater than 0"));
        }

        if rx.timeout_ms == 0 || rx.timeout_ms > 10000 {
            return Err(invalid("timeout_ms must be between 1 and 10000"));
        }

        if !(MIN_PACKET_LENGTH..=MAX_PACKET_LENGTH).contains(&rx.packet_length) {
            return Err(invalid(format!(
                "packet_length must be between {} and {}",
                MIN_PACKET_LENGTH, MAX_PACKET_LENGTH
            )));
        }

        if self.decoder.enabled.is_empty() {
            return Err(invalid("at least one decoder must be enabled"));
        }

        for (i, family) in self.decoder.enabled.iter().enumerate() {
            if self.decoder.enabled[..i].contains(family) {
                return Err(invalid(format!("decoder '{}' is listed more than once", family)));
            }
        }

        if self.telemetry.enabled && self.telemetry.log_dir.is_empty() {
            return Err(invalid("telemetry log_dir cannot be empty when enabled"));
        }

        if self.telemetry.max_records_per_file == 0 {
            return Err(invalid("max_records_per_file must be greater than 0"));
        }

        if self.telemetry.max_files_to_keep == 0 {
            return Err(invalid("max_files_to_keep must be greater than 0"));
        }

        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(invalid(format!(
                "logging level must be one of: {}",
                LOG_LEVELS.join(", ")
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn assert_rejected(config: &Config, fragment: &str) {
        match config.validate() {
            Err(RxError::Config(e)) => assert!(
                e.to_string().contains(fragment),
                "'{}' does not mention '{}'",
                e,
                fragment
            ),
            other => panic!("Expected Config error, got: {:?}", other),
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.validate().is_ok());
        assert_eq!(config.receiver.source, SourceKind::Serial);
        assert_eq!(config.receiver.port, "/dev/ttyUSB0");
        assert_eq!(config.receiver.baud_rate, 115200);
        assert_eq!(config.receiver.timeout_ms, 500);
        assert_eq!(config.receiver.packet_length, 27);
        assert_eq!(config.receiver.sync_word, 0xD4);
        assert_eq!(config.decoder.enabled, SensorFamily::PRIORITY.to_vec());
        assert!(!config.decoder.log_failures);
        assert!(config.telemetry.enabled);
        assert_eq!(config.telemetry.log_dir, "./logs");
        assert_eq!(config.telemetry.max_records_per_file, 10000);
        assert_eq!(config.telemetry.max_files_to_keep, 10);
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.file.is_empty());
    }

    #[test]
    fn test_empty_file_equals_default() {
        let parsed = Config::parse("").unwrap();
        let default = Config::default();

        assert_eq!(parsed.receiver.port, default.receiver.port);
        assert_eq!(parsed.receiver.packet_length, default.receiver.packet_length);
        assert_eq!(parsed.decoder.enabled, default.decoder.enabled);
        assert_eq!(parsed.telemetry.log_dir, default.telemetry.log_dir);
        assert_eq!(parsed.logging.level, default.logging.level);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config = Config::parse(
            r#"
[receiver]
port = "/dev/ttyACM1"
sync_word = 0x2D

[decoder]
enabled = ["leakage", "6in1"]
"#,
        )
        .unwrap();

        assert_eq!(config.receiver.port, "/dev/ttyACM1");
        assert_eq!(config.receiver.sync_word, 0x2D);
        assert_eq!(config.receiver.timeout_ms, 500);
        assert_eq!(
            config.decoder.enabled,
            vec![SensorFamily::Leakage, SensorFamily::Weather6In1]
        );
    }

    #[test]
    fn test_load_config_from_file() {
        let toml_content = r#"
[receiver]
source = "replay"
replay_file = "captures/station.hex"
timeout_ms = 250

[decoder]
enabled = ["7in1", "lightning"]
log_failures = true

[telemetry]
enabled = false

[logging]
level = "debug"
file = "rx.log"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = Config::load(temp_file.path()).unwrap();
        assert_eq!(config.receiver.source, SourceKind::Replay);
        assert_eq!(config.receiver.replay_file, PathBuf::from("captures/station.hex"));
        assert_eq!(config.receiver.timeout_ms, 250);
        assert!(config.decoder.log_failures);
        assert!(!config.telemetry.enabled);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.file, "rx.log");
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let result = Config::load("/nonexistent/weather-sensor-rx.toml");
        assert!(matches!(result, Err(RxError::Io(_))));
    }

    #[test]
    fn test_unknown_decoder_name_rejected() {
        let result = Config::parse("[decoder]\nenabled = [\"9in1\"]\n");
        assert!(matches!(result, Err(RxError::Config(_))));
    }

    #[test]
    fn test_unknown_source_rejected() {
        let result = Config::parse("[receiver]\nsource = \"sdr\"\n");
        assert!(matches!(result, Err(RxError::Config(_))));
    }

    #[test]
    fn test_sync_word_out_of_range_rejected() {
        let result = Config::parse("[receiver]\nsync_word = 0x1D4\n");
        assert!(matches!(result, Err(RxError::Config(_))));
    }

    #[test]
    fn test_invalid_serial_port() {
        let mut config = Config::default();
        config.receiver.port = String::new();
        assert_rejected(&config, "serial port cannot be empty");

        // Port is irrelevant for replay
        config.receiver.source = SourceKind::Replay;
        config.receiver.replay_file = PathBuf::from("frames.hex");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_fallback_ports() {
        let config = Config::parse(
            r#"
[receiver]
port = "/dev/ttyUSB0"
fallback_ports = ["/dev/ttyUSB1", "/dev/ttyACM0"]
"#,
        )
        .unwrap();

        assert_eq!(config.receiver.fallback_ports, vec!["/dev/ttyUSB1", "/dev/ttyACM0"]);
        assert!(Config::default().receiver.fallback_ports.is_empty());

        let mut config = Config::default();
        config.receiver.fallback_ports = vec![String::new()];
        assert_rejected(&config, "fallback_ports cannot contain an empty path");
    }

    #[test]
    fn test_replay_requires_file() {
        let mut config = Config::default();
        config.receiver.source = SourceKind::Replay;
        assert_rejected(&config, "replay_file is required");
    }

    #[test]
    fn test_invalid_baud_rate() {
        let mut config = Config::default();
        config.receiver.baud_rate = 0;
        assert_rejected(&config, "baud_rate");
    }

    #[test]
    fn test_timeout_bounds() {
        let mut config = Config::default();

        for (timeout, valid) in [(0, false), (1, true), (10000, true), (10001, false)] {
            config.receiver.timeout_ms = timeout;
            assert_eq!(config.validate().is_ok(), valid, "timeout_ms = {}", timeout);
        }
    }

    #[test]
    fn test_packet_length_bounds() {
        let mut config = Config::default();

        for (length, valid) in [(8, false), (9, true), (64, true), (65, false)] {
            config.receiver.packet_length = length;
            assert_eq!(config.validate().is_ok(), valid, "packet_length = {}", length);
        }
    }

    #[test]
    fn test_empty_decoder_list() {
        let mut config = Config::default();
        config.decoder.enabled.clear();
        assert_rejected(&config, "at least one decoder");
    }

    #[test]
    fn test_duplicate_decoder() {
        let mut config = Config::default();
        config.decoder.enabled = vec![
            SensorFamily::Weather6In1,
            SensorFamily::Leakage,
            SensorFamily::Weather6In1,
        ];
        assert_rejected(&config, "decoder '6in1' is listed more than once");
    }

    #[test]
    fn test_empty_log_dir_when_enabled() {
        let mut config = Config::default();
        config.telemetry.log_dir = String::new();
        assert_rejected(&config, "log_dir cannot be empty");

        config.telemetry.enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_rotation_limits() {
        let mut config = Config::default();
        config.telemetry.max_records_per_file = 0;
        assert_rejected(&config, "max_records_per_file");

        let mut config = Config::default();
        config.telemetry.max_files_to_keep = 0;
        assert_rejected(&config, "max_files_to_keep");
    }

    #[test]
    fn test_unknown_log_level() {
        let mut config = Config::default();
        config.logging.level = "verbose".to_string();
        assert_rejected(&config, "logging level must be one of");

        for level in LOG_LEVELS {
            config.logging.level = level.to_string();
            assert!(config.validate().is_ok(), "level {} rejected", level);
        }
    }

    #[test]
    fn test_shipped_default_config_is_valid() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/default.toml");
        let config = Config::load(path).unwrap();

        assert_eq!(config.receiver.packet_length, 27);
        assert_eq!(config.decoder.enabled, SensorFamily::PRIORITY.to_vec());
    }
}
