//! # Error Types
//!
//! Custom error types for the weather sensor receiver using `thiserror`.
//!
//! [`DecodeError`] describes why a single payload was rejected by a decoder.
//! These are ordinary outcomes of listening to a shared radio channel and
//! never abort the receiver. [`RxError`] covers everything else (configuration,
//! serial port, telemetry files).

use thiserror::Error;

use crate::decoder::protocol::DecodeStatus;

/// Reason a payload was rejected by a decoder
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Buffer is shorter than the frame layout requires
    #[error("payload too short: need {needed} bytes, got {actual}")]
    TooShort { needed: usize, actual: usize },

    /// Fields decode to a structurally or semantically impossible value
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),

    /// Complemented half of a 5-in-1 frame does not match
    #[error("parity mismatch at column {column}")]
    Parity { column: usize },

    /// Additive checksum, bit count or CRC mismatch
    #[error("checksum mismatch: expected 0x{expected:04X}, got 0x{actual:04X}")]
    Checksum { expected: u16, actual: u16 },

    /// LFSR digest mismatch
    #[error("digest mismatch: expected 0x{expected:04X}, got 0x{actual:04X}")]
    Digest { expected: u16, actual: u16 },

    /// Decoder declined the frame without declaring it broken
    #[error("frame skipped")]
    Skip,

    /// Decoder chain has no members
    #[error("no decoder enabled")]
    NoDecoder,
}

impl DecodeError {
    /// Status code reported for this failure
    pub fn status(&self) -> DecodeStatus {
        match self {
            DecodeError::TooShort { .. } | DecodeError::InvalidInput(_) | DecodeError::NoDecoder => {
                DecodeStatus::InvalidInput
            }
            DecodeError::Parity { .. } => DecodeStatus::ParityError,
            DecodeError::Checksum { .. } => DecodeStatus::ChecksumError,
            DecodeError::Digest { .. } => DecodeStatus::DigestError,
            DecodeError::Skip => DecodeStatus::Skip,
        }
    }
}

/// Main error type for the receiver application
#[derive(Debug, Error)]
pub enum RxError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serial port errors
    #[error("Serial error: {0}")]
    Serial(String),

    /// None of the candidate serial devices could be opened
    #[error("No serial device found (tried: {0})")]
    SerialPortNotFound(String),

    /// Telemetry record serialization errors
    #[error("Telemetry error: {0}")]
    Telemetry(#[from] serde_json::Error),
}

/// Result type alias for the receiver
pub type Result<T> = std::result::Result<T, RxError>;
