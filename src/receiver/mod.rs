//! # Receiver Module
//!
//! Supplies raw radio packets to the decoders.
//!
//! This module handles:
//! - Reading packets from a serial radio bridge with a receive timeout
//! - Replaying captured frames from a hex text file
//! - Checking and stripping the sync word that prefixes every payload

pub mod replay;
pub mod serial;

pub use replay::ReplaySource;
pub use serial::{SerialReceiver, StreamReceiver};

use async_trait::async_trait;

use crate::config::{ReceiverConfig, SourceKind};
use crate::decoder::protocol::DecodeStatus;
use crate::error::Result;

/// Outcome of a single receive call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RxStatus {
    /// Complete packet received
    None,
    /// Nothing arrived within the receive timeout
    Timeout,
    /// Packet ended before the requested length
    Underflow,
    /// More data arrived than the receive buffer holds; the packet is dropped
    Overflow,
    /// Source is exhausted and will not produce more packets
    Closed,
    /// Transport error
    Fault(String),
}

impl RxStatus {
    /// Status to report to the presentation layer when no decode was attempted
    pub fn decode_status(&self) -> Option<DecodeStatus> {
        match self {
            RxStatus::Overflow => Some(DecodeStatus::BufferFull),
            _ => None,
        }
    }
}

/// Producer of raw radio packets
#[async_trait]
pub trait PacketSource: Send {
    /// Receive one packet of at most `max_length` bytes
    ///
    /// The buffer may be shorter than requested (or empty) when the status
    /// is not [`RxStatus::None`].
    async fn receive(&mut self, max_length: usize) -> (RxStatus, Vec<u8>);
}

/// Payload of a received packet with the leading sync word stripped
///
/// Returns `None` unless the receive succeeded and byte 0 equals
/// `sync_word`.
///
/// # Examples
///
/// ```
/// use weather_sensor_rx::receiver::{extract_payload, RxStatus};
///
/// let packet = [0xD4, 0x54, 0x1B, 0x21];
/// assert_eq!(extract_payload(&RxStatus::None, &packet, 0xD4), Some(&packet[1..]));
/// assert_eq!(extract_payload(&RxStatus::Timeout, &packet, 0xD4), None);
/// ```
pub fn extract_payload<'a>(status: &RxStatus, data: &'a [u8], sync_word: u8) -> Option<&'a [u8]> {
    if *status != RxStatus::None {
        return None;
    }

    match data.split_first() {
        Some((&first, payload)) if first == sync_word => Some(payload),
        _ => None,
    }
}

/// Open the packet source selected in the configuration
///
/// # Errors
///
/// Returns error if none of the serial ports can be opened or the replay
/// file cannot be read or parsed
pub async fn open_source(config: &ReceiverConfig) -> Result<Box<dyn PacketSource>> {
    match config.source {
        SourceKind::Serial => {
            let paths: Vec<&str> = std::iter::once(config.port.as_str())
                .chain(config.fallback_ports.iter().map(String::as_str))
                .collect();
            let receiver = SerialReceiver::open_first(&paths, config.baud_rate, config.timeout_ms)?;
            Ok(Box::new(receiver))
        }
        SourceKind::Replay => {
            let source = ReplaySource::open(&config.replay_file).await?;
            Ok(Box::new(source))
        }
    }
}
