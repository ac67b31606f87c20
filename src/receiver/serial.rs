//! # Serial Radio Bridge
//!
//! Receives packets from a radio module bridged onto a serial port. The
//! bridge writes each received packet as one burst of raw bytes; a pause of
//! [`FRAME_GAP`] ends the packet.

use std::time::Duration;

use async_trait::async_trait;
use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::time::timeout;
use tokio_serial::SerialPortBuilderExt;
use tracing::{debug, info, trace};

use super::{PacketSource, RxStatus};
use crate::config::MAX_PACKET_LENGTH;
use crate::error::{Result, RxError};

/// Silence that terminates a packet burst
pub const FRAME_GAP: Duration = Duration::from_millis(5);

/// Receiver over the serial radio bridge
pub type SerialReceiver = StreamReceiver<tokio_serial::SerialStream>;

/// Packet receiver over any byte stream
pub struct StreamReceiver<R> {
    stream: R,
    /// Device path or other label for log messages
    label: String,
    /// Maximum wait for the first byte of a packet
    timeout: Duration,
    buffer: BytesMut,
}

impl<R> std::fmt::Debug for StreamReceiver<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamReceiver")
            .field("label", &self.label)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl SerialReceiver {
    /// Open the radio bridge's serial port (8N1, no flow control)
    ///
    /// # Arguments
    ///
    /// * `path` - Device path (e.g., "/dev/ttyUSB0")
    /// * `baud_rate` - Serial line speed
    /// * `timeout_ms` - Maximum wait for a packet in `receive`
    ///
    /// # Errors
    ///
    /// Returns [`RxError::Serial`] if the port cannot be opened
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use weather_sensor_rx::receiver::SerialReceiver;
    ///
    /// #[tokio::main]
    /// async fn main() -> anyhow::Result<()> {
    ///     let receiver = SerialReceiver::open("/dev/ttyUSB0", 115200, 500)?;
    ///     println!("Listening on {}", receiver.label());
    ///     Ok(())
    /// }
    /// ```
    pub fn open(path: &str, baud_rate: u32, timeout_ms: u64) -> Result<Self> {
        debug!("Opening serial port: {}", path);

        let port = tokio_serial::new(path, baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .open_native_async()
            .map_err(|e| RxError::Serial(format!("Failed to open {}: {}", path, e)))?;

        info!("Opened radio bridge at {} ({} baud)", path, baud_rate);
        Ok(Self::new(port, path, Duration::from_millis(timeout_ms)))
    }

    /// Open the first serial port that can be opened
    ///
    /// # Errors
    ///
    /// Returns [`RxError::SerialPortNotFound`] listing every path tried
    pub fn open_first(paths: &[&str], baud_rate: u32, timeout_ms: u64) -> Result<Self> {
        for path in paths {
            match Self::open(path, baud_rate, timeout_ms) {
                Ok(receiver) => return Ok(receiver),
                Err(e) => debug!("{}", e),
            }
        }

        Err(RxError::SerialPortNotFound(paths.join(", ")))
    }
}

impl<R> StreamReceiver<R>
where
    R: AsyncRead + Unpin + Send,
{
    pub fn new(stream: R, label: impl Into<String>, timeout: Duration) -> Self {
        Self {
            stream,
            label: label.into(),
            timeout,
            buffer: BytesMut::with_capacity(MAX_PACKET_LENGTH),
        }
    }

    /// Device path or label given at construction
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Read one packet burst into the buffer
    ///
    /// Waits up to the receive timeout for the first byte, then reads until
    /// the stream pauses for [`FRAME_GAP`] or ends.
    async fn read_burst(&mut self) -> RxStatus {
        let mut chunk = [0u8; MAX_PACKET_LENGTH];
        let mut overflow = false;
        self.buffer.clear();

        match timeout(self.timeout, self.stream.read(&mut chunk)).await {
            Err(_) => return RxStatus::Timeout,
            Ok(Ok(0)) => return RxStatus::Closed,
            Ok(Ok(n)) => self.buffer.extend_from_slice(&chunk[..n]),
            Ok(Err(e)) => return RxStatus::Fault(e.to_string()),
        }

        loop {
            match timeout(FRAME_GAP, self.stream.read(&mut chunk)).await {
                Err(_) | Ok(Ok(0)) => break,
                Ok(Ok(n)) => {
                    if overflow || self.buffer.len() + n > MAX_PACKET_LENGTH {
                        // Keep draining so the next packet starts clean
                        overflow = true;
                        self.buffer.clear();
                    } else {
                        self.buffer.extend_from_slice(&chunk[..n]);
                    }
                }
                Ok(Err(e)) => return RxStatus::Fault(e.to_string()),
            }
        }

        if overflow {
            RxStatus::Overflow
        } else {
            RxStatus::None
        }
    }
}

#[async_trait]
impl<R> PacketSource for StreamReceiver<R>
where
    R: AsyncRead + Unpin + Send,
{
    async fn receive(&mut self, max_length: usize) -> (RxStatus, Vec<u8>) {
        let status = self.read_burst().await;
        if status != RxStatus::None {
            trace!(source = %self.label, "receive: {:?}", status);
            return (status, Vec::new());
        }

        if self.buffer.len() < max_length {
            return (RxStatus::Underflow, self.buffer.to_vec());
        }

        // Bytes beyond the requested length are discarded
        self.buffer.truncate(max_length);
        (RxStatus::None, self.buffer.to_vec())
    }
}
