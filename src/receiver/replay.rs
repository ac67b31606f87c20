//! # Replay Source
//!
//! Replays captured packets from a text file, one hex-encoded packet per
//! line:
//!
//! ```text
//! # 6-in-1 weather station
//! D4 54 1B 21 10 34 27 18 FF 88 FF 29 28 06 42 87 FF F0 C6 00 00 00 00 00 00 00 00
//! D4C7703597040857700000000000000000 03FFFFFFFFFFFFFFFFFF   # leakage
//! ```
//!
//! Whitespace inside a line is ignored and `#` starts a comment.

use std::collections::VecDeque;
use std::io;
use std::path::Path;

use async_trait::async_trait;
use tracing::info;

use super::{PacketSource, RxStatus};
use crate::config::MAX_PACKET_LENGTH;
use crate::error::Result;

/// Packet source backed by captured frames
#[derive(Debug, Clone, Default)]
pub struct ReplaySource {
    frames: VecDeque<Vec<u8>>,
}

impl ReplaySource {
    /// Read and parse a capture file
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, or one of kind
    /// `InvalidData` naming the first malformed line
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path).await?;
        let source = Self::parse(&text).map_err(|e| {
            io::Error::new(e.kind(), format!("{}: {}", path.display(), e))
        })?;

        info!("Loaded {} captured frames from {}", source.remaining(), path.display());
        Ok(source)
    }

    /// Parse capture text
    ///
    /// # Errors
    ///
    /// Returns an `InvalidData` error naming the first malformed line
    pub fn parse(text: &str) -> io::Result<Self> {
        let mut frames = VecDeque::new();

        for (index, line) in text.lines().enumerate() {
            let content = line.split('#').next().unwrap_or_default();
            let digits: String = content.chars().filter(|c| !c.is_whitespace()).collect();
            if digits.is_empty() {
                continue;
            }

            let frame = hex::decode(&digits).map_err(|e| {
                io::Error::new(io::ErrorKind::InvalidData, format!("line {}: {}", index + 1, e))
            })?;
            frames.push_back(frame);
        }

        Ok(Self { frames })
    }

    /// Source replaying the given frames in order
    pub fn from_frames<I>(frames: I) -> Self
    where
        I: IntoIterator<Item = Vec<u8>>,
    {
        Self {
            frames: frames.into_iter().collect(),
        }
    }

    /// Frames not yet replayed
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

#[async_trait]
impl PacketSource for ReplaySource {
    async fn receive(&mut self, max_length: usize) -> (RxStatus, Vec<u8>) {
        let Some(mut frame) = self.frames.pop_front() else {
            return (RxStatus::Closed, Vec::new());
        };

        if frame.len() > MAX_PACKET_LENGTH {
            return (RxStatus::Overflow, Vec::new());
        }
        if frame.len() < max_length {
            return (RxStatus::Underflow, frame);
        }

        frame.truncate(max_length);
        (RxStatus::None, frame)
    }
}
