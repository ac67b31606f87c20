//! # Bresser Payload Decoder Module
//!
//! Decoding and validation of Bresser 868 MHz sensor payloads.
//!
//! This module handles:
//! - Checksum, LFSR-16 digest and CRC16 validation
//! - Bit-exact field extraction per frame family (5-in-1, 6-in-1, 7-in-1,
//!   lightning, leakage)
//! - Trying the decoders in priority order on a received payload
//! - Sensor type naming for presentation
//!
//! Decoders are stateless: raw bytes in, [`SensorReading`] or
//! [`DecodeError`] out.

pub mod bcd;
pub mod diagnostics;
pub mod digest;
pub mod dispatch;
pub mod encoder;
pub mod leakage;
pub mod lightning;
pub mod protocol;
pub mod reading;
pub mod weather_5in1;
pub mod weather_6in1;
pub mod weather_7in1;

pub use diagnostics::{DiagnosticSink, SilentSink, TracingSink};
pub use dispatch::DecoderChain;
pub use protocol::{sensor_type_name, DecodeStatus, SensorFamily};
pub use reading::{Measurements, SensorReading};

use crate::error::DecodeError;

/// A decoding algorithm for one frame family
pub trait PayloadDecoder: Send + Sync {
    /// Frame family handled by this decoder
    fn family(&self) -> SensorFamily;

    /// Validate `payload` and extract a reading
    ///
    /// Implementations validate the whole frame before extracting any
    /// field and never return a partially filled reading.
    fn decode(&self, payload: &[u8], diag: &dyn DiagnosticSink)
        -> Result<SensorReading, DecodeError>;
}

/// Decoder instance for `family`
pub fn decoder_for(family: SensorFamily) -> Box<dyn PayloadDecoder> {
    match family {
        SensorFamily::Weather5In1 => Box::new(weather_5in1::Weather5In1Decoder),
        SensorFamily::Weather6In1 => Box::new(weather_6in1::Weather6In1Decoder),
        SensorFamily::Weather7In1 => Box::new(weather_7in1::Weather7In1Decoder),
        SensorFamily::Lightning => Box::new(lightning::LightningDecoder),
        SensorFamily::Leakage => Box::new(leakage::LeakageDecoder),
    }
}

/// Reject buffers shorter than the frame layout
pub(crate) fn ensure_len(payload: &[u8], needed: usize) -> Result<(), DecodeError> {
    if payload.len() < needed {
        return Err(DecodeError::TooShort {
            needed,
            actual: payload.len(),
        });
    }
    Ok(())
}
