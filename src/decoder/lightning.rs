//! # Lightning Sensor Payload Decoder
//!
//! Bresser lightning sensor. Whitened like the 7-in-1 frame; sensor type and
//! startup flag are read from the on-air byte 6.
//!
//! ```text
//! DIGEST:8h8h ID:8h8h CTR:12h ?1b BATT:1b ?2b STYPE:4h STARTUP:1b ?3b DIST:8d ...
//! ```
//!
//! Digest is LFSR-16 gen 0x8810 key 0xabf9 over 8 bytes with final XOR 0x899e.

use super::bcd::bcd3_hi;
use super::diagnostics::DiagnosticSink;
use super::digest::{dewhiten, lfsr_digest16};
use super::protocol::*;
use super::reading::SensorReading;
use super::{ensure_len, PayloadDecoder};
use crate::error::DecodeError;

/// Decoder for lightning sensor frames
#[derive(Debug, Clone, Copy, Default)]
pub struct LightningDecoder;

impl PayloadDecoder for LightningDecoder {
    fn family(&self) -> SensorFamily {
        SensorFamily::Lightning
    }

    fn decode(
        &self,
        payload: &[u8],
        diag: &dyn DiagnosticSink,
    ) -> Result<SensorReading, DecodeError> {
        decode_lightning(payload, diag)
    }
}

/// Decode a lightning sensor payload
///
/// The strike counter's leading digit runs 0-15, so counts reach 1599.
///
/// # Errors
///
/// - [`DecodeError::TooShort`] if fewer than 10 bytes are supplied
/// - [`DecodeError::Digest`] if the de-whitened digest does not match
pub fn decode_lightning(
    payload: &[u8],
    diag: &dyn DiagnosticSink,
) -> Result<SensorReading, DecodeError> {
    let family = SensorFamily::Lightning;
    ensure_len(payload, PAYLOAD_LIGHTNING_SIZE)?;

    // Read before de-whitening
    let sensor_type = payload[6] >> 4;
    let startup = payload[6] & 0x08 == 0;

    let w = dewhiten(&payload[..PAYLOAD_LIGHTNING_SIZE]);

    let expected = u16::from_be_bytes([w[0], w[1]]) ^ DIGEST_LIGHTNING_FINAL_XOR;
    let digest = lfsr_digest16(
        &w[2..2 + DIGEST_LIGHTNING_LEN],
        LFSR_GENERATOR,
        DIGEST_LIGHTNING_KEY,
    );
    if digest != expected {
        diag.debug(
            family,
            &format!("digest check failed - [0x{:04X}] != [0x{:04X}]", expected, digest),
        );
        return Err(DecodeError::Digest { expected, actual: digest });
    }

    let sensor_id = u16::from_be_bytes([w[2], w[3]]) as u32;

    let mut reading = SensorReading::new(family, sensor_id, sensor_type);
    reading.startup = startup;
    reading.battery_ok = w[5] & 0x08 != 0;
    reading.data.strike_count = Some(bcd3_hi(w[4], w[5]) as u16);
    reading.data.distance_km = Some(w[7]);

    Ok(reading)
}
