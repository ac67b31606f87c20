//! # Water Leakage Sensor Payload Decoder
//!
//! Bresser water leakage sensor. Not whitened, protected by CRC16/XMODEM.
//!
//! ```text
//! CRC:16h ID:32h STYPE:4h STARTUP:1b CH:3d ALARM:1b NO_ALARM:1b BATT:2b ?4h ...
//! ```
//!
//! The CRC covers only five bytes, so decoded fields are cross-checked
//! before a reading is accepted.

use super::diagnostics::DiagnosticSink;
use super::digest::crc16_xmodem;
use super::protocol::*;
use super::reading::SensorReading;
use super::{ensure_len, PayloadDecoder};
use crate::error::DecodeError;

/// Decoder for water leakage sensor frames
#[derive(Debug, Clone, Copy, Default)]
pub struct LeakageDecoder;

impl PayloadDecoder for LeakageDecoder {
    fn family(&self) -> SensorFamily {
        SensorFamily::Leakage
    }

    fn decode(
        &self,
        payload: &[u8],
        diag: &dyn DiagnosticSink,
    ) -> Result<SensorReading, DecodeError> {
        decode_leakage(payload, diag)
    }
}

/// Decode a water leakage sensor payload
///
/// # Errors
///
/// - [`DecodeError::TooShort`] if fewer than 8 bytes are supplied
/// - [`DecodeError::Checksum`] if the CRC over bytes 2..7 does not match bytes 0-1
/// - [`DecodeError::InvalidInput`] if the sensor type is not a leakage sensor,
///   the alarm flags contradict each other, or the channel is 0
pub fn decode_leakage(payload: &[u8], diag: &dyn DiagnosticSink) -> Result<SensorReading, DecodeError> {
    let family = SensorFamily::Leakage;
    ensure_len(payload, PAYLOAD_LEAKAGE_SIZE)?;

    let expected = u16::from_be_bytes([payload[0], payload[1]]);
    let crc = crc16_xmodem(&payload[2..2 + CRC_LEAKAGE_LEN]);
    if crc != expected {
        diag.debug(
            family,
            &format!("CRC check failed - [0x{:04X}] != [0x{:04X}]", expected, crc),
        );
        return Err(DecodeError::Checksum { expected, actual: crc });
    }

    let sensor_id = u32::from_be_bytes([payload[2], payload[3], payload[4], payload[5]]);
    let sensor_type = payload[6] >> 4;
    let channel = payload[6] & 0x07;
    let alarm = payload[7] & 0x80 != 0;
    let no_alarm = payload[7] & 0x40 != 0;

    if sensor_type != SENSOR_TYPE_LEAKAGE {
        diag.debug(family, &format!("sensor type {} is not a leakage sensor", sensor_type));
        return Err(DecodeError::InvalidInput("not a leakage sensor"));
    }
    if alarm == no_alarm {
        diag.debug(family, "alarm and no-alarm flags contradict each other");
        return Err(DecodeError::InvalidInput("contradicting alarm flags"));
    }
    if channel == 0 {
        diag.debug(family, "channel 0 is not a valid channel");
        return Err(DecodeError::InvalidInput("channel 0"));
    }

    let mut reading = SensorReading::new(family, sensor_id, sensor_type);
    reading.channel = Some(channel);
    reading.startup = payload[6] & 0x08 == 0;
    reading.battery_ok = payload[7] & 0x30 != 0;
    reading.data.alarm = Some(alarm && !no_alarm);

    Ok(reading)
}
