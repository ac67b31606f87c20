//! # 6-in-1 Payload Decoder
//!
//! Bresser 6-in-1 weather sensors and the sensors sharing their frame:
//! 7-in-1 indoor sensor, new 5-in-1 sensors, Froggit WH6000, Ventus C8488A,
//! 3-in-1 Professional Wind Gauge, pool/spa thermometer and the soil
//! moisture sensor.
//!
//! ```text
//! DIGEST:8h8h ID:8h8h8h8h STYPE:4h STARTUP:1b CH:3d WSPEED:~8h~4h ~4h~8h WDIR:12h ?4h
//!   TEMP:8h.4h ?2b BATT:1b ?1b HUM:8h UV:~12h FLAGS:4h CHKSUM:8h
//! DIGEST:8h8h ID:8h8h8h8h STYPE:4h STARTUP:1b CH:3d WSPEED:~8h~4h ~4h~8h WDIR:12h ?4h
//!   RAIN:~8h~8h~8h UV:8h8h FLAGS:4h CHKSUM:8h
//! ```
//!
//! Weather stations alternate temperature/humidity and rain messages
//! (FLAGS 0 and 1); wind is sent in every message.

use super::bcd::{bcd2, bcd3_hi, bcd6, hi, lo};
use super::diagnostics::DiagnosticSink;
use super::digest::{add_bytes, lfsr_digest16};
use super::protocol::*;
use super::reading::SensorReading;
use super::{ensure_len, PayloadDecoder};
use crate::error::DecodeError;

/// Soil moisture index 1-16 to percent (scale is 20/3)
const MOISTURE_MAP: [u8; 16] = [0, 7, 13, 20, 27, 33, 40, 47, 53, 60, 67, 73, 80, 87, 93, 99];

/// Lower bound of the sensors' temperature range in tenths of °C; the 3-in-1
/// wind gauge sets the sign bit on positive values, which lands below it.
const TEMP_MIN_TENTHS: i32 = -500;

/// Decoder for the 6-in-1 frame family
#[derive(Debug, Clone, Copy, Default)]
pub struct Weather6In1Decoder;

impl PayloadDecoder for Weather6In1Decoder {
    fn family(&self) -> SensorFamily {
        SensorFamily::Weather6In1
    }

    fn decode(
        &self,
        payload: &[u8],
        diag: &dyn DiagnosticSink,
    ) -> Result<SensorReading, DecodeError> {
        decode_6in1(payload, diag)
    }
}

/// Map a soil moisture index (1-16) to percent
pub fn moisture_percent(index: u32) -> Option<u8> {
    match index {
        1..=16 => Some(MOISTURE_MAP[index as usize - 1]),
        _ => None,
    }
}

/// Decode a 6-in-1 payload
///
/// # Arguments
///
/// * `payload` - Frame without sync word (at least 18 bytes)
/// * `diag` - Receives rejection details and field corrections
///
/// # Errors
///
/// - [`DecodeError::TooShort`] if fewer than 18 bytes are supplied
/// - [`DecodeError::Digest`] if the LFSR digest over bytes 2..17 does not match bytes 0-1
/// - [`DecodeError::Checksum`] if bytes 2..18 do not add up to 0xFF
pub fn decode_6in1(payload: &[u8], diag: &dyn DiagnosticSink) -> Result<SensorReading, DecodeError> {
    let family = SensorFamily::Weather6In1;
    ensure_len(payload, PAYLOAD_6IN1_SIZE)?;

    let expected = u16::from_be_bytes([payload[0], payload[1]]);
    let digest = lfsr_digest16(&payload[2..2 + DIGEST_6IN1_LEN], LFSR_GENERATOR, DIGEST_6IN1_KEY);
    if digest != expected {
        diag.debug(
            family,
            &format!("digest check failed - [0x{:04X}] != [0x{:04X}]", expected, digest),
        );
        return Err(DecodeError::Digest { expected, actual: digest });
    }

    let sum = add_bytes(&payload[2..2 + CHECKSUM_6IN1_LEN]);
    if sum != CHECKSUM_6IN1_EXPECTED {
        diag.debug(family, &format!("checksum failed - sum 0x{:02X}", sum));
        return Err(DecodeError::Checksum {
            expected: CHECKSUM_6IN1_EXPECTED as u16,
            actual: sum as u16,
        });
    }

    let sensor_id = u32::from_be_bytes([payload[2], payload[3], payload[4], payload[5]]);
    let sensor_type = payload[6] >> 4;
    let flags = payload[16] & 0x0F;

    let mut reading = SensorReading::new(family, sensor_id, sensor_type);
    reading.channel = Some(payload[6] & 0x07);
    reading.startup = payload[6] & 0x08 == 0;

    // Temperature, humidity and UV share their bytes with the rain counter
    let mut humidity = None;
    if flags == 0 {
        let negative = (payload[13] >> 3) & 1 == 1;
        let temp_raw = bcd3_hi(payload[12], payload[13]) as i32;
        let mut temp_tenths = if negative { temp_raw - 1000 } else { temp_raw };

        let sign_corrected = temp_tenths < TEMP_MIN_TENTHS;
        if sign_corrected {
            diag.warn(
                family,
                &format!("inverted sign bit, temperature {} corrected", temp_tenths),
            );
            temp_tenths = temp_raw;
        }

        reading.data.temp_c = Some(temp_tenths as f32 / 10.0);
        reading.battery_ok = (payload[13] >> 1) & 1 == 1;
        humidity = Some(bcd2(payload[14]));

        // ff01 or 0000 if not available, inverted BCD otherwise
        let uv_hi = !payload[15];
        let uv_lo = !payload[16] & 0xF0;
        if uv_hi <= 0x99 && uv_lo <= 0x90 && !sign_corrected {
            reading.data.uv_index = Some(bcd3_hi(uv_hi, uv_lo) as f32 / 10.0);
        }
    }

    if flags == 1 && sensor_type == SENSOR_TYPE_WEATHER1 {
        let rain_raw = bcd6(!payload[12], !payload[13], !payload[14]);
        reading.data.rain_mm = Some(rain_raw as f32 / 10.0);
    }

    let (w7, w8, w9) = (!payload[7], !payload[8], !payload[9]);
    if w7 <= 0x99 && w8 <= 0x99 && w9 <= 0x99 {
        let gust_raw = bcd3_hi(w7, w8);
        let avg_raw = hi(w9) * 100 + lo(w9) * 10 + lo(w8);
        let dir_raw = bcd3_hi(payload[10], payload[11]);

        reading.data.wind_gust_meter_sec = Some(gust_raw as f32 / 10.0);
        reading.data.wind_avg_meter_sec = Some(avg_raw as f32 / 10.0);
        reading.data.wind_direction_deg = Some(dir_raw as f32);
    }

    match sensor_type {
        SENSOR_TYPE_POOL_THERMO => humidity = None,
        SENSOR_TYPE_SOIL => {
            // Wind and UV decode to valid zeros, but the hardware has neither
            reading.data.wind_gust_meter_sec = None;
            reading.data.wind_avg_meter_sec = None;
            reading.data.wind_direction_deg = None;
            reading.data.uv_index = None;

            if let Some(moisture) = humidity.and_then(moisture_percent) {
                reading.data.moisture = Some(moisture);
                humidity = None;
            }
        }
        _ => {}
    }
    reading.data.humidity = humidity.map(|h| h as u8);

    Ok(reading)
}
