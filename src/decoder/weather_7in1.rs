//! # 7-in-1 / 8-in-1 Payload Decoder
//!
//! Bresser 7-in-1 and 8-in-1 weather stations, and the air quality
//! (particulate matter), CO2 and HCHO/VOC sensors sharing their frame.
//!
//! The frame is whitened with 0xAA. Sensor type, startup flag and channel
//! (byte 6) must be read from the on-air bytes; everything else is read
//! after removing the whitening.
//!
//! ```text
//! DIGEST:8h8h ID:8h8h WDIR:8h4h ?4h STYPE:4h STARTUP:1b CH:3d WGST:8h.4h WAVG:4h8h.4h
//!   RAIN:8h8h8h ?8h TEMP:8h.4h FLAGS:4h HUM:8h LIGHT:8h8h8h UV:8h.4h ?4h ...
//! ```
//!
//! Digest is LFSR-16 gen 0x8810 key 0xba95 over 23 bytes with final XOR 0x6df1.

use super::bcd::{bcd2, bcd3_hi, bcd4, bcd4_mid, bcd6, hi, lo};
use super::diagnostics::DiagnosticSink;
use super::digest::{dewhiten, lfsr_digest16};
use super::protocol::*;
use super::reading::SensorReading;
use super::{ensure_len, PayloadDecoder};
use crate::error::DecodeError;

/// Temperatures above this raw BCD value are negative (raw - 1000)
const TEMP_NEGATIVE_THRESHOLD: u32 = 600;

/// Decoder for the 7-in-1 frame family
#[derive(Debug, Clone, Copy, Default)]
pub struct Weather7In1Decoder;

impl PayloadDecoder for Weather7In1Decoder {
    fn family(&self) -> SensorFamily {
        SensorFamily::Weather7In1
    }

    fn decode(
        &self,
        payload: &[u8],
        diag: &dyn DiagnosticSink,
    ) -> Result<SensorReading, DecodeError> {
        decode_7in1(payload, diag)
    }
}

/// Temperature in °C from a 3-digit BCD value in tenths
fn temperature(raw: u32) -> f32 {
    let tenths = if raw > TEMP_NEGATIVE_THRESHOLD {
        raw as i32 - 1000
    } else {
        raw as i32
    };
    tenths as f32 / 10.0
}

/// Decode a 7-in-1 payload
///
/// # Errors
///
/// - [`DecodeError::TooShort`] if fewer than 26 bytes are supplied
/// - [`DecodeError::Digest`] if the de-whitened digest does not match
pub fn decode_7in1(payload: &[u8], diag: &dyn DiagnosticSink) -> Result<SensorReading, DecodeError> {
    let family = SensorFamily::Weather7In1;
    ensure_len(payload, PAYLOAD_7IN1_SIZE)?;

    // Read before de-whitening
    let sensor_type = payload[6] >> 4;
    let startup = payload[6] & 0x08 == 0;
    let channel = payload[6] & 0x07;

    let w = dewhiten(&payload[..PAYLOAD_7IN1_SIZE]);

    let expected = u16::from_be_bytes([w[0], w[1]]) ^ DIGEST_7IN1_FINAL_XOR;
    let digest = lfsr_digest16(&w[2..2 + DIGEST_7IN1_LEN], LFSR_GENERATOR, DIGEST_7IN1_KEY);
    if digest != expected {
        diag.debug(
            family,
            &format!("digest check failed - [0x{:04X}] != [0x{:04X}]", expected, digest),
        );
        return Err(DecodeError::Digest { expected, actual: digest });
    }

    if payload[21] == 0x00 {
        diag.warn(family, "data sanity check failed: byte 21 is zero");
    }

    let sensor_id = u16::from_be_bytes([w[2], w[3]]) as u32;

    let mut reading = SensorReading::new(family, sensor_id, sensor_type);
    reading.channel = Some(channel);
    reading.startup = startup;
    reading.battery_ok = (w[15] & 0x06) != 0x06;

    match sensor_type {
        SENSOR_TYPE_WEATHER1 | SENSOR_TYPE_WEATHER2 | SENSOR_TYPE_WEATHER3 => {
            reading.data.temp_c = Some(temperature(bcd3_hi(w[14], w[15])));
            reading.data.humidity = Some(bcd2(w[16]) as u8);
            reading.data.rain_mm = Some(bcd6(w[10], w[11], w[12]) as f32 / 10.0);

            if sensor_type != SENSOR_TYPE_WEATHER2 {
                let gust_raw = bcd3_hi(w[7], w[8]);
                let avg_raw = lo(w[8]) * 100 + bcd2(w[9]);

                reading.data.wind_direction_deg = Some(bcd3_hi(w[4], w[5]) as f32);
                reading.data.wind_gust_meter_sec = Some(gust_raw as f32 / 10.0);
                reading.data.wind_avg_meter_sec = Some(avg_raw as f32 / 10.0);
                reading.data.light_lux = Some(bcd6(w[17], w[18], w[19]) as f32);
                reading.data.uv_index = Some(bcd3_hi(w[20], w[21]) as f32 / 10.0);
            }

            if sensor_type == SENSOR_TYPE_WEATHER3 && hi(w[23]) < 10 {
                reading.data.globe_temp_c = Some(temperature(bcd3_hi(w[22], w[23])));
            }
        }
        SENSOR_TYPE_AIR_PM => {
            reading.data.pm_1_0 = Some(bcd4_mid(w[8], w[9], w[10]) as u16);
            reading.data.pm_2_5 = Some(bcd4_mid(w[10], w[11], w[12]) as u16);
            reading.data.pm_10 = Some(bcd4_mid(w[12], w[13], w[14]) as u16);
        }
        SENSOR_TYPE_CO2 => {
            reading.data.co2_ppm = Some(bcd4(w[4], w[5]) as u16);
        }
        SENSOR_TYPE_HCHO_VOC => {
            reading.data.hcho_ppb = Some(bcd4(w[4], w[5]) as u16);
            reading.data.voc_level = Some(lo(w[22]) as u8);
        }
        other => {
            diag.debug(family, &format!("no measurements known for sensor type {}", other));
        }
    }

    Ok(reading)
}
