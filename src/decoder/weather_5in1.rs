//! # 5-in-1 Payload Decoder
//!
//! Bresser 5-in-1 weather sensors and the Professional Rain Gauge.
//!
//! The 26-byte frame is self-redundant: bytes 0..13 are the bitwise
//! complement of bytes 13..26. Byte 13 holds the number of bits set in
//! bytes 14..26.
//!
//! ```text
//! [13 bytes, inverted copy] BITS:8d ID:8h STARTUP:1b TYPE:7h GUST:8h DIR:4h GUST:4h
//!   AVG:8h ?4h AVG:4h TEMP:8h ?4h TEMP:4h HUM:8h RAIN:8h8h BATT:1b ?3b SIGN:4h
//! ```

use super::bcd::{hi, lo};
use super::diagnostics::DiagnosticSink;
use super::digest::count_bits;
use super::protocol::*;
use super::reading::SensorReading;
use super::{ensure_len, PayloadDecoder};
use crate::error::DecodeError;

/// Rain gauge counts in steps 2.5 times larger than the weather stations
const RAIN_GAUGE_SCALE: f32 = 2.5;

/// Decoder for the 5-in-1 frame family
#[derive(Debug, Clone, Copy, Default)]
pub struct Weather5In1Decoder;

impl PayloadDecoder for Weather5In1Decoder {
    fn family(&self) -> SensorFamily {
        SensorFamily::Weather5In1
    }

    fn decode(
        &self,
        payload: &[u8],
        diag: &dyn DiagnosticSink,
    ) -> Result<SensorReading, DecodeError> {
        decode_5in1(payload, diag)
    }
}

/// Decode a 5-in-1 payload
///
/// # Errors
///
/// - [`DecodeError::TooShort`] if fewer than 26 bytes are supplied
/// - [`DecodeError::Parity`] with the first column where the halves are not complementary
/// - [`DecodeError::Checksum`] if the bit count in byte 13 does not match bytes 14..26
pub fn decode_5in1(payload: &[u8], diag: &dyn DiagnosticSink) -> Result<SensorReading, DecodeError> {
    let family = SensorFamily::Weather5In1;
    ensure_len(payload, PAYLOAD_5IN1_SIZE)?;

    if let Some(column) =
        (0..HALF_5IN1_SIZE).find(|&col| payload[col] ^ payload[col + HALF_5IN1_SIZE] != 0xFF)
    {
        diag.debug(family, &format!("parity wrong at column {}", column));
        return Err(DecodeError::Parity { column });
    }

    let expected = payload[HALF_5IN1_SIZE];
    let bits = count_bits(&payload[HALF_5IN1_SIZE + 1..PAYLOAD_5IN1_SIZE]);
    if bits != expected as u32 {
        diag.debug(family, &format!("bit count {} != {}", bits, expected));
        return Err(DecodeError::Checksum {
            expected: expected as u16,
            actual: bits as u16,
        });
    }

    let p = &payload[..PAYLOAD_5IN1_SIZE];
    let sensor_type = p[15] & 0x7F;

    let mut reading = SensorReading::new(family, p[14] as u32, sensor_type);
    reading.startup = p[15] & 0x80 == 0;
    reading.battery_ok = p[25] & 0x80 == 0;

    if lo(p[20]) <= 9 {
        let mut temp_raw = (lo(p[20]) + hi(p[20]) * 10 + lo(p[21]) * 100) as i32;
        if p[25] & 0x0F != 0 {
            temp_raw = -temp_raw;
        }
        reading.data.temp_c = Some(temp_raw as f32 / 10.0);
    }

    let humidity_valid = lo(p[22]) <= 9;
    let humidity = (lo(p[22]) + hi(p[22]) * 10) as u8;

    let wind_direction_raw = hi(p[17]) * 225;
    let gust_raw = (lo(p[17]) << 8) + p[16] as u32;
    let avg_raw = lo(p[18]) + hi(p[18]) * 10 + lo(p[19]) * 100;

    let rain_raw = lo(p[23]) + hi(p[23]) * 10 + lo(p[24]) * 100 + hi(p[24]) * 1000;
    let mut rain_mm = rain_raw as f32 / 10.0;

    let rain_gauge = SENSOR_TYPES_RAIN_GAUGE.contains(&sensor_type);
    if rain_gauge {
        rain_mm *= RAIN_GAUGE_SCALE;
    } else {
        if humidity_valid {
            reading.data.humidity = Some(humidity);
        }
        reading.data.wind_direction_deg = Some(wind_direction_raw as f32 / 10.0);
        reading.data.wind_gust_meter_sec = Some(gust_raw as f32 / 10.0);
        reading.data.wind_avg_meter_sec = Some(avg_raw as f32 / 10.0);
    }
    reading.data.rain_mm = Some(rain_mm);

    Ok(reading)
}
