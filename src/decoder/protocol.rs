//! # Bresser Protocol Constants and Types
//!
//! Wire-level definitions shared by the payload decoders.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::reading::SensorReading;
use crate::error::DecodeError;

/// Sync word byte that precedes every payload in the receive buffer
pub const SYNC_WORD: u8 = 0xD4;

/// Payload length after the sync word has been stripped
pub const PAYLOAD_SIZE: usize = 26;

/// Whitening mask applied by 7-in-1 and lightning transmitters
pub const WHITENING_MASK: u8 = 0xAA;

/// LFSR-16 generator shared by all digest-protected families
pub const LFSR_GENERATOR: u16 = 0x8810;

/// 6-in-1: LFSR key and number of digested bytes
pub const DIGEST_6IN1_KEY: u16 = 0x5412;
pub const DIGEST_6IN1_LEN: usize = 15;
/// 6-in-1: additive checksum over bytes 2..18 must equal this
pub const CHECKSUM_6IN1_EXPECTED: u8 = 0xFF;
pub const CHECKSUM_6IN1_LEN: usize = 16;

/// 7-in-1: LFSR key, number of digested bytes and final XOR
pub const DIGEST_7IN1_KEY: u16 = 0xBA95;
pub const DIGEST_7IN1_LEN: usize = 23;
pub const DIGEST_7IN1_FINAL_XOR: u16 = 0x6DF1;

/// Lightning: LFSR key, number of digested bytes and final XOR
pub const DIGEST_LIGHTNING_KEY: u16 = 0xABF9;
pub const DIGEST_LIGHTNING_LEN: usize = 8;
pub const DIGEST_LIGHTNING_FINAL_XOR: u16 = 0x899E;

/// Leakage: CRC16/XMODEM parameters and number of covered bytes
pub const CRC16_XMODEM_POLY: u16 = 0x1021;
pub const CRC16_XMODEM_INIT: u16 = 0x0000;
pub const CRC_LEAKAGE_LEN: usize = 5;

/// 5-in-1: size of each half of the self-redundant frame
pub const HALF_5IN1_SIZE: usize = 13;

/// Minimum payload sizes per family
pub const PAYLOAD_5IN1_SIZE: usize = 26;
pub const PAYLOAD_6IN1_SIZE: usize = 18;
pub const PAYLOAD_7IN1_SIZE: usize = 26;
pub const PAYLOAD_LIGHTNING_SIZE: usize = 10;
pub const PAYLOAD_LEAKAGE_SIZE: usize = 8;

/// Sensor type codes
pub const SENSOR_TYPE_WEATHER0: u8 = 0;
pub const SENSOR_TYPE_WEATHER1: u8 = 1;
pub const SENSOR_TYPE_THERMO_HYGRO: u8 = 2;
pub const SENSOR_TYPE_POOL_THERMO: u8 = 3;
pub const SENSOR_TYPE_SOIL: u8 = 4;
pub const SENSOR_TYPE_LEAKAGE: u8 = 5;
pub const SENSOR_TYPE_AIR_PM: u8 = 8;
pub const SENSOR_TYPE_LIGHTNING: u8 = 9;
pub const SENSOR_TYPE_CO2: u8 = 10;
pub const SENSOR_TYPE_HCHO_VOC: u8 = 11;
pub const SENSOR_TYPE_WEATHER2: u8 = 12;
pub const SENSOR_TYPE_WEATHER3: u8 = 13;

/// 5-in-1 type codes of the Professional Rain Gauge
pub const SENSOR_TYPES_RAIN_GAUGE: std::ops::RangeInclusive<u8> = 0x39..=0x3B;

/// Outcome of a single decode attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodeStatus {
    Ok,
    InvalidInput,
    ParityError,
    ChecksumError,
    DigestError,
    Skip,
    BufferFull,
}

impl DecodeStatus {
    /// Split a decode result into the status/reading pair used for presentation
    ///
    /// A reading is only ever paired with [`DecodeStatus::Ok`].
    pub fn of(result: Result<SensorReading, DecodeError>) -> (DecodeStatus, Option<SensorReading>) {
        match result {
            Ok(reading) => (DecodeStatus::Ok, Some(reading)),
            Err(e) => (e.status(), None),
        }
    }
}

impl fmt::Display for DecodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DecodeStatus::Ok => "OK",
            DecodeStatus::InvalidInput => "INVALID",
            DecodeStatus::ParityError => "PAR_ERR",
            DecodeStatus::ChecksumError => "CHK_ERR",
            DecodeStatus::DigestError => "DIG_ERR",
            DecodeStatus::Skip => "SKIP",
            DecodeStatus::BufferFull => "FULL",
        };
        f.write_str(s)
    }
}

/// Frame family, one per decoding algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorFamily {
    #[serde(rename = "5in1")]
    Weather5In1,
    #[serde(rename = "6in1")]
    Weather6In1,
    #[serde(rename = "7in1")]
    Weather7In1,
    #[serde(rename = "lightning")]
    Lightning,
    #[serde(rename = "leakage")]
    Leakage,
}

impl SensorFamily {
    /// Dispatch priority; frames are not self-describing, so the most
    /// strongly protected formats are tried first.
    pub const PRIORITY: [SensorFamily; 5] = [
        SensorFamily::Weather7In1,
        SensorFamily::Weather6In1,
        SensorFamily::Weather5In1,
        SensorFamily::Lightning,
        SensorFamily::Leakage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SensorFamily::Weather5In1 => "5in1",
            SensorFamily::Weather6In1 => "6in1",
            SensorFamily::Weather7In1 => "7in1",
            SensorFamily::Lightning => "lightning",
            SensorFamily::Leakage => "leakage",
        }
    }
}

impl fmt::Display for SensorFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Human readable label for a sensor type code
///
/// # Examples
///
/// ```
/// use weather_sensor_rx::decoder::protocol::sensor_type_name;
///
/// assert_eq!(sensor_type_name(9), "Lightning Sensor");
/// assert_eq!(sensor_type_name(7), "Unknown (Type 7)");
/// ```
pub fn sensor_type_name(sensor_type: u8) -> Cow<'static, str> {
    let name = match sensor_type {
        SENSOR_TYPE_WEATHER0 | SENSOR_TYPE_WEATHER1 => "Weather Station",
        SENSOR_TYPE_THERMO_HYGRO => "Thermo-/Hygrometer",
        SENSOR_TYPE_POOL_THERMO => "Pool / Spa Thermometer",
        SENSOR_TYPE_SOIL => "Soil Moisture Sensor",
        SENSOR_TYPE_LEAKAGE => "Water Leakage Sensor",
        SENSOR_TYPE_AIR_PM => "Air Quality Sensor (PM)",
        SENSOR_TYPE_LIGHTNING => "Lightning Sensor",
        SENSOR_TYPE_CO2 => "CO2 Sensor",
        SENSOR_TYPE_HCHO_VOC => "Air Quality Sensor (HCHO/VOC)",
        SENSOR_TYPE_WEATHER2 => "Weather Station (7-in-1, no wind)",
        SENSOR_TYPE_WEATHER3 => "Weather Station (8-in-1)",
        t if SENSOR_TYPES_RAIN_GAUGE.contains(&t) => "Professional Rain Gauge",
        other => return Cow::Owned(format!("Unknown (Type {})", other)),
    };
    Cow::Borrowed(name)
}
