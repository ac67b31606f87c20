//! # Sensor Readings
//!
//! Decoded measurement record. Fields that were not transmitted, or failed
//! their per-field validity check, are `None` and left out of the JSON form.

use std::fmt;

use serde::Serialize;

use super::protocol::SensorFamily;

/// One decoded sensor message
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorReading {
    /// Frame family the reading was decoded from
    pub family: SensorFamily,

    /// Sensor ID (8, 16 or 32 bits wide depending on the family)
    pub sensor_id: u32,

    /// Sensor type code, meaning depends on the family
    pub sensor_type: u8,

    /// Channel (0-7), not transmitted by every family
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<u8>,

    /// Battery state
    pub battery_ok: bool,

    /// Sensor was powered up recently
    pub startup: bool,

    /// Measurements present in this message
    #[serde(flatten)]
    pub data: Measurements,
}

/// Optional measurement fields
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Measurements {
    /// Air temperature in °C
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_c: Option<f32>,

    /// Relative humidity in %
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity: Option<u8>,

    /// Soil moisture in %
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moisture: Option<u8>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub uv_index: Option<f32>,

    /// Wind gust speed in m/s
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wind_gust_meter_sec: Option<f32>,

    /// Average wind speed in m/s
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wind_avg_meter_sec: Option<f32>,

    /// Wind direction in degrees
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wind_direction_deg: Option<f32>,

    /// Rain counter in mm
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rain_mm: Option<f32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub light_lux: Option<f32>,

    /// Globe (black bulb) temperature in °C
    #[serde(skip_serializing_if = "Option::is_none")]
    pub globe_temp_c: Option<f32>,

    /// Particulate matter in µg/m³
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pm_1_0: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pm_2_5: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pm_10: Option<u16>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub co2_ppm: Option<u16>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub hcho_ppb: Option<u16>,

    /// VOC level (1 = bad .. 5 = good)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voc_level: Option<u8>,

    /// Lightning strike counter
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strike_count: Option<u16>,

    /// Distance to the last strike in km
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<u8>,

    /// Water leakage alarm
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alarm: Option<bool>,
}

impl SensorReading {
    /// Create a reading with no measurements yet
    pub fn new(family: SensorFamily, sensor_id: u32, sensor_type: u8) -> Self {
        Self {
            family,
            sensor_id,
            sensor_type,
            channel: None,
            battery_ok: true,
            startup: false,
            data: Measurements::default(),
        }
    }

    /// Wind fields are transmitted together; true if all three are present
    pub fn has_wind(&self) -> bool {
        self.data.wind_gust_meter_sec.is_some()
            && self.data.wind_avg_meter_sec.is_some()
            && self.data.wind_direction_deg.is_some()
    }
}

/// One-line summary: identity first, then the measurements present
impl fmt::Display for SensorReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "id: 0x{:08X} type: {}", self.sensor_id, self.sensor_type)?;
        if let Some(ch) = self.channel {
            write!(f, " ch: {}", ch)?;
        }
        write!(f, " batt_ok: {}", u8::from(self.battery_ok))?;
        if self.startup {
            f.write_str(" startup")?;
        }

        let d = &self.data;
        if let Some(v) = d.temp_c {
            write!(f, " temp: {:.1}", v)?;
        }
        if let Some(v) = d.humidity {
            write!(f, " hum: {}", v)?;
        }
        if let Some(v) = d.moisture {
            write!(f, " moist: {}", v)?;
        }
        if let (Some(gust), Some(avg), Some(dir)) =
            (d.wind_gust_meter_sec, d.wind_avg_meter_sec, d.wind_direction_deg)
        {
            write!(f, " w_gust: {:.1} w_avg: {:.1} w_dir: {:.1}", gust, avg, dir)?;
        }
        if let Some(v) = d.rain_mm {
            write!(f, " rain: {:.1}", v)?;
        }
        if let Some(v) = d.uv_index {
            write!(f, " uv: {:.1}", v)?;
        }
        if let Some(v) = d.light_lux {
            write!(f, " light: {:.0}", v)?;
        }
        if let Some(v) = d.globe_temp_c {
            write!(f, " globe: {:.1}", v)?;
        }
        if let (Some(pm1), Some(pm25), Some(pm10)) = (d.pm_1_0, d.pm_2_5, d.pm_10) {
            write!(f, " pm1.0: {} pm2.5: {} pm10: {}", pm1, pm25, pm10)?;
        }
        if let Some(v) = d.co2_ppm {
            write!(f, " co2: {}", v)?;
        }
        if let Some(v) = d.hcho_ppb {
            write!(f, " hcho: {}", v)?;
        }
        if let Some(v) = d.voc_level {
            write!(f, " voc: {}", v)?;
        }
        if let Some(v) = d.strike_count {
            write!(f, " strikes: {}", v)?;
        }
        if let Some(v) = d.distance_km {
            write!(f, " dist: {}", v)?;
        }
        if let Some(v) = d.alarm {
            write!(f, " alarm: {}", u8::from(v))?;
        }
        Ok(())
    }
}
