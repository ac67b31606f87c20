//! Telemetry record layout

use std::borrow::Cow;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::decoder::protocol::sensor_type_name;
use crate::decoder::reading::SensorReading;

/// One line of the telemetry log
#[derive(Debug, Serialize)]
pub struct TelemetryRecord<'a> {
    /// RFC 3339 UTC receive time, millisecond precision
    pub timestamp: String,

    pub sensor_type_name: Cow<'static, str>,

    #[serde(flatten)]
    pub reading: &'a SensorReading,
}

impl<'a> TelemetryRecord<'a> {
    pub fn new(timestamp: DateTime<Utc>, reading: &'a SensorReading) -> Self {
        Self {
            timestamp: timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            sensor_type_name: sensor_type_name(reading.sensor_type),
            reading,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::protocol::SensorFamily;
    use chrono::TimeZone;

    #[test]
    fn test_record_json() {
        let mut reading = SensorReading::new(SensorFamily::Lightning, 0x1FA2, 9);
        reading.data.strike_count = Some(3);
        let timestamp = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 5).unwrap();

        let value = serde_json::to_value(TelemetryRecord::new(timestamp, &reading)).unwrap();

        assert_eq!(value["timestamp"], "2024-05-01T12:30:05.000Z");
        assert_eq!(value["sensor_type_name"], "Lightning Sensor");
        assert_eq!(value["family"], "lightning");
        assert_eq!(value["sensor_id"], 0x1FA2);
        assert_eq!(value["strike_count"], 3);
        assert!(value.get("temp_c").is_none());
    }
}
