//! # Weather Sensor RX Library
//!
//! Receive and decode Bresser 868 MHz weather sensor messages.
//!
//! This library provides payload validation and decoding for the Bresser
//! 5-in-1, 6-in-1 and 7-in-1 weather stations and their relatives (soil
//! moisture, pool thermometer, air quality, lightning and water leakage
//! sensors), plus the packet sources and telemetry log used by the
//! `weather-sensor-rx` receiver.
//!
//! # Examples
//!
//! ```
//! use weather_sensor_rx::decoder::{DecoderChain, SilentSink};
//!
//! let payload = [
//!     0x54, 0x1B, 0x21, 0x10, 0x34, 0x27, 0x18, 0xFF, 0x88, 0xFF, 0x29, 0x28, 0x06,
//!     0x42, 0x87, 0xFF, 0xF0, 0xC6, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
//! ];
//!
//! let reading = DecoderChain::default().decode(&payload, &SilentSink).unwrap();
//! assert_eq!(reading.sensor_id, 0x2110_3427);
//! ```

pub mod config;
pub mod decoder;
pub mod error;
pub mod receiver;
pub mod telemetry;
