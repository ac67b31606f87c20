//! # Decoder Dispatch
//!
//! Bresser frames carry no family marker, so a received payload is offered
//! to each enabled decoder in a fixed priority order until one accepts it.

use std::fmt;

use super::diagnostics::DiagnosticSink;
use super::protocol::SensorFamily;
use super::reading::SensorReading;
use super::{decoder_for, PayloadDecoder};
use crate::error::DecodeError;

/// Ordered list of payload decoders
pub struct DecoderChain {
    decoders: Vec<Box<dyn PayloadDecoder>>,
}

impl fmt::Debug for DecoderChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecoderChain")
            .field("families", &self.families())
            .finish()
    }
}

impl Default for DecoderChain {
    fn default() -> Self {
        Self::with_families(&SensorFamily::PRIORITY)
    }
}

impl DecoderChain {
    /// Chain of the enabled families, in dispatch priority order
    ///
    /// The order of `enabled` does not matter; duplicates are ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use weather_sensor_rx::decoder::{DecoderChain, SensorFamily};
    ///
    /// let chain = DecoderChain::with_families(&[SensorFamily::Leakage, SensorFamily::Weather6In1]);
    /// assert_eq!(chain.families(), vec![SensorFamily::Weather6In1, SensorFamily::Leakage]);
    /// ```
    pub fn with_families(enabled: &[SensorFamily]) -> Self {
        let decoders = SensorFamily::PRIORITY
            .iter()
            .filter(|family| enabled.contains(family))
            .map(|&family| decoder_for(family))
            .collect();

        Self { decoders }
    }

    /// Chain with caller-supplied decoders, tried in the given order
    pub fn from_decoders(decoders: Vec<Box<dyn PayloadDecoder>>) -> Self {
        Self { decoders }
    }

    /// Families in the order they are tried
    pub fn families(&self) -> Vec<SensorFamily> {
        self.decoders.iter().map(|d| d.family()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }

    /// Decode `payload` with the first decoder that accepts it
    ///
    /// Stops at the first success or [`DecodeError::Skip`]. If every
    /// decoder rejects the payload, the error of the last one is returned.
    ///
    /// # Errors
    ///
    /// [`DecodeError::NoDecoder`] if the chain is empty, otherwise the last
    /// decoder's error.
    pub fn decode(
        &self,
        payload: &[u8],
        diag: &dyn DiagnosticSink,
    ) -> Result<SensorReading, DecodeError> {
        let mut last = DecodeError::NoDecoder;

        for decoder in &self.decoders {
            match decoder.decode(payload, diag) {
                Ok(reading) => return Ok(reading),
                Err(DecodeError::Skip) => return Err(DecodeError::Skip),
                Err(e) => last = e,
            }
        }

        Err(last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::diagnostics::SilentSink;
    use crate::decoder::protocol::DecodeStatus;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const MSG_5IN1: [u8; 26] = [
        0xEA, 0xEC, 0x7F, 0xEB, 0x5F, 0xEE, 0xEF, 0xFA, 0xFE, 0x76, 0xBB, 0xFA, 0xFF, 0x15,
        0x13, 0x80, 0x14, 0xA0, 0x11, 0x10, 0x05, 0x01, 0x89, 0x44, 0x05, 0x00,
    ];
    const MSG_6IN1: [u8; 26] = [
        0x54, 0x1B, 0x21, 0x10, 0x34, 0x27, 0x18, 0xFF, 0x88, 0xFF, 0x29, 0x28, 0x06, 0x42,
        0x87, 0xFF, 0xF0, 0xC6, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    ];
    const MSG_7IN1: [u8; 26] = [
        0xC4, 0xD6, 0x3A, 0xC5, 0xBD, 0xFA, 0x18, 0xAA, 0xAA, 0xAA, 0xAA, 0xAB, 0xFC, 0xAA,
        0x98, 0xDA, 0x89, 0xA3, 0x2F, 0xEC, 0xAF, 0x9A, 0xAA, 0xAA, 0xAA, 0x00,
    ];
    const MSG_LIGHTNING: [u8; 26] = [
        0x73, 0x69, 0xB5, 0x08, 0xAA, 0xA2, 0x90, 0xAA, 0xAA, 0xAA, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x00, 0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    ];
    const MSG_LEAKAGE: [u8; 26] = [
        0xC7, 0x70, 0x35, 0x97, 0x04, 0x08, 0x57, 0x70, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x03, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    ];

    /// Decoder returning a fixed result and counting calls
    struct FixedDecoder {
        result: Result<(), DecodeError>,
        calls: Arc<AtomicUsize>,
    }

    impl PayloadDecoder for FixedDecoder {
        fn family(&self) -> SensorFamily {
            SensorFamily::Weather6In1
        }

        fn decode(
            &self,
            _payload: &[u8],
            _diag: &dyn DiagnosticSink,
        ) -> Result<SensorReading, DecodeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result
                .clone()
                .map(|_| SensorReading::new(SensorFamily::Weather6In1, 1, 1))
        }
    }

    fn fixed(result: Result<(), DecodeError>) -> (Box<dyn PayloadDecoder>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let decoder = FixedDecoder {
            result,
            calls: Arc::clone(&calls),
        };
        (Box::new(decoder), calls)
    }

    #[test]
    fn test_default_order() {
        assert_eq!(DecoderChain::default().families(), SensorFamily::PRIORITY.to_vec());
    }

    #[test]
    fn test_each_capture_reaches_its_decoder() {
        let chain = DecoderChain::default();
        let cases = [
            (&MSG_5IN1, SensorFamily::Weather5In1),
            (&MSG_6IN1, SensorFamily::Weather6In1),
            (&MSG_7IN1, SensorFamily::Weather7In1),
            (&MSG_LIGHTNING, SensorFamily::Lightning),
            (&MSG_LEAKAGE, SensorFamily::Leakage),
        ];

        for (msg, family) in cases {
            let reading = chain.decode(msg, &SilentSink).unwrap();
            assert_eq!(reading.family, family);
        }
    }

    #[test]
    fn test_disabled_family_is_not_tried() {
        let chain = DecoderChain::with_families(&[SensorFamily::Weather7In1, SensorFamily::Leakage]);
        let result = chain.decode(&MSG_6IN1, &SilentSink);
        assert!(matches!(result, Err(DecodeError::Checksum { .. })));
    }

    #[test]
    fn test_all_fail_reports_last_error() {
        let chain = DecoderChain::default();

        // Zero buffer passes the leakage CRC and fails its sanity checks
        let (status, reading) = DecodeStatus::of(chain.decode(&[0x00; 26], &SilentSink));
        assert_eq!(status, DecodeStatus::InvalidInput);
        assert!(reading.is_none());

        let (status, reading) = DecodeStatus::of(chain.decode(&[0xFF; 26], &SilentSink));
        assert_eq!(status, DecodeStatus::ChecksumError);
        assert!(reading.is_none());
    }

    #[test]
    fn test_empty_chain() {
        let chain = DecoderChain::with_families(&[]);
        assert!(chain.is_empty());
        assert_eq!(chain.decode(&MSG_6IN1, &SilentSink), Err(DecodeError::NoDecoder));
    }

    #[test]
    fn test_stops_at_first_success() {
        let (first, first_calls) = fixed(Err(DecodeError::Digest { expected: 1, actual: 2 }));
        let (second, second_calls) = fixed(Ok(()));
        let (third, third_calls) = fixed(Ok(()));
        let chain = DecoderChain::from_decoders(vec![first, second, third]);

        assert!(chain.decode(&[0; 26], &SilentSink).is_ok());
        assert_eq!(first_calls.load(Ordering::SeqCst), 1);
        assert_eq!(second_calls.load(Ordering::SeqCst), 1);
        assert_eq!(third_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_skip_stops_chain() {
        let (first, _) = fixed(Err(DecodeError::Skip));
        let (second, second_calls) = fixed(Ok(()));
        let chain = DecoderChain::from_decoders(vec![first, second]);

        assert_eq!(chain.decode(&[0; 26], &SilentSink), Err(DecodeError::Skip));
        assert_eq!(second_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_debug_lists_families() {
        let chain = DecoderChain::with_families(&[SensorFamily::Lightning]);
        assert_eq!(format!("{:?}", chain), "DecoderChain { families: [Lightning] }");
    }
}
