//! # Checksum and Digest Primitives
//!
//! Integrity checks used by the Bresser payload formats:
//!
//! - 8-bit additive checksum (6-in-1)
//! - LFSR-16 keyed digest (6-in-1, 7-in-1, lightning)
//! - CRC16/XMODEM, table driven (leakage)
//! - Bit population count (5-in-1)
//!
//! The LFSR digest follows the rtl_433 reference bit for bit; deployed
//! transmitters depend on it.

use super::protocol::{CRC16_XMODEM_INIT, CRC16_XMODEM_POLY, WHITENING_MASK};

/// Precomputed CRC16/XMODEM lookup table
const CRC16_XMODEM_TABLE: [u16; 256] = generate_crc16_table(CRC16_XMODEM_POLY);

/// Generate a CRC16 lookup table at compile time
const fn generate_crc16_table(poly: u16) -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut i = 0;

    while i < 256 {
        let mut crc = (i as u16) << 8;
        let mut j = 0;

        while j < 8 {
            if (crc & 0x8000) != 0 {
                crc = (crc << 1) ^ poly;
            } else {
                crc <<= 1;
            }
            j += 1;
        }

        table[i] = crc;
        i += 1;
    }

    table
}

/// Sum of all bytes (wrapping) in `data`
///
/// Callers compare the low byte against a family-specific sentinel.
pub fn add_bytes(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |acc, &b| acc.wrapping_add(b))
}

/// Keyed LFSR-16 digest
///
/// Each byte is processed MSB first. For every set data bit the current
/// key is XORed into the accumulator; then the key is rolled right by one,
/// feeding the generator back in when the dropped bit was set.
///
/// # Examples
///
/// ```
/// use weather_sensor_rx::decoder::digest::lfsr_digest16;
///
/// // A single set bit yields the key itself
/// assert_eq!(lfsr_digest16(&[0x80], 0x8810, 0x5412), 0x5412);
/// assert_eq!(lfsr_digest16(&[0x00; 8], 0x8810, 0x5412), 0);
/// ```
pub fn lfsr_digest16(data: &[u8], generator: u16, key: u16) -> u16 {
    let mut sum: u16 = 0;
    let mut key = key;

    for &byte in data {
        for bit in (0..8).rev() {
            if (byte >> bit) & 1 == 1 {
                sum ^= key;
            }

            // Roll the key right; the dropped LSB is reinserted via the generator
            if key & 1 == 1 {
                key = (key >> 1) ^ generator;
            } else {
                key >>= 1;
            }
        }
    }

    sum
}

/// CRC16/XMODEM (poly 0x1021, init 0x0000) using the lookup table
///
/// MSB first, no reflection, no final XOR.
///
/// # Examples
///
/// ```
/// use weather_sensor_rx::decoder::digest::crc16_xmodem;
///
/// assert_eq!(crc16_xmodem(b"123456789"), 0x31C3);
/// ```
pub fn crc16_xmodem(data: &[u8]) -> u16 {
    let mut crc = CRC16_XMODEM_INIT;

    for &byte in data {
        let index = ((crc >> 8) as u8 ^ byte) as usize;
        crc = (crc << 8) ^ CRC16_XMODEM_TABLE[index];
    }

    crc
}

/// Number of set bits across `data`
pub fn count_bits(data: &[u8]) -> u32 {
    data.iter().map(|b| b.count_ones()).sum()
}

/// Copy of `data` with the whitening mask removed from every byte
pub fn dewhiten(data: &[u8]) -> Vec<u8> {
    data.iter().map(|b| b ^ WHITENING_MASK).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Bitwise CRC16 reference for the lookup table
    fn crc16_bitwise(data: &[u8], polynomial: u16, init: u16) -> u16 {
        let mut crc = init;

        for &byte in data {
            crc ^= (byte as u16) << 8;

            for _ in 0..8 {
                if (crc & 0x8000) != 0 {
                    crc = (crc << 1) ^ polynomial;
                } else {
                    crc <<= 1;
                }
            }
        }

        crc
    }

    #[test]
    fn test_add_bytes_wraps() {
        assert_eq!(add_bytes(&[]), 0);
        assert_eq!(add_bytes(&[0x01, 0x02, 0x03]), 0x06);
        assert_eq!(add_bytes(&[0xFF, 0x02]), 0x01);
    }

    #[test]
    fn test_add_bytes_6in1_frame() {
        // bytes 2..18 of a captured 6-in-1 frame sum to 0xFF
        let frame = [
            0x54, 0x1B, 0x21, 0x10, 0x34, 0x27, 0x18, 0xFF, 0x88, 0xFF, 0x29, 0x28, 0x06, 0x42,
            0x87, 0xFF, 0xF0, 0xC6,
        ];
        assert_eq!(add_bytes(&frame[2..18]), 0xFF);
    }

    #[test]
    fn test_lfsr_digest_known_frames() {
        let frame = [
            0x54, 0x1B, 0x21, 0x10, 0x34, 0x27, 0x18, 0xFF, 0x88, 0xFF, 0x29, 0x28, 0x06, 0x42,
            0x87, 0xFF, 0xF0, 0xC6,
        ];
        assert_eq!(lfsr_digest16(&frame[2..17], 0x8810, 0x5412), 0x541B);

        let frame = [
            0x2A, 0xAF, 0x21, 0x10, 0x34, 0x27, 0x18, 0xFF, 0xAA, 0xFF, 0x29, 0x28, 0xFF, 0xBB,
            0x89, 0xFF, 0x01, 0x1F,
        ];
        assert_eq!(lfsr_digest16(&frame[2..17], 0x8810, 0x5412), 0x2AAF);
    }

    #[test]
    fn test_lfsr_digest_single_bit_changes_result() {
        let data = [0x21, 0x10, 0x34, 0x27, 0x18];
        let reference = lfsr_digest16(&data, 0x8810, 0x5412);

        for i in 0..data.len() {
            for bit in 0..8 {
                let mut corrupted = data;
                corrupted[i] ^= 1 << bit;
                assert_ne!(
                    lfsr_digest16(&corrupted, 0x8810, 0x5412),
                    reference,
                    "bit {} of byte {} not detected",
                    bit,
                    i
                );
            }
        }
    }

    #[test]
    fn test_crc16_xmodem_check_value() {
        // Standard catalogue check value for "123456789"
        assert_eq!(crc16_bitwise(b"123456789", 0x1021, 0x0000), 0x31C3);
        assert_eq!(crc16_xmodem(b"123456789"), 0x31C3);
    }

    #[test]
    fn test_crc16_leakage_frame() {
        let frame = [0xC7, 0x70, 0x35, 0x97, 0x04, 0x08, 0x57, 0x70];
        assert_eq!(crc16_xmodem(&frame[2..7]), 0xC770);
    }

    #[test]
    fn test_crc16_lookup_table_matches_bitwise() {
        let test_data = [
            vec![0x01, 0x02, 0x03],
            vec![0xFF, 0xFE, 0xFD],
            vec![0x35, 0x97, 0x04, 0x08, 0x57],
            vec![0x00; 24],
            vec![0xFF; 10],
        ];

        for data in test_data.iter() {
            assert_eq!(
                crc16_xmodem(data),
                crc16_bitwise(data, CRC16_XMODEM_POLY, CRC16_XMODEM_INIT),
                "CRC mismatch for data: {:?}",
                data
            );
        }
    }

    #[test]
    fn test_crc16_init_value() {
        assert_eq!(crc16_xmodem(&[]), CRC16_XMODEM_INIT);
        assert_eq!(crc16_bitwise(&[], 0x1021, 0xFFFF), 0xFFFF);
    }

    #[test]
    fn test_count_bits() {
        assert_eq!(count_bits(&[]), 0);
        assert_eq!(count_bits(&[0xFF, 0x01, 0x80]), 10);
        assert_eq!(count_bits(&[0xFF; 12]), 96);
    }

    #[test]
    fn test_dewhiten_is_involution() {
        let raw = [0xC4, 0xD6, 0x3A, 0x00, 0xFF];
        let plain = dewhiten(&raw);
        assert_eq!(plain, vec![0x6E, 0x7C, 0x90, 0xAA, 0x55]);
        assert_eq!(dewhiten(&plain), raw.to_vec());
    }
}
