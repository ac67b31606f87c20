//! # Bresser Frame Encoder
//!
//! Builds valid payloads from plain field bytes, the way a sensor
//! transmitter does. The decoder tests use it for variants without a
//! captured sample.
//!
//! Every function takes a 26-byte frame with the measurement fields already
//! in place and fills in the integrity bytes (and whitening, where the
//! family uses it).

use super::digest::{add_bytes, count_bits, crc16_xmodem, lfsr_digest16};
use super::protocol::*;

/// Payload buffer as handed to the decoders (sync word stripped)
pub type Frame = [u8; PAYLOAD_SIZE];

/// Fill in digest (bytes 0-1) and additive checksum (byte 17) of a 6-in-1 frame
///
/// # Examples
///
/// ```
/// use weather_sensor_rx::decoder::encoder::seal_6in1;
/// use weather_sensor_rx::decoder::digest::add_bytes;
///
/// let mut frame = [0u8; 26];
/// frame[2..7].copy_from_slice(&[0x21, 0x10, 0x34, 0x27, 0x18]);
/// let sealed = seal_6in1(frame);
/// assert_eq!(add_bytes(&sealed[2..18]), 0xFF);
/// ```
pub fn seal_6in1(mut frame: Frame) -> Frame {
    let sum = add_bytes(&frame[2..17]);
    frame[17] = CHECKSUM_6IN1_EXPECTED.wrapping_sub(sum);

    let digest = lfsr_digest16(&frame[2..2 + DIGEST_6IN1_LEN], LFSR_GENERATOR, DIGEST_6IN1_KEY);
    frame[..2].copy_from_slice(&digest.to_be_bytes());

    frame
}

/// Fill in bit count (byte 13) and complemented first half of a 5-in-1 frame
///
/// Only bytes 14..26 of the input are used.
pub fn seal_5in1(mut frame: Frame) -> Frame {
    frame[HALF_5IN1_SIZE] = count_bits(&frame[HALF_5IN1_SIZE + 1..]) as u8;

    for col in 0..HALF_5IN1_SIZE {
        frame[col] = !frame[col + HALF_5IN1_SIZE];
    }

    frame
}

/// Digest and whiten a 7-in-1 frame
///
/// `plain` holds the de-whitened fields; `type_byte` is the on-air value of
/// byte 6 (sensor type, startup flag, channel), which receivers read before
/// removing the whitening.
pub fn seal_7in1(plain: Frame, type_byte: u8) -> Frame {
    seal_whitened(
        plain,
        type_byte,
        DIGEST_7IN1_LEN,
        DIGEST_7IN1_KEY,
        DIGEST_7IN1_FINAL_XOR,
    )
}

/// Digest and whiten a lightning frame, see [`seal_7in1`]
pub fn seal_lightning(plain: Frame, type_byte: u8) -> Frame {
    seal_whitened(
        plain,
        type_byte,
        DIGEST_LIGHTNING_LEN,
        DIGEST_LIGHTNING_KEY,
        DIGEST_LIGHTNING_FINAL_XOR,
    )
}

/// Fill in the CRC16/XMODEM (bytes 0-1) of a leakage frame
pub fn seal_leakage(mut frame: Frame) -> Frame {
    let crc = crc16_xmodem(&frame[2..2 + CRC_LEAKAGE_LEN]);
    frame[..2].copy_from_slice(&crc.to_be_bytes());
    frame
}

fn seal_whitened(mut plain: Frame, type_byte: u8, len: usize, key: u16, final_xor: u16) -> Frame {
    plain[6] = type_byte ^ WHITENING_MASK;

    let digest = lfsr_digest16(&plain[2..2 + len], LFSR_GENERATOR, key) ^ final_xor;
    plain[..2].copy_from_slice(&digest.to_be_bytes());

    plain.map(|b| b ^ WHITENING_MASK)
}
