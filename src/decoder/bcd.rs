//! Nibble and BCD digit helpers for the packed sensor fields.

/// High nibble of `byte`
#[inline]
pub fn hi(byte: u8) -> u32 {
    (byte >> 4) as u32
}

/// Low nibble of `byte`
#[inline]
pub fn lo(byte: u8) -> u32 {
    (byte & 0x0F) as u32
}

/// Two BCD digits packed in one byte (`0x87` → 87)
#[inline]
pub fn bcd2(byte: u8) -> u32 {
    hi(byte) * 10 + lo(byte)
}

/// Three digits: both nibbles of `a` followed by the high nibble of `b`
#[inline]
pub fn bcd3_hi(a: u8, b: u8) -> u32 {
    hi(a) * 100 + lo(a) * 10 + hi(b)
}

/// Four digits: low nibble of `a`, both nibbles of `b`, high nibble of `c`
#[inline]
pub fn bcd4_mid(a: u8, b: u8, c: u8) -> u32 {
    lo(a) * 1000 + hi(b) * 100 + lo(b) * 10 + hi(c)
}

/// Four digits packed in two bytes (`0x04, 0x25` → 425)
#[inline]
pub fn bcd4(a: u8, b: u8) -> u32 {
    bcd2(a) * 100 + bcd2(b)
}

/// Six digits packed in three bytes
#[inline]
pub fn bcd6(a: u8, b: u8, c: u8) -> u32 {
    bcd2(a) * 10_000 + bcd2(b) * 100 + bcd2(c)
}
