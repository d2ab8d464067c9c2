//! CRC-16/CCITT-FALSE: polynomial 0x1021, initial value 0xFFFF, MSB first,
//! no final XOR.

use crate::codec::{CRC_SIZE, MIN_FRAME_LEN, SYNC_SIZE};

const POLY: u16 = 0x1021;
const INIT: u16 = 0xFFFF;

/// Incremental CRC-16/CCITT-FALSE hasher.
///
/// Feeding the same bytes in any split produces the same result, which lets
/// callers checksum spans that wrap around the ring buffer.
#[derive(Debug, Clone, Copy)]
pub struct Crc16 {
    value: u16,
}

impl Crc16 {
    pub const fn new() -> Self {
        Self { value: INIT }
    }

    /// Fold `data` into the running checksum.
    pub fn update(mut self, data: &[u8]) -> Self {
        for &byte in data {
            self.value ^= u16::from(byte) << 8;
            for _ in 0..8 {
                if self.value & 0x8000 != 0 {
                    self.value = (self.value << 1) ^ POLY;
                } else {
                    self.value <<= 1;
                }
            }
        }
        self
    }

    pub const fn finish(self) -> u16 {
        self.value
    }
}

impl Default for Crc16 {
    fn default() -> Self {
        Self::new()
    }
}

/// Compute the CRC-16/CCITT-FALSE of `data`.
pub fn crc16_ccitt(data: &[u8]) -> u16 {
    Crc16::new().update(data).finish()
}

/// Returns true if `data` checksums to `expected`.
pub fn verify(data: &[u8], expected: u16) -> bool {
    crc16_ccitt(data) == expected
}

/// Check the trailing CRC of a complete frame.
///
/// Only the CRC is checked; sync and length consistency are left to
/// [`validate`](crate::validate::validate). Returns false for buffers shorter
/// than a minimal frame.
pub fn verify_frame_crc(frame: &[u8]) -> bool {
    if frame.len() < MIN_FRAME_LEN {
        return false;
    }
    let crc_at = frame.len() - CRC_SIZE;
    let stored = u16::from_le_bytes([frame[crc_at], frame[crc_at + 1]]);
    verify(&frame[SYNC_SIZE..crc_at], stored)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_vector() {
        assert_eq!(crc16_ccitt(b"123456789"), 0x29B1);
    }

    #[test]
    fn empty_input_is_initial_value() {
        assert_eq!(crc16_ccitt(&[]), 0xFFFF);
    }

    #[test]
    fn incremental_matches_one_shot() {
        let data = b"the quick brown fox jumps over the lazy dog";
        for split in 0..=data.len() {
            let (a, b) = data.split_at(split);
            assert_eq!(Crc16::new().update(a).update(b).finish(), crc16_ccitt(data));
        }
    }

    #[test]
    fn verify_detects_single_bit_flip() {
        let mut data = *b"123456789";
        assert!(verify(&data, 0x29B1));
        data[4] ^= 0x01;
        assert!(!verify(&data, 0x29B1));
    }

    #[test]
    fn verify_frame_crc_on_encoded_frame() {
        let mut wire = bytes::BytesMut::new();
        crate::codec::encode_frame(0x01, 7, 0x42, b"abc", &mut wire).unwrap();
        assert!(verify_frame_crc(&wire));

        let last = wire.len() - 1;
        wire[last] ^= 0xFF;
        assert!(!verify_frame_crc(&wire));
    }

    #[test]
    fn verify_frame_crc_rejects_short_buffers() {
        assert!(!verify_frame_crc(&[0xAA, 0x55, 0x00]));
    }
}
