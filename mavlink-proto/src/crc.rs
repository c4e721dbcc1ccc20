//! MAVLink frame checksum.
//!
//! MAVLink's "X.25" checksum is CRC-16/MCRF4XX: polynomial 0x1021 (reflected),
//! seed 0xFFFF, no final xor. Every message id additionally folds a CRC_EXTRA
//! byte into the checksum after the payload.

use crc::{Crc, CRC_16_MCRF4XX};

/// CRC-16/MCRF4XX calculator with 256-entry lookup table.
const X25: Crc<u16> = Crc::<u16>::new(&CRC_16_MCRF4XX);

/// Calculate the checksum of a frame body (header without start marker, then
/// payload) followed by the message's CRC_EXTRA byte.
#[inline]
#[must_use]
pub fn calculate_crc(data: &[u8], crc_extra: u8) -> u16 {
    let mut digest = X25Digest::new();
    digest.update_slice(data);
    digest.update(crc_extra);
    digest.finalize()
}

/// Incremental checksum, for callers that assemble a frame piecewise.
pub struct X25Digest {
    digest: crc::Digest<'static, u16>,
}

impl X25Digest {
    /// Create a new digest seeded with 0xFFFF.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            digest: X25.digest(),
        }
    }

    /// Update the digest with a single byte.
    #[inline]
    pub fn update(&mut self, byte: u8) {
        self.digest.update(&[byte]);
    }

    /// Update the digest with a byte slice.
    #[inline]
    pub fn update_slice(&mut self, data: &[u8]) {
        self.digest.update(data);
    }

    /// Finalize and return the checksum value.
    #[inline]
    #[must_use]
    pub fn finalize(self) -> u16 {
        self.digest.finalize()
    }
}

impl Default for X25Digest {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_x25_check_value() {
        // Catalog check value for "123456789"; the last byte stands in for CRC_EXTRA.
        assert_eq!(calculate_crc(b"12345678", b'9'), 0x6F91);
    }

    #[test]
    fn test_heartbeat_checksum() {
        // v2 HEARTBEAT body from sysid 1 / compid 1, CRC_EXTRA 50
        let body = [
            0x09, 0x00, 0x00, 0x00, 0x01, 0x01, 0x00, 0x00, 0x00, // header
            0x05, 0x00, 0x00, 0x00, 0x02, 0x03, 0xD1, 0x04, 0x03, // payload
        ];
        assert_eq!(calculate_crc(&body, 50), 0xAF32);
    }

    #[test]
    fn test_digest_matches_batch() {
        let data = b"mavlink frame body";
        let mut digest = X25Digest::new();
        for &b in data.iter() {
            digest.update(b);
        }
        digest.update(42);
        assert_eq!(digest.finalize(), calculate_crc(data, 42));
    }
}
