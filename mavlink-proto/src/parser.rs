//! Incremental MAVLink v1/v2 frame parser.
//!
//! Bytes are pushed one at a time. The parser buffers a candidate frame from its
//! start marker on, and once the declared length has arrived validates the
//! checksum against the message's CRC_EXTRA. Signed MAVLink 2 frames are
//! accepted; the signature is kept but not verified.
//!
//! When a candidate is rejected (bad checksum, unknown message id, unsupported
//! flags) only its start marker is dropped and the bytes already buffered are
//! rescanned, so a real frame that started inside the rejected one is still
//! found.

use crate::crc::calculate_crc;
use crate::frame::{
    MavFrame, MavlinkVersion, CHECKSUM_LEN, HEADER_LEN_V1, HEADER_LEN_V2, IFLAG_SIGNED,
    MAVLINK_STX_V1, MAVLINK_STX_V2, MAX_FRAME_SIZE, SIGNATURE_LEN,
};
use crate::messages::crc_extra;

/// Parser error. The offending bytes have already been discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// CRC mismatch.
    CrcError,
    /// No CRC_EXTRA known for this message id; the frame cannot be validated.
    UnknownMessage(u32),
    /// MAVLink 2 incompatibility flags this parser does not understand.
    UnsupportedFlags(u8),
}

/// Parser statistics for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ParserStats {
    /// Frames decoded with a valid checksum.
    pub frames_ok: u32,
    /// Candidate frames rejected for a bad checksum.
    pub crc_errors: u32,
    /// Frames dropped because their message id is unknown.
    pub unknown_messages: u32,
    /// Frames dropped for unsupported incompatibility flags.
    pub bad_flags: u32,
}

impl ParserStats {
    fn record(&mut self, error: ParseError) {
        match error {
            ParseError::CrcError => self.crc_errors = self.crc_errors.wrapping_add(1),
            ParseError::UnknownMessage(_) => {
                self.unknown_messages = self.unknown_messages.wrapping_add(1)
            }
            ParseError::UnsupportedFlags(_) => self.bad_flags = self.bad_flags.wrapping_add(1),
        }
    }
}

/// Outcome of checking the buffer head.
enum Candidate {
    NeedMore,
    Complete { frame: MavFrame, len: usize },
    Invalid { error: ParseError, skip: usize },
}

/// MAVLink frame parser.
pub struct MavlinkParser {
    buffer: [u8; MAX_FRAME_SIZE],
    pos: usize,
    stats: ParserStats,
}

#[inline]
const fn is_start_marker(byte: u8) -> bool {
    byte == MAVLINK_STX_V1 || byte == MAVLINK_STX_V2
}

impl MavlinkParser {
    /// Create a new parser.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buffer: [0u8; MAX_FRAME_SIZE],
            pos: 0,
            stats: ParserStats {
                frames_ok: 0,
                crc_errors: 0,
                unknown_messages: 0,
                bad_flags: 0,
            },
        }
    }

    /// Drop any partial frame. Statistics are kept.
    pub fn reset(&mut self) {
        self.pos = 0;
    }

    /// Get parser statistics.
    #[must_use]
    pub fn stats(&self) -> ParserStats {
        self.stats
    }

    /// Reset parser statistics.
    pub fn reset_stats(&mut self) {
        self.stats = ParserStats::default();
    }

    /// Number of bytes currently buffered for a partial frame.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.pos
    }

    /// Feed a byte to the parser.
    ///
    /// Returns `Ok(Some(frame))` once a complete, checksum-valid frame has been
    /// received, `Ok(None)` while more bytes are needed.
    ///
    /// # Errors
    ///
    /// Returns the reason a candidate frame was rejected. The parser has already
    /// resynchronized; callers simply keep feeding bytes.
    pub fn push_byte(&mut self, byte: u8) -> Result<Option<MavFrame>, ParseError> {
        if self.pos == 0 && !is_start_marker(byte) {
            return Ok(None);
        }
        if self.pos == MAX_FRAME_SIZE {
            // Unreachable while every push is followed by advance(); keeps indexing safe.
            self.discard(1);
        }
        self.buffer[self.pos] = byte;
        self.pos += 1;
        self.advance()
    }

    /// Check the bytes already buffered for another complete frame.
    ///
    /// A frame returned by [`Self::push_byte`] can leave further complete
    /// frames behind it, for example when a rejected candidate contained
    /// several real frames. Call this until it returns `Ok(None)` to take them
    /// out without waiting for more input.
    ///
    /// # Errors
    ///
    /// Same as [`Self::push_byte`].
    pub fn poll(&mut self) -> Result<Option<MavFrame>, ParseError> {
        if self.pos == 0 {
            return Ok(None);
        }
        self.advance()
    }

    /// Evaluate the buffered bytes until a frame completes or more input is needed.
    fn advance(&mut self) -> Result<Option<MavFrame>, ParseError> {
        let mut error = None;
        loop {
            match self.buffer[..self.pos].iter().position(|&b| is_start_marker(b)) {
                Some(0) => {}
                Some(start) => self.discard(start),
                None => {
                    self.pos = 0;
                    return error.map_or(Ok(None), Err);
                }
            }

            match self.check_candidate() {
                Candidate::NeedMore => return error.map_or(Ok(None), Err),
                Candidate::Complete { frame, len } => {
                    self.discard(len);
                    self.stats.frames_ok = self.stats.frames_ok.wrapping_add(1);
                    return Ok(Some(frame));
                }
                Candidate::Invalid { error: e, skip } => {
                    self.stats.record(e);
                    self.discard(skip);
                    error = Some(e);
                }
            }
        }
    }

    /// Inspect the frame candidate starting at `buffer[0]`.
    fn check_candidate(&self) -> Candidate {
        let is_v2 = self.buffer[0] == MAVLINK_STX_V2;
        let header_len = if is_v2 { HEADER_LEN_V2 } else { HEADER_LEN_V1 };
        if self.pos < header_len {
            return Candidate::NeedMore;
        }

        let payload_len = self.buffer[1] as usize;
        let (incompat_flags, compat_flags) = if is_v2 {
            (self.buffer[2], self.buffer[3])
        } else {
            (0, 0)
        };
        if incompat_flags & !IFLAG_SIGNED != 0 {
            return Candidate::Invalid {
                error: ParseError::UnsupportedFlags(incompat_flags),
                skip: 1,
            };
        }

        let signature_len = if incompat_flags & IFLAG_SIGNED != 0 { SIGNATURE_LEN } else { 0 };
        let crc_pos = header_len + payload_len;
        let frame_len = crc_pos + CHECKSUM_LEN + signature_len;
        if self.pos < frame_len {
            return Candidate::NeedMore;
        }

        let (sequence, system_id, component_id, message_id) = if is_v2 {
            let id = (self.buffer[7] as u32)
                | ((self.buffer[8] as u32) << 8)
                | ((self.buffer[9] as u32) << 16);
            (self.buffer[4], self.buffer[5], self.buffer[6], id)
        } else {
            (self.buffer[2], self.buffer[3], self.buffer[4], self.buffer[5] as u32)
        };

        let Some(extra) = crc_extra(message_id) else {
            return Candidate::Invalid {
                error: ParseError::UnknownMessage(message_id),
                skip: 1,
            };
        };

        let calculated = calculate_crc(&self.buffer[1..crc_pos], extra);
        let received = u16::from_le_bytes([self.buffer[crc_pos], self.buffer[crc_pos + 1]]);
        if calculated != received {
            return Candidate::Invalid {
                error: ParseError::CrcError,
                skip: 1,
            };
        }

        let signature = if signature_len > 0 {
            let mut sig = [0u8; SIGNATURE_LEN];
            let sig_pos = crc_pos + CHECKSUM_LEN;
            sig.copy_from_slice(&self.buffer[sig_pos..sig_pos + SIGNATURE_LEN]);
            Some(sig)
        } else {
            None
        };

        let mut frame = if is_v2 {
            MavFrame::v2(sequence, system_id, component_id, message_id, &self.buffer[header_len..crc_pos])
        } else {
            MavFrame::v1(sequence, system_id, component_id, message_id as u8, &self.buffer[header_len..crc_pos])
        };
        if frame.version == MavlinkVersion::V2 {
            frame.incompat_flags = incompat_flags;
            frame.compat_flags = compat_flags;
        }
        frame.signature = signature;

        Candidate::Complete {
            frame,
            len: frame_len,
        }
    }

    /// Remove the first `n` buffered bytes.
    fn discard(&mut self, n: usize) {
        let n = n.min(self.pos);
        self.buffer.copy_within(n..self.pos, 0);
        self.pos -= n;
    }
}

impl Default for MavlinkParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::messages::{MavMessage, MSG_ID_HEARTBEAT};
    use std::vec::Vec;

    const HEARTBEAT_V2: [u8; 21] = [
        0xFD, 0x09, 0x00, 0x00, 0x00, 0x01, 0x01, 0x00, 0x00, 0x00, 0x05, 0x00, 0x00, 0x00, 0x02,
        0x03, 0xD1, 0x04, 0x03, 0x32, 0xAF,
    ];

    const HEARTBEAT_V1: [u8; 17] = [
        0xFE, 0x09, 0x07, 0x01, 0x01, 0x00, 0x05, 0x00, 0x00, 0x00, 0x02, 0x03, 0x51, 0x04, 0x03,
        0x41, 0x31,
    ];

    fn feed(parser: &mut MavlinkParser, bytes: &[u8]) -> (Vec<MavFrame>, Vec<ParseError>) {
        let mut frames = Vec::new();
        let mut errors = Vec::new();
        for &b in bytes {
            match parser.push_byte(b) {
                Ok(Some(frame)) => frames.push(frame),
                Ok(None) => {}
                Err(e) => errors.push(e),
            }
        }
        (frames, errors)
    }

    #[test]
    fn test_parser_ignores_noise_before_start() {
        let mut parser = MavlinkParser::new();
        assert!(parser.push_byte(0x00).unwrap().is_none());
        assert!(parser.push_byte(0x42).unwrap().is_none());
        assert_eq!(parser.buffered(), 0);
    }

    #[test]
    fn test_parse_heartbeat_v2() {
        let mut parser = MavlinkParser::new();
        let (frames, errors) = feed(&mut parser, &HEARTBEAT_V2);
        assert!(errors.is_empty());
        assert_eq!(frames.len(), 1);

        let frame = &frames[0];
        assert_eq!(frame.version, MavlinkVersion::V2);
        assert_eq!(frame.system_id, 1);
        assert_eq!(frame.component_id, 1);
        assert_eq!(frame.message_id, MSG_ID_HEARTBEAT);
        match frame.decode() {
            MavMessage::Heartbeat(hb) => {
                assert!(hb.is_armed());
                assert_eq!(hb.custom_mode, 5);
            }
            other => panic!("unexpected message {:?}", other),
        }
        assert_eq!(parser.stats().frames_ok, 1);
        assert_eq!(parser.buffered(), 0);
    }

    #[test]
    fn test_parse_heartbeat_v1() {
        let mut parser = MavlinkParser::new();
        let (frames, _) = feed(&mut parser, &HEARTBEAT_V1);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].version, MavlinkVersion::V1);
        assert_eq!(frames[0].sequence, 7);
    }

    #[test]
    fn test_frame_split_across_pushes() {
        let mut parser = MavlinkParser::new();
        let (frames, _) = feed(&mut parser, &HEARTBEAT_V2[..11]);
        assert!(frames.is_empty());
        assert_eq!(parser.buffered(), 11);
        let (frames, _) = feed(&mut parser, &HEARTBEAT_V2[11..]);
        assert_eq!(frames.len(), 1);
    }

    #[test]
    fn test_crc_error_then_recovery() {
        let mut corrupt = HEARTBEAT_V2;
        corrupt[12] ^= 0x40;

        let mut parser = MavlinkParser::new();
        let (frames, errors) = feed(&mut parser, &corrupt);
        assert!(frames.is_empty());
        assert_eq!(errors, [ParseError::CrcError]);
        assert_eq!(parser.stats().crc_errors, 1);

        let (frames, _) = feed(&mut parser, &HEARTBEAT_V2);
        assert_eq!(frames.len(), 1);
    }

    #[test]
    fn test_false_start_marker_does_not_swallow_frame() {
        // A stray STX with a large length byte would otherwise eat the real frame
        let mut stream = Vec::from([0xFE, 0xC8, 0x13]);
        stream.extend_from_slice(&HEARTBEAT_V2);
        // Pad so the bogus candidate reaches its declared length
        stream.extend(core::iter::repeat(0x55).take(220));

        let mut parser = MavlinkParser::new();
        let (frames, errors) = feed(&mut parser, &stream);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].message_id, MSG_ID_HEARTBEAT);
        assert!(errors.is_empty(), "recovered frame wins over the rejection");
        assert_eq!(parser.stats().crc_errors, 1);
    }

    #[test]
    fn test_poll_drains_frames_behind_rejected_candidate() {
        // A false v1 candidate declaring 40 payload bytes spans both heartbeats
        let mut stream = Vec::from([0xFE, 0x28, 0x00, 0x00, 0x00, 0x00]);
        stream.extend_from_slice(&HEARTBEAT_V2);
        stream.extend_from_slice(&HEARTBEAT_V2);

        let mut parser = MavlinkParser::new();
        let (frames, errors) = feed(&mut parser, &stream);
        assert!(errors.is_empty());
        assert_eq!(frames.len(), 1);
        assert_eq!(parser.stats().crc_errors, 1);
        assert_eq!(parser.buffered(), HEARTBEAT_V2.len());

        let second = parser.poll().unwrap().expect("second heartbeat");
        assert_eq!(second, frames[0]);
        assert_eq!(parser.poll(), Ok(None));
        assert_eq!(parser.buffered(), 0);
        assert_eq!(parser.stats().frames_ok, 2);
    }

    #[test]
    fn test_poll_on_partial_frame_needs_more() {
        let mut parser = MavlinkParser::new();
        assert_eq!(parser.poll(), Ok(None));
        feed(&mut parser, &HEARTBEAT_V2[..12]);
        assert_eq!(parser.poll(), Ok(None));
        assert_eq!(parser.buffered(), 12);
    }

    #[test]
    fn test_back_to_back_frames() {
        let mut stream = Vec::from(HEARTBEAT_V1);
        stream.extend_from_slice(&HEARTBEAT_V2);
        stream.extend_from_slice(&HEARTBEAT_V1);
        let mut parser = MavlinkParser::new();
        let (frames, errors) = feed(&mut parser, &stream);
        assert!(errors.is_empty());
        assert_eq!(frames.len(), 3);
    }

    #[test]
    fn test_unknown_message_rejected() {
        // v2 frame with message id 60000 and a payload containing a start marker
        let mut stream = Vec::from([0xFD, 0x03, 0x00, 0x00, 0x00, 0x01, 0x01, 0x60, 0xEA, 0x00]);
        stream.extend_from_slice(&[0xFE, 0x01, 0x02, 0x12, 0x34]);
        stream.extend_from_slice(&HEARTBEAT_V2);

        let mut parser = MavlinkParser::new();
        let (frames, errors) = feed(&mut parser, &stream);
        // The marker inside the payload is tried too, and fails its checksum
        assert_eq!(errors, [ParseError::UnknownMessage(60_000), ParseError::CrcError]);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].message_id, MSG_ID_HEARTBEAT);
        assert_eq!(parser.stats().unknown_messages, 1);
        assert_eq!(parser.stats().crc_errors, 1);
    }

    #[test]
    fn test_unsupported_incompat_flags() {
        let mut bad = HEARTBEAT_V2;
        bad[2] = 0x02;
        let mut parser = MavlinkParser::new();
        let (frames, errors) = feed(&mut parser, &bad);
        assert!(frames.is_empty());
        assert_eq!(errors, [ParseError::UnsupportedFlags(0x02)]);
    }

    #[test]
    fn test_signed_frame_passes_signature_through() {
        let mut signed = Vec::from(HEARTBEAT_V2);
        signed[2] = IFLAG_SIGNED;
        // The checksum covers the flags byte, so recompute it
        let crc = calculate_crc(&signed[1..19], 50).to_le_bytes();
        signed[19] = crc[0];
        signed[20] = crc[1];
        signed.extend_from_slice(&[0x11; SIGNATURE_LEN]);

        let mut parser = MavlinkParser::new();
        let (frames, errors) = feed(&mut parser, &signed);
        assert!(errors.is_empty());
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].signature, Some([0x11; SIGNATURE_LEN]));

        let mut out = [0u8; MAX_FRAME_SIZE];
        let len = frames[0].serialize(&mut out).unwrap();
        assert_eq!(&out[..len], signed.as_slice());
    }

    #[test]
    fn test_reset_drops_partial_frame() {
        let mut parser = MavlinkParser::new();
        feed(&mut parser, &HEARTBEAT_V2[..8]);
        parser.reset();
        assert_eq!(parser.buffered(), 0);
        let (frames, _) = feed(&mut parser, &HEARTBEAT_V2);
        assert_eq!(frames.len(), 1);
    }
}
