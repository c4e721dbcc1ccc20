//! Decoded MAVLink frame and its serializer.

use heapless::Vec;

use crate::crc::X25Digest;
use crate::messages::{crc_extra, MavMessage};

/// MAVLink 1 start byte.
pub const MAVLINK_STX_V1: u8 = 0xFE;

/// MAVLink 2 start byte.
pub const MAVLINK_STX_V2: u8 = 0xFD;

/// MAVLink 1 header length, start byte included.
pub const HEADER_LEN_V1: usize = 6;

/// MAVLink 2 header length, start byte included.
pub const HEADER_LEN_V2: usize = 10;

/// Checksum length.
pub const CHECKSUM_LEN: usize = 2;

/// MAVLink 2 signature trailer length.
pub const SIGNATURE_LEN: usize = 13;

/// Largest payload a frame can carry.
pub const MAX_PAYLOAD_LEN: usize = 255;

/// Maximum MAVLink frame size (signed MAVLink 2 with a full payload).
pub const MAX_FRAME_SIZE: usize = HEADER_LEN_V2 + MAX_PAYLOAD_LEN + CHECKSUM_LEN + SIGNATURE_LEN;

/// Incompatibility flag: frame carries a signature trailer.
pub const IFLAG_SIGNED: u8 = 0x01;

/// Protocol generation of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MavlinkVersion {
    V1,
    V2,
}

/// Error type for serialization operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SerializeError {
    /// The output buffer is too small to hold the serialized frame.
    BufferTooSmall,
    /// No CRC_EXTRA is known for the frame's message id.
    UnknownMessage,
}

impl core::fmt::Display for SerializeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::BufferTooSmall => write!(f, "buffer too small"),
            Self::UnknownMessage => write!(f, "unknown message id"),
        }
    }
}

/// One complete, checksum-valid MAVLink frame.
///
/// Holds the header fields verbatim so that [`MavFrame::serialize`] reproduces
/// the bytes the frame was decoded from, signature trailer included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MavFrame {
    pub version: MavlinkVersion,
    pub sequence: u8,
    pub system_id: u8,
    pub component_id: u8,
    pub message_id: u32,
    /// MAVLink 2 incompatibility flags (always 0 for MAVLink 1).
    pub incompat_flags: u8,
    /// MAVLink 2 compatibility flags (always 0 for MAVLink 1).
    pub compat_flags: u8,
    pub payload: Vec<u8, MAX_PAYLOAD_LEN>,
    /// Signature trailer, passed through unverified.
    pub signature: Option<[u8; SIGNATURE_LEN]>,
}

impl MavFrame {
    /// Create an unsigned MAVLink 2 frame.
    ///
    /// Payloads longer than [`MAX_PAYLOAD_LEN`] are truncated.
    #[must_use]
    pub fn v2(sequence: u8, system_id: u8, component_id: u8, message_id: u32, payload: &[u8]) -> Self {
        Self {
            version: MavlinkVersion::V2,
            sequence,
            system_id,
            component_id,
            message_id,
            incompat_flags: 0,
            compat_flags: 0,
            payload: Self::payload_from(payload),
            signature: None,
        }
    }

    /// Create a MAVLink 1 frame. Only the low byte of `message_id` is representable.
    #[must_use]
    pub fn v1(sequence: u8, system_id: u8, component_id: u8, message_id: u8, payload: &[u8]) -> Self {
        Self {
            version: MavlinkVersion::V1,
            sequence,
            system_id,
            component_id,
            message_id: message_id as u32,
            incompat_flags: 0,
            compat_flags: 0,
            payload: Self::payload_from(payload),
            signature: None,
        }
    }

    fn payload_from(payload: &[u8]) -> Vec<u8, MAX_PAYLOAD_LEN> {
        let len = payload.len().min(MAX_PAYLOAD_LEN);
        let mut vec = Vec::new();
        // Cannot fail: len is clamped to capacity
        let _ = vec.extend_from_slice(&payload[..len]);
        vec
    }

    /// Typed view of the payload.
    #[must_use]
    pub fn decode(&self) -> MavMessage {
        MavMessage::decode(self.message_id, &self.payload)
    }

    /// Length of the serialized frame in bytes.
    #[must_use]
    pub fn wire_len(&self) -> usize {
        let header = match self.version {
            MavlinkVersion::V1 => HEADER_LEN_V1,
            MavlinkVersion::V2 => HEADER_LEN_V2,
        };
        let signature = if self.signature.is_some() { SIGNATURE_LEN } else { 0 };
        header + self.payload.len() + CHECKSUM_LEN + signature
    }

    /// Serialize the frame into `buf`, recomputing the checksum.
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// [`SerializeError::BufferTooSmall`] if `buf` is shorter than [`Self::wire_len`],
    /// [`SerializeError::UnknownMessage`] if no CRC_EXTRA is known for the id.
    pub fn serialize(&self, buf: &mut [u8]) -> Result<usize, SerializeError> {
        let extra = crc_extra(self.message_id).ok_or(SerializeError::UnknownMessage)?;
        let len = self.wire_len();
        if buf.len() < len {
            return Err(SerializeError::BufferTooSmall);
        }

        let payload_len = self.payload.len() as u8;
        let header_len = match self.version {
            MavlinkVersion::V1 => {
                buf[..HEADER_LEN_V1].copy_from_slice(&[
                    MAVLINK_STX_V1,
                    payload_len,
                    self.sequence,
                    self.system_id,
                    self.component_id,
                    self.message_id as u8,
                ]);
                HEADER_LEN_V1
            }
            MavlinkVersion::V2 => {
                let id = self.message_id.to_le_bytes();
                let incompat = if self.signature.is_some() {
                    self.incompat_flags | IFLAG_SIGNED
                } else {
                    self.incompat_flags & !IFLAG_SIGNED
                };
                buf[..HEADER_LEN_V2].copy_from_slice(&[
                    MAVLINK_STX_V2,
                    payload_len,
                    incompat,
                    self.compat_flags,
                    self.sequence,
                    self.system_id,
                    self.component_id,
                    id[0],
                    id[1],
                    id[2],
                ]);
                HEADER_LEN_V2
            }
        };

        let crc_pos = header_len + self.payload.len();
        buf[header_len..crc_pos].copy_from_slice(&self.payload);

        let mut digest = X25Digest::new();
        digest.update_slice(&buf[1..crc_pos]);
        digest.update(extra);
        buf[crc_pos..crc_pos + CHECKSUM_LEN].copy_from_slice(&digest.finalize().to_le_bytes());

        if let Some(signature) = &self.signature {
            let sig_pos = crc_pos + CHECKSUM_LEN;
            buf[sig_pos..sig_pos + SIGNATURE_LEN].copy_from_slice(signature);
        }

        Ok(len)
    }
}
