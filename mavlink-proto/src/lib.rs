//! MAVLink frame codec.
//!
//! Chip-agnostic, allocation-free MAVLink v1/v2 framing: an incremental parser
//! that resynchronizes on corrupt input, a serializer that reproduces frames
//! byte for byte, and typed views of the handful of messages a radio link
//! bridge needs to inspect.
//!
//! # Example
//!
//! ```ignore
//! use mavlink_proto::{MavlinkParser, MavMessage};
//!
//! let mut parser = MavlinkParser::new();
//!
//! // Feed bytes from UART
//! for byte in uart_bytes {
//!     if let Ok(Some(frame)) = parser.push_byte(byte) {
//!         if let MavMessage::Heartbeat(hb) = frame.decode() {
//!             // hb.is_armed() ...
//!         }
//!     }
//! }
//! ```
//!
//! # UART Configuration
//!
//! MAVLink commonly uses:
//! - 57600 baud for telemetry radios
//! - 115200 baud for direct serial connections
//! - 8N1 (8 data bits, no parity, 1 stop bit)

#![cfg_attr(not(feature = "std"), no_std)]

pub mod crc;
pub mod frame;
pub mod messages;
pub mod parser;

pub use crc::{calculate_crc, X25Digest};
pub use frame::{
    MavFrame, MavlinkVersion, SerializeError, CHECKSUM_LEN, HEADER_LEN_V1, HEADER_LEN_V2,
    IFLAG_SIGNED, MAVLINK_STX_V1, MAVLINK_STX_V2, MAX_FRAME_SIZE, MAX_PAYLOAD_LEN, SIGNATURE_LEN,
};
pub use messages::{
    crc_extra, Attitude, ExtendedSysState, GpsRawInt, Heartbeat, MavMessage, SysStatus,
    MSG_ID_ATTITUDE, MSG_ID_EXTENDED_SYS_STATE, MSG_ID_GPS_RAW_INT, MSG_ID_HEARTBEAT,
    MSG_ID_SYS_STATUS,
};
pub use parser::{MavlinkParser, ParseError, ParserStats};

/// Common MAVLink baud rates.
pub const MAVLINK_BAUDRATE_TELEMETRY: u32 = 57_600;
pub const MAVLINK_BAUDRATE_SERIAL: u32 = 115_200;
