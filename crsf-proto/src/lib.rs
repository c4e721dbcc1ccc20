//! CRSF telemetry for a MAVLink radio link.
//!
//! This crate mirrors flight-controller telemetry from the forwarded MAVLink
//! stream into CRSF packets for the handset. It is chip-agnostic and fully
//! testable on host.
//!
//! # Features
//!
//! - [`CrsfTelemetryMirror`] subscribes to a `bridge_core::MavlinkBridge`
//! - Battery, GPS and attitude encoding via `uf-crsf`
//! - No chip-specific dependencies - works on any platform
//!
//! # Example
//!
//! ```ignore
//! use crsf_proto::{CrsfTelemetryMirror, MAX_TELEMETRY_FRAME_SIZE};
//!
//! let mut bridge = MavlinkBridge::new(config, Some(uart), sink, CrsfTelemetryMirror::<8>::new());
//! let mut buf = [0u8; MAX_TELEMETRY_FRAME_SIZE];
//!
//! bridge.tick();
//! while let Some(Ok(len)) = bridge.subscriber_mut().poll_frame(&mut buf) {
//!     crsf_uart.write(&buf[..len]);
//! }
//! ```
//!
//! # UART Configuration
//!
//! CRSF uses 420000 baud, 8N1:
//! - Baud rate: 420000 (ExpressLRS) or 416666 (TBS Crossfire)
//! - Data bits: 8
//! - Parity: None
//! - Stop bits: 1

#![cfg_attr(not(feature = "std"), no_std)]

pub mod mirror;
pub mod telemetry;

pub use mirror::CrsfTelemetryMirror;
pub use telemetry::{encode_telemetry, MAX_TELEMETRY_FRAME_SIZE};

/// CRSF baud rate for ExpressLRS receivers.
pub const CRSF_BAUDRATE_ELRS: u32 = 420_000;

/// CRSF baud rate for TBS Crossfire receivers.
pub const CRSF_BAUDRATE_TBS: u32 = 416_666;
