//! Platform-agnostic MAVLink bridge and vehicle-state tracker.
//!
//! This crate provides the core of a radio link endpoint's MAVLink handling
//! without any platform-specific dependencies. It can be used both in embedded
//! `no_std` environments and on host for testing.
//!
//! # Overview
//!
//! - [`types`]: Vehicle state ([`VehicleState`], [`TriState`], [`VehicleType`], [`VehicleStatus`])
//! - [`tracker`]: Message classification ([`VehicleStateTracker`])
//! - [`input`]: Serial transport trait ([`ByteStream`])
//! - [`output`]: Raw frame sink and decoded frame subscriber ([`FrameSink`], [`MavlinkSubscriber`])
//! - [`bridge`]: Drives the transport and fans out frames ([`MavlinkBridge`])
//! - [`telemetry`]: Protocol-neutral telemetry from forwarded frames ([`TelemetryData`])
//! - [`setup`]: Link settings and bridge configuration ([`Setup`], [`BridgeConfig`])
//!
//! # Example
//!
//! ```ignore
//! use bridge_core::{BridgeConfig, MavlinkBridge, NullSink, NullSubscriber, Setup};
//!
//! let config = BridgeConfig::from_setup(&Setup::DEFAULT);
//! let mut bridge = MavlinkBridge::new(config, Some(uart), NullSink, NullSubscriber);
//!
//! loop {
//!     bridge.tick();
//!     let status = bridge.query_vehicle_state();
//!     // Report status.raw() over the link...
//! }
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting and logging (for embedded targets)
//! - **`embedded-io`**: [`ByteStream`] adapter for `embedded-io` peripherals
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations,
//! making it suitable for embedded systems with limited resources.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

#[macro_use]
mod fmt;

pub mod bridge;
pub mod input;
pub mod output;
pub mod setup;
pub mod telemetry;
pub mod tracker;
pub mod types;

// Re-export main types at crate root
pub use bridge::MavlinkBridge;
#[cfg(feature = "embedded-io")]
pub use input::EmbeddedIoStream;
pub use input::ByteStream;
pub use output::{FrameSink, MavlinkSubscriber, NullSink, NullSubscriber, OutputError};
pub use setup::{
    BridgeConfig, ChannelsSource, DeviceCapabilities, RxSetup, SerialDestination, SerialLinkMode,
    Setup, TxSetup,
};
pub use telemetry::{TelemetryData, TelemetryError};
pub use tracker::VehicleStateTracker;
pub use types::{TriState, VehicleState, VehicleStatus, VehicleType};

// Codec types that appear in this crate's API
pub use mavlink_proto::{MavFrame, ParseError, ParserStats};
