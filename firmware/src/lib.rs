//! MAVLink telemetry bridge for RP2040.
//!
//! This crate provides the embedded side of a radio link endpoint's MAVLink
//! handling: it reads the autopilot's MAVLink stream from UART, mirrors it to
//! USB and as CRSF telemetry, and shows the tracked vehicle status on the LED.
//!
//! # Hardware Configuration
//!
//! | Function | GPIO | Description |
//! |----------|------|-------------|
//! | UART0 TX | 0    | CRSF telemetry to the handset (420000 baud) |
//! | UART1 TX | 8    | MAVLink transmit to the autopilot |
//! | UART1 RX | 9    | MAVLink receive from the autopilot (57600 baud) |
//! | LED      | 25   | On-board LED (vehicle status) |
//!
//! # Architecture
//!
//! The firmware uses the Embassy async runtime with these tasks:
//!
//! - **Bridge Task**: Ticks the [`bridge_core::MavlinkBridge`] every millisecond
//! - **USB Task**: Manages the USB device stack
//! - **USB Mirror Task**: Drains raw frames to the CDC-ACM port
//! - **CRSF Task**: Writes encoded CRSF telemetry to UART0
//! - **Status Task**: Drives the LED from the vehicle status
//!
//! The vehicle status is published through an Embassy
//! [`Signal`](embassy_sync::signal::Signal) with "latest value wins" semantics.
//!
//! # Features
//!
//! - **`dev-panic`** (default): Use `panic-probe` for development (prints panic info via RTT)
//! - **`prod-panic`**: Use `panic-reset` for production (silent watchdog reset)

#![no_std]

pub mod crsf_output;
pub mod status_led;
pub mod usb_mirror;

// Re-export core types for convenience
pub use bridge_core::{
    BridgeConfig, DeviceCapabilities, EmbeddedIoStream, MavlinkBridge, Setup, VehicleStatus,
};

pub use crsf_output::{queue_crsf_frames, run_crsf_output, CrsfChannel, TelemetryMirror};
pub use status_led::{run_status_led, LedPattern, StatusSignal};
pub use usb_mirror::{configure_usb_cdc, run_usb_mirror, MirrorPipe, UsbDriver, UsbMirrorSink};

/// MAVLink UART as seen by the bridge.
pub type MavlinkSerial = EmbeddedIoStream<embassy_rp::uart::BufferedUart>;

/// The bridge as wired on this board.
pub type Bridge = MavlinkBridge<MavlinkSerial, UsbMirrorSink, TelemetryMirror>;

/// Capabilities of the Pico wiring this firmware targets.
pub const DEVICE_CAPABILITIES: DeviceCapabilities = DeviceCapabilities {
    has_jrpin5: false,
    has_in_port: false,
};
