//! Telemetry extraction for downstream protocols.
//!
//! Flight-controller telemetry is pulled out of forwarded MAVLink frames into
//! protocol-neutral units, so a secondary protocol (CRSF, ...) only needs an
//! encoder for [`TelemetryData`].

use core::f32::consts::PI;

use mavlink_proto::messages::MavMessage;
use mavlink_proto::MavFrame;

/// Radians to hundredths of a degree.
const CENTIDEGREES_PER_RAD: f32 = 18_000.0 / PI;

/// Telemetry data that can be sent on to the transmitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TelemetryData {
    /// Battery status telemetry.
    Battery {
        /// Voltage in millivolts.
        voltage_mv: u16,
        /// Current draw in milliamps.
        current_ma: u16,
        /// Remaining capacity percentage (0-100).
        remaining_pct: u8,
    },
    /// GPS position telemetry.
    Gps {
        /// Latitude in degrees * 1e7.
        lat: i32,
        /// Longitude in degrees * 1e7.
        lon: i32,
        /// Altitude in meters.
        alt_m: i16,
        /// Ground speed in m/s.
        speed_mps: u8,
        /// Number of satellites.
        sats: u8,
    },
    /// Attitude (orientation) telemetry.
    Attitude {
        /// Roll angle in degrees * 100.
        roll: i16,
        /// Pitch angle in degrees * 100.
        pitch: i16,
        /// Yaw angle in degrees * 100.
        yaw: i16,
    },
}

impl TelemetryData {
    /// Extract telemetry from a decoded frame, if it carries any.
    ///
    /// MAVLink "unknown" markers (-1, `u16::MAX`, 255 satellites) become 0.
    #[must_use]
    pub fn from_frame(frame: &MavFrame) -> Option<Self> {
        match frame.decode() {
            MavMessage::SysStatus(s) => {
                let voltage_mv = if s.voltage_battery == u16::MAX { 0 } else { s.voltage_battery };
                let current_ma = (s.current_battery.max(0) as u32 * 10).min(u16::MAX as u32) as u16;
                let remaining_pct = s.battery_remaining.clamp(0, 100) as u8;
                Some(Self::Battery {
                    voltage_mv,
                    current_ma,
                    remaining_pct,
                })
            }
            MavMessage::GpsRawInt(g) => {
                let alt_m = (g.alt / 1000).clamp(i16::MIN as i32, i16::MAX as i32) as i16;
                let speed_mps = if g.vel == u16::MAX { 0 } else { (g.vel / 100).min(u8::MAX as u16) as u8 };
                let sats = if g.satellites_visible == u8::MAX { 0 } else { g.satellites_visible };
                Some(Self::Gps {
                    lat: g.lat,
                    lon: g.lon,
                    alt_m,
                    speed_mps,
                    sats,
                })
            }
            MavMessage::Attitude(a) => Some(Self::Attitude {
                roll: centidegrees(a.roll),
                pitch: centidegrees(a.pitch),
                yaw: centidegrees(a.yaw),
            }),
            _ => None,
        }
    }

    /// Whether `self` and `other` are the same kind of telemetry.
    #[inline]
    #[must_use]
    pub fn same_kind(&self, other: &Self) -> bool {
        core::mem::discriminant(self) == core::mem::discriminant(other)
    }
}

// `as` saturates and maps NaN to 0
fn centidegrees(rad: f32) -> i16 {
    (rad * CENTIDEGREES_PER_RAD) as i16
}

/// Error type for telemetry operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TelemetryError {
    /// Telemetry not supported by this protocol/transport.
    NotSupported,
    /// Encoding or I/O error during transmission.
    Io,
    /// Transmit buffer is full.
    BufferFull,
}

impl core::fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotSupported => write!(f, "telemetry not supported"),
            Self::Io => write!(f, "telemetry I/O error"),
            Self::BufferFull => write!(f, "telemetry buffer full"),
        }
    }
}
