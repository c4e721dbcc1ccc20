//! MAVLink message subset: ids, CRC_EXTRA values, enum constants and typed
//! payload views.
//!
//! Payload layouts follow the MAVLink wire order (fields sorted by size, largest
//! first). MAVLink 2 senders strip trailing zero bytes from the payload, so every
//! decoder zero-extends its input to the full message length first.

use mavlink::ardupilotmega::MavMessage as ArduPilotMessage;
use mavlink::Message;

/// HEARTBEAT message ID.
pub const MSG_ID_HEARTBEAT: u32 = 0;
/// SYS_STATUS message ID.
pub const MSG_ID_SYS_STATUS: u32 = 1;
/// GPS_RAW_INT message ID.
pub const MSG_ID_GPS_RAW_INT: u32 = 24;
/// ATTITUDE message ID.
pub const MSG_ID_ATTITUDE: u32 = 30;
/// MANUAL_CONTROL message ID.
pub const MSG_ID_MANUAL_CONTROL: u32 = 69;
/// RADIO_STATUS message ID.
pub const MSG_ID_RADIO_STATUS: u32 = 109;
/// EXTENDED_SYS_STATE message ID.
pub const MSG_ID_EXTENDED_SYS_STATE: u32 = 245;

/// Component id of the primary flight controller.
pub const MAV_COMP_ID_AUTOPILOT1: u8 = 1;

/// `MAV_AUTOPILOT_ARDUPILOTMEGA`: custom mode is the ArduPilot mode number.
pub const MAV_AUTOPILOT_ARDUPILOTMEGA: u8 = 3;
/// `MAV_AUTOPILOT_INVALID`: sent by components that are not flight controllers.
pub const MAV_AUTOPILOT_INVALID: u8 = 8;

/// `MAV_MODE_FLAG_SAFETY_ARMED` bit of the heartbeat base mode.
pub const MAV_MODE_FLAG_SAFETY_ARMED: u8 = 0x80;

/// `MAV_LANDED_STATE_IN_AIR`.
pub const MAV_LANDED_STATE_IN_AIR: u8 = 2;

pub const MAV_TYPE_GENERIC: u8 = 0;
pub const MAV_TYPE_FIXED_WING: u8 = 1;
pub const MAV_TYPE_QUADROTOR: u8 = 2;
pub const MAV_TYPE_COAXIAL: u8 = 3;
pub const MAV_TYPE_HELICOPTER: u8 = 4;
pub const MAV_TYPE_ANTENNA_TRACKER: u8 = 5;
pub const MAV_TYPE_GCS: u8 = 6;
pub const MAV_TYPE_AIRSHIP: u8 = 7;
pub const MAV_TYPE_GROUND_ROVER: u8 = 10;
pub const MAV_TYPE_SURFACE_BOAT: u8 = 11;
pub const MAV_TYPE_SUBMARINE: u8 = 12;
pub const MAV_TYPE_HEXAROTOR: u8 = 13;
pub const MAV_TYPE_OCTOROTOR: u8 = 14;
pub const MAV_TYPE_TRICOPTER: u8 = 15;
pub const MAV_TYPE_VTOL_TAILSITTER_DUOROTOR: u8 = 19;
pub const MAV_TYPE_VTOL_TAILSITTER_QUADROTOR: u8 = 20;
pub const MAV_TYPE_VTOL_TILTROTOR: u8 = 21;
pub const MAV_TYPE_VTOL_FIXEDROTOR: u8 = 22;
pub const MAV_TYPE_VTOL_TAILSITTER: u8 = 23;
pub const MAV_TYPE_VTOL_TILTWING: u8 = 24;
pub const MAV_TYPE_DODECAROTOR: u8 = 29;
pub const MAV_TYPE_DECAROTOR: u8 = 35;

/// CRC_EXTRA seed byte for a message id, or `None` if the id is not known.
///
/// Looked up in the ArduPilot dialect, which includes the common message set.
/// Ids outside the dialect cannot be validated.
#[must_use]
pub fn crc_extra(msg_id: u32) -> Option<u8> {
    let extra = ArduPilotMessage::extra_crc(msg_id);
    // The generated table answers 0 for ids it does not know
    if extra == 0 && ArduPilotMessage::default_message_from_id(msg_id).is_err() {
        return None;
    }
    Some(extra)
}

/// Copy a (possibly truncated) payload into a zero-filled array of the full
/// message length.
#[inline]
fn zero_extended<const N: usize>(payload: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    let len = payload.len().min(N);
    out[..len].copy_from_slice(&payload[..len]);
    out
}

#[inline]
fn u16_at(p: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([p[at], p[at + 1]])
}

#[inline]
fn u32_at(p: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([p[at], p[at + 1], p[at + 2], p[at + 3]])
}

#[inline]
fn f32_at(p: &[u8], at: usize) -> f32 {
    f32::from_bits(u32_at(p, at))
}

/// HEARTBEAT (0).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Heartbeat {
    /// Autopilot-specific mode (ArduPilot: flight mode number).
    pub custom_mode: u32,
    /// `MAV_TYPE` of the sender.
    pub mav_type: u8,
    /// `MAV_AUTOPILOT` flavor.
    pub autopilot: u8,
    /// `MAV_MODE_FLAG` bitmask.
    pub base_mode: u8,
    /// `MAV_STATE`.
    pub system_status: u8,
    pub mavlink_version: u8,
}

impl Heartbeat {
    /// Full payload length.
    pub const LEN: usize = 9;

    /// Decode from a frame payload.
    #[must_use]
    pub fn decode(payload: &[u8]) -> Self {
        let p: [u8; Self::LEN] = zero_extended(payload);
        Self {
            custom_mode: u32_at(&p, 0),
            mav_type: p[4],
            autopilot: p[5],
            base_mode: p[6],
            system_status: p[7],
            mavlink_version: p[8],
        }
    }

    /// Encode into wire order.
    #[must_use]
    pub fn encode(&self) -> [u8; Self::LEN] {
        let mode = self.custom_mode.to_le_bytes();
        [
            mode[0],
            mode[1],
            mode[2],
            mode[3],
            self.mav_type,
            self.autopilot,
            self.base_mode,
            self.system_status,
            self.mavlink_version,
        ]
    }

    /// Whether the safety-armed bit is set.
    #[inline]
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.base_mode & MAV_MODE_FLAG_SAFETY_ARMED != 0
    }
}

/// SYS_STATUS (1), battery fields only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SysStatus {
    /// Battery voltage in mV (`u16::MAX` = unknown).
    pub voltage_battery: u16,
    /// Battery current in cA (-1 = unknown).
    pub current_battery: i16,
    /// Remaining battery in percent (-1 = unknown).
    pub battery_remaining: i8,
}

impl SysStatus {
    pub const LEN: usize = 31;

    #[must_use]
    pub fn decode(payload: &[u8]) -> Self {
        let p: [u8; Self::LEN] = zero_extended(payload);
        Self {
            voltage_battery: u16_at(&p, 14),
            current_battery: u16_at(&p, 16) as i16,
            battery_remaining: p[30] as i8,
        }
    }
}

/// GPS_RAW_INT (24).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GpsRawInt {
    /// Latitude in degE7.
    pub lat: i32,
    /// Longitude in degE7.
    pub lon: i32,
    /// Altitude (MSL) in mm.
    pub alt: i32,
    /// Ground speed in cm/s (`u16::MAX` = unknown).
    pub vel: u16,
    pub fix_type: u8,
    /// Visible satellites (255 = unknown).
    pub satellites_visible: u8,
}

impl GpsRawInt {
    pub const LEN: usize = 30;

    #[must_use]
    pub fn decode(payload: &[u8]) -> Self {
        let p: [u8; Self::LEN] = zero_extended(payload);
        Self {
            lat: u32_at(&p, 8) as i32,
            lon: u32_at(&p, 12) as i32,
            alt: u32_at(&p, 16) as i32,
            vel: u16_at(&p, 24),
            fix_type: p[28],
            satellites_visible: p[29],
        }
    }
}

/// ATTITUDE (30), angles only.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Attitude {
    /// Roll in rad.
    pub roll: f32,
    /// Pitch in rad.
    pub pitch: f32,
    /// Yaw in rad.
    pub yaw: f32,
}

impl Attitude {
    pub const LEN: usize = 28;

    #[must_use]
    pub fn decode(payload: &[u8]) -> Self {
        let p: [u8; Self::LEN] = zero_extended(payload);
        Self {
            roll: f32_at(&p, 4),
            pitch: f32_at(&p, 8),
            yaw: f32_at(&p, 12),
        }
    }
}

/// EXTENDED_SYS_STATE (245).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ExtendedSysState {
    pub vtol_state: u8,
    /// `MAV_LANDED_STATE`.
    pub landed_state: u8,
}

impl ExtendedSysState {
    pub const LEN: usize = 2;

    #[must_use]
    pub fn decode(payload: &[u8]) -> Self {
        let p: [u8; Self::LEN] = zero_extended(payload);
        Self {
            vtol_state: p[0],
            landed_state: p[1],
        }
    }

    #[must_use]
    pub fn encode(&self) -> [u8; Self::LEN] {
        [self.vtol_state, self.landed_state]
    }

    /// Whether the vehicle reports being in the air.
    #[inline]
    #[must_use]
    pub const fn is_in_air(&self) -> bool {
        self.landed_state == MAV_LANDED_STATE_IN_AIR
    }
}

/// Typed view of a decoded frame's payload.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MavMessage {
    Heartbeat(Heartbeat),
    SysStatus(SysStatus),
    GpsRawInt(GpsRawInt),
    Attitude(Attitude),
    ExtendedSysState(ExtendedSysState),
    /// Any message id without a typed view here.
    Other(u32),
}

impl MavMessage {
    /// Decode `payload` as message `msg_id`.
    #[must_use]
    pub fn decode(msg_id: u32, payload: &[u8]) -> Self {
        match msg_id {
            MSG_ID_HEARTBEAT => Self::Heartbeat(Heartbeat::decode(payload)),
            MSG_ID_SYS_STATUS => Self::SysStatus(SysStatus::decode(payload)),
            MSG_ID_GPS_RAW_INT => Self::GpsRawInt(GpsRawInt::decode(payload)),
            MSG_ID_ATTITUDE => Self::Attitude(Attitude::decode(payload)),
            MSG_ID_EXTENDED_SYS_STATE => Self::ExtendedSysState(ExtendedSysState::decode(payload)),
            other => Self::Other(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heartbeat_decode() {
        let hb = Heartbeat::decode(&[0x05, 0x00, 0x00, 0x00, 0x02, 0x03, 0xD1, 0x04, 0x03]);
        assert_eq!(hb.custom_mode, 5);
        assert_eq!(hb.mav_type, MAV_TYPE_QUADROTOR);
        assert_eq!(hb.autopilot, MAV_AUTOPILOT_ARDUPILOTMEGA);
        assert!(hb.is_armed());
        assert_eq!(Heartbeat::decode(&hb.encode()), hb);
    }

    #[test]
    fn test_truncated_payload_is_zero_extended() {
        // MAVLink 2 drops trailing zeros: landed_state 0 leaves only vtol_state
        let ess = ExtendedSysState::decode(&[0x01]);
        assert_eq!(ess.vtol_state, 1);
        assert_eq!(ess.landed_state, 0);
        assert!(!ess.is_in_air());

        let hb = Heartbeat::decode(&[]);
        assert_eq!(hb, Heartbeat::default());
    }

    #[test]
    fn test_sys_status_battery_fields() {
        let mut p = [0u8; SysStatus::LEN];
        p[14..16].copy_from_slice(&12_600u16.to_le_bytes());
        p[16..18].copy_from_slice(&(-1i16).to_le_bytes());
        p[30] = 87;
        let s = SysStatus::decode(&p);
        assert_eq!(s.voltage_battery, 12_600);
        assert_eq!(s.current_battery, -1);
        assert_eq!(s.battery_remaining, 87);
    }

    #[test]
    fn test_gps_raw_int_fields() {
        let mut p = [0u8; GpsRawInt::LEN];
        p[8..12].copy_from_slice(&473_977_420i32.to_le_bytes());
        p[12..16].copy_from_slice(&(-1_222_000i32).to_le_bytes());
        p[16..20].copy_from_slice(&488_000i32.to_le_bytes());
        p[24..26].copy_from_slice(&1_250u16.to_le_bytes());
        p[28] = 3;
        p[29] = 14;
        let g = GpsRawInt::decode(&p);
        assert_eq!(g.lat, 473_977_420);
        assert_eq!(g.lon, -1_222_000);
        assert_eq!(g.alt, 488_000);
        assert_eq!(g.vel, 1_250);
        assert_eq!(g.fix_type, 3);
        assert_eq!(g.satellites_visible, 14);
    }

    #[test]
    fn test_crc_extra_covers_dialect() {
        assert_eq!(crc_extra(MSG_ID_HEARTBEAT), Some(50));
        assert_eq!(crc_extra(MSG_ID_EXTENDED_SYS_STATE), Some(130));
        assert_eq!(crc_extra(120), Some(134)); // LOG_DATA
        assert_eq!(crc_extra(124), Some(87)); // GPS2_RAW
        assert_eq!(crc_extra(246), Some(184)); // ADSB_VEHICLE
        assert_eq!(crc_extra(11_030), Some(144)); // ESC_TELEMETRY_1_TO_4
    }

    #[test]
    fn test_unknown_ids_have_no_crc_extra() {
        assert_eq!(crc_extra(60_000), None);
        assert_eq!(crc_extra(0x00FF_FFFF), None);
        assert!(matches!(MavMessage::decode(74, &[]), MavMessage::Other(74)));
    }
}
