//! Vehicle state types: TriState, VehicleType, VehicleState, VehicleStatus.

use core::num::NonZeroU8;

use mavlink_proto::messages::{
    MAV_TYPE_AIRSHIP, MAV_TYPE_ANTENNA_TRACKER, MAV_TYPE_COAXIAL, MAV_TYPE_DECAROTOR,
    MAV_TYPE_DODECAROTOR, MAV_TYPE_FIXED_WING, MAV_TYPE_GROUND_ROVER, MAV_TYPE_HELICOPTER,
    MAV_TYPE_HEXAROTOR, MAV_TYPE_OCTOROTOR, MAV_TYPE_QUADROTOR, MAV_TYPE_SUBMARINE,
    MAV_TYPE_SURFACE_BOAT, MAV_TYPE_TRICOPTER, MAV_TYPE_VTOL_FIXEDROTOR,
    MAV_TYPE_VTOL_TAILSITTER, MAV_TYPE_VTOL_TAILSITTER_DUOROTOR,
    MAV_TYPE_VTOL_TAILSITTER_QUADROTOR, MAV_TYPE_VTOL_TILTROTOR, MAV_TYPE_VTOL_TILTWING,
};

/// A boolean that may not have been reported yet.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TriState {
    #[default]
    Unknown,
    False,
    True,
}

impl TriState {
    /// `true` only for [`TriState::True`].
    #[inline]
    #[must_use]
    pub const fn is_true(self) -> bool {
        matches!(self, Self::True)
    }

    #[inline]
    #[must_use]
    pub const fn is_known(self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// The known value, if any.
    #[inline]
    #[must_use]
    pub const fn known(self) -> Option<bool> {
        match self {
            Self::Unknown => None,
            Self::False => Some(false),
            Self::True => Some(true),
        }
    }
}

impl From<bool> for TriState {
    fn from(value: bool) -> Self {
        if value {
            Self::True
        } else {
            Self::False
        }
    }
}

/// ArduPilot firmware family a vehicle runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VehicleType {
    Plane,
    Copter,
    Rover,
    Sub,
    Tracker,
    Blimp,
}

impl VehicleType {
    /// Map a heartbeat `MAV_TYPE` to the firmware family that sends it.
    #[must_use]
    pub const fn from_mav_type(mav_type: u8) -> Option<Self> {
        match mav_type {
            MAV_TYPE_FIXED_WING
            | MAV_TYPE_VTOL_TAILSITTER_DUOROTOR
            | MAV_TYPE_VTOL_TAILSITTER_QUADROTOR
            | MAV_TYPE_VTOL_TILTROTOR
            | MAV_TYPE_VTOL_FIXEDROTOR
            | MAV_TYPE_VTOL_TAILSITTER
            | MAV_TYPE_VTOL_TILTWING => Some(Self::Plane),
            MAV_TYPE_QUADROTOR
            | MAV_TYPE_COAXIAL
            | MAV_TYPE_HELICOPTER
            | MAV_TYPE_HEXAROTOR
            | MAV_TYPE_OCTOROTOR
            | MAV_TYPE_TRICOPTER
            | MAV_TYPE_DODECAROTOR
            | MAV_TYPE_DECAROTOR => Some(Self::Copter),
            MAV_TYPE_GROUND_ROVER | MAV_TYPE_SURFACE_BOAT => Some(Self::Rover),
            MAV_TYPE_SUBMARINE => Some(Self::Sub),
            MAV_TYPE_ANTENNA_TRACKER => Some(Self::Tracker),
            MAV_TYPE_AIRSHIP => Some(Self::Blimp),
            _ => None,
        }
    }
}

/// Snapshot of what the autopilot has reported about the vehicle.
///
/// All fields start out unknown. Only [`crate::tracker::VehicleStateTracker`]
/// mutates them.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct VehicleState {
    pub(crate) system_id: Option<NonZeroU8>,
    pub(crate) armed: TriState,
    pub(crate) flying: TriState,
    pub(crate) vehicle_type: Option<VehicleType>,
    pub(crate) flight_mode: Option<u32>,
}

impl VehicleState {
    /// State with every field unknown.
    pub const UNKNOWN: Self = Self {
        system_id: None,
        armed: TriState::Unknown,
        flying: TriState::Unknown,
        vehicle_type: None,
        flight_mode: None,
    };

    /// System id of the most recently accepted autopilot heartbeat.
    #[inline]
    #[must_use]
    pub const fn system_id(&self) -> Option<NonZeroU8> {
        self.system_id
    }

    #[inline]
    #[must_use]
    pub const fn armed(&self) -> TriState {
        self.armed
    }

    #[inline]
    #[must_use]
    pub const fn flying(&self) -> TriState {
        self.flying
    }

    /// Known only for autopilots whose custom mode is an ArduPilot mode number.
    #[inline]
    #[must_use]
    pub const fn vehicle_type(&self) -> Option<VehicleType> {
        self.vehicle_type
    }

    /// Raw heartbeat custom mode, known only alongside [`Self::vehicle_type`] flavor.
    #[inline]
    #[must_use]
    pub const fn flight_mode(&self) -> Option<u32> {
        self.flight_mode
    }

    /// Composite status derived from `armed` and `flying`.
    #[must_use]
    pub const fn status(&self) -> VehicleStatus {
        match (self.armed, self.flying) {
            (TriState::Unknown, _) => VehicleStatus::Unknown,
            (TriState::False, _) => VehicleStatus::Disarmed,
            (TriState::True, TriState::True) => VehicleStatus::Flying,
            (TriState::True, _) => VehicleStatus::Armed,
        }
    }
}

/// Composite vehicle status reported over the radio link.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VehicleStatus {
    #[default]
    Unknown,
    Disarmed,
    Armed,
    Flying,
}

impl VehicleStatus {
    /// Wire value for unknown status.
    pub const RAW_UNKNOWN: u8 = 0xFF;

    /// Numeric status code: 0 disarmed, 1 armed, 2 armed and flying.
    #[inline]
    #[must_use]
    pub const fn code(self) -> Option<u8> {
        match self {
            Self::Unknown => None,
            Self::Disarmed => Some(0),
            Self::Armed => Some(1),
            Self::Flying => Some(2),
        }
    }

    /// Status code as a single byte, with [`Self::RAW_UNKNOWN`] for unknown.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u8 {
        match self.code() {
            Some(code) => code,
            None => Self::RAW_UNKNOWN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(armed: TriState, flying: TriState) -> VehicleState {
        VehicleState {
            armed,
            flying,
            ..VehicleState::UNKNOWN
        }
    }

    #[test]
    fn test_status_truth_table() {
        use TriState::{False, True, Unknown};

        for flying in [Unknown, False, True] {
            assert_eq!(state(Unknown, flying).status(), VehicleStatus::Unknown);
            assert_eq!(state(False, flying).status(), VehicleStatus::Disarmed);
        }
        assert_eq!(state(True, True).status(), VehicleStatus::Flying);
        assert_eq!(state(True, False).status(), VehicleStatus::Armed);
        assert_eq!(state(True, Unknown).status(), VehicleStatus::Armed);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(VehicleStatus::Unknown.code(), None);
        assert_eq!(VehicleStatus::Unknown.raw(), 0xFF);
        assert_eq!(VehicleStatus::Disarmed.raw(), 0);
        assert_eq!(VehicleStatus::Armed.raw(), 1);
        assert_eq!(VehicleStatus::Flying.raw(), 2);
    }

    #[test]
    fn test_tristate_from_bool() {
        assert_eq!(TriState::from(true), TriState::True);
        assert_eq!(TriState::from(false), TriState::False);
        assert_eq!(TriState::default(), TriState::Unknown);
        assert_eq!(TriState::False.known(), Some(false));
        assert!(!TriState::Unknown.is_known());
    }

    #[test]
    fn test_vehicle_type_mapping() {
        assert_eq!(VehicleType::from_mav_type(MAV_TYPE_FIXED_WING), Some(VehicleType::Plane));
        assert_eq!(VehicleType::from_mav_type(MAV_TYPE_VTOL_TILTROTOR), Some(VehicleType::Plane));
        assert_eq!(VehicleType::from_mav_type(MAV_TYPE_QUADROTOR), Some(VehicleType::Copter));
        assert_eq!(VehicleType::from_mav_type(MAV_TYPE_HELICOPTER), Some(VehicleType::Copter));
        assert_eq!(VehicleType::from_mav_type(MAV_TYPE_SURFACE_BOAT), Some(VehicleType::Rover));
        assert_eq!(VehicleType::from_mav_type(MAV_TYPE_SUBMARINE), Some(VehicleType::Sub));
        assert_eq!(VehicleType::from_mav_type(MAV_TYPE_ANTENNA_TRACKER), Some(VehicleType::Tracker));
        assert_eq!(VehicleType::from_mav_type(MAV_TYPE_AIRSHIP), Some(VehicleType::Blimp));
        assert_eq!(VehicleType::from_mav_type(mavlink_proto::messages::MAV_TYPE_GCS), None);
        assert_eq!(VehicleType::from_mav_type(mavlink_proto::messages::MAV_TYPE_GENERIC), None);
    }
}
