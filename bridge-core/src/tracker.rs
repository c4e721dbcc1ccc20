//! VehicleStateTracker: derives [`VehicleState`] from decoded MAVLink frames.

use core::num::NonZeroU8;

use mavlink_proto::messages::{
    ExtendedSysState, Heartbeat, MAV_AUTOPILOT_ARDUPILOTMEGA, MAV_AUTOPILOT_INVALID,
    MAV_COMP_ID_AUTOPILOT1, MSG_ID_EXTENDED_SYS_STATE, MSG_ID_HEARTBEAT,
};
use mavlink_proto::MavFrame;

use crate::types::{TriState, VehicleState, VehicleStatus, VehicleType};

/// Classifies frames and updates the vehicle state. Performs no I/O.
///
/// Heartbeats are accepted only from the autopilot component and only when
/// they name a real autopilot. Every other message type is ignored until an
/// autopilot has been identified.
#[derive(Clone, Debug, Default)]
pub struct VehicleStateTracker {
    state: VehicleState,
}

impl VehicleStateTracker {
    /// Create a tracker with every field unknown.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: VehicleState::UNKNOWN,
        }
    }

    /// Forget everything learned so far.
    pub fn reset(&mut self) {
        self.state = VehicleState::UNKNOWN;
    }

    /// Current snapshot.
    #[inline]
    #[must_use]
    pub fn state(&self) -> &VehicleState {
        &self.state
    }

    /// Composite status of the current snapshot.
    #[inline]
    #[must_use]
    pub fn status(&self) -> VehicleStatus {
        self.state.status()
    }

    /// Update the state from one decoded frame.
    pub fn on_message(&mut self, frame: &MavFrame) {
        if frame.message_id == MSG_ID_HEARTBEAT && frame.component_id == MAV_COMP_ID_AUTOPILOT1 {
            self.on_heartbeat(frame.system_id, &Heartbeat::decode(&frame.payload));
        }

        if self.state.system_id.is_none() {
            return;
        }

        if frame.message_id == MSG_ID_EXTENDED_SYS_STATE {
            let ess = ExtendedSysState::decode(&frame.payload);
            let flying = TriState::from(ess.is_in_air());
            if flying != self.state.flying {
                debug!("flying: {}", flying);
            }
            self.state.flying = flying;
        }
    }

    fn on_heartbeat(&mut self, system_id: u8, hb: &Heartbeat) {
        if hb.autopilot == MAV_AUTOPILOT_INVALID {
            return;
        }

        let system_id = NonZeroU8::new(system_id);
        if system_id != self.state.system_id {
            debug!("autopilot system id: {}", system_id.map_or(0, NonZeroU8::get));
        }
        self.state.system_id = system_id;

        let armed = TriState::from(hb.is_armed());
        if armed != self.state.armed {
            debug!("armed: {}", armed);
        }
        self.state.armed = armed;

        if hb.autopilot == MAV_AUTOPILOT_ARDUPILOTMEGA {
            self.state.vehicle_type = VehicleType::from_mav_type(hb.mav_type);
            self.state.flight_mode = Some(hb.custom_mode);
        } else {
            self.state.vehicle_type = None;
            self.state.flight_mode = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mavlink_proto::messages::{
        MAV_LANDED_STATE_IN_AIR, MAV_MODE_FLAG_SAFETY_ARMED, MAV_TYPE_GCS, MAV_TYPE_QUADROTOR,
    };

    const MAV_AUTOPILOT_PX4: u8 = 12;
    const MAV_LANDED_STATE_ON_GROUND: u8 = 1;

    fn heartbeat_frame(system_id: u8, component_id: u8, autopilot: u8, base_mode: u8) -> MavFrame {
        let hb = Heartbeat {
            custom_mode: 5,
            mav_type: MAV_TYPE_QUADROTOR,
            autopilot,
            base_mode,
            system_status: 4,
            mavlink_version: 3,
        };
        MavFrame::v2(0, system_id, component_id, MSG_ID_HEARTBEAT, &hb.encode())
    }

    fn landed_frame(system_id: u8, landed_state: u8) -> MavFrame {
        let ess = ExtendedSysState {
            vtol_state: 0,
            landed_state,
        };
        MavFrame::v2(0, system_id, 1, MSG_ID_EXTENDED_SYS_STATE, &ess.encode())
    }

    fn armed_ardupilot(system_id: u8) -> MavFrame {
        heartbeat_frame(system_id, 1, MAV_AUTOPILOT_ARDUPILOTMEGA, MAV_MODE_FLAG_SAFETY_ARMED | 0x51)
    }

    #[test]
    fn test_initial_state_unknown() {
        let tracker = VehicleStateTracker::new();
        assert_eq!(*tracker.state(), VehicleState::UNKNOWN);
        assert_eq!(tracker.status(), VehicleStatus::Unknown);
    }

    #[test]
    fn test_armed_heartbeat_identifies_system() {
        let mut tracker = VehicleStateTracker::new();
        tracker.on_message(&armed_ardupilot(7));

        let state = tracker.state();
        assert_eq!(state.system_id().map(NonZeroU8::get), Some(7));
        assert_eq!(state.armed(), TriState::True);
        assert_eq!(state.flying(), TriState::Unknown);
        assert_eq!(state.vehicle_type(), Some(VehicleType::Copter));
        assert_eq!(state.flight_mode(), Some(5));
        assert_eq!(tracker.status(), VehicleStatus::Armed);
    }

    #[test]
    fn test_invalid_autopilot_heartbeat_ignored() {
        let mut tracker = VehicleStateTracker::new();
        tracker.on_message(&heartbeat_frame(255, 1, MAV_AUTOPILOT_INVALID, MAV_MODE_FLAG_SAFETY_ARMED));
        assert_eq!(*tracker.state(), VehicleState::UNKNOWN);

        tracker.on_message(&armed_ardupilot(1));
        let before = *tracker.state();
        tracker.on_message(&heartbeat_frame(255, 1, MAV_AUTOPILOT_INVALID, 0));
        assert_eq!(*tracker.state(), before);
    }

    #[test]
    fn test_heartbeat_from_other_component_ignored() {
        let mut tracker = VehicleStateTracker::new();
        tracker.on_message(&heartbeat_frame(1, 190, MAV_AUTOPILOT_ARDUPILOTMEGA, MAV_MODE_FLAG_SAFETY_ARMED));
        assert_eq!(*tracker.state(), VehicleState::UNKNOWN);
    }

    #[test]
    fn test_landed_state_gated_until_identified() {
        let mut tracker = VehicleStateTracker::new();
        tracker.on_message(&landed_frame(1, MAV_LANDED_STATE_IN_AIR));
        assert_eq!(tracker.state().flying(), TriState::Unknown);
        assert_eq!(tracker.status(), VehicleStatus::Unknown);

        tracker.on_message(&armed_ardupilot(1));
        tracker.on_message(&landed_frame(1, MAV_LANDED_STATE_IN_AIR));
        assert_eq!(tracker.state().flying(), TriState::True);
        assert_eq!(tracker.status(), VehicleStatus::Flying);

        tracker.on_message(&landed_frame(1, MAV_LANDED_STATE_ON_GROUND));
        assert_eq!(tracker.state().flying(), TriState::False);
        assert_eq!(tracker.status(), VehicleStatus::Armed);
    }

    #[test]
    fn test_system_id_zero_keeps_gate_closed() {
        let mut tracker = VehicleStateTracker::new();
        tracker.on_message(&armed_ardupilot(0));
        assert_eq!(tracker.state().system_id(), None);
        assert_eq!(tracker.state().armed(), TriState::True);

        tracker.on_message(&landed_frame(0, MAV_LANDED_STATE_IN_AIR));
        assert_eq!(tracker.state().flying(), TriState::Unknown);
    }

    #[test]
    fn test_last_heartbeat_wins() {
        let mut tracker = VehicleStateTracker::new();
        tracker.on_message(&armed_ardupilot(1));
        tracker.on_message(&heartbeat_frame(2, 1, MAV_AUTOPILOT_ARDUPILOTMEGA, 0));
        assert_eq!(tracker.state().system_id().map(NonZeroU8::get), Some(2));
        assert_eq!(tracker.state().armed(), TriState::False);
        assert_eq!(tracker.status(), VehicleStatus::Disarmed);
    }

    #[test]
    fn test_non_ardupilot_clears_type_and_mode() {
        let mut tracker = VehicleStateTracker::new();
        tracker.on_message(&armed_ardupilot(1));
        tracker.on_message(&heartbeat_frame(1, 1, MAV_AUTOPILOT_PX4, MAV_MODE_FLAG_SAFETY_ARMED));

        let state = tracker.state();
        assert_eq!(state.armed(), TriState::True);
        assert_eq!(state.vehicle_type(), None);
        assert_eq!(state.flight_mode(), None);
    }

    #[test]
    fn test_unmapped_vehicle_type_is_unknown() {
        let hb = Heartbeat {
            custom_mode: 0,
            mav_type: MAV_TYPE_GCS,
            autopilot: MAV_AUTOPILOT_ARDUPILOTMEGA,
            base_mode: 0,
            system_status: 0,
            mavlink_version: 3,
        };
        let mut tracker = VehicleStateTracker::new();
        tracker.on_message(&MavFrame::v2(0, 1, 1, MSG_ID_HEARTBEAT, &hb.encode()));
        assert_eq!(tracker.state().vehicle_type(), None);
        assert_eq!(tracker.state().flight_mode(), Some(0));
    }

    #[test]
    fn test_reset() {
        let mut tracker = VehicleStateTracker::new();
        tracker.on_message(&armed_ardupilot(1));
        tracker.reset();
        assert_eq!(*tracker.state(), VehicleState::UNKNOWN);
    }
}
