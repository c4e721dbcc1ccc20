//! CRSF telemetry mirror of the forwarded MAVLink stream.

use bridge_core::{MavFrame, MavlinkSubscriber, TelemetryData, TelemetryError};
use heapless::Deque;

use crate::telemetry::encode_telemetry;

/// Queues telemetry extracted from forwarded MAVLink frames until the CRSF
/// side is ready to send it.
///
/// Only the latest value of each kind is kept: a new battery reading replaces
/// a queued one in place. When the queue is full the oldest entry is dropped.
/// Intake never blocks.
pub struct CrsfTelemetryMirror<const N: usize> {
    queue: Deque<TelemetryData, N>,
    dropped: u32,
}

impl<const N: usize> CrsfTelemetryMirror<N> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            queue: Deque::new(),
            dropped: 0,
        }
    }

    /// Queue one telemetry value.
    pub fn push(&mut self, data: TelemetryData) {
        if let Some(queued) = self.queue.iter_mut().find(|queued| queued.same_kind(&data)) {
            *queued = data;
            return;
        }
        if self.queue.is_full() {
            if let Some(_oldest) = self.queue.pop_front() {
                #[cfg(feature = "defmt")]
                defmt::trace!("CRSF mirror full, evicted {:?}", _oldest);
            }
            self.dropped = self.dropped.wrapping_add(1);
        }
        if self.queue.push_back(data).is_err() {
            // Zero capacity
            self.dropped = self.dropped.wrapping_add(1);
        }
    }

    /// Encode the oldest queued value into `buf`.
    ///
    /// Returns `None` when nothing is queued. The entry is consumed even if
    /// encoding fails.
    pub fn poll_frame(&mut self, buf: &mut [u8]) -> Option<Result<usize, TelemetryError>> {
        let data = self.queue.pop_front()?;
        Some(encode_telemetry(&data, buf))
    }

    /// Number of entries evicted because the queue was full.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

impl<const N: usize> Default for CrsfTelemetryMirror<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> MavlinkSubscriber for CrsfTelemetryMirror<N> {
    fn on_mavlink_message(&mut self, frame: &MavFrame) {
        if let Some(data) = TelemetryData::from_frame(frame) {
            self.push(data);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::MAX_TELEMETRY_FRAME_SIZE;
    use mavlink_proto::messages::{SysStatus, MSG_ID_HEARTBEAT, MSG_ID_SYS_STATUS};

    fn attitude(roll: i16) -> TelemetryData {
        TelemetryData::Attitude {
            roll,
            pitch: 0,
            yaw: 0,
        }
    }

    fn battery(voltage_mv: u16) -> TelemetryData {
        TelemetryData::Battery {
            voltage_mv,
            current_ma: 0,
            remaining_pct: 50,
        }
    }

    fn gps() -> TelemetryData {
        TelemetryData::Gps {
            lat: 0,
            lon: 0,
            alt_m: 0,
            speed_mps: 0,
            sats: 0,
        }
    }

    #[test]
    fn test_latest_value_of_a_kind_wins() {
        let mut mirror: CrsfTelemetryMirror<4> = CrsfTelemetryMirror::new();
        mirror.push(attitude(100));
        mirror.push(battery(11_000));
        mirror.push(attitude(200));

        assert_eq!(mirror.len(), 2);
        assert_eq!(mirror.queue.front(), Some(&attitude(200)));
        assert_eq!(mirror.dropped(), 0);
    }

    #[test]
    fn test_full_queue_drops_oldest() {
        let mut mirror: CrsfTelemetryMirror<2> = CrsfTelemetryMirror::new();
        mirror.push(attitude(1));
        mirror.push(battery(11_000));
        mirror.push(gps());

        assert_eq!(mirror.len(), 2);
        assert_eq!(mirror.dropped(), 1);
        assert_eq!(mirror.queue.front(), Some(&battery(11_000)));
    }

    #[test]
    fn test_poll_frame_drains_queue() {
        let mut mirror: CrsfTelemetryMirror<4> = CrsfTelemetryMirror::new();
        let mut buf = [0u8; MAX_TELEMETRY_FRAME_SIZE];
        assert!(mirror.poll_frame(&mut buf).is_none());

        mirror.push(attitude(0));
        let len = mirror.poll_frame(&mut buf).unwrap().unwrap();
        assert!(len > 0);
        assert!(mirror.is_empty());
    }

    #[test]
    fn test_subscribes_to_telemetry_frames_only() {
        let mut mirror: CrsfTelemetryMirror<4> = CrsfTelemetryMirror::default();
        mirror.on_mavlink_message(&MavFrame::v2(0, 1, 1, MSG_ID_HEARTBEAT, &[0; 9]));
        assert!(mirror.is_empty());

        let mut p = [0u8; SysStatus::LEN];
        p[14..16].copy_from_slice(&12_000u16.to_le_bytes());
        mirror.on_mavlink_message(&MavFrame::v2(0, 1, 1, MSG_ID_SYS_STATUS, &p));
        assert_eq!(mirror.len(), 1);

        mirror.clear();
        assert!(mirror.is_empty());
    }
}
