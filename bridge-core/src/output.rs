//! Frame sink and subscriber traits, and error types.

use mavlink_proto::MavFrame;

/// Error type for output operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputError {
    /// Communication I/O error.
    Io,
    /// Device not ready (e.g., USB not enumerated).
    NotReady,
    /// Frame dropped because the outbound buffer is full.
    Dropped,
    /// Frame did not fit the serialization buffer.
    Overflow,
    /// Frame could not be re-encoded (no CRC_EXTRA for its message id).
    Unencodable,
}

impl core::fmt::Display for OutputError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Io => write!(f, "I/O error"),
            Self::NotReady => write!(f, "output not ready"),
            Self::Dropped => write!(f, "frame dropped"),
            Self::Overflow => write!(f, "frame too large"),
            Self::Unencodable => write!(f, "frame cannot be encoded"),
        }
    }
}

/// Destination for raw, re-serialized MAVLink frames.
///
/// This is the byte-forwarding path to the secondary telemetry consumer; it
/// carries every frame regardless of its content.
pub trait FrameSink {
    /// Forward one complete serialized frame. Must not block.
    fn send(&mut self, frame: &[u8]) -> Result<(), OutputError>;
}

impl<T: FrameSink + ?Sized> FrameSink for &mut T {
    fn send(&mut self, frame: &[u8]) -> Result<(), OutputError> {
        (**self).send(frame)
    }
}

/// Listener for decoded MAVLink frames.
///
/// Fire-and-forget: implementations must return promptly and never block.
pub trait MavlinkSubscriber {
    fn on_mavlink_message(&mut self, frame: &MavFrame);
}

impl<T: MavlinkSubscriber + ?Sized> MavlinkSubscriber for &mut T {
    fn on_mavlink_message(&mut self, frame: &MavFrame) {
        (**self).on_mavlink_message(frame)
    }
}

/// Frame sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl FrameSink for NullSink {
    fn send(&mut self, _frame: &[u8]) -> Result<(), OutputError> {
        Ok(())
    }
}

/// Subscriber that ignores every frame.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSubscriber;

impl MavlinkSubscriber for NullSubscriber {
    fn on_mavlink_message(&mut self, _frame: &MavFrame) {}
}
