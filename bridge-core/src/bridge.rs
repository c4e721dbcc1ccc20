//! MavlinkBridge: drains the serial stream, fans out decoded frames, and
//! tracks the vehicle state.

use mavlink_proto::{MavFrame, MavlinkParser, ParserStats, SerializeError, MAX_FRAME_SIZE};

use crate::input::ByteStream;
use crate::output::{FrameSink, MavlinkSubscriber, OutputError};
use crate::setup::BridgeConfig;
use crate::tracker::VehicleStateTracker;
use crate::types::{VehicleState, VehicleStatus};

/// A bridge from a MAVLink serial stream to a raw frame sink and a decoded
/// frame subscriber.
///
/// The bridge is polled: each [`MavlinkBridge::tick`] consumes the bytes the
/// transport has buffered and returns without waiting for more. Partial frames
/// are kept across ticks. Every checksum-valid frame is, in order:
///
/// 1. re-serialized and written to the [`FrameSink`],
/// 2. handed to the [`MavlinkSubscriber`],
/// 3. applied to the vehicle state.
///
/// # Error Handling
///
/// Nothing escapes `tick()`. Corrupt input is dropped and the parser
/// resynchronizes on the next start marker; sink failures are logged and do
/// not stop steps 2 and 3. A missing transport makes the bridge inert.
pub struct MavlinkBridge<S, K, M> {
    config: BridgeConfig,
    serial: Option<S>,
    sink: K,
    subscriber: M,
    parser: MavlinkParser,
    tracker: VehicleStateTracker,
    tx_buf: [u8; MAX_FRAME_SIZE],
}

impl<S: ByteStream, K: FrameSink, M: MavlinkSubscriber> MavlinkBridge<S, K, M> {
    /// Create an initialized bridge.
    pub fn new(config: BridgeConfig, serial: Option<S>, sink: K, subscriber: M) -> Self {
        Self {
            config,
            serial,
            sink,
            subscriber,
            parser: MavlinkParser::new(),
            tracker: VehicleStateTracker::new(),
            tx_buf: [0u8; MAX_FRAME_SIZE],
        }
    }

    /// Reset the parser and forget the vehicle state.
    pub fn initialize(&mut self) {
        self.parser.reset();
        self.parser.reset_stats();
        self.tracker.reset();
    }

    /// Process the currently available input.
    ///
    /// Returns the number of frames forwarded. Does nothing, and leaves the
    /// input untouched, unless the configured link mode is MAVLink.
    pub fn tick(&mut self) -> usize {
        if !self.config.is_active() {
            return 0;
        }

        let Self {
            config,
            serial,
            sink,
            subscriber,
            parser,
            tracker,
            tx_buf,
        } = self;
        let Some(serial) = serial.as_mut() else {
            return 0;
        };

        let mut consumed = 0usize;
        let mut forwarded = 0usize;
        while config.max_bytes_per_tick.map_or(true, |max| consumed < max) && serial.available() {
            let Some(byte) = serial.read_byte() else {
                break;
            };
            consumed += 1;

            let mut next = parser.push_byte(byte);
            loop {
                match next {
                    Ok(Some(frame)) => {
                        trace!(
                            "frame {} from {}:{} seq {}",
                            frame.message_id,
                            frame.system_id,
                            frame.component_id,
                            frame.sequence
                        );
                        if let Err(e) = forward_raw(sink, tx_buf, &frame) {
                            warn!("frame sink error: {}", e);
                        }
                        subscriber.on_mavlink_message(&frame);
                        tracker.on_message(&frame);
                        forwarded += 1;
                    }
                    Ok(None) => break,
                    Err(e) => {
                        warn!("dropped MAVLink frame: {}", e);
                        break;
                    }
                }
                // Complete frames can already be buffered behind this one
                next = parser.poll();
            }
        }
        forwarded
    }

    /// Composite status: unknown, disarmed, armed, or armed and flying.
    #[inline]
    pub fn query_vehicle_state(&self) -> VehicleStatus {
        self.tracker.status()
    }

    /// Full tracked vehicle state.
    #[inline]
    pub fn vehicle_state(&self) -> &VehicleState {
        self.tracker.state()
    }

    /// Codec statistics since construction or the last [`Self::initialize`].
    #[inline]
    pub fn parser_stats(&self) -> ParserStats {
        self.parser.stats()
    }

    /// Whether the transport has input; `false` without a transport.
    pub fn has_input(&mut self) -> bool {
        self.serial.as_mut().is_some_and(|s| s.available())
    }

    /// Read one byte from the transport; 0 when nothing is available or
    /// there is no transport.
    pub fn read_byte(&mut self) -> u8 {
        self.serial.as_mut().and_then(|s| s.read_byte()).unwrap_or(0)
    }

    /// Write toward the serial peer; no-op without a transport.
    pub fn write_buffer(&mut self, data: &[u8]) {
        if let Some(serial) = self.serial.as_mut() {
            serial.write(data);
        }
    }

    /// Flush the transport; no-op without a transport.
    pub fn flush_output(&mut self) {
        if let Some(serial) = self.serial.as_mut() {
            serial.flush();
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Get a mutable reference to the transport, if present.
    pub fn serial_mut(&mut self) -> Option<&mut S> {
        self.serial.as_mut()
    }

    /// Get a reference to the frame sink.
    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Get a mutable reference to the frame sink.
    pub fn sink_mut(&mut self) -> &mut K {
        &mut self.sink
    }

    /// Get a reference to the subscriber.
    pub fn subscriber(&self) -> &M {
        &self.subscriber
    }

    /// Get a mutable reference to the subscriber.
    pub fn subscriber_mut(&mut self) -> &mut M {
        &mut self.subscriber
    }

    /// Decompose the bridge into its transport, sink and subscriber.
    pub fn into_parts(self) -> (Option<S>, K, M) {
        (self.serial, self.sink, self.subscriber)
    }
}

fn forward_raw<K: FrameSink>(sink: &mut K, buf: &mut [u8], frame: &MavFrame) -> Result<(), OutputError> {
    let len = frame.serialize(buf).map_err(|e| match e {
        SerializeError::BufferTooSmall => OutputError::Overflow,
        SerializeError::UnknownMessage => OutputError::Unencodable,
    })?;
    sink.send(&buf[..len])
}
