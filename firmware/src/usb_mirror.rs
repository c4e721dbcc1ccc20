//! USB CDC-ACM mirror of the raw MAVLink stream.
//!
//! The bridge writes re-serialized frames into a [`Pipe`] without waiting;
//! [`run_usb_mirror`] drains the pipe into a CDC-ACM serial port so a ground
//! station on the USB host sees the same MAVLink stream.

use bridge_core::{FrameSink, OutputError};
use defmt::{debug, info};
use embassy_rp::peripherals::USB;
use embassy_rp::usb::Driver;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::pipe::Pipe;
use embassy_usb::class::cdc_acm::{CdcAcmClass, State};
use embassy_usb::driver::EndpointError;
use embassy_usb::Builder;

/// Bytes buffered between the bridge and the USB endpoint.
pub const MIRROR_PIPE_SIZE: usize = 1024;

/// CDC-ACM bulk packet size.
pub const MAX_PACKET_SIZE: u16 = 64;

pub type MirrorPipe = Pipe<CriticalSectionRawMutex, MIRROR_PIPE_SIZE>;

pub type UsbDriver = Driver<'static, USB>;

/// [`FrameSink`] feeding the USB mirror pipe.
///
/// A frame that does not fit the free space is dropped whole, so the host
/// never sees a truncated frame.
pub struct UsbMirrorSink {
    pipe: &'static MirrorPipe,
    dropped: u32,
}

impl UsbMirrorSink {
    pub fn new(pipe: &'static MirrorPipe) -> Self {
        Self { pipe, dropped: 0 }
    }

    /// Number of frames dropped because the pipe was full.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}

impl FrameSink for UsbMirrorSink {
    fn send(&mut self, frame: &[u8]) -> Result<(), OutputError> {
        if self.pipe.free_capacity() < frame.len() {
            self.dropped = self.dropped.wrapping_add(1);
            return Err(OutputError::Dropped);
        }
        match self.pipe.try_write(frame) {
            Ok(n) if n == frame.len() => Ok(()),
            _ => {
                self.dropped = self.dropped.wrapping_add(1);
                Err(OutputError::Dropped)
            }
        }
    }
}

/// Configure the CDC-ACM class in the USB builder.
pub fn configure_usb_cdc(
    builder: &mut Builder<'static, UsbDriver>,
    state: &'static mut State<'static>,
) -> CdcAcmClass<'static, UsbDriver> {
    CdcAcmClass::new(builder, state, MAX_PACKET_SIZE)
}

/// Forward the mirror pipe to the USB host, forever.
///
/// While no host has the port open the pipe keeps filling, and the bridge
/// drops frames until the port is opened again.
pub async fn run_usb_mirror(mut class: CdcAcmClass<'static, UsbDriver>, pipe: &'static MirrorPipe) -> ! {
    let mut buf = [0u8; MAX_PACKET_SIZE as usize];
    loop {
        class.wait_connection().await;
        info!("USB mirror connected");
        pipe.clear();

        loop {
            let n = pipe.read(&mut buf).await;
            if let Err(EndpointError::Disabled) = class.write_packet(&buf[..n]).await {
                break;
            }
        }
        debug!("USB mirror disconnected");
    }
}
