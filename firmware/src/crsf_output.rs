//! CRSF telemetry toward the handset.

use crsf_proto::{CrsfTelemetryMirror, MAX_TELEMETRY_FRAME_SIZE};
use defmt::{error, warn};
use embassy_rp::uart::{Async, UartTx};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use heapless::Vec;

/// Telemetry kinds the mirror keeps at once.
pub const MIRROR_DEPTH: usize = 4;

pub type TelemetryMirror = CrsfTelemetryMirror<MIRROR_DEPTH>;

/// One encoded CRSF packet.
pub type CrsfFrame = Vec<u8, MAX_TELEMETRY_FRAME_SIZE>;

pub type CrsfChannel = Channel<CriticalSectionRawMutex, CrsfFrame, 4>;

/// Encode everything the mirror holds and queue it for the CRSF UART.
///
/// Never waits; packets that find the channel full are dropped.
pub fn queue_crsf_frames(mirror: &mut TelemetryMirror, channel: &CrsfChannel) {
    let mut buf = [0u8; MAX_TELEMETRY_FRAME_SIZE];
    while let Some(result) = mirror.poll_frame(&mut buf) {
        match result {
            Ok(len) => {
                let Ok(frame) = CrsfFrame::from_slice(&buf[..len]) else {
                    continue;
                };
                if channel.try_send(frame).is_err() {
                    warn!("CRSF queue full, packet dropped");
                }
            }
            Err(e) => warn!("CRSF encode error: {:?}", e),
        }
    }
}

/// Write queued CRSF packets to the UART, forever.
pub async fn run_crsf_output(mut tx: UartTx<'static, Async>, channel: &'static CrsfChannel) -> ! {
    loop {
        let frame = channel.receive().await;
        if let Err(e) = tx.write(&frame).await {
            error!("CRSF UART error: {:?}", e);
        }
    }
}
