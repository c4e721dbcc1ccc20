//! CRSF telemetry encoding.
//!
//! Converts TelemetryData to CRSF packet format for transmission.

use bridge_core::{TelemetryData, TelemetryError};
use uf_crsf::packets::{write_packet_to_buffer, Attitude, Battery, Gps, PacketAddress};

/// CRSF GPS altitude offset in meters.
const GPS_ALTITUDE_OFFSET_M: i32 = 1000;

/// Convert TelemetryData to a CRSF packet and write it to buffer.
///
/// This is a chip-agnostic function that encodes telemetry data into
/// CRSF packet format. The caller is responsible for transmitting the
/// resulting bytes via UART.
///
/// # Arguments
///
/// * `data` - The telemetry data to encode
/// * `buf` - Buffer to write the encoded packet into (at least [`MAX_TELEMETRY_FRAME_SIZE`] bytes)
///
/// # Returns
///
/// The number of bytes written to the buffer, or an error.
pub fn encode_telemetry(data: &TelemetryData, buf: &mut [u8]) -> Result<usize, TelemetryError> {
    match *data {
        TelemetryData::Battery {
            voltage_mv,
            current_ma,
            remaining_pct,
        } => {
            // voltage: mV -> 10mV, current: mA -> 10mA
            let voltage = (voltage_mv / 10) as i16;
            let current = (current_ma / 10) as i16;
            let packet =
                Battery::new(voltage, current, 0, remaining_pct).map_err(|_| TelemetryError::Io)?;
            write_packet_to_buffer(buf, PacketAddress::FlightController, &packet)
                .map_err(|_| TelemetryError::BufferFull)
        }

        TelemetryData::Gps {
            lat,
            lon,
            alt_m,
            speed_mps,
            sats,
        } => {
            // speed: m/s -> 0.1 km/h, alt: meters with 1000m offset
            let groundspeed = speed_mps as u16 * 36;
            let altitude = (alt_m as i32 + GPS_ALTITUDE_OFFSET_M).clamp(0, u16::MAX as i32) as u16;
            let packet = Gps::new(lat, lon, groundspeed, 0, altitude, sats)
                .map_err(|_| TelemetryError::Io)?;
            write_packet_to_buffer(buf, PacketAddress::FlightController, &packet)
                .map_err(|_| TelemetryError::BufferFull)
        }

        TelemetryData::Attitude { roll, pitch, yaw } => {
            // Convert from degrees*100 to radians*10000
            // degrees*100 -> radians*10000: multiply by (pi/180) * 100 = ~1.745
            let roll_rad = ((roll as i32) * 1745 / 1000) as i16;
            let pitch_rad = ((pitch as i32) * 1745 / 1000) as i16;
            let yaw_rad = ((yaw as i32) * 1745 / 1000) as i16;
            let packet = Attitude::new(roll_rad, pitch_rad, yaw_rad).map_err(|_| TelemetryError::Io)?;
            write_packet_to_buffer(buf, PacketAddress::FlightController, &packet)
                .map_err(|_| TelemetryError::BufferFull)
        }
    }
}

/// Maximum size for a CRSF telemetry frame.
pub const MAX_TELEMETRY_FRAME_SIZE: usize = 64;
