//! Vehicle status indication on the on-board LED.

use bridge_core::VehicleStatus;
use embassy_futures::select::{select, Either};
use embassy_rp::gpio::Output;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Timer};

/// Latest vehicle status, published by the bridge task.
pub type StatusSignal = Signal<CriticalSectionRawMutex, VehicleStatus>;

/// LED output for one vehicle status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub enum LedPattern {
    Off,
    On,
    /// Toggle every half period.
    Blink(Duration),
}

impl LedPattern {
    pub const SLOW_BLINK: Duration = Duration::from_millis(500);
    pub const FAST_BLINK: Duration = Duration::from_millis(100);

    /// Off = unknown, slow blink = disarmed, on = armed, fast blink = flying.
    pub const fn for_status(status: VehicleStatus) -> Self {
        match status {
            VehicleStatus::Unknown => Self::Off,
            VehicleStatus::Disarmed => Self::Blink(Self::SLOW_BLINK),
            VehicleStatus::Armed => Self::On,
            VehicleStatus::Flying => Self::Blink(Self::FAST_BLINK),
        }
    }
}

/// Drive `led` from the status signal, forever.
pub async fn run_status_led(mut led: Output<'static>, signal: &'static StatusSignal) -> ! {
    let mut pattern = LedPattern::Off;
    loop {
        match pattern {
            LedPattern::Off => {
                led.set_low();
                pattern = LedPattern::for_status(signal.wait().await);
            }
            LedPattern::On => {
                led.set_high();
                pattern = LedPattern::for_status(signal.wait().await);
            }
            LedPattern::Blink(half_period) => {
                led.toggle();
                if let Either::Second(status) = select(Timer::after(half_period), signal.wait()).await {
                    pattern = LedPattern::for_status(status);
                }
            }
        }
    }
}
