#![no_std]
#![no_main]

use defmt::info;
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::{UART1, USB};
use embassy_rp::uart::{Async, BufferedUart, Config as UartConfig, UartTx};
use embassy_rp::usb::Driver;
use embassy_sync::channel::Channel;
use embassy_sync::pipe::Pipe;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Ticker};
use embassy_usb::class::cdc_acm::{CdcAcmClass, State};
use embassy_usb::{Builder, Config as UsbConfig};
use mavlink_bridge::{
    configure_usb_cdc, queue_crsf_frames, run_crsf_output, run_status_led, run_usb_mirror,
    Bridge, BridgeConfig, CrsfChannel, MavlinkSerial, MirrorPipe, Setup, StatusSignal,
    TelemetryMirror, UsbDriver, UsbMirrorSink, VehicleStatus, DEVICE_CAPABILITIES,
};
use static_cell::StaticCell;

#[cfg(feature = "dev-panic")]
use panic_probe as _;
#[cfg(feature = "prod-panic")]
use panic_reset as _;

bind_interrupts!(struct Irqs {
    UART1_IRQ => embassy_rp::uart::BufferedInterruptHandler<UART1>;
    USBCTRL_IRQ => embassy_rp::usb::InterruptHandler<USB>;
});

/// CRSF UART speed (ExpressLRS).
const CRSF_BAUDRATE: u32 = crsf_proto::CRSF_BAUDRATE_ELRS;

/// Bridge service period.
const TICK_PERIOD: Duration = Duration::from_millis(1);

/// Vehicle status for the LED task ("latest value wins").
static STATUS_SIGNAL: StaticCell<StatusSignal> = StaticCell::new();

/// Raw MAVLink bytes on their way to the USB host.
static MIRROR_PIPE: StaticCell<MirrorPipe> = StaticCell::new();

/// Encoded CRSF packets on their way to UART0.
static CRSF_CHANNEL: StaticCell<CrsfChannel> = StaticCell::new();

/// MAVLink UART ring buffers.
static UART_TX_BUF: StaticCell<[u8; 512]> = StaticCell::new();
static UART_RX_BUF: StaticCell<[u8; 1024]> = StaticCell::new();

/// USB device configuration buffer.
static CONFIG_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static BOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static MSOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static CONTROL_BUF: StaticCell<[u8; 64]> = StaticCell::new();

/// CDC-ACM state.
static CDC_STATE: StaticCell<State> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("MAVLink bridge starting...");

    let p = embassy_rp::init(embassy_rp::config::Config::default());

    let signal = STATUS_SIGNAL.init(Signal::new());
    let pipe = MIRROR_PIPE.init(Pipe::new());
    let channel = CRSF_CHANNEL.init(Channel::new());

    let setup = Setup::init(&DEVICE_CAPABILITIES);
    let config = BridgeConfig::from_setup(&setup);
    info!("Link setup: {:?}", setup);

    // --- MAVLink UART Setup ---
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = setup.rx.serial_baudrate;

    let uart = BufferedUart::new(
        p.UART1,
        p.PIN_8, // TX
        p.PIN_9, // RX
        Irqs,
        UART_TX_BUF.init([0; 512]),
        UART_RX_BUF.init([0; 1024]),
        uart_config,
    );
    let serial = MavlinkSerial::new(uart);

    // --- CRSF UART Setup ---
    let mut crsf_config = UartConfig::default();
    crsf_config.baudrate = CRSF_BAUDRATE;
    let crsf_tx = UartTx::new(p.UART0, p.PIN_0, p.DMA_CH0, crsf_config);

    // --- USB Setup ---
    let usb_driver = Driver::new(p.USB, Irqs);

    let mut usb_config = UsbConfig::new(0x1209, 0x0001); // pid.codes test VID/PID
    usb_config.manufacturer = Some("mLRS");
    usb_config.product = Some("MAVLink Bridge");
    usb_config.serial_number = Some("001");
    usb_config.max_power = 100;
    usb_config.max_packet_size_0 = 64;

    let config_descriptor = CONFIG_DESCRIPTOR.init([0; 256]);
    let bos_descriptor = BOS_DESCRIPTOR.init([0; 256]);
    let msos_descriptor = MSOS_DESCRIPTOR.init([0; 256]);
    let control_buf = CONTROL_BUF.init([0; 64]);

    let mut builder = Builder::new(
        usb_driver,
        usb_config,
        config_descriptor,
        bos_descriptor,
        msos_descriptor,
        control_buf,
    );

    let cdc_state = CDC_STATE.init(State::new());
    let cdc = configure_usb_cdc(&mut builder, cdc_state);

    let usb_device = builder.build();

    // On-board LED on Pico
    let led = Output::new(p.PIN_25, Level::Low);

    let mut bridge = Bridge::new(
        config,
        Some(serial),
        UsbMirrorSink::new(pipe),
        TelemetryMirror::new(),
    );
    bridge.initialize();

    spawner.spawn(usb_task(usb_device).unwrap());
    spawner.spawn(usb_mirror_task(cdc, pipe).unwrap());
    spawner.spawn(crsf_task(crsf_tx, channel).unwrap());
    spawner.spawn(led_task(led, signal).unwrap());
    spawner.spawn(bridge_task(bridge, channel, signal).unwrap());

    info!("MAVLink bridge initialized, waiting for the autopilot...");
}

/// USB device task - runs the USB stack.
#[embassy_executor::task]
async fn usb_task(mut device: embassy_usb::UsbDevice<'static, UsbDriver>) {
    device.run().await;
}

#[embassy_executor::task]
async fn usb_mirror_task(class: CdcAcmClass<'static, UsbDriver>, pipe: &'static MirrorPipe) {
    run_usb_mirror(class, pipe).await
}

#[embassy_executor::task]
async fn crsf_task(tx: UartTx<'static, Async>, channel: &'static CrsfChannel) {
    run_crsf_output(tx, channel).await
}

#[embassy_executor::task]
async fn led_task(led: Output<'static>, signal: &'static StatusSignal) {
    run_status_led(led, signal).await
}

/// Bridge task - services the MAVLink stream every tick and publishes the
/// vehicle status when it changes.
#[embassy_executor::task]
async fn bridge_task(
    mut bridge: Bridge,
    channel: &'static CrsfChannel,
    signal: &'static StatusSignal,
) {
    let mut ticker = Ticker::every(TICK_PERIOD);
    let mut last_status = VehicleStatus::Unknown;
    signal.signal(last_status);

    loop {
        bridge.tick();
        queue_crsf_frames(bridge.subscriber_mut(), channel);

        let status = bridge.query_vehicle_state();
        if status != last_status {
            info!("Vehicle status: {:?}", status);
            signal.signal(status);
            last_status = status;
        }

        ticker.next().await;
    }
}
