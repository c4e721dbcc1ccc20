//! Link setup and bridge configuration.
//!
//! [`Setup`] holds the user-facing link settings for both ends of the radio
//! link. [`BridgeConfig`] is the part of it the MAVLink bridge needs, handed to
//! [`crate::MavlinkBridge::new`] at construction.

/// How the serial port payload is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SerialLinkMode {
    /// Bytes are passed through without inspection.
    Transparent,
    /// The stream is MAVLink; frames are parsed and the vehicle state tracked.
    Mavlink,
}

/// Where the transmitter routes the serial stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SerialDestination {
    SerialPort,
    /// Half-duplex bridge on the JR module bay pin 5.
    MBridge,
}

/// Where the transmitter takes RC channels from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelsSource {
    None,
    MBridge,
    InPort,
    /// CRSF on the JR module bay pin 5.
    Crsf,
}

/// Transmitter-side settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TxSetup {
    pub serial_destination: SerialDestination,
    pub channels_source: ChannelsSource,
    pub serial_link_mode: SerialLinkMode,
}

/// Receiver-side settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RxSetup {
    pub serial_baudrate: u32,
    pub serial_link_mode: SerialLinkMode,
}

/// Hardware features that constrain the setup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceCapabilities {
    /// Half-duplex JR bay pin 5 is wired up.
    pub has_jrpin5: bool,
    /// A dedicated RC input port exists.
    pub has_in_port: bool,
}

/// Link settings for both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Setup {
    pub tx: TxSetup,
    pub rx: RxSetup,
}

impl Setup {
    /// Factory defaults.
    pub const DEFAULT: Self = Self {
        tx: TxSetup {
            serial_destination: SerialDestination::SerialPort,
            channels_source: ChannelsSource::None,
            serial_link_mode: SerialLinkMode::Mavlink,
        },
        rx: RxSetup {
            serial_baudrate: 57_600,
            serial_link_mode: SerialLinkMode::Mavlink,
        },
    };

    /// Defaults, sanitized for `caps`.
    #[must_use]
    pub fn init(caps: &DeviceCapabilities) -> Self {
        let mut setup = Self::DEFAULT;
        setup.sanitize(caps);
        setup
    }

    /// Replace settings the hardware cannot honor with safe fallbacks.
    pub fn sanitize(&mut self, caps: &DeviceCapabilities) {
        let tx = &mut self.tx;

        // mBridge and CRSF both need pin 5
        if tx.serial_destination == SerialDestination::MBridge
            && tx.channels_source == ChannelsSource::Crsf
        {
            tx.channels_source = ChannelsSource::None;
        }

        if !caps.has_jrpin5 {
            if tx.serial_destination == SerialDestination::MBridge {
                tx.serial_destination = SerialDestination::SerialPort;
            }
            if matches!(tx.channels_source, ChannelsSource::MBridge | ChannelsSource::Crsf) {
                tx.channels_source = ChannelsSource::None;
            }
        }

        if !caps.has_in_port && tx.channels_source == ChannelsSource::InPort {
            tx.channels_source = ChannelsSource::None;
        }
    }
}

impl Default for Setup {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Configuration of one [`crate::MavlinkBridge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BridgeConfig {
    /// Serial link mode of the receiver end; the bridge runs only in MAVLink mode.
    pub serial_link_mode: SerialLinkMode,
    /// Upper bound on bytes consumed per tick; `None` drains all available input.
    pub max_bytes_per_tick: Option<usize>,
}

impl BridgeConfig {
    #[must_use]
    pub const fn new(serial_link_mode: SerialLinkMode) -> Self {
        Self {
            serial_link_mode,
            max_bytes_per_tick: None,
        }
    }

    #[must_use]
    pub const fn from_setup(setup: &Setup) -> Self {
        Self::new(setup.rx.serial_link_mode)
    }

    /// Limit the bytes consumed by a single tick.
    #[must_use]
    pub const fn with_max_bytes_per_tick(mut self, max: usize) -> Self {
        self.max_bytes_per_tick = Some(max);
        self
    }

    /// Whether the bridge should process the serial stream at all.
    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self.serial_link_mode, SerialLinkMode::Mavlink)
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self::from_setup(&Setup::DEFAULT)
    }
}
