use embassy_time::Duration;

/// Role of the local peripheral on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusMode {
    /// The MCU drives the clock and addresses devices.
    Controller,
    /// The MCU answers a remote controller.
    Target,
}

/// Parameters applied when the bus is brought up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusConfig {
    pub mode: BusMode,
    /// Clock speed in Hz.
    pub frequency_hz: u32,
    pub sda_pullup: bool,
    pub scl_pullup: bool,
    /// Upper bound on waiting for exclusive access. `None` waits forever.
    pub lock_timeout: Option<Duration>,
    /// Pause between the register-select write and the data read.
    pub settle_delay: Duration,
}

impl BusConfig {
    pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(30);

    pub const fn new(frequency_hz: u32) -> Self {
        Self {
            mode: BusMode::Controller,
            frequency_hz,
            sda_pullup: true,
            scl_pullup: true,
            lock_timeout: None,
            settle_delay: Self::DEFAULT_SETTLE_DELAY,
        }
    }

    pub const fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = Some(timeout);
        self
    }

    pub const fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }
}

impl Default for BusConfig {
    fn default() -> Self {
        Self::new(100_000)
    }
}

/// Payload of a register write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegisterValue {
    U8(u8),
    U16(u16),
    /// Only the low 24 bits are transmitted.
    U24(u32),
}

impl RegisterValue {
    /// Encode `register` followed by the payload, most-significant byte first.
    ///
    /// Returns the frame buffer and the number of valid bytes in it.
    pub fn frame(self, register: u8) -> ([u8; 4], usize) {
        match self {
            RegisterValue::U8(v) => ([register, v, 0, 0], 2),
            RegisterValue::U16(v) => {
                let [hi, lo] = v.to_be_bytes();
                ([register, hi, lo, 0], 3)
            }
            RegisterValue::U24(v) => {
                let [_, b2, b1, b0] = v.to_be_bytes();
                ([register, b2, b1, b0], 4)
            }
        }
    }
}

/// Width of a register read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegisterWidth {
    U8,
    U16,
}

impl RegisterWidth {
    pub const fn byte_count(self) -> usize {
        match self {
            RegisterWidth::U8 => 1,
            RegisterWidth::U16 => 2,
        }
    }

    /// Assemble a received frame. Devices on this bus send the low byte first.
    pub fn decode(self, buf: &[u8; 2]) -> u16 {
        match self {
            RegisterWidth::U8 => u16::from(buf[0]),
            RegisterWidth::U16 => u16::from_le_bytes(*buf),
        }
    }
}
