use embassy_nrf::interrupt::Priority;
use embassy_nrf::peripherals::{self, P0_11, P0_13, P0_26, P0_27, PWM0, RNG, TWISPI0};
use embassy_nrf::Peri;

/// Two-wire bus shared by the LED-matrix panels.
pub struct TwimBusResources {
    pub twim: Peri<'static, TWISPI0>,
    pub sda: Peri<'static, P0_26>,
    pub scl: Peri<'static, P0_27>,
}

/// Piezo buzzer on a PWM channel.
pub struct BuzzerResources {
    pub pwm: Peri<'static, PWM0>,
    pub pin: Peri<'static, P0_13>,
}

/// Push-button, active high with an external switch to VDD.
pub struct ButtonResources {
    pub pin: Peri<'static, P0_11>,
}

/// Everything the game firmware uses from the chip.
pub struct Board {
    /// Peripherals for the matrix bus.
    pub twim_bus: TwimBusResources,
    /// Peripherals for the buzzer.
    pub buzzer: BuzzerResources,
    /// Pin for the flap button.
    pub button: ButtonResources,
    /// Random Number Generator.
    pub rng: Peri<'static, RNG>,
}

impl Default for Board {
    fn default() -> Self {
        let mut config = embassy_nrf::config::Config::default();
        config.gpiote_interrupt_priority = Priority::P2;
        config.time_interrupt_priority = Priority::P2;
        Self::new(config)
    }
}

impl Board {
    /// Create a new instance based on HAL configuration
    pub fn new(config: embassy_nrf::config::Config) -> Self {
        let p = embassy_nrf::init(config);

        Self {
            twim_bus: TwimBusResources {
                twim: p.TWISPI0,
                sda: p.P0_26,
                scl: p.P0_27,
            },
            buzzer: BuzzerResources {
                pwm: p.PWM0,
                pin: p.P0_13,
            },
            button: ButtonResources { pin: p.P0_11 },
            rng: p.RNG,
        }
    }
}

/// Steal the bus peripherals back after the driver has been dropped.
///
/// # Safety
///
/// No live driver may still own `TWISPI0`, `P0_26` or `P0_27`.
pub(crate) unsafe fn steal_twim_bus() -> TwimBusResources {
    TwimBusResources {
        twim: peripherals::TWISPI0::steal(),
        sda: peripherals::P0_26::steal(),
        scl: peripherals::P0_27::steal(),
    }
}
