use bus_driver::{BusConfig, BusFactory, BusMode, InitError};
use embassy_nrf::gpio::{Input, Pull};
use embassy_nrf::interrupt::{self, InterruptExt};
use embassy_nrf::mode::Blocking;
use embassy_nrf::pwm::{DutyCycle, Prescaler, SimpleConfig, SimplePwm};
use embassy_nrf::{bind_interrupts, peripherals, rng, twim};
use grounded::uninit::GroundedArrayCell;
use rand_core::{impls, RngCore};
use tone_sequencer::Buzzer;

use crate::board::{steal_twim_bus, ButtonResources, BuzzerResources, TwimBusResources};

bind_interrupts!(struct TwimIrqs {
    TWISPI0 => twim::InterruptHandler<peripherals::TWISPI0>;
});

/// Reasons the TWIM peripheral rejects a bus configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TwimConfigError {
    /// The TWIM block can only act as controller.
    TargetMode,
    /// Only 100, 250 and 400 kHz are available.
    UnsupportedFrequency(u32),
}

/// Destructor token for recovering the TWIM peripheral resources.
pub struct TwimDestructor;

/// Factory for creating the matrix bus from the TWISPI0 peripheral.
pub struct TwimFactory;

/// DMA buffer for TWIM operations, stored in a sound `GroundedArrayCell`.
static TWIM_DMA_BUF: GroundedArrayCell<u8, 32> = GroundedArrayCell::const_init();

impl BusFactory for TwimFactory {
    type Bus = twim::Twim<'static>;
    type Resources = TwimBusResources;
    type Destructor = TwimDestructor;
    type Error = TwimConfigError;

    fn create(
        resources: Self::Resources,
        config: &BusConfig,
    ) -> Result<(Self::Bus, Self::Destructor), (InitError<Self::Error>, Self::Resources)>
    {
        if config.mode == BusMode::Target {
            return Err((InitError::Config(TwimConfigError::TargetMode), resources));
        }
        let frequency = match config.frequency_hz {
            100_000 => twim::Frequency::K100,
            250_000 => twim::Frequency::K250,
            400_000 => twim::Frequency::K400,
            other => {
                return Err((
                    InitError::Config(TwimConfigError::UnsupportedFrequency(other)),
                    resources,
                ))
            }
        };

        let mut twim_config = twim::Config::default();
        twim_config.frequency = frequency;
        twim_config.sda_pullup = config.sda_pullup;
        twim_config.scl_pullup = config.scl_pullup;
        interrupt::TWISPI0.set_priority(interrupt::Priority::P3);

        // SAFETY: The bus driver mutex is held during create, and this only
        // runs on the Idle→Active transition, so no other reference to the
        // buffer is alive. `const_init` leaves it zeroed.
        let buf: &'static mut [u8; 32] =
            unsafe { &mut *(TWIM_DMA_BUF.as_mut_ptr() as *mut [u8; 32]) };

        let bus = twim::Twim::new(
            resources.twim,
            TwimIrqs,
            resources.sda,
            resources.scl,
            twim_config,
            buf,
        );
        Ok((bus, TwimDestructor))
    }

    fn recover(_destructor: Self::Destructor) -> Self::Resources {
        // SAFETY: The driver drops the bus before calling recover, so nothing
        // else holds these peripherals.
        unsafe { steal_twim_bus() }
    }
}

/// PWM clock after the /128 prescaler.
const PWM_CLOCK_HZ: u32 = 16_000_000 >> 7;
/// Lowest rate the 15-bit counter can produce at that clock.
const MIN_FREQUENCY_HZ: u32 = PWM_CLOCK_HZ / 0x7FFF + 1;

/// Buzzer driven by one channel of a `SimplePwm`.
pub struct PwmBuzzer<'d> {
    pwm: SimplePwm<'d>,
    duty_us: u32,
}

impl<'d> PwmBuzzer<'d> {
    pub fn new(pwm: SimplePwm<'d>) -> Self {
        Self { pwm, duty_us: 0 }
    }

    /// Changing the period rescales the counter, so the pulse width is
    /// recomputed after every change.
    fn apply_duty(&mut self) {
        let ticks = u64::from(self.duty_us) * u64::from(PWM_CLOCK_HZ) / 1_000_000;
        let ticks = ticks.min(u64::from(self.pwm.max_duty())) as u16;
        self.pwm.set_duty(0, DutyCycle::normal(ticks));
    }
}

impl Buzzer for PwmBuzzer<'_> {
    fn set_frequency(&mut self, frequency_hz: u32) {
        let clamped = frequency_hz.max(MIN_FREQUENCY_HZ);
        if clamped != frequency_hz {
            trace!("buzzer {} Hz clamped to {} Hz", frequency_hz, clamped);
        }
        self.pwm.set_period(clamped);
        self.apply_duty();
    }

    fn set_duty_us(&mut self, duty_us: u32) {
        self.duty_us = duty_us;
        self.apply_duty();
    }
}

impl BuzzerResources {
    pub fn configure(self) -> PwmBuzzer<'static> {
        let mut config = SimpleConfig::default();
        config.prescaler = Prescaler::Div128;
        PwmBuzzer::new(SimplePwm::new_1ch(self.pwm, self.pin, &config))
    }
}

impl ButtonResources {
    pub fn configure(self) -> Input<'static> {
        Input::new(self.pin, Pull::Down)
    }
}

/// `RngCore` over the on-chip random number generator.
pub struct BoardRng {
    rng: rng::Rng<'static, Blocking>,
}

impl BoardRng {
    pub fn new(rng: embassy_nrf::Peri<'static, peripherals::RNG>) -> Self {
        Self {
            rng: rng::Rng::new_blocking(rng),
        }
    }
}

impl RngCore for BoardRng {
    fn next_u32(&mut self) -> u32 {
        impls::next_u32_via_fill(self)
    }

    fn next_u64(&mut self) -> u64 {
        impls::next_u64_via_fill(self)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.blocking_fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}
