use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::mutex::MutexGuard;
use embassy_time::{Duration, Timer};
use embedded_hal_async::i2c::{Error as _, I2c};

use crate::config::{RegisterValue, RegisterWidth};
use crate::error::BusError;
use crate::factory::BusFactory;

/// Lifecycle of the bus owned by a driver.
pub(crate) enum Phase<F: BusFactory> {
    /// Bus is not configured; resources are available.
    Idle(F::Resources),
    /// Bus is configured and ready for transactions.
    Active(ActiveBus<F>),
    /// Left behind if a transition panicked halfway.
    Poisoned,
}

impl<F: BusFactory> Phase<F> {
    /// Move the current phase out, leaving `Poisoned` in its place.
    pub(crate) fn take(&mut self) -> Self {
        core::mem::replace(self, Phase::Poisoned)
    }
}

pub(crate) struct ActiveBus<F: BusFactory> {
    pub(crate) bus: F::Bus,
    pub(crate) destructor: F::Destructor,
    pub(crate) settle_delay: Duration,
}

/// Exclusive access to the initialized bus.
///
/// Holding a session blocks every other transaction; dropping it releases the
/// bus. Sessions are only handed out while the driver is initialized.
pub struct BusSession<'a, M: RawMutex, F: BusFactory> {
    guard: MutexGuard<'a, M, Phase<F>>,
}

impl<'a, M: RawMutex, F: BusFactory> BusSession<'a, M, F> {
    /// Only called by `BusDriver` after checking the phase is `Active`.
    pub(crate) fn new(guard: MutexGuard<'a, M, Phase<F>>) -> Self {
        Self { guard }
    }

    fn active(&mut self) -> Result<&mut ActiveBus<F>, BusError<F::Error>> {
        match &mut *self.guard {
            Phase::Active(active) => Ok(active),
            Phase::Idle(_) => Err(BusError::NotInitialized),
            Phase::Poisoned => Err(BusError::Poisoned),
        }
    }

    /// Returns the underlying bus for raw transactions.
    #[inline]
    pub fn bus(&mut self) -> Result<&mut F::Bus, BusError<F::Error>> {
        self.active().map(|active| &mut active.bus)
    }

    /// Write `value` to `register` of the device at `address`.
    pub async fn write_register(
        &mut self,
        address: u8,
        register: u8,
        value: RegisterValue,
    ) -> Result<(), BusError<F::Error>> {
        let (frame, len) = value.frame(register);
        trace!("i2c write {:#x}/{:#x}: {}", address, register, value);

        self.bus()?.write(address, &frame[..len]).await.map_err(|e| {
            let kind = e.kind();
            error!(
                "unable to write register {:#x} at {:#x}: {}",
                register,
                address,
                kind
            );
            BusError::Fail(kind)
        })
    }

    /// Select `register` on the device at `address`, wait for the device to
    /// settle, then read `width` bytes back.
    pub async fn read_register(
        &mut self,
        address: u8,
        register: u8,
        width: RegisterWidth,
    ) -> Result<u16, BusError<F::Error>> {
        let settle_delay = self.active()?.settle_delay;

        if let Err(e) = self.bus()?.write(address, &[register]).await {
            let kind = e.kind();
            error!(
                "unable to select register {:#x} at {:#x}: {}",
                register,
                address,
                kind
            );
            return Err(BusError::Fail(kind));
        }

        Timer::after(settle_delay).await;

        let mut buf = [0u8; 2];
        let len = width.byte_count();
        if let Err(e) = self.bus()?.read(address, &mut buf[..len]).await {
            let kind = e.kind();
            error!(
                "unable to read register {:#x} at {:#x}: {}",
                register,
                address,
                kind
            );
            return Err(BusError::Fail(kind));
        }

        Ok(width.decode(&buf))
    }
}
