use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::{with_timeout, Duration};
use portable_atomic::{AtomicU32, Ordering};

use crate::config::{BusConfig, RegisterValue, RegisterWidth};
use crate::error::{BusError, InitError};
use crate::factory::BusFactory;
use crate::session::{ActiveBus, BusSession, Phase};

/// Sentinel for "wait forever" in `lock_timeout_ms`.
const UNBOUNDED: u32 = u32::MAX;

/// Shared two-wire bus driver.
///
/// Owns the bus resources and serializes every transaction through one
/// mutex. The bus is created by [`init`](Self::init) and dropped again by
/// [`deinit`](Self::deinit); any transaction outside that window fails with
/// [`BusError::NotInitialized`].
pub struct BusDriver<M: RawMutex, F: BusFactory> {
    state: Mutex<M, Phase<F>>,
    lock_timeout_ms: AtomicU32,
}

impl<M: RawMutex, F: BusFactory> BusDriver<M, F> {
    /// Create an uninitialized driver holding the given resources.
    pub const fn new(resources: F::Resources) -> Self {
        Self {
            state: Mutex::new(Phase::Idle(resources)),
            lock_timeout_ms: AtomicU32::new(UNBOUNDED),
        }
    }

    /// Bring up the bus with `config`.
    ///
    /// Calling `init` on an initialized driver is a no-op. If the factory
    /// fails, the resources are kept so `init` can be retried.
    pub async fn init(&self, config: BusConfig) -> Result<(), BusError<F::Error>> {
        let mut phase = self.state.lock().await;

        // Poisoned only while the factory runs.
        let resources = match phase.take() {
            Phase::Idle(resources) => resources,
            active @ Phase::Active(_) => {
                *phase = active;
                debug!("bus already initialized");
                return Ok(());
            }
            Phase::Poisoned => return Err(BusError::Poisoned),
        };

        let (bus, destructor) = F::create(resources, &config).map_err(|(err, resources)| {
            *phase = Phase::Idle(resources);
            match err {
                InitError::Config(_) => error!("bus init failed: configuration rejected"),
                InitError::Install(_) => error!("bus init failed: peripheral not installed"),
            }
            BusError::from(err)
        })?;

        self.set_lock_timeout(config.lock_timeout);
        *phase = Phase::Active(ActiveBus {
            bus,
            destructor,
            settle_delay: config.settle_delay,
        });
        info!("bus up at {} Hz", config.frequency_hz);
        Ok(())
    }

    /// Tear the bus down and recover its resources.
    ///
    /// Waits for any in-flight transaction. A no-op when already idle.
    pub async fn deinit(&self) -> Result<(), BusError<F::Error>> {
        let mut phase = self.state.lock().await;

        match phase.take() {
            Phase::Active(ActiveBus { bus, destructor, .. }) => {
                drop(bus);
                *phase = Phase::Idle(F::recover(destructor));
                self.set_lock_timeout(None);
                info!("bus released");
                Ok(())
            }
            idle @ Phase::Idle(_) => {
                *phase = idle;
                Ok(())
            }
            Phase::Poisoned => Err(BusError::Poisoned),
        }
    }

    /// Acquire exclusive access to the bus.
    ///
    /// Waits at most the configured lock timeout. Contention blocks rather
    /// than fails until that bound elapses.
    pub async fn session(&self) -> Result<BusSession<'_, M, F>, BusError<F::Error>> {
        let guard = match self.lock_timeout() {
            None => self.state.lock().await,
            Some(timeout) => with_timeout(timeout, self.state.lock())
                .await
                .map_err(|_| {
                    warn!("bus lock not acquired within {}", timeout);
                    BusError::Timeout
                })?,
        };

        let ready = match &*guard {
            Phase::Active(_) => Ok(()),
            Phase::Idle(_) => Err(BusError::NotInitialized),
            Phase::Poisoned => Err(BusError::Poisoned),
        };
        ready.map(|()| BusSession::new(guard))
    }

    /// Write `value` to `register` of the device at `address`.
    pub async fn write_register(
        &self,
        address: u8,
        register: u8,
        value: RegisterValue,
    ) -> Result<(), BusError<F::Error>> {
        self.session()
            .await?
            .write_register(address, register, value)
            .await
    }

    /// Read a `width`-sized register of the device at `address`.
    pub async fn read_register(
        &self,
        address: u8,
        register: u8,
        width: RegisterWidth,
    ) -> Result<u16, BusError<F::Error>> {
        self.session()
            .await?
            .read_register(address, register, width)
            .await
    }

    /// Returns `Some(true)` if initialized, `Some(false)` if idle, `None` if
    /// the bus is busy or poisoned.
    ///
    /// Never waits for the lock.
    pub fn is_initialized(&self) -> Option<bool> {
        self.state.try_lock().ok().and_then(|state| match &*state {
            Phase::Active(_) => Some(true),
            Phase::Idle(_) => Some(false),
            Phase::Poisoned => None,
        })
    }

    /// The current bound on waiting for exclusive access.
    pub fn lock_timeout(&self) -> Option<Duration> {
        match self.lock_timeout_ms.load(Ordering::Relaxed) {
            UNBOUNDED => None,
            ms => Some(Duration::from_millis(u64::from(ms))),
        }
    }

    /// Change the bound on waiting for exclusive access.
    pub fn set_lock_timeout(&self, timeout: Option<Duration>) {
        let ms = timeout.map_or(UNBOUNDED, |t| {
            u32::try_from(t.as_millis()).unwrap_or(UNBOUNDED - 1).min(UNBOUNDED - 1)
        });
        self.lock_timeout_ms.store(ms, Ordering::Relaxed);
    }
}
