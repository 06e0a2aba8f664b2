use embedded_hal_async::i2c::I2c;

use crate::config::BusConfig;
use crate::error::InitError;

/// Board-specific bring-up and tear-down of the bus peripheral.
///
/// The driver calls [`create`](Self::create) from `init` and
/// [`recover`](Self::recover) from `deinit`, both with the driver lock held.
pub trait BusFactory {
    /// Peripheral handle the register transactions run on.
    type Bus: I2c;
    /// Pins and peripheral instances consumed by `create`.
    type Resources;
    /// Left behind by `create`; turned back into `Resources` once the bus is
    /// gone.
    type Destructor;
    /// Detail attached to [`InitError`].
    type Error: core::fmt::Debug;

    /// Configure the peripheral for `config`.
    ///
    /// A rejected configuration must hand `resources` back untouched so
    /// `init` can be retried.
    fn create(
        resources: Self::Resources,
        config: &BusConfig,
    ) -> Result<(Self::Bus, Self::Destructor), (InitError<Self::Error>, Self::Resources)>;

    fn recover(destructor: Self::Destructor) -> Self::Resources;
}
