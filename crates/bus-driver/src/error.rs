use embedded_hal::i2c::ErrorKind;

/// Errors a [`BusFactory`](crate::BusFactory) reports while bringing up the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitError<E: core::fmt::Debug> {
    /// The requested configuration is not supported by the peripheral.
    Config(E),
    /// The peripheral could not be installed with a valid configuration.
    Install(E),
}

/// Errors that can occur during bus operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusError<E: core::fmt::Debug> {
    /// Bus parameters were rejected during `init`.
    Config(E),
    /// The bus peripheral failed to install during `init`.
    Install(E),
    /// A transaction was not acknowledged or otherwise failed on the wire.
    Fail(ErrorKind),
    /// The driver has not been initialized, or has been deinitialized.
    NotInitialized,
    /// Exclusive access could not be obtained within the lock timeout.
    Timeout,
    /// Driver state was lost mid-transition and cannot be recovered.
    Poisoned,
}

impl<E: core::fmt::Debug> From<InitError<E>> for BusError<E> {
    fn from(err: InitError<E>) -> Self {
        match err {
            InitError::Config(e) => BusError::Config(e),
            InitError::Install(e) => BusError::Install(e),
        }
    }
}
