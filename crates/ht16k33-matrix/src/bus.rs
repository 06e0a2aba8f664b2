use bus_driver::{BusDriver, BusError, BusFactory, RegisterValue};
use embassy_sync::blocking_mutex::raw::RawMutex;

/// Byte-wide register writes to a device on a shared bus.
#[allow(async_fn_in_trait)]
pub trait RegisterBus {
    type Error: core::fmt::Debug;

    async fn write_register(
        &self,
        address: u8,
        register: u8,
        value: u8,
    ) -> Result<(), Self::Error>;
}

impl<M: RawMutex, F: BusFactory> RegisterBus for BusDriver<M, F> {
    type Error = BusError<F::Error>;

    async fn write_register(
        &self,
        address: u8,
        register: u8,
        value: u8,
    ) -> Result<(), Self::Error> {
        BusDriver::write_register(self, address, register, RegisterValue::U8(value))
            .await
    }
}
