#![no_std]
//! Serialized register access over a shared two-wire bus.
//!
//! A [`BusDriver`] owns the bus peripheral behind a single mutex. The bus is
//! brought up by [`BusDriver::init`] through a [`BusFactory`] and torn down
//! again by [`BusDriver::deinit`], which hands the resources back.
//! Every register transaction holds the mutex for its full duration, so only
//! one transaction is ever in flight.

#[macro_use]
mod fmt;

mod config;
mod driver;
mod error;
mod factory;
mod session;

pub use config::{BusConfig, BusMode, RegisterValue, RegisterWidth};
pub use driver::BusDriver;
pub use error::{BusError, InitError};
pub use factory::BusFactory;
pub use session::BusSession;
