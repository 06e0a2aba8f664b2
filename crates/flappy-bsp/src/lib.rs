//! Board support for the nRF52840 flappy console: pin assignment, the TWIM
//! bus factory, the PWM buzzer, the button input and the hardware RNG.
#![no_std]

#[macro_use]
mod fmt;

mod board;
mod resources;

pub use board::*;
pub use resources::*;
