//! Push-button watcher.
//!
//! The button is sampled on a fixed period while listening is enabled. A
//! low-to-high transition reports one press; the handler is not called again
//! until the button has been seen released.
#![no_std]

#[macro_use]
mod fmt;

mod watcher;

pub use watcher::{ButtonState, InputWatcher, POLL_PERIOD};

/// Receives button edges from the watcher.
pub trait EdgeHandler {
    fn on_press(&mut self);

    fn on_release(&mut self) {}
}

impl<F: FnMut()> EdgeHandler for F {
    fn on_press(&mut self) {
        self()
    }
}
