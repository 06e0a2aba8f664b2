//! Tone and tone-sequence playback on a single PWM buzzer.
//!
//! Requests are admitted from any task with [`ToneSequencer::play_tone`] or
//! [`ToneSequencer::play_sequence`] and carried out by one long-lived worker,
//! [`ToneSequencer::run`], which owns the [`Buzzer`].
#![no_std]

#[macro_use]
mod fmt;

mod sequencer;

pub use sequencer::{PlaybackState, ToneSequencer};

/// PWM pulse width that makes the buzzer audible.
pub const AUDIBLE_DUTY_US: u32 = 200;
/// Frequency parked on while silent.
pub const SILENT_FREQUENCY_HZ: u32 = 1;
/// Frequency the channel is brought up at.
pub const BASE_FREQUENCY_HZ: u32 = 50;

/// One PWM channel driving a piezo buzzer.
pub trait Buzzer {
    fn set_frequency(&mut self, frequency_hz: u32);
    fn set_duty_us(&mut self, duty_us: u32);

    /// Duty 0, parked at [`SILENT_FREQUENCY_HZ`].
    fn silence(&mut self) {
        self.set_duty_us(0);
        self.set_frequency(SILENT_FREQUENCY_HZ);
    }
}

/// A frequency held for a duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Tone {
    pub frequency_hz: u32,
    pub duration_ms: u32,
}

impl Tone {
    pub const fn new(frequency_hz: u32, duration_ms: u32) -> Self {
        Self {
            frequency_hz,
            duration_ms,
        }
    }
}
