use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Timer};
use embedded_hal::digital::{Error as _, InputPin};
use portable_atomic::{AtomicBool, Ordering};

use crate::EdgeHandler;

/// Default sampling period. Also bounds how long a stop request takes.
pub const POLL_PERIOD: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonState {
    pub pressed: bool,
    pub listening: bool,
}

pub struct InputWatcher<M: RawMutex> {
    listening: AtomicBool,
    pressed: AtomicBool,
    start: Signal<M, ()>,
    poll_period: Duration,
}

impl<M: RawMutex> Default for InputWatcher<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex> InputWatcher<M> {
    pub const fn new() -> Self {
        Self::with_poll_period(POLL_PERIOD)
    }

    pub const fn with_poll_period(poll_period: Duration) -> Self {
        Self {
            listening: AtomicBool::new(false),
            pressed: AtomicBool::new(false),
            start: Signal::new(),
            poll_period,
        }
    }

    /// Begin sampling the button. Returns `false` if already listening.
    pub fn start_listening(&self) -> bool {
        if self
            .listening
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }
        self.pressed.store(false, Ordering::Release);
        self.start.signal(());
        true
    }

    /// Ask the worker to stop. Takes effect at its next sample, so up to one
    /// poll period later.
    pub fn stop_listening(&self) {
        self.listening.store(false, Ordering::Release);
    }

    pub fn is_listening(&self) -> bool {
        self.listening.load(Ordering::Acquire)
    }

    pub fn state(&self) -> ButtonState {
        ButtonState {
            pressed: self.pressed.load(Ordering::Acquire),
            listening: self.listening.load(Ordering::Acquire),
        }
    }

    pub fn poll_period(&self) -> Duration {
        self.poll_period
    }

    /// Sample `pin` once and report an edge to `handler` if there was one.
    ///
    /// The button is active high. A failed read skips the sample.
    pub fn poll_once<P: InputPin>(&self, pin: &mut P, handler: &mut impl EdgeHandler) {
        let high = match pin.is_high() {
            Ok(level) => level,
            Err(e) => {
                warn!("button read failed: {}", e.kind());
                return;
            }
        };
        let pressed = self.pressed.load(Ordering::Acquire);

        if high && !pressed {
            self.pressed.store(true, Ordering::Release);
            trace!("button pressed");
            handler.on_press();
        } else if !high && pressed {
            self.pressed.store(false, Ordering::Release);
            handler.on_release();
        }
    }

    /// Sampling worker. Sleeps until [`start_listening`](Self::start_listening)
    /// and samples every poll period until listening is turned off, then
    /// waits for the next start.
    pub async fn run<P: InputPin>(&self, pin: &mut P, handler: &mut impl EdgeHandler) {
        loop {
            self.start.wait().await;
            debug!("button listener started");

            while self.is_listening() {
                self.poll_once(pin, handler);
                Timer::after(self.poll_period).await;
            }
            debug!("button listener stopped");
        }
    }
}
