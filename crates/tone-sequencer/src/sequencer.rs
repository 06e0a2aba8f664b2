use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::signal::Signal;
use embassy_time::Timer;
use portable_atomic::{AtomicU8, AtomicUsize, Ordering};

use crate::{Buzzer, Tone, AUDIBLE_DUTY_US, BASE_FREQUENCY_HZ};

const IDLE: u8 = 0;
const PLAYING_TONE: u8 = 1;
const PLAYING_SEQUENCE: u8 = 2;

/// What the buzzer is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlaybackState {
    Idle,
    PlayingTone,
    /// Index of the segment currently sounding.
    PlayingSequence(usize),
}

enum Request {
    Tone(Tone),
    Sequence(&'static [Tone]),
}

/// Shared playback front-end.
///
/// At most one tone or sequence plays at a time. A request made while
/// something is playing is dropped, and playback cannot be cancelled once
/// admitted.
pub struct ToneSequencer<M: RawMutex> {
    state: AtomicU8,
    index: AtomicUsize,
    request: Signal<M, Request>,
}

impl<M: RawMutex> Default for ToneSequencer<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex> ToneSequencer<M> {
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(IDLE),
            index: AtomicUsize::new(0),
            request: Signal::new(),
        }
    }

    /// Sound `frequency_hz` for `duration_ms`.
    ///
    /// Returns `false` without doing anything if playback is in progress.
    pub fn play_tone(&self, frequency_hz: u32, duration_ms: u32) -> bool {
        if !self.admit(PLAYING_TONE) {
            trace!("tone {} Hz dropped, buzzer busy", frequency_hz);
            return false;
        }
        self.request
            .signal(Request::Tone(Tone::new(frequency_hz, duration_ms)));
        true
    }

    /// Play every tone of `sequence` back to back.
    ///
    /// Returns `false` without doing anything if playback is in progress or
    /// the sequence is empty.
    pub fn play_sequence(&self, sequence: &'static [Tone]) -> bool {
        if sequence.is_empty() || !self.admit(PLAYING_SEQUENCE) {
            trace!("sequence of {} dropped", sequence.len());
            return false;
        }
        self.index.store(0, Ordering::Release);
        self.request.signal(Request::Sequence(sequence));
        true
    }

    pub fn state(&self) -> PlaybackState {
        match self.state.load(Ordering::Acquire) {
            PLAYING_TONE => PlaybackState::PlayingTone,
            PLAYING_SEQUENCE => {
                PlaybackState::PlayingSequence(self.index.load(Ordering::Acquire))
            }
            _ => PlaybackState::Idle,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.state.load(Ordering::Acquire) != IDLE
    }

    fn admit(&self, next: u8) -> bool {
        self.state
            .compare_exchange(IDLE, next, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn finish(&self, buzzer: &mut impl Buzzer) {
        buzzer.silence();
        self.index.store(0, Ordering::Release);
        self.state.store(IDLE, Ordering::Release);
    }

    /// Playback worker. Owns the buzzer for its whole lifetime and never
    /// returns.
    pub async fn run(&self, buzzer: &mut impl Buzzer) {
        buzzer.set_frequency(BASE_FREQUENCY_HZ);
        buzzer.set_duty_us(0);
        info!("tone worker ready");

        loop {
            match self.request.wait().await {
                Request::Tone(tone) => {
                    debug!("tone {} Hz for {} ms", tone.frequency_hz, tone.duration_ms);
                    buzzer.set_frequency(tone.frequency_hz);
                    buzzer.set_duty_us(AUDIBLE_DUTY_US);
                    Timer::after_millis(u64::from(tone.duration_ms)).await;
                }
                Request::Sequence(sequence) => {
                    debug!("sequence of {} tones", sequence.len());
                    buzzer.set_duty_us(AUDIBLE_DUTY_US);
                    for (index, tone) in sequence.iter().enumerate() {
                        self.index.store(index, Ordering::Release);
                        buzzer.set_frequency(tone.frequency_hz);
                        Timer::after_millis(u64::from(tone.duration_ms)).await;
                    }
                }
            }
            self.finish(buzzer);
        }
    }
}
