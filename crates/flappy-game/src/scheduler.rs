//! Fixed-period game loop.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::{Duration, Ticker};
use rand_core::RngCore;
use tone_sequencer::{Tone, ToneSequencer};

use crate::{Canvas, GameSession, GameState};

/// Period between game updates.
pub const TICK_PERIOD: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Copy)]
pub struct GameConfig {
    pub tick_period: Duration,
    /// Played while the bird passes through a gap.
    pub score_tones: &'static [Tone],
    /// Played when the round ends.
    pub fail_tones: &'static [Tone],
}

impl GameConfig {
    pub const fn new(score_tones: &'static [Tone], fail_tones: &'static [Tone]) -> Self {
        Self {
            tick_period: TICK_PERIOD,
            score_tones,
            fail_tones,
        }
    }

    pub const fn with_tick_period(mut self, tick_period: Duration) -> Self {
        self.tick_period = tick_period;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickOutcome {
    Running,
    /// The bird is inside a gap; the round continues.
    Scored,
    /// The bird crashed; the round was reset.
    Failed,
}

/// One update/render cycle.
///
/// Clears the canvas, applies `flap`, advances and redraws the round, then
/// flushes the canvas before judging the new position.
pub async fn tick<C, R, M>(
    canvas: &mut C,
    state: &mut GameState<R>,
    flap: bool,
    tones: &ToneSequencer<M>,
    config: &GameConfig,
) -> TickOutcome
where
    C: Canvas,
    R: RngCore,
    M: RawMutex,
{
    canvas.clear().await;

    if flap {
        state.flap();
    }
    state.advance();

    state.draw(canvas);
    canvas.update().await;

    if state.is_terminal() {
        tones.play_sequence(config.fail_tones);
        state.setup();
        return TickOutcome::Failed;
    }
    if state.is_scoring() {
        tones.play_sequence(config.score_tones);
        return TickOutcome::Scored;
    }
    TickOutcome::Running
}

/// Game task body. Waits for [`GameSession::start`], then ticks at
/// `config.tick_period` until the session is stopped, and waits again.
/// Every start begins a fresh round, including one that lands before the
/// loop noticed the preceding stop.
///
/// Ticks are not preempted: a slow tick delays the ones after it.
pub async fn run<C, R, M, T>(
    session: &GameSession<'_, M>,
    canvas: &mut C,
    state: &mut GameState<R>,
    tones: &ToneSequencer<T>,
    config: &GameConfig,
) where
    C: Canvas,
    R: RngCore,
    M: RawMutex,
    T: RawMutex,
{
    loop {
        session.wait_started().await;
        state.setup();
        let mut ticker = Ticker::every(config.tick_period);

        while session.is_active() {
            if session.take_restart() {
                debug!("restarted, round reset");
                state.setup();
            }
            let flap = session.take_flap();
            match tick(canvas, state, flap, tones, config).await {
                TickOutcome::Failed => info!("crashed, round reset"),
                TickOutcome::Scored => trace!("scoring"),
                TickOutcome::Running => {}
            }
            ticker.next().await;
        }
        debug!("tick loop idle");
    }
}
