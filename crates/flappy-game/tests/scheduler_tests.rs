use std::cell::RefCell;
use std::rc::Rc;

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_time::{Duration, Timer};
use flappy_game::scheduler::{run, tick};
use flappy_game::{Bird, Canvas, GameConfig, GameSession, GameState, TickOutcome};
use input_watcher::InputWatcher;
use rand_core::RngCore;
use tone_sequencer::{Buzzer, Tone, ToneSequencer};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Always opens the gap on row 8.
struct FixedRng;

impl RngCore for FixedRng {
    fn next_u32(&mut self) -> u32 {
        5
    }

    fn next_u64(&mut self) -> u64 {
        5
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        dest.fill(5);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Draw {
    Clear,
    Pixel(i32, i32),
    Update,
}

/// Canvas that records every call in order.
#[derive(Default, Clone)]
struct RecordingCanvas {
    log: Rc<RefCell<Vec<Draw>>>,
}

impl RecordingCanvas {
    fn log(&self) -> Vec<Draw> {
        self.log.borrow().clone()
    }

    fn updates(&self) -> usize {
        self.log.borrow().iter().filter(|d| **d == Draw::Update).count()
    }

    /// Row of the most recently drawn bird pixel.
    fn bird_row(&self) -> Option<i32> {
        let bird_x = Bird::START.x as i32;
        self.log.borrow().iter().rev().find_map(|d| match d {
            Draw::Pixel(x, y) if *x == bird_x => Some(*y),
            _ => None,
        })
    }
}

impl Canvas for RecordingCanvas {
    fn set_pixel(&mut self, x: i32, y: i32, _on: bool) {
        self.log.borrow_mut().push(Draw::Pixel(x, y));
    }

    async fn update(&mut self) {
        self.log.borrow_mut().push(Draw::Update);
    }

    async fn clear(&mut self) {
        self.log.borrow_mut().push(Draw::Clear);
    }
}

/// Buzzer that only remembers the frequencies it was asked for.
#[derive(Default)]
struct FrequencyLog {
    frequencies: Vec<u32>,
}

impl Buzzer for FrequencyLog {
    fn set_frequency(&mut self, frequency_hz: u32) {
        self.frequencies.push(frequency_hz);
    }

    fn set_duty_us(&mut self, _duty_us: u32) {}
}

/// Run the tone worker until the admitted playback has finished and return
/// every frequency it set, from bring-up to silence.
async fn played(tones: &ToneSequencer<NoopRawMutex>) -> Vec<u32> {
    let mut buzzer = FrequencyLog::default();
    let drain = async {
        while tones.is_playing() {
            Timer::after_millis(2).await;
        }
    };
    match select(tones.run(&mut buzzer), drain).await {
        Either::First(()) => panic!("tone worker returned"),
        Either::Second(()) => {}
    }
    buzzer.frequencies
}

// Short segments keep the worker runs quick.
const SCORE: [Tone; 3] = [Tone::new(200, 5), Tone::new(400, 5), Tone::new(600, 5)];
const FAIL: [Tone; 4] = [
    Tone::new(600, 5),
    Tone::new(500, 5),
    Tone::new(300, 5),
    Tone::new(100, 5),
];

const CONFIG: GameConfig = GameConfig::new(&SCORE, &FAIL);

// ---------------------------------------------------------------------------
// tick
// ---------------------------------------------------------------------------

#[futures_test::test]
async fn idle_tick_redraws_without_moving() {
    let mut canvas = RecordingCanvas::default();
    let mut state = GameState::new(FixedRng);
    let tones = ToneSequencer::<NoopRawMutex>::new();

    let outcome = tick(&mut canvas, &mut state, false, &tones, &CONFIG).await;

    assert_eq!(outcome, TickOutcome::Running);
    assert_eq!(*state.bird(), Bird::START);
    assert!(!tones.is_playing());

    // Clear first, flush last, drawing in between: two pipes of eleven
    // cells each, plus the bird.
    let log = canvas.log();
    assert_eq!(log.len(), 25);
    assert_eq!(log.first(), Some(&Draw::Clear));
    assert_eq!(log.last(), Some(&Draw::Update));
    assert!(log[1..24].iter().all(|d| matches!(d, Draw::Pixel(..))));
    assert_eq!(log[23], Draw::Pixel(2, 7));
}

#[futures_test::test]
async fn flap_arms_the_round() {
    let mut canvas = RecordingCanvas::default();
    let mut state = GameState::new(FixedRng);
    let tones = ToneSequencer::<NoopRawMutex>::new();

    tick(&mut canvas, &mut state, true, &tones, &CONFIG).await;

    assert!(state.is_armed());
    assert!((state.bird().y - 6.3).abs() < 1e-4);
    // Drawn after the move, before the flush.
    let log = canvas.log();
    assert_eq!(log[log.len() - 2], Draw::Pixel(2, 6));
    assert_eq!(log.last(), Some(&Draw::Update));
}

#[futures_test::test]
async fn crash_plays_fail_and_resets() {
    let mut canvas = RecordingCanvas::default();
    let mut state = GameState::new(FixedRng);
    let tones = ToneSequencer::<NoopRawMutex>::new();
    state.flap();
    state.bird_mut().y = 20.0;

    let outcome = tick(&mut canvas, &mut state, false, &tones, &CONFIG).await;

    assert_eq!(outcome, TickOutcome::Failed);
    assert_eq!(*state.bird(), Bird::START);
    assert!(!state.is_armed());
    // The crash frame is flushed before the verdict.
    assert_eq!(canvas.log().last(), Some(&Draw::Update));

    assert_eq!(played(&tones).await, [50, 600, 500, 300, 100, 1]);
}

#[futures_test::test]
async fn gap_plays_score_and_keeps_going() {
    let mut canvas = RecordingCanvas::default();
    let mut state = GameState::new(FixedRng);
    let tones = ToneSequencer::<NoopRawMutex>::new();
    state.lanes_mut()[0].x = 2.0;
    state.bird_mut().y = 8.0;

    let outcome = tick(&mut canvas, &mut state, false, &tones, &CONFIG).await;

    assert_eq!(outcome, TickOutcome::Scored);
    assert_eq!(state.bird().y, 8.0);
    assert_eq!(state.lanes()[0].x, 2.0);

    // Still in the gap next tick; the busy buzzer drops the repeat.
    let outcome = tick(&mut canvas, &mut state, false, &tones, &CONFIG).await;
    assert_eq!(outcome, TickOutcome::Scored);

    assert_eq!(played(&tones).await, [50, 200, 400, 600, 1]);
}

// ---------------------------------------------------------------------------
// GameSession
// ---------------------------------------------------------------------------

#[test]
fn start_and_stop_are_idempotent() {
    let watcher = InputWatcher::<NoopRawMutex>::new();
    let session = GameSession::new(&watcher);

    assert!(session.start());
    assert!(!session.start());
    assert!(session.is_active());
    assert!(watcher.is_listening());

    assert!(session.stop());
    assert!(!session.stop());
    assert!(!session.is_active());
    assert!(!watcher.is_listening());
}

#[test]
fn flaps_only_count_while_active() {
    let watcher = InputWatcher::<NoopRawMutex>::new();
    let session = GameSession::new(&watcher);

    session.request_flap();
    assert!(!session.take_flap());

    session.start();
    session.request_flap();
    session.request_flap();
    assert!(session.take_flap());
    assert!(!session.take_flap());
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

#[futures_test::test]
async fn run_ticks_only_while_started() {
    let watcher = InputWatcher::<NoopRawMutex>::new();
    let session = GameSession::new(&watcher);
    let tones = ToneSequencer::<NoopRawMutex>::new();
    let mut state = GameState::new(FixedRng);
    let recorder = RecordingCanvas::default();
    let mut canvas = recorder.clone();
    let config = CONFIG.with_tick_period(Duration::from_millis(5));

    let game = run(&session, &mut canvas, &mut state, &tones, &config);
    let body = async {
        Timer::after_millis(30).await;
        assert_eq!(recorder.updates(), 0);

        session.start();
        Timer::after_millis(60).await;
        let ticked = recorder.updates();
        assert!(ticked >= 5, "only {ticked} ticks");

        session.stop();
        Timer::after_millis(10).await;
        let settled = recorder.updates();
        Timer::after_millis(40).await;
        assert_eq!(recorder.updates(), settled);
    };

    match select(game, body).await {
        Either::First(()) => panic!("game loop returned"),
        Either::Second(()) => {}
    }
}

#[futures_test::test]
async fn quick_restart_begins_a_fresh_round() {
    let watcher = InputWatcher::<NoopRawMutex>::new();
    let session = GameSession::new(&watcher);
    let tones = ToneSequencer::<NoopRawMutex>::new();
    let mut state = GameState::new(FixedRng);
    let recorder = RecordingCanvas::default();
    let mut canvas = recorder.clone();
    let config = CONFIG.with_tick_period(Duration::from_millis(10));

    let game = run(&session, &mut canvas, &mut state, &tones, &config);
    let body = async {
        session.start();
        session.request_flap();
        Timer::after_millis(55).await;
        let climbed = recorder.bird_row();
        assert!(climbed < Some(7), "bird still at {climbed:?}");

        // Stop and start again without giving the loop a chance to notice.
        session.stop();
        session.start();
        Timer::after_millis(35).await;
        assert_eq!(recorder.bird_row(), Some(7), "round was not reset");

        // The restart left no stale start behind: stopping really stops.
        session.stop();
        Timer::after_millis(15).await;
        let settled = recorder.updates();
        Timer::after_millis(40).await;
        assert_eq!(recorder.updates(), settled);
    };

    match select(game, body).await {
        Either::First(()) => panic!("game loop returned"),
        Either::Second(()) => {}
    }
}
