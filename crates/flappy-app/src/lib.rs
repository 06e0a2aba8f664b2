#![no_std]

#[doc(hidden)]
#[macro_use]
pub mod util;

pub mod config;
pub mod tasks;

use bus_driver::BusDriver;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use flappy_bsp::TwimFactory;
use flappy_game::GameSession;
use ht16k33_matrix::MatrixArray;
use input_watcher::InputWatcher;
use tone_sequencer::ToneSequencer;

pub const FW_VERSION: &str = env!("FW_VERSION");

/// Shared two-wire bus on TWISPI0.
pub type MatrixBus = BusDriver<CriticalSectionRawMutex, TwimFactory>;

/// The panel array the game draws on.
pub type GameCanvas = MatrixArray<'static, MatrixBus, { config::PANEL_ADDRESSES.len() }>;

pub type Tones = ToneSequencer<CriticalSectionRawMutex>;
pub type Button = InputWatcher<CriticalSectionRawMutex>;
pub type Session = GameSession<'static, CriticalSectionRawMutex>;

pub mod prelude {
    pub use super::{
        config, debug, error, info, tasks::*, trace, unwrap, warn, Button, GameCanvas,
        MatrixBus, Session, Tones, FW_VERSION,
    };
    pub use embassy_executor::Spawner;
    pub use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
    pub use embassy_time::{Duration, Timer};

    pub use flappy_bsp::{Board, BoardRng, PwmBuzzer};
}
