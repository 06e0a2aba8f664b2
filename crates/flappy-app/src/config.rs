//! Compile-time configuration of the console.

use bus_driver::BusConfig;
use embassy_time::Duration;
use flappy_game::GameConfig;
use ht16k33_matrix::Orientation;
use tone_sequencer::Tone;

/// Matrix bus clock. TWIM supports 100, 250 and 400 kHz.
pub const BUS_FREQUENCY_HZ: u32 = 100_000;

/// Bound on waiting for the bus. `None` waits as long as it takes.
pub const BUS_LOCK_TIMEOUT: Option<Duration> = None;

pub const BUS: BusConfig = {
    let mut config = BusConfig::new(BUS_FREQUENCY_HZ);
    config.sda_pullup = true;
    config.scl_pullup = true;
    config.lock_timeout = BUS_LOCK_TIMEOUT;
    config
};

/// Panel addresses, top to bottom.
pub const PANEL_ADDRESSES: [u8; 2] = [0x70, 0x71];

/// Panels are stacked into an 8x16 field.
pub const ORIENTATION: Orientation = Orientation::Vertical;

pub const SCORE_TONES: [Tone; 3] = [
    Tone::new(200, 200),
    Tone::new(400, 200),
    Tone::new(600, 200),
];

pub const FAIL_TONES: [Tone; 4] = [
    Tone::new(600, 500),
    Tone::new(500, 500),
    Tone::new(300, 500),
    Tone::new(100, 500),
];

pub const GAME: GameConfig = GameConfig::new(&SCORE_TONES, &FAIL_TONES);
