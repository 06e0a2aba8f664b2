#![no_std]
#![no_main]

use static_cell::StaticCell;

#[cfg(feature = "defmt")]
use defmt_rtt as _;
#[cfg(feature = "defmt")]
use panic_probe as _;
#[cfg(not(feature = "defmt"))]
use panic_reset as _;

use flappy_app::prelude::*;

static MATRIX_BUS: StaticCell<MatrixBus> = StaticCell::new();
static TONES: StaticCell<Tones> = StaticCell::new();
static BUTTON: StaticCell<Button> = StaticCell::new();
static SESSION: StaticCell<Session> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("flappy {}", FW_VERSION);
    let board = Board::default();

    let bus: &'static MatrixBus = MATRIX_BUS.init(MatrixBus::new(board.twim_bus));
    unwrap!(bus.init(config::BUS).await);

    let tones: &'static Tones = TONES.init(Tones::new());
    let button: &'static Button = BUTTON.init(Button::new());
    let session: &'static Session = SESSION.init(Session::new(button));

    spawner.must_spawn(tone_task(tones, board.buzzer.configure()));
    spawner.must_spawn(button_task(button, session, board.button.configure()));
    spawner.must_spawn(game_task(bus, session, tones, BoardRng::new(board.rng)));

    // Let the panels come up before the first tick.
    Timer::after_millis(50).await;
    session.start();
}
