use embassy_nrf::gpio::Input;
use flappy_bsp::{BoardRng, PwmBuzzer};
use flappy_game::{scheduler, GameState};
use ht16k33_matrix::MatrixArray;

use crate::{config, Button, GameCanvas, MatrixBus, Session, Tones};

/// Owns the buzzer and plays whatever the game asks for.
#[embassy_executor::task]
pub async fn tone_task(tones: &'static Tones, mut buzzer: PwmBuzzer<'static>) {
    tones.run(&mut buzzer).await;
}

/// Samples the flap button and forwards presses to the running game.
#[embassy_executor::task]
pub async fn button_task(
    button: &'static Button,
    session: &'static Session,
    mut pin: Input<'static>,
) {
    let mut on_press = || session.request_flap();
    button.run(&mut pin, &mut on_press).await;
}

/// Brings up the panel array and runs the game loop on it.
#[embassy_executor::task]
pub async fn game_task(
    bus: &'static MatrixBus,
    session: &'static Session,
    tones: &'static Tones,
    rng: BoardRng,
) {
    let mut canvas: GameCanvas = MatrixArray::new(bus);
    canvas.init(config::ORIENTATION);
    for address in config::PANEL_ADDRESSES {
        if let Err(e) = canvas.add_panel(address).await {
            warn!("panel {:#x} not added: {}", address, e);
        }
    }
    info!(
        "canvas {}x{} on {} panels",
        canvas.width(),
        canvas.height(),
        canvas.panel_count()
    );

    let mut state = GameState::new(rng);
    scheduler::run(session, &mut canvas, &mut state, tones, &config::GAME).await;
}
