//! One-button "flappy" game on a tiled LED-matrix canvas.
//!
//! [`GameState`] holds the bird and two scrolling pipe lanes, [`GameSession`]
//! carries the start/stop and flap requests between tasks, and
//! [`scheduler::run`] drives the fixed-period update/render cycle.
#![no_std]

#[macro_use]
mod fmt;

mod canvas;
mod entity;
pub mod scheduler;
mod session;
mod state;

pub use canvas::Canvas;
pub use entity::{Bird, PipeLane};
pub use scheduler::{GameConfig, TickOutcome};
pub use session::GameSession;
pub use state::GameState;

/// Rows the game plays on.
pub const FIELD_HEIGHT: i32 = 16;
