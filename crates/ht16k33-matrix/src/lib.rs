//! Driver for HT16K33-backed 8x8 LED-matrix panels.
//!
//! A [`MatrixPanel`] keeps a shadow copy of its eight row registers and only
//! transmits rows that changed since the last [`MatrixPanel::update`]. A
//! [`MatrixArray`] tiles several panels along one axis into a single canvas.
#![no_std]

#[macro_use]
mod fmt;

mod array;
mod bus;
mod panel;

pub use array::{ArrayError, MatrixArray, Orientation};
pub use bus::RegisterBus;
pub use panel::{MatrixPanel, PanelBuffer, PanelRow, Pixel, COLUMNS, ROWS};
