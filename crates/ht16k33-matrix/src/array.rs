use heapless::Vec;

use crate::bus::RegisterBus;
use crate::panel::{MatrixPanel, Pixel, COLUMNS, ROWS};

/// Axis along which panels are tiled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Orientation {
    /// Panels sit side by side; the canvas grows in width.
    #[default]
    Horizontal,
    /// Panels are stacked; the canvas grows in height.
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ArrayError {
    /// The array has not been initialized.
    NotInitialized,
    /// Every panel slot is taken.
    Full,
}

/// Up to `N` panels tiled into one canvas.
///
/// Panel `i` covers canvas columns `8i..8i+8` when horizontal, or rows
/// `8i..8i+8` when vertical, in the order the panels were added.
pub struct MatrixArray<'a, B: RegisterBus, const N: usize> {
    bus: &'a B,
    orientation: Orientation,
    panels: Vec<MatrixPanel<'a, B>, N>,
    initialized: bool,
}

impl<'a, B: RegisterBus, const N: usize> MatrixArray<'a, B, N> {
    pub const fn new(bus: &'a B) -> Self {
        Self {
            bus,
            orientation: Orientation::Horizontal,
            panels: Vec::new(),
            initialized: false,
        }
    }

    /// Start an empty array tiled along `orientation`. No-op when already
    /// initialized.
    pub fn init(&mut self, orientation: Orientation) {
        if self.initialized {
            return;
        }
        self.orientation = orientation;
        self.panels.clear();
        self.initialized = true;
    }

    /// Release every panel and return to the uninitialized state.
    pub fn deinit(&mut self) {
        if !self.initialized {
            return;
        }
        for panel in self.panels.iter_mut() {
            panel.deinit();
        }
        self.panels.clear();
        self.initialized = false;
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn contains(&self, address: u8) -> bool {
        self.panels.iter().any(|panel| panel.address() == address)
    }

    /// Append and initialize the panel at `address`.
    ///
    /// Adding an address that is already part of the array does nothing.
    pub async fn add_panel(&mut self, address: u8) -> Result<(), ArrayError> {
        if !self.initialized {
            return Err(ArrayError::NotInitialized);
        }
        if self.contains(address) {
            return Ok(());
        }
        if self.panels.is_full() {
            warn!("no slot left for panel {:#x}", address);
            return Err(ArrayError::Full);
        }

        let mut panel = MatrixPanel::new(self.bus, address);
        panel.init().await;
        self.panels.push(panel).map_err(|_| ArrayError::Full)?;
        info!("panel {:#x} added as #{}", address, self.panels.len() - 1);
        Ok(())
    }

    pub fn panel_count(&self) -> usize {
        self.panels.len()
    }

    pub fn panel(&self, index: usize) -> Option<&MatrixPanel<'a, B>> {
        self.panels.get(index)
    }

    pub fn width(&self) -> usize {
        match self.orientation {
            Orientation::Horizontal => COLUMNS * self.panels.len(),
            Orientation::Vertical => COLUMNS,
        }
    }

    pub fn height(&self) -> usize {
        match self.orientation {
            Orientation::Horizontal => ROWS,
            Orientation::Vertical => ROWS * self.panels.len(),
        }
    }

    /// Map canvas coordinates to `(panel index, local x, local y)`.
    pub fn resolve(&self, x: i32, y: i32) -> Option<(usize, u8, u8)> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        if x >= self.width() || y >= self.height() {
            return None;
        }

        let (index, local_x, local_y) = match self.orientation {
            Orientation::Horizontal => (x / COLUMNS, x % COLUMNS, y),
            Orientation::Vertical => (y / ROWS, x, y % ROWS),
        };
        // Both locals are below 8 after the bounds check.
        Some((index, local_x as u8, local_y as u8))
    }

    /// Set one canvas pixel. Coordinates outside the canvas are ignored.
    pub fn set_pixel(&mut self, x: i32, y: i32, on: bool) {
        if !self.initialized {
            return;
        }
        if let Some((index, local_x, local_y)) = self.resolve(x, y) {
            self.panels[index].set_pixel(local_x, local_y, on);
        }
    }

    pub fn set_pixels(&mut self, pixels: impl IntoIterator<Item = Pixel>) {
        for pixel in pixels {
            self.set_pixel(pixel.x, pixel.y, pixel.on);
        }
    }

    /// Flush every panel, in the order they were added.
    pub async fn update(&mut self) {
        if !self.initialized {
            return;
        }
        for panel in self.panels.iter_mut() {
            panel.update().await;
        }
    }

    /// Blank every panel, in the order they were added.
    pub async fn clear(&mut self) {
        if !self.initialized {
            return;
        }
        for panel in self.panels.iter_mut() {
            panel.clear().await;
        }
    }

    /// Register writes rejected across all panels.
    pub fn write_failures(&self) -> u32 {
        self.panels
            .iter()
            .fold(0, |total, panel| total.saturating_add(panel.write_failures()))
    }
}
