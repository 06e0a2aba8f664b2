use crate::bus::RegisterBus;

/// Rows per panel.
pub const ROWS: usize = 8;
/// Columns per panel.
pub const COLUMNS: usize = 8;

/// System setup: oscillator on.
const CMD_OSCILLATOR_ON: u8 = 0x21;
/// Display on, blinking off.
const CMD_DISPLAY_ON: u8 = 0x81;
/// Dimming set to 16/16.
const CMD_BRIGHTNESS_MAX: u8 = 0xE7;

/// Display RAM address of row `y`. Each row owns an even/odd register pair;
/// only the even one drives the 8x8 matrix.
#[inline]
const fn row_register(y: usize) -> u8 {
    (y * 2) as u8
}

/// Bit driving column `x` within a row. The panel wiring puts column 0 on the
/// most significant bit and shifts every other column down by one.
#[inline]
const fn column_mask(x: u8) -> u8 {
    if x == 0 {
        0x80
    } else {
        1 << (x - 1)
    }
}

/// One shadowed row register.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PanelRow {
    pub value: u8,
    /// Set while `value` differs from what was last written to the panel.
    pub dirty: bool,
}

/// Shadow copy of a panel's eight row registers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PanelBuffer {
    rows: [PanelRow; ROWS],
}

impl PanelBuffer {
    pub fn rows(&self) -> &[PanelRow; ROWS] {
        &self.rows
    }

    pub fn row(&self, y: usize) -> Option<PanelRow> {
        self.rows.get(y).copied()
    }

    /// True when nothing is waiting to be flushed.
    pub fn is_clean(&self) -> bool {
        self.rows.iter().all(|row| !row.dirty)
    }

    /// Apply one pixel change, returning whether the row byte changed.
    ///
    /// Turning a pixel off toggles its bit, so switching off a pixel that is
    /// already off lights it.
    fn apply(&mut self, x: u8, y: u8, on: bool) -> bool {
        let row = &mut self.rows[usize::from(y)];
        let mask = column_mask(x);
        let next = if on { row.value | mask } else { row.value ^ mask };

        if next == row.value {
            return false;
        }
        row.value = next;
        row.dirty = true;
        true
    }
}

/// A requested pixel state in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Pixel {
    pub x: i32,
    pub y: i32,
    pub on: bool,
}

impl Pixel {
    pub const fn new(x: i32, y: i32, on: bool) -> Self {
        Self { x, y, on }
    }
}

/// A single 8x8 HT16K33 panel.
///
/// Pixel writes only touch the shadow buffer; [`update`](Self::update)
/// transmits the rows that changed. Bus failures never surface to the caller:
/// the buffer moves on as if the write landed and the failure is counted.
pub struct MatrixPanel<'a, B: RegisterBus> {
    bus: &'a B,
    address: u8,
    buffer: PanelBuffer,
    initialized: bool,
    write_failures: u32,
}

impl<'a, B: RegisterBus> MatrixPanel<'a, B> {
    pub const fn new(bus: &'a B, address: u8) -> Self {
        Self {
            bus,
            address,
            buffer: PanelBuffer {
                rows: [PanelRow { value: 0, dirty: false }; ROWS],
            },
            initialized: false,
            write_failures: 0,
        }
    }

    /// 7-bit bus address of the panel.
    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn buffer(&self) -> &PanelBuffer {
        &self.buffer
    }

    /// Number of register writes the bus rejected since creation.
    pub fn write_failures(&self) -> u32 {
        self.write_failures
    }

    /// Start the oscillator, switch the display on at full brightness and
    /// blank every row.
    pub async fn init(&mut self) {
        if self.initialized {
            return;
        }

        self.write(CMD_OSCILLATOR_ON, 0x00).await;
        self.write(CMD_DISPLAY_ON, 0x00).await;
        self.write(CMD_BRIGHTNESS_MAX, 0xFF).await;

        for y in 0..ROWS {
            self.write(row_register(y), 0x00).await;
        }
        self.buffer = PanelBuffer::default();
        self.initialized = true;
        debug!("panel {:#x} initialized", self.address);
    }

    /// Forget the panel state. The display keeps showing its last frame.
    pub fn deinit(&mut self) {
        if self.initialized {
            self.buffer = PanelBuffer::default();
            self.initialized = false;
        }
    }

    /// Set the pixel at local column `x`, row `y`. Off-panel coordinates are
    /// ignored.
    pub fn set_pixel(&mut self, x: u8, y: u8, on: bool) {
        if !self.initialized || usize::from(x) >= COLUMNS || usize::from(y) >= ROWS {
            return;
        }
        self.buffer.apply(x, y, on);
    }

    pub fn set_pixels(&mut self, pixels: impl IntoIterator<Item = Pixel>) {
        for pixel in pixels {
            if let (Ok(x), Ok(y)) = (u8::try_from(pixel.x), u8::try_from(pixel.y)) {
                self.set_pixel(x, y, pixel.on);
            }
        }
    }

    /// Transmit every dirty row, in row order.
    pub async fn update(&mut self) {
        if !self.initialized {
            return;
        }

        for y in 0..ROWS {
            let row = self.buffer.rows[y];
            if row.dirty {
                self.write(row_register(y), row.value).await;
                self.buffer.rows[y].dirty = false;
            }
        }
    }

    /// Blank every lit row right away, bypassing the dirty tracking.
    pub async fn clear(&mut self) {
        if !self.initialized {
            return;
        }

        for y in 0..ROWS {
            if self.buffer.rows[y].value != 0 {
                self.buffer.rows[y] = PanelRow::default();
                self.write(row_register(y), 0x00).await;
            }
        }
    }

    async fn write(&mut self, register: u8, value: u8) {
        if self.bus.write_register(self.address, register, value).await.is_err() {
            self.write_failures = self.write_failures.saturating_add(1);
            warn!(
                "panel {:#x}: write of {:#x} to register {:#x} failed",
                self.address,
                value,
                register
            );
        }
    }
}
