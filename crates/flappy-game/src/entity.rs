use crate::{Canvas, FIELD_HEIGHT};

/// Upward speed given by a flap.
pub const FLAP_VELOCITY: f32 = -0.8;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Bird {
    pub x: f32,
    pub y: f32,
    pub vy: f32,
    pub ay: f32,
}

impl Bird {
    pub const START: Bird = Bird {
        x: 2.0,
        y: 7.0,
        vy: -1.0,
        ay: 0.1,
    };

    pub fn flap(&mut self) {
        self.vy = FLAP_VELOCITY;
    }

    pub fn advance(&mut self, dt: f32) {
        self.vy += self.ay * dt;
        self.y += self.vy;
    }

    /// Cell the bird occupies on the canvas.
    pub fn cell(&self) -> (i32, i32) {
        (self.x as i32, self.y as i32)
    }

    pub fn draw(&self, canvas: &mut impl Canvas) {
        let (x, y) = self.cell();
        canvas.set_pixel(x, y, true);
    }
}

/// A vertical pipe with a gap the bird can pass through.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PipeLane {
    pub x: f32,
    /// Row at the centre of the gap.
    pub opening_y: f32,
    pub opening_size: f32,
}

impl PipeLane {
    pub const fn new(x: f32, opening_y: f32, opening_size: f32) -> Self {
        Self {
            x,
            opening_y,
            opening_size,
        }
    }

    pub fn advance(&mut self, vx: f32, dt: f32) {
        self.x += vx * dt;
    }

    pub fn column(&self) -> i32 {
        self.x as i32
    }

    /// True for rows covered by pipe rather than gap.
    pub fn is_pipe_row(&self, y: i32) -> bool {
        let half = self.opening_size / 2.0;
        y < (self.opening_y - half) as i32 || y > (self.opening_y + half) as i32
    }

    /// The bird's cell overlaps pipe.
    pub fn collides(&self, bird: &Bird) -> bool {
        let (x, y) = bird.cell();
        x == self.column() && self.is_pipe_row(y)
    }

    /// The bird's cell sits inside the gap.
    pub fn in_opening(&self, bird: &Bird) -> bool {
        let (x, y) = bird.cell();
        x == self.column() && !self.is_pipe_row(y)
    }

    pub fn draw(&self, canvas: &mut impl Canvas) {
        let x = self.column();
        for y in (0..FIELD_HEIGHT).filter(|&y| self.is_pipe_row(y)) {
            canvas.set_pixel(x, y, true);
        }
    }
}
