use rand_core::RngCore;

use crate::entity::{Bird, PipeLane};
use crate::{Canvas, FIELD_HEIGHT};

/// Time step per tick.
const DT: f32 = 1.0;
/// Horizontal pipe speed, cells per tick.
const PIPE_VELOCITY: f32 = -0.2;
/// Distance a recycled lane is placed behind the other one.
const LANE_SPACING: f32 = 6.0;
const OPENING_SIZE: f32 = 4.0;
const OPENING_MIN: u32 = 3;
const OPENING_MAX: u32 = 12;
const LANE_START: [f32; 2] = [10.0, 16.0];

/// Bird, pipe lanes and the random source that places the gaps.
pub struct GameState<R: RngCore> {
    bird: Bird,
    lanes: [PipeLane; 2],
    armed: bool,
    rng: R,
}

impl<R: RngCore> GameState<R> {
    pub fn new(rng: R) -> Self {
        let mut state = Self {
            bird: Bird::START,
            lanes: LANE_START.map(|x| PipeLane::new(x, 8.0, OPENING_SIZE)),
            armed: false,
            rng,
        };
        state.setup();
        state
    }

    /// Reset to the start position with fresh gaps. Nothing moves until the
    /// next flap.
    pub fn setup(&mut self) {
        self.bird = Bird::START;
        for (i, x) in LANE_START.into_iter().enumerate() {
            let opening_y = self.random_opening();
            self.lanes[i] = PipeLane::new(x, opening_y, OPENING_SIZE);
        }
        self.armed = false;
    }

    /// Kick the bird upward. The first flap of a round starts the motion.
    pub fn flap(&mut self) {
        self.bird.flap();
        self.armed = true;
    }

    /// Move everything by one step. Returns `false` while waiting for the
    /// first flap.
    pub fn advance(&mut self) -> bool {
        if !self.armed {
            return false;
        }

        for lane in self.lanes.iter_mut() {
            lane.advance(PIPE_VELOCITY, DT);
        }
        self.bird.advance(DT);

        // A lane leaving on the left re-enters behind the other one.
        if self.lanes[0].x < 0.0 {
            self.recycle(0, 1);
        } else if self.lanes[1].x < 0.0 {
            self.recycle(1, 0);
        }
        true
    }

    fn recycle(&mut self, lane: usize, other: usize) {
        self.lanes[lane].x = self.lanes[other].x + LANE_SPACING;
        self.lanes[lane].opening_y = self.random_opening();
    }

    fn random_opening(&mut self) -> f32 {
        let span = OPENING_MAX - OPENING_MIN + 1;
        (self.rng.next_u32() % span + OPENING_MIN) as f32
    }

    pub fn draw(&self, canvas: &mut impl Canvas) {
        for lane in &self.lanes {
            lane.draw(canvas);
        }
        self.bird.draw(canvas);
    }

    /// The bird hit a pipe or left the field.
    pub fn is_terminal(&self) -> bool {
        self.lanes.iter().any(|lane| lane.collides(&self.bird))
            || self.bird.y < 0.0
            || self.bird.y > (FIELD_HEIGHT + 1) as f32
    }

    /// The bird is passing through a gap.
    pub fn is_scoring(&self) -> bool {
        self.lanes.iter().any(|lane| lane.in_opening(&self.bird))
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn bird(&self) -> &Bird {
        &self.bird
    }

    pub fn bird_mut(&mut self) -> &mut Bird {
        &mut self.bird
    }

    pub fn lanes(&self) -> &[PipeLane; 2] {
        &self.lanes
    }

    pub fn lanes_mut(&mut self) -> &mut [PipeLane; 2] {
        &mut self.lanes
    }
}
