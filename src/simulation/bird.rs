//! Birds: physical state, sensors and the pilot that steers them.
//!
//! Birds only move vertically. Horizontal progress is simulated by the pipes
//! scrolling left, so `x` is fixed at spawn.

use ndarray::Array1;
use rand::Rng;

use super::brain::Brain;
use super::error::Result;
use super::params::Params;
use super::pipes::Pipe;

/// Brain output above which a bird flaps.
pub const FLAP_THRESHOLD: f32 = 0.5;
/// Divisor that brings velocities into the brain's input range.
pub const VELOCITY_SCALE: f32 = 10.0;

/// Who decides when a bird flaps.
#[derive(Debug, Clone)]
pub enum Pilot {
    /// The bird asks its neural network every tick.
    Network(Brain),
    /// Flaps are injected from outside; the bird never decides by itself.
    Human,
}

/// A single bird.
#[derive(Debug, Clone)]
pub struct Bird {
    /// Stable identifier, unique within a world.
    pub id: usize,
    /// Horizontal position of the left edge (never changes).
    pub x: f32,
    /// Vertical position of the top edge.
    pub y: f32,
    /// Bounding box width.
    pub width: f32,
    /// Bounding box height.
    pub height: f32,
    /// Vertical velocity (positive is down).
    pub velocity: f32,
    /// Velocity set by a flap.
    pub lift: f32,
    /// Velocity added every tick.
    pub gravity: f32,
    /// Ticks survived.
    pub score: u32,
    /// Pipes flown past.
    pub pipes_passed: u32,
    /// Selection probability, assigned once the bird's episode is over.
    pub fitness: f64,
    /// Set once the bird crashed.
    pub lost: bool,
    /// What steers the bird.
    pub pilot: Pilot,
}

impl Bird {
    /// Spawns a bird at mid-height with the given pilot.
    pub fn new(id: usize, pilot: Pilot, params: &Params) -> Self {
        Self {
            id,
            x: params.bird_x,
            y: params.world_height / 2.0,
            width: params.bird_width,
            height: params.bird_height,
            velocity: 0.0,
            lift: params.lift,
            gravity: params.gravity,
            score: 0,
            pipes_passed: 0,
            fitness: 0.0,
            lost: false,
            pilot,
        }
    }

    /// Spawns a network-driven bird holding its own copy of `brain`.
    pub fn with_brain(id: usize, brain: &Brain, params: &Params) -> Self {
        Self::new(id, Pilot::Network(brain.clone()), params)
    }

    /// Spawns a network-driven bird with a fresh random brain.
    pub fn new_random(id: usize, params: &Params, rng: &mut impl Rng) -> Self {
        Self::new(id, Pilot::Network(Brain::new_bird(rng)), params)
    }

    /// Spawns a human-controlled bird.
    pub fn human(id: usize, params: &Params) -> Self {
        Self::new(id, Pilot::Human, params)
    }

    /// Whether flaps come from outside.
    pub fn is_human(&self) -> bool {
        matches!(self.pilot, Pilot::Human)
    }

    /// The bird's brain, if it has one.
    pub fn brain(&self) -> Option<&Brain> {
        match &self.pilot {
            Pilot::Network(brain) => Some(brain),
            Pilot::Human => None,
        }
    }

    /// Mutable access to the bird's brain, if it has one.
    pub fn brain_mut(&mut self) -> Option<&mut Brain> {
        match &mut self.pilot {
            Pilot::Network(brain) => Some(brain),
            Pilot::Human => None,
        }
    }

    /// First pipe whose right edge is still ahead of the bird.
    pub fn next_pipe<'a>(&self, pipes: &'a [Pipe], params: &Params) -> Option<&'a Pipe> {
        pipes.iter().find(|pipe| pipe.right(params) > self.x)
    }

    /// Normalized sensor readings:
    /// `[y, velocity, pipe x, gap top, gap bottom]`.
    pub fn sense(&self, pipes: &[Pipe], params: &Params) -> Array1<f32> {
        let height = params.world_height;
        let own = [self.y / height, self.velocity / VELOCITY_SCALE];

        let ahead = match self.next_pipe(pipes, params) {
            Some(pipe) => [
                pipe.x / params.world_width,
                pipe.gap_top / height,
                pipe.gap_bottom(params) / height,
            ],
            None => [0.5, 0.5, 0.5],
        };

        own.into_iter().chain(ahead).collect()
    }

    /// Lets the brain decide whether to flap. Human birds never decide.
    ///
    /// Returns whether the bird flapped.
    pub fn decide(&mut self, pipes: &[Pipe], params: &Params) -> Result<bool> {
        let Pilot::Network(brain) = &self.pilot else {
            return Ok(false);
        };

        let output = brain.predict(&self.sense(pipes, params))?;
        let flap = output.first().is_some_and(|&o| o > FLAP_THRESHOLD);
        if flap {
            self.flap();
        }
        Ok(flap)
    }

    /// Sets the velocity to the lift velocity.
    pub fn flap(&mut self) {
        self.velocity = self.lift;
    }

    /// Advances one tick: survival score, gravity, position.
    pub fn tick(&mut self) {
        self.score += 1;
        self.velocity += self.gravity;
        self.y += self.velocity;
    }

    /// Whether the bird touched the ground or left through the top.
    pub fn is_out_of_bounds(&self, params: &Params) -> bool {
        self.y + self.height > params.ground_y() || self.y < 0.0
    }

    /// Whether the bird's box overlaps the solid part of `pipe`.
    pub fn collides_with(&self, pipe: &Pipe, params: &Params) -> bool {
        let overlaps_x = self.x < pipe.right(params) && self.x + self.width > pipe.x;
        let outside_gap = self.y < pipe.gap_top || self.y + self.height > pipe.gap_bottom(params);
        overlaps_x && outside_gap
    }

    /// Whether the bird crashed into anything this tick.
    pub fn hits_anything(&self, pipes: &[Pipe], params: &Params) -> bool {
        self.is_out_of_bounds(params) || pipes.iter().any(|pipe| self.collides_with(pipe, params))
    }
}
