use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::Result;

/// Smallest allowed population.
pub const MIN_POPULATION: usize = 10;
/// Largest allowed population.
pub const MAX_POPULATION: usize = 500;
/// Largest number of ticks simulated per rendered frame.
pub const MAX_SPEED: u32 = 10;

/// Simulation parameters: playfield geometry, physics constants and the
/// run-time tunables the presentation layer may change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Playfield width.
    pub world_width: f32,
    /// Playfield height (ground included).
    pub world_height: f32,
    /// Height of the ground strip at the bottom of the playfield.
    pub ground_height: f32,
    /// Horizontal size of a pipe.
    pub pipe_width: f32,
    /// Vertical size of the opening in a pipe.
    pub pipe_gap: f32,
    /// Ticks between two pipe spawns.
    pub pipe_spawn_interval: u64,
    /// Distance a pipe scrolls left per tick.
    pub pipe_speed: f32,
    /// Minimum distance between the top of the playfield and the gap.
    pub pipe_margin_top: u32,
    /// Minimum distance between the bottom of the gap and the playfield bottom.
    pub pipe_margin_bottom: u32,
    /// Fixed horizontal position of every bird.
    pub bird_x: f32,
    /// Bird bounding box width.
    pub bird_width: f32,
    /// Bird bounding box height.
    pub bird_height: f32,
    /// Velocity added every tick.
    pub gravity: f32,
    /// Velocity a flap sets (negative is up).
    pub lift: f32,
    /// Birds per generation.
    pub population_size: usize,
    /// Per-weight mutation probability.
    pub mutation_rate: f32,
    /// Ticks per rendered frame.
    pub simulation_speed: u32,
    /// Reward pipes passed on top of survival time.
    pub enhanced_fitness: bool,
    /// Carry the top tenth of each generation over unmutated.
    pub elitism: bool,
    /// Scale the mutation rate with training progress.
    pub adaptive_mutation: bool,
    /// Seed of the simulation random stream.
    pub seed: u64,
    /// Where the best brain is saved and loaded from.
    pub brain_path: PathBuf,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            world_width: 400.0,
            world_height: 600.0,
            ground_height: 20.0,
            pipe_width: 52.0,
            pipe_gap: 180.0,
            pipe_spawn_interval: 100,
            pipe_speed: 2.0,
            pipe_margin_top: 50,
            pipe_margin_bottom: 100,
            bird_x: 50.0,
            bird_width: 34.0,
            bird_height: 24.0,
            gravity: 0.25,
            lift: -6.5,
            population_size: 50,
            mutation_rate: 0.05,
            simulation_speed: 1,
            enhanced_fitness: false,
            elitism: false,
            adaptive_mutation: false,
            seed: 42,
            brain_path: PathBuf::from("best_flappy_brain.bin"),
        }
    }
}

impl Params {
    /// Pulls every tunable back into its allowed range.
    pub fn clamp(&mut self) {
        self.population_size = self.population_size.clamp(MIN_POPULATION, MAX_POPULATION);
        self.mutation_rate = self.mutation_rate.clamp(0.0, 1.0);
        self.simulation_speed = self.simulation_speed.clamp(1, MAX_SPEED);
    }

    /// Changes the population size by `delta`, staying within bounds.
    pub fn adjust_population(&mut self, delta: i32) {
        let size = self.population_size as i64 + i64::from(delta);
        self.population_size = size.clamp(MIN_POPULATION as i64, MAX_POPULATION as i64) as usize;
    }

    /// Changes the mutation rate by `delta`, rounded to two decimals.
    pub fn adjust_mutation_rate(&mut self, delta: f32) {
        let rate = ((self.mutation_rate + delta) * 100.0).round() / 100.0;
        self.mutation_rate = rate.clamp(0.0, 1.0);
    }

    /// Changes the simulation speed by `delta`, staying within bounds.
    pub fn adjust_speed(&mut self, delta: i32) {
        let speed = i64::from(self.simulation_speed) + i64::from(delta);
        self.simulation_speed = speed.clamp(1, i64::from(MAX_SPEED)) as u32;
    }

    /// Smallest and largest gap offset a new pipe can get.
    pub fn gap_top_range(&self) -> (u32, u32) {
        let low = self.pipe_margin_top;
        let high = (self.world_height - self.pipe_gap) as u32;
        let high = high.saturating_sub(self.pipe_margin_bottom).max(low);
        (low, high)
    }

    /// Y coordinate of the ground line.
    pub fn ground_y(&self) -> f32 {
        self.world_height - self.ground_height
    }

    /// Saves the parameters to a JSON file.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Loads parameters from a JSON file. Missing fields take their defaults
    /// and out-of-range tunables are clamped.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let mut params: Self = serde_json::from_str(&json)?;
        params.clamp();
        Ok(params)
    }
}
