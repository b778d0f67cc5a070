//! The simulation state object and its per-tick state machine.
//!
//! A [`World`] owns everything the simulation mutates: the bird pools, the
//! pipe stream, the random stream and the parameters. The presentation layer
//! reads it through [`World::snapshot`] and changes it only through
//! [`super::events`] between ticks.

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, warn};

use super::bird::Bird;
use super::brain::{ACTUATOR_COUNT, Brain, SENSOR_COUNT};
use super::error::{Error, Result};
use super::evolution::Evolution;
use super::history::{GenerationRecord, History};
use super::params::Params;
use super::persistence;
use super::pipes::PipeStream;

/// What the world is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Start screen, nothing moves.
    Idle,
    /// A population is evolving.
    Training,
    /// A human races a saved brain.
    PlayerVsAi,
    /// The race is over.
    Finished,
}

/// Outcome of a finished race.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winner {
    /// The human survived longer.
    Player,
    /// The saved brain survived longer.
    Ai,
    /// Both crashed on the same tick.
    Draw,
}

/// Read-only view of a bird for rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BirdView {
    /// Stable bird id.
    pub id: usize,
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Box width.
    pub width: f32,
    /// Box height.
    pub height: f32,
    /// Ticks survived.
    pub score: u32,
    /// Whether the bird crashed.
    pub lost: bool,
    /// Whether a human steers the bird.
    pub human: bool,
}

impl From<&Bird> for BirdView {
    fn from(bird: &Bird) -> Self {
        Self {
            id: bird.id,
            x: bird.x,
            y: bird.y,
            width: bird.width,
            height: bird.height,
            score: bird.score,
            lost: bird.lost,
            human: bird.is_human(),
        }
    }
}

/// Read-only view of a pipe for rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipeView {
    /// Left edge.
    pub x: f32,
    /// Horizontal size.
    pub width: f32,
    /// Where the gap starts.
    pub gap_top: f32,
    /// Where the gap ends.
    pub gap_bottom: f32,
}

/// Everything the presentation layer needs after a batch of ticks.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldSnapshot {
    /// Current mode.
    pub mode: Mode,
    /// Ticks since the generation or race started.
    pub tick: u64,
    /// Current generation number.
    pub generation: u32,
    /// Birds still flying this generation.
    pub alive: usize,
    /// Birds that crashed this generation.
    pub finished: usize,
    /// Configured population size.
    pub population: usize,
    /// Mutation rate the next children will get.
    pub mutation_rate: f32,
    /// Best score seen so far in training.
    pub best_score: u32,
    /// Id of the current best bird, if any.
    pub best_bird: Option<usize>,
    /// Birds to draw.
    pub birds: Vec<BirdView>,
    /// Pipes to draw.
    pub pipes: Vec<PipeView>,
    /// Result of a finished race.
    pub winner: Option<Winner>,
}

/// The whole simulation state.
#[derive(Debug, Clone)]
pub struct World {
    /// Geometry, physics and tunables.
    pub params: Params,
    /// Current mode.
    pub mode: Mode,
    /// Birds still flying in this generation.
    pub active: Vec<Bird>,
    /// Birds that crashed in this generation.
    pub finished: Vec<Bird>,
    /// Human bird of a race.
    pub player: Option<Bird>,
    /// Saved-brain bird of a race.
    pub opponent: Option<Bird>,
    /// Pipes on screen.
    pub pipes: PipeStream,
    /// Ticks since the generation or race started.
    pub tick: u64,
    /// Current generation number (starting at 1).
    pub generation: u32,
    /// Selection state carried across generations.
    pub evolution: Evolution,
    /// Per-generation statistics.
    pub history: History,
    next_id: usize,
    rng: StdRng,
}

impl World {
    /// Creates an idle world.
    pub fn new(mut params: Params) -> Self {
        params.clamp();
        Self {
            rng: StdRng::seed_from_u64(params.seed),
            evolution: Evolution::new(&params),
            params,
            mode: Mode::Idle,
            active: Vec::new(),
            finished: Vec::new(),
            player: None,
            opponent: None,
            pipes: PipeStream::new(),
            tick: 0,
            generation: 1,
            history: History::default(),
            next_id: 0,
        }
    }

    fn spawn_id(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Enters training. Resumes the current population unless there is none
    /// or `force_restart` is set, in which case a fresh random population is
    /// spawned and the random stream is reseeded.
    pub fn start_training(&mut self, force_restart: bool) {
        self.pipes.clear();
        self.tick = 0;
        self.mode = Mode::Training;

        if force_restart || (self.active.is_empty() && self.finished.is_empty()) {
            self.rng = StdRng::seed_from_u64(self.params.seed);
            self.generation = 1;
            self.evolution = Evolution::new(&self.params);
            self.history.clear();
            self.finished.clear();
            let mut birds = Vec::with_capacity(self.params.population_size);
            for _ in 0..self.params.population_size {
                let id = self.spawn_id();
                birds.push(Bird::new_random(id, &self.params, &mut self.rng));
            }
            self.active = birds;
            info!(population = self.active.len(), "started training");
        }
    }

    /// Starts a race between a human bird and a bird flying `brain`.
    pub fn start_match(&mut self, brain: &Brain) -> Result<()> {
        if brain.inputs() != SENSOR_COUNT
            || brain.outputs() != ACTUATOR_COUNT
            || !brain.is_consistent()
        {
            return Err(Error::CorruptData(format!(
                "brain topology {}-{}-{} cannot fly a bird",
                brain.inputs(),
                brain.hidden(),
                brain.outputs()
            )));
        }

        let player_id = self.spawn_id();
        let opponent_id = self.spawn_id();
        self.player = Some(Bird::human(player_id, &self.params));
        self.opponent = Some(Bird::with_brain(opponent_id, brain, &self.params));
        self.active.clear();
        self.finished.clear();
        self.pipes.clear();
        self.tick = 0;
        self.mode = Mode::PlayerVsAi;
        info!("started race against saved brain");
        Ok(())
    }

    /// Starts a race against the brain saved at `params.brain_path`.
    ///
    /// Returns `false` and leaves the world unchanged when no usable brain
    /// is saved.
    pub fn start_match_from_file(&mut self) -> bool {
        let Some(brain) = persistence::load_saved_brain(&self.params.brain_path) else {
            return false;
        };
        match self.start_match(&brain) {
            Ok(()) => true,
            Err(err) => {
                warn!(%err, "cannot race saved brain");
                false
            }
        }
    }

    /// Whether a brain snapshot exists at `params.brain_path`.
    pub fn saved_brain_available(&self) -> bool {
        persistence::saved_brain_exists(&self.params.brain_path)
    }

    /// The "space or click" action: start training from the start screen,
    /// flap during a race, and play again once a race is over.
    pub fn primary_action(&mut self) {
        match self.mode {
            Mode::Idle => self.start_training(false),
            Mode::PlayerVsAi => self.flap_player(),
            Mode::Finished => {
                let brain = self.opponent.as_ref().and_then(Bird::brain).cloned();
                match brain {
                    Some(brain) => {
                        if let Err(err) = self.start_match(&brain) {
                            warn!(%err, "cannot start rematch");
                        }
                    }
                    None => self.start_training(false),
                }
            }
            Mode::Training => {}
        }
    }

    /// Flaps the human bird if a race is running and it is still flying.
    pub fn flap_player(&mut self) {
        if self.mode != Mode::PlayerVsAi {
            return;
        }
        if let Some(player) = self.player.as_mut().filter(|p| !p.lost) {
            player.flap();
        }
    }

    /// Runs `params.simulation_speed` ticks back to back.
    pub fn step_frame(&mut self) {
        for _ in 0..self.params.simulation_speed {
            self.step();
        }
    }

    /// Advances the simulation by one tick.
    pub fn step(&mut self) {
        if matches!(self.mode, Mode::Idle | Mode::Finished) {
            return;
        }

        self.tick += 1;
        self.pipes.advance(self.tick, &self.params, &mut self.rng);

        match self.mode {
            Mode::Training => self.step_training(),
            Mode::PlayerVsAi => self.step_match(),
            Mode::Idle | Mode::Finished => {}
        }
    }

    fn step_training(&mut self) {
        let pipes = self.pipes.as_slice();
        for bird in &mut self.active {
            if let Err(err) = bird.decide(pipes, &self.params) {
                warn!(bird = bird.id, %err, "bird could not decide");
            }
            bird.tick();
            bird.lost = bird.hits_anything(pipes, &self.params);
        }

        let (crashed, flying): (Vec<Bird>, Vec<Bird>) =
            self.active.drain(..).partition(|bird| bird.lost);
        self.active = flying;
        self.finished.extend(crashed);

        self.pipes.credit_passes(self.active.iter_mut(), &self.params);

        if self.active.is_empty() {
            self.advance_generation();
        }
    }

    fn advance_generation(&mut self) {
        let next = self.evolution.next_generation(
            &mut self.finished,
            &self.params,
            &mut self.next_id,
            &mut self.rng,
        );

        let best_score = self.finished.iter().map(|b| b.score).max().unwrap_or(0);
        let mean_score = if self.finished.is_empty() {
            0.0
        } else {
            self.finished.iter().map(|b| f64::from(b.score)).sum::<f64>()
                / self.finished.len() as f64
        };
        let record = GenerationRecord {
            generation: self.generation,
            best_score,
            mean_score,
            mutation_rate: self.evolution.mutation_rate,
        };
        self.history.record(record);
        info!(
            generation = self.generation,
            best_score,
            mean_score,
            mutation_rate = self.evolution.mutation_rate,
            "generation finished"
        );

        self.active = next;
        self.finished.clear();
        self.pipes.clear();
        self.tick = 0;
        self.generation += 1;
    }

    fn step_match(&mut self) {
        let pipes = self.pipes.as_slice();
        for bird in self.player.iter_mut().chain(self.opponent.iter_mut()) {
            if bird.lost {
                continue;
            }
            if let Err(err) = bird.decide(pipes, &self.params) {
                warn!(bird = bird.id, %err, "bird could not decide");
            }
            bird.tick();
            bird.lost = bird.hits_anything(pipes, &self.params);
        }

        let racers = self.player.iter_mut().chain(self.opponent.iter_mut());
        self.pipes
            .credit_passes(racers.filter(|bird| !bird.lost), &self.params);

        let player_lost = self.player.as_ref().is_none_or(|b| b.lost);
        let opponent_lost = self.opponent.as_ref().is_none_or(|b| b.lost);
        if player_lost && opponent_lost {
            self.mode = Mode::Finished;
            info!(winner = ?self.winner(), "race finished");
        }
    }

    /// Bird with the highest score among the flying ones, or among the
    /// crashed ones if none is flying.
    pub fn best_bird(&self) -> Option<&Bird> {
        let pool = if self.active.is_empty() {
            &self.finished
        } else {
            &self.active
        };
        pool.iter().max_by_key(|bird| bird.score)
    }

    /// Saves the best training bird's brain to `params.brain_path`.
    ///
    /// Returns `Ok(false)` when there is nothing to save.
    pub fn save_best_brain(&self) -> Result<bool> {
        if self.mode != Mode::Training {
            return Ok(false);
        }
        let Some(brain) = self.best_bird().and_then(Bird::brain) else {
            return Ok(false);
        };
        brain.save_to_file(&self.params.brain_path)?;
        Ok(true)
    }

    /// Mutation rate the next generation of children will be bred with.
    pub fn current_mutation_rate(&self) -> f32 {
        if self.params.adaptive_mutation && self.generation > 1 {
            self.evolution.mutation_rate
        } else {
            self.params.mutation_rate
        }
    }

    /// Result of a finished race.
    pub fn winner(&self) -> Option<Winner> {
        if self.mode != Mode::Finished {
            return None;
        }
        let player = self.player.as_ref()?.score;
        let ai = self.opponent.as_ref()?.score;
        Some(match player.cmp(&ai) {
            std::cmp::Ordering::Greater => Winner::Player,
            std::cmp::Ordering::Less => Winner::Ai,
            std::cmp::Ordering::Equal => Winner::Draw,
        })
    }

    /// Takes a read-only snapshot for rendering.
    pub fn snapshot(&self) -> WorldSnapshot {
        let birds: Vec<BirdView> = match self.mode {
            Mode::Training => self.active.iter().map(BirdView::from).collect(),
            Mode::PlayerVsAi | Mode::Finished => self
                .player
                .iter()
                .chain(self.opponent.iter())
                .map(BirdView::from)
                .collect(),
            Mode::Idle => Vec::new(),
        };

        let pipes = self
            .pipes
            .iter()
            .map(|pipe| PipeView {
                x: pipe.x,
                width: self.params.pipe_width,
                gap_top: pipe.gap_top,
                gap_bottom: pipe.gap_bottom(&self.params),
            })
            .collect();

        let best = self.best_bird();
        let current_best = best.map_or(0, |bird| bird.score);

        WorldSnapshot {
            mode: self.mode,
            tick: self.tick,
            generation: self.generation,
            alive: self.active.len(),
            finished: self.finished.len(),
            population: self.params.population_size,
            mutation_rate: self.current_mutation_rate(),
            best_score: self.evolution.best_score.max(current_best),
            best_bird: best.map(|bird| bird.id),
            birds,
            pipes,
            winner: self.winner(),
        }
    }
}
