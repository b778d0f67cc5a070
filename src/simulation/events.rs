//! Control events from the presentation layer.
//!
//! Input handlers never touch the world directly. They push events into an
//! [`EventQueue`], and [`apply_events`] applies them in order between ticks.

use tracing::{info, warn};

use super::world::{Mode, World};

/// Genetic algorithm enhancements that can be switched on and off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enhancement {
    /// Pipes passed count towards fitness.
    EnhancedFitness,
    /// Top birds are carried over unmutated.
    Elitism,
    /// Mutation rate follows training progress.
    AdaptiveMutation,
}

/// A discrete request from the user.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlEvent {
    /// Space or click: start, flap or play again depending on the mode.
    PrimaryAction,
    /// Flap the human bird.
    Flap,
    /// Enter training.
    StartTraining {
        /// Throw the current population away.
        force_restart: bool,
    },
    /// Race the saved brain.
    StartMatch,
    /// Save the best brain of the current generation.
    SaveBest,
    /// Change the population size.
    AdjustPopulation(i32),
    /// Change the mutation rate.
    AdjustMutationRate(f32),
    /// Change the number of ticks per frame.
    AdjustSpeed(i32),
    /// Flip one of the enhancement toggles.
    Toggle(Enhancement),
}

/// Queue for collecting control events between ticks.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Vec<ControlEvent>,
}

impl EventQueue {
    /// Creates an empty event queue.
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Adds an event to the queue.
    pub fn push(&mut self, event: ControlEvent) {
        self.events.push(event);
    }

    /// Drains all events from the queue.
    pub fn drain(&mut self) -> std::vec::Drain<'_, ControlEvent> {
        self.events.drain(..)
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Applies and drains all queued events.
pub fn apply_events(world: &mut World, queue: &mut EventQueue) {
    for event in queue.drain() {
        apply_event(world, event);
    }
}

fn apply_event(world: &mut World, event: ControlEvent) {
    let tunable = world.mode != Mode::PlayerVsAi;

    match event {
        ControlEvent::PrimaryAction => world.primary_action(),
        ControlEvent::Flap => world.flap_player(),
        ControlEvent::StartTraining { force_restart } => {
            let allowed = if force_restart {
                world.mode == Mode::Training
            } else {
                matches!(world.mode, Mode::Idle | Mode::Finished)
            };
            if allowed {
                world.start_training(force_restart);
            }
        }
        ControlEvent::StartMatch => {
            if world.saved_brain_available() {
                world.start_match_from_file();
            } else {
                info!("no saved brain yet, train one first");
            }
        }
        ControlEvent::SaveBest => match world.save_best_brain() {
            Ok(true) => {}
            Ok(false) => info!("nothing to save"),
            Err(err) => warn!(%err, "could not save best brain"),
        },
        ControlEvent::AdjustPopulation(delta) if tunable => world.params.adjust_population(delta),
        ControlEvent::AdjustMutationRate(delta) if tunable => {
            world.params.adjust_mutation_rate(delta);
        }
        ControlEvent::AdjustSpeed(delta) => world.params.adjust_speed(delta),
        ControlEvent::Toggle(enhancement) if tunable => {
            let flag = match enhancement {
                Enhancement::EnhancedFitness => &mut world.params.enhanced_fitness,
                Enhancement::Elitism => &mut world.params.elitism,
                Enhancement::AdaptiveMutation => &mut world.params.adaptive_mutation,
            };
            *flag = !*flag;
        }
        ControlEvent::AdjustPopulation(_)
        | ControlEvent::AdjustMutationRate(_)
        | ControlEvent::Toggle(_) => {}
    }
}
