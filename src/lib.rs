//! # Flappy Evo - Neuroevolution of Flappy Birds
//!
//! A population of birds learns to fly through scrolling pipes. Every bird is
//! steered by a small neural network, and a genetic algorithm breeds the
//! networks of the birds that survived longest.
//!
//! ## Features
//!
//! - Feed-forward brains (5 sensors, 8 hidden neurons, 1 flap output, sigmoid)
//! - Roulette-wheel selection on squared, normalized scores
//! - Optional elitism, pipe-based fitness bonus and adaptive mutation rate
//! - Saving the best brain and racing it as a human player
//! - Deterministic, seeded simulation independent of rendering
//!
//! ## Core Modules
//!
//! - [`simulation::brain`] - Neural network implementation
//! - [`simulation::bird`] - Bird physics, sensors and collisions
//! - [`simulation::pipes`] - Obstacle generation and scrolling
//! - [`simulation::evolution`] - Fitness, selection and reproduction
//! - [`simulation::world`] - Simulation state and per-tick state machine
//! - [`simulation::events`] - Control events applied between ticks

/// Core simulation logic and data structures.
pub mod simulation {
    /// Birds, their pilots and their physics.
    pub mod bird;
    /// Neural network implementation for bird brains.
    pub mod brain;
    /// Errors produced by the simulation core.
    pub mod error;
    /// Control events applied between ticks.
    pub mod events;
    /// Fitness assignment, selection and reproduction.
    pub mod evolution;
    /// Per-generation statistics.
    pub mod history;
    /// Simulation parameters.
    pub mod params;
    /// Binary snapshots of trained brains.
    pub mod persistence;
    /// Scrolling obstacles.
    pub mod pipes;
    /// Simulation state and the per-tick state machine.
    pub mod world;
}
