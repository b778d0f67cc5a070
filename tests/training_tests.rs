#![allow(missing_docs)]
#![allow(clippy::float_cmp)]

use flappy_evo::simulation::bird::Bird;
use flappy_evo::simulation::brain::{ACTUATOR_COUNT, Brain, HIDDEN_COUNT, SENSOR_COUNT};
use flappy_evo::simulation::events::{ControlEvent, EventQueue, apply_events};
use flappy_evo::simulation::params::Params;
use flappy_evo::simulation::pipes::Pipe;
use flappy_evo::simulation::world::{Mode, World};
use std::fs;
use std::path::PathBuf;

fn create_test_params() -> Params {
    Params {
        population_size: 10,
        brain_path: std::env::temp_dir().join(format!(
            "flappy_evo_{}_training.bin",
            std::process::id()
        )),
        ..Params::default()
    }
}

/// Replaces the population with birds whose brains never flap.
fn ground_bound_population(world: &mut World) {
    let brain = Brain::zeros(SENSOR_COUNT, HIDDEN_COUNT, ACTUATOR_COUNT);
    world.active = (0..world.params.population_size)
        .map(|i| Bird::with_brain(10_000 + i, &brain, &world.params))
        .collect();
}

/// Steps until the current generation is over.
fn finish_generation(world: &mut World) {
    let generation = world.generation;
    for _ in 0..50_000 {
        world.step();
        if world.generation != generation {
            return;
        }
    }
    panic!("generation {generation} never ended");
}

#[test]
fn test_silent_population_falls_and_breeds() {
    let mut world = World::new(create_test_params());
    world.start_training(false);
    ground_bound_population(&mut world);

    let mut ticks = 0;
    while world.generation == 1 {
        world.step();
        ticks += 1;
        assert!(ticks <= 60, "birds should hit the ground within 60 ticks");
    }

    // They all fall together, no pipe has reached them yet
    assert_eq!(world.generation, 2);
    assert_eq!(world.active.len(), 10);
    assert!(world.finished.is_empty());
    assert_eq!(world.tick, 0);
    assert!(world.pipes.is_empty());

    let record = world.history.last().expect("generation should be recorded");
    assert_eq!(record.generation, 1);
    assert_eq!(record.best_score, ticks);
    assert_eq!(record.mean_score, f64::from(ticks));
    assert_eq!(world.evolution.best_score, ticks);
}

#[test]
fn test_elitism_keeps_best_brains_unmutated() {
    let mut params = create_test_params();
    params.population_size = 50;
    params.elitism = true;
    let mut world = World::new(params);
    world.start_training(false);

    let originals: Vec<Brain> = world
        .active
        .iter()
        .filter_map(|b| b.brain().cloned())
        .collect();

    finish_generation(&mut world);

    assert_eq!(world.active.len(), 50);
    for elite in world.active.iter().take(5) {
        let brain = elite.brain().expect("trained birds have brains");
        assert!(originals.contains(brain));
    }
}

#[test]
fn test_adaptive_mutation_follows_progress() {
    let mut params = create_test_params();
    params.adaptive_mutation = true;
    let mut world = World::new(params);
    world.start_training(false);
    assert_eq!(world.current_mutation_rate(), 0.05);

    finish_generation(&mut world);

    // First generation always improves on nothing
    assert!((world.current_mutation_rate() - 0.035).abs() < 1e-6);
    assert_eq!(world.evolution.stagnant_generations, 0);
}

#[test]
fn test_save_best_then_race_it() {
    let params = create_test_params();
    let path: PathBuf = params.brain_path.clone();
    let mut world = World::new(params);

    // Nothing to save before training starts
    assert!(!world.save_best_brain().unwrap());

    world.start_training(false);
    for _ in 0..10 {
        world.step();
    }
    let best = world
        .best_bird()
        .and_then(Bird::brain)
        .cloned()
        .expect("a bird is flying");

    let mut queue = EventQueue::new();
    queue.push(ControlEvent::SaveBest);
    queue.push(ControlEvent::StartMatch);
    apply_events(&mut world, &mut queue);

    assert_eq!(Brain::load_from_file(&path).unwrap(), best);
    assert_eq!(world.mode, Mode::PlayerVsAi);
    assert!(world.active.is_empty());
    assert_eq!(world.opponent.as_ref().and_then(Bird::brain), Some(&best));
    assert!(world.player.as_ref().is_some_and(Bird::is_human));

    fs::remove_file(&path).ok();
}

#[test]
fn test_population_change_applies_next_generation() {
    let mut world = World::new(create_test_params());
    world.start_training(false);

    let mut queue = EventQueue::new();
    queue.push(ControlEvent::AdjustPopulation(20));
    apply_events(&mut world, &mut queue);
    assert_eq!(world.active.len(), 10);

    finish_generation(&mut world);
    assert_eq!(world.active.len(), 30);
}

#[test]
fn test_pipe_collision_ends_generation() {
    let mut world = World::new(create_test_params());
    world.start_training(false);

    // Spans the birds horizontally, gap well below them
    world.pipes.push(Pipe::new(40.0, 400.0));
    world.step();

    assert_eq!(world.generation, 2);
    assert_eq!(world.active.len(), 10);
    let record = world.history.last().expect("generation should be recorded");
    assert_eq!(record.best_score, 1);
}

#[test]
fn test_passing_a_pipe_is_credited_once() {
    let mut world = World::new(create_test_params());
    world.start_training(false);
    ground_bound_population(&mut world);

    // Birds sit inside the gap while the pipe slides past them
    world.pipes.push(Pipe::new(0.0, 250.0));
    for _ in 0..3 {
        world.step();
    }
    assert_eq!(world.generation, 1);
    assert_eq!(world.active.len(), 10);
    assert!(world.active.iter().all(|b| b.pipes_passed == 1));

    for _ in 0..10 {
        world.step();
    }
    assert!(world.active.iter().all(|b| b.pipes_passed == 1));
}
