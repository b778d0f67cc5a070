//! Generational selection and reproduction.
//!
//! When every bird of a generation has crashed, the finished pool is scored,
//! sorted by fitness and turned into the next population: optional elites
//! are copied verbatim, everything else is a mutated copy of a parent picked
//! by roulette-wheel selection.

use rand::Rng;
use tracing::{debug, warn};

use super::bird::Bird;
use super::params::Params;

/// Bonus score per pipe passed under the enhanced fitness policy.
pub const PIPE_BONUS: f64 = 100.0;
/// Generations without a new best score before the mutation rate is raised.
pub const STAGNATION_LIMIT: u32 = 3;
/// Ceiling of the raised mutation rate.
pub const MAX_ADAPTIVE_RATE: f32 = 0.15;
/// Floor of the lowered mutation rate.
pub const MIN_ADAPTIVE_RATE: f32 = 0.01;
/// Factor applied to the mutation rate right after an improvement.
pub const IMPROVEMENT_FACTOR: f32 = 0.7;

/// How a bird's raw performance turns into fitness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitnessPolicy {
    /// Ticks survived.
    Standard,
    /// Ticks survived plus a bonus per pipe passed.
    Enhanced,
}

impl FitnessPolicy {
    /// Picks the policy configured in `params`.
    pub fn from_params(params: &Params) -> Self {
        if params.enhanced_fitness {
            Self::Enhanced
        } else {
            Self::Standard
        }
    }

    fn raw_score(self, bird: &Bird) -> f64 {
        match self {
            Self::Standard => f64::from(bird.score),
            Self::Enhanced => f64::from(bird.score) + f64::from(bird.pipes_passed) * PIPE_BONUS,
        }
    }
}

/// Assigns normalized, squared fitness to every bird in `pool`.
///
/// Fitness sums to one. If every bird scored zero, each gets `1/N`.
pub fn assign_fitness(pool: &mut [Bird], policy: FitnessPolicy) {
    if pool.is_empty() {
        return;
    }

    let total: f64 = pool.iter().map(|b| policy.raw_score(b).powi(2)).sum();

    if total > 0.0 {
        for bird in pool.iter_mut() {
            bird.fitness = policy.raw_score(bird).powi(2) / total;
        }
    } else {
        let uniform = 1.0 / pool.len() as f64;
        for bird in pool.iter_mut() {
            bird.fitness = uniform;
        }
    }
}

/// Sorts by fitness, highest first. Ties keep their order.
pub fn sort_by_fitness(pool: &mut [Bird]) {
    pool.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));
}

/// Roulette-wheel pick over a fitness-sorted pool for a draw `r` in [0, 1).
///
/// Always returns a valid index for a non-empty pool, even when rounding
/// leaves the cumulative fitness short of `r`.
pub fn roulette_index(pool: &[Bird], r: f64) -> usize {
    let mut cumulative = 0.0;
    for (i, bird) in pool.iter().enumerate() {
        cumulative += bird.fitness;
        if cumulative > r {
            return i;
        }
    }
    pool.len().saturating_sub(1)
}

/// Number of elites carried over for a population of `population` birds.
pub fn elite_count(population: usize) -> usize {
    (population / 10).max(1)
}

/// Cross-generation bookkeeping for the evolution controller.
#[derive(Debug, Clone)]
pub struct Evolution {
    /// Best score any generation has reached.
    pub best_score: u32,
    /// Consecutive generations that did not beat `best_score`.
    pub stagnant_generations: u32,
    /// Mutation rate applied to the most recent children.
    pub mutation_rate: f32,
}

impl Evolution {
    /// Starts tracking with the configured mutation rate.
    pub fn new(params: &Params) -> Self {
        Self {
            best_score: 0,
            stagnant_generations: 0,
            mutation_rate: params.mutation_rate,
        }
    }

    /// Records a generation's best score and returns the mutation rate its
    /// children should get.
    pub fn adapt_mutation_rate(&mut self, generation_best: u32, params: &Params) -> f32 {
        let improved = generation_best > self.best_score;
        if improved {
            self.best_score = generation_best;
            self.stagnant_generations = 0;
        } else {
            self.stagnant_generations += 1;
        }

        let base = params.mutation_rate;
        self.mutation_rate = if !params.adaptive_mutation {
            base
        } else if improved {
            (base * IMPROVEMENT_FACTOR).max(MIN_ADAPTIVE_RATE)
        } else if self.stagnant_generations >= STAGNATION_LIMIT {
            (base * 2.0).min(MAX_ADAPTIVE_RATE)
        } else {
            base
        };
        self.mutation_rate
    }

    /// Turns the finished pool into the next population.
    ///
    /// The pool is left scored and sorted; `next_id` hands out ids for the
    /// new birds.
    pub fn next_generation(
        &mut self,
        finished: &mut [Bird],
        params: &Params,
        next_id: &mut usize,
        rng: &mut impl Rng,
    ) -> Vec<Bird> {
        let population = params.population_size;
        let mut spawn_id = || {
            let id = *next_id;
            *next_id += 1;
            id
        };

        if finished.is_empty() {
            warn!("generation ended with no finished birds, spawning a random population");
            return (0..population)
                .map(|_| Bird::new_random(spawn_id(), params, rng))
                .collect();
        }

        assign_fitness(finished, FitnessPolicy::from_params(params));
        sort_by_fitness(finished);

        let generation_best = finished.iter().map(|b| b.score).max().unwrap_or(0);
        let rate = self.adapt_mutation_rate(generation_best, params);

        let mut next = Vec::with_capacity(population);

        if params.elitism {
            let elites = elite_count(population).min(finished.len());
            for elite in finished.iter().take(elites) {
                next.push(spawn_child(spawn_id(), elite, params));
            }
            debug!(elites, "carried elites over");
        }

        while next.len() < population {
            let parent = &finished[roulette_index(finished, rng.random::<f64>())];
            let mut child = spawn_child(spawn_id(), parent, params);
            if let Some(brain) = child.brain_mut() {
                brain.mutate(rate, rng);
            }
            next.push(child);
        }

        debug!(generation_best, rate, "bred next generation");
        next
    }
}

/// Unmutated offspring of `parent`. Human parents yield human children.
fn spawn_child(id: usize, parent: &Bird, params: &Params) -> Bird {
    Bird::new(id, parent.pilot.clone(), params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn pool_with_scores(scores: &[u32], rng: &mut StdRng) -> Vec<Bird> {
        let params = Params::default();
        scores
            .iter()
            .enumerate()
            .map(|(id, &score)| {
                let mut bird = Bird::new_random(id, &params, rng);
                bird.score = score;
                bird
            })
            .collect()
    }

    #[test]
    fn fitness_sums_to_one() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut pool = pool_with_scores(&[10, 20, 30, 0, 55], &mut rng);
        assign_fitness(&mut pool, FitnessPolicy::Standard);
        let total: f64 = pool.iter().map(|b| b.fitness).sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert!((pool[1].fitness / pool[0].fitness - 4.0).abs() < 1e-9);
    }

    #[test]
    fn zero_scores_get_uniform_fitness() {
        let mut rng = StdRng::seed_from_u64(12);
        let mut pool = pool_with_scores(&[0, 0, 0, 0], &mut rng);
        assign_fitness(&mut pool, FitnessPolicy::Standard);
        assert!(pool.iter().all(|b| (b.fitness - 0.25).abs() < 1e-12));
    }

    #[test]
    fn enhanced_fitness_rewards_pipes() {
        let mut rng = StdRng::seed_from_u64(13);
        let mut pool = pool_with_scores(&[100, 100], &mut rng);
        pool[1].pipes_passed = 1;
        assign_fitness(&mut pool, FitnessPolicy::Enhanced);
        let expected = 200.0_f64.powi(2) / (100.0_f64.powi(2) + 200.0_f64.powi(2));
        assert!((pool[1].fitness - expected).abs() < 1e-12);
    }

    #[test]
    fn roulette_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(14);
        let mut pool = pool_with_scores(&[1, 2, 3], &mut rng);
        assign_fitness(&mut pool, FitnessPolicy::Standard);
        sort_by_fitness(&mut pool);

        for r in [0.0, 0.5, 0.999_999_999, 1.0 - f64::EPSILON, 1.0, 1.5] {
            assert!(roulette_index(&pool, r) < pool.len());
        }
        assert_eq!(roulette_index(&pool, 1.0), pool.len() - 1);
        assert_eq!(roulette_index(&pool, 0.0), 0);
    }

    #[test]
    fn roulette_follows_cumulative_fitness() {
        let mut rng = StdRng::seed_from_u64(15);
        let mut pool = pool_with_scores(&[0, 0], &mut rng);
        pool[0].fitness = 0.7;
        pool[1].fitness = 0.3;
        assert_eq!(roulette_index(&pool, 0.69), 0);
        assert_eq!(roulette_index(&pool, 0.71), 1);
    }

    #[test]
    fn elite_count_has_a_floor_of_one() {
        assert_eq!(elite_count(50), 5);
        assert_eq!(elite_count(10), 1);
        assert_eq!(elite_count(5), 1);
        assert_eq!(elite_count(500), 50);
    }

    #[test]
    fn adaptive_rate_reacts_to_progress() {
        let params = Params {
            adaptive_mutation: true,
            mutation_rate: 0.05,
            ..Params::default()
        };
        let mut evolution = Evolution::new(&params);

        let improved = evolution.adapt_mutation_rate(100, &params);
        assert!((improved - 0.035).abs() < 1e-6);

        assert!((evolution.adapt_mutation_rate(90, &params) - 0.05).abs() < 1e-6);
        assert!((evolution.adapt_mutation_rate(90, &params) - 0.05).abs() < 1e-6);
        assert!((evolution.adapt_mutation_rate(100, &params) - 0.10).abs() < 1e-6);
        assert_eq!(evolution.stagnant_generations, 3);

        let params = Params {
            mutation_rate: 0.1,
            ..params
        };
        assert!((evolution.adapt_mutation_rate(50, &params) - MAX_ADAPTIVE_RATE).abs() < 1e-6);
        let params = Params {
            mutation_rate: 0.005,
            ..params
        };
        assert!((evolution.adapt_mutation_rate(101, &params) - MIN_ADAPTIVE_RATE).abs() < 1e-6);
    }

    #[test]
    fn disabled_adaptation_keeps_configured_rate() {
        let params = Params::default();
        let mut evolution = Evolution::new(&params);
        for best in [10, 5, 5, 5, 5] {
            let rate = evolution.adapt_mutation_rate(best, &params);
            assert!((rate - params.mutation_rate).abs() < f32::EPSILON);
        }
        assert_eq!(evolution.best_score, 10);
    }

    #[test]
    fn next_generation_fills_population_with_fresh_ids() {
        let params = Params {
            population_size: 20,
            ..Params::default()
        };
        let mut rng = StdRng::seed_from_u64(16);
        let mut finished = pool_with_scores(&[5; 20], &mut rng);
        let mut next_id = 20;
        let mut evolution = Evolution::new(&params);

        let next = evolution.next_generation(&mut finished, &params, &mut next_id, &mut rng);

        assert_eq!(next.len(), 20);
        assert_eq!(next_id, 40);
        assert!(next.iter().all(|b| b.score == 0 && !b.lost && b.id >= 20));
    }

    #[test]
    fn elitism_copies_top_brains_unmutated() {
        let params = Params {
            population_size: 50,
            elitism: true,
            mutation_rate: 1.0,
            ..Params::default()
        };
        let mut rng = StdRng::seed_from_u64(17);
        let scores: Vec<u32> = (1..=50).collect();
        let mut finished = pool_with_scores(&scores, &mut rng);
        let mut next_id = 50;
        let mut evolution = Evolution::new(&params);

        let next = evolution.next_generation(&mut finished, &params, &mut next_id, &mut rng);

        let top: Vec<_> = finished.iter().take(5).map(|b| b.brain().unwrap()).collect();
        assert_eq!(finished[0].score, 50);
        for (child, parent) in next.iter().take(5).zip(&top) {
            assert_eq!(child.brain().unwrap(), *parent);
        }

        let unchanged = next
            .iter()
            .filter(|child| finished.iter().any(|p| p.brain() == child.brain()))
            .count();
        assert_eq!(unchanged, 5);
    }

    #[test]
    fn empty_pool_yields_random_population() {
        let params = Params::default();
        let mut rng = StdRng::seed_from_u64(18);
        let mut next_id = 0;
        let mut evolution = Evolution::new(&params);
        let next = evolution.next_generation(&mut [], &params, &mut next_id, &mut rng);
        assert_eq!(next.len(), params.population_size);
    }
}
