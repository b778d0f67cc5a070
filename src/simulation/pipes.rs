//! Procedurally generated pipes scrolling towards the birds.

use std::collections::HashSet;

use rand::Rng;

use super::bird::Bird;
use super::params::Params;

/// A pipe pair with a gap the birds have to fly through.
#[derive(Debug, Clone)]
pub struct Pipe {
    /// Left edge.
    pub x: f32,
    /// Height of the upper pipe, i.e. where the gap starts.
    pub gap_top: f32,
    /// Ids of birds already credited for passing this pipe.
    pub credited: HashSet<usize>,
}

impl Pipe {
    /// Creates a pipe with an uncredited gap.
    pub fn new(x: f32, gap_top: f32) -> Self {
        Self {
            x,
            gap_top,
            credited: HashSet::new(),
        }
    }

    /// Right edge.
    pub fn right(&self, params: &Params) -> f32 {
        self.x + params.pipe_width
    }

    /// Where the gap ends and the lower pipe starts.
    pub fn gap_bottom(&self, params: &Params) -> f32 {
        self.gap_top + params.pipe_gap
    }
}

/// Pipes currently on screen, oldest (leftmost) first.
#[derive(Debug, Clone, Default)]
pub struct PipeStream {
    pipes: Vec<Pipe>,
}

impl PipeStream {
    /// Creates an empty stream.
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns a pipe when `tick` is on the spawn interval, scrolls every pipe
    /// and drops the ones that left the playfield.
    pub fn advance(&mut self, tick: u64, params: &Params, rng: &mut impl Rng) {
        if params.pipe_spawn_interval > 0 && tick % params.pipe_spawn_interval == 0 {
            let (low, high) = params.gap_top_range();
            let gap_top = rng.random_range(low..=high);
            self.pipes.push(Pipe::new(params.world_width, gap_top as f32));
        }

        for pipe in &mut self.pipes {
            pipe.x -= params.pipe_speed;
        }

        self.pipes.retain(|pipe| pipe.right(params) > 0.0);
    }

    /// Credits every bird that has flown past a pipe, once per pipe.
    ///
    /// Returns the number of new credits handed out.
    pub fn credit_passes<'a>(
        &mut self,
        birds: impl IntoIterator<Item = &'a mut Bird>,
        params: &Params,
    ) -> usize {
        let mut credits = 0;
        for bird in birds {
            for pipe in &mut self.pipes {
                if bird.x > pipe.right(params) && pipe.credited.insert(bird.id) {
                    bird.pipes_passed += 1;
                    credits += 1;
                }
            }
        }
        credits
    }

    /// Adds a pipe at the end of the stream.
    pub fn push(&mut self, pipe: Pipe) {
        self.pipes.push(pipe);
    }

    /// Removes every pipe.
    pub fn clear(&mut self) {
        self.pipes.clear();
    }

    /// Pipes in spawn order.
    pub fn iter(&self) -> std::slice::Iter<'_, Pipe> {
        self.pipes.iter()
    }

    /// Pipes in spawn order, as a slice.
    pub fn as_slice(&self) -> &[Pipe] {
        &self.pipes
    }

    /// Number of pipes on screen.
    pub fn len(&self) -> usize {
        self.pipes.len()
    }

    /// Whether no pipe is on screen.
    pub fn is_empty(&self) -> bool {
        self.pipes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn spawns_on_interval_at_right_edge() {
        let params = Params::default();
        let mut rng = StdRng::seed_from_u64(3);
        let mut stream = PipeStream::new();

        for tick in 1..params.pipe_spawn_interval {
            stream.advance(tick, &params, &mut rng);
        }
        assert!(stream.is_empty());

        stream.advance(params.pipe_spawn_interval, &params, &mut rng);
        assert_eq!(stream.len(), 1);
        let pipe = &stream.as_slice()[0];
        assert!((pipe.x - (params.world_width - params.pipe_speed)).abs() < f32::EPSILON);
    }

    #[test]
    fn gap_always_fits_playfield() {
        let params = Params::default();
        let mut rng = StdRng::seed_from_u64(4);
        let mut stream = PipeStream::new();
        for _ in 0..500 {
            stream.clear();
            stream.advance(0, &params, &mut rng);
            let pipe = &stream.as_slice()[0];
            assert!(pipe.gap_top >= params.pipe_margin_top as f32);
            assert!(
                pipe.gap_bottom(&params)
                    <= params.world_height - params.pipe_margin_bottom as f32
            );
        }
    }

    #[test]
    fn offscreen_pipes_are_dropped_in_order() {
        let params = Params::default();
        let mut rng = StdRng::seed_from_u64(5);
        let mut stream = PipeStream::new();
        stream.push(Pipe::new(-params.pipe_width + 1.0, 100.0));
        stream.push(Pipe::new(10.0, 200.0));
        stream.push(Pipe::new(200.0, 300.0));

        stream.advance(1, &params, &mut rng);

        let tops: Vec<f32> = stream.iter().map(|p| p.gap_top).collect();
        assert_eq!(tops, vec![200.0, 300.0]);
    }

    #[test]
    fn passes_are_credited_once() {
        let params = Params::default();
        let mut stream = PipeStream::new();
        stream.push(Pipe::new(-10.0, 100.0));
        let mut birds = vec![Bird::human(1, &params), Bird::human(2, &params)];

        assert_eq!(stream.credit_passes(birds.iter_mut(), &params), 2);
        assert_eq!(stream.credit_passes(birds.iter_mut(), &params), 0);
        assert!(birds.iter().all(|b| b.pipes_passed == 1));
    }
}
