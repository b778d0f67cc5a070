//! Neural network implementation for bird brains.
//!
//! A fixed-topology perceptron with one hidden layer, sigmoid activations and
//! no biases. Genetic variation comes from [`Brain::mutate`] alone; brains are
//! never crossed over.

use ndarray::{Array1, Array2};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::error::{Error, Result};

/// Sensor values a bird feeds its brain.
pub const SENSOR_COUNT: usize = 5;
/// Hidden neurons in a bird brain.
pub const HIDDEN_COUNT: usize = 8;
/// Actuator outputs (flap or not).
pub const ACTUATOR_COUNT: usize = 1;
/// Half-width of the uniform noise added to a mutated weight.
pub const MUTATION_NOISE: f32 = 0.1;

/// Logistic activation.
#[inline]
pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Feed-forward network with a single hidden layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brain {
    /// Input to hidden weights (`hidden` × `inputs`).
    pub weights_ih: Array2<f32>,
    /// Hidden to output weights (`outputs` × `hidden`).
    pub weights_ho: Array2<f32>,
}

impl Brain {
    /// Creates a network with weights drawn uniformly from [-1, 1].
    pub fn new_random(
        inputs: usize,
        hidden: usize,
        outputs: usize,
        rng: &mut impl Rng,
    ) -> Self {
        Self {
            weights_ih: Array2::from_shape_fn((hidden, inputs), |_| rng.random_range(-1.0..=1.0)),
            weights_ho: Array2::from_shape_fn((outputs, hidden), |_| rng.random_range(-1.0..=1.0)),
        }
    }

    /// Creates the default bird topology with random weights.
    pub fn new_bird(rng: &mut impl Rng) -> Self {
        Self::new_random(SENSOR_COUNT, HIDDEN_COUNT, ACTUATOR_COUNT, rng)
    }

    /// Creates a network whose weights are all zero. Every output is 0.5.
    pub fn zeros(inputs: usize, hidden: usize, outputs: usize) -> Self {
        Self {
            weights_ih: Array2::zeros((hidden, inputs)),
            weights_ho: Array2::zeros((outputs, hidden)),
        }
    }

    /// Number of inputs the network expects.
    pub fn inputs(&self) -> usize {
        self.weights_ih.ncols()
    }

    /// Number of hidden neurons.
    pub fn hidden(&self) -> usize {
        self.weights_ih.nrows()
    }

    /// Number of outputs.
    pub fn outputs(&self) -> usize {
        self.weights_ho.nrows()
    }

    /// Checks that the two weight matrices chain together.
    pub fn is_consistent(&self) -> bool {
        self.weights_ho.ncols() == self.weights_ih.nrows()
    }

    /// Runs a forward pass: `sigmoid(W_ho · sigmoid(W_ih · inputs))`.
    pub fn predict(&self, inputs: &Array1<f32>) -> Result<Array1<f32>> {
        if inputs.len() != self.inputs() {
            return Err(Error::InvalidInput {
                expected: self.inputs(),
                actual: inputs.len(),
            });
        }

        let mut hidden = self.weights_ih.dot(inputs);
        hidden.mapv_inplace(sigmoid);

        let mut output = self.weights_ho.dot(&hidden);
        output.mapv_inplace(sigmoid);
        Ok(output)
    }

    /// Perturbs each weight with probability `rate` by uniform noise in
    /// `[-MUTATION_NOISE, MUTATION_NOISE)`.
    pub fn mutate(&mut self, rate: f32, rng: &mut impl Rng) {
        let mut perturb = |w: f32| {
            if rng.random::<f32>() < rate {
                w + rng.random_range(-MUTATION_NOISE..MUTATION_NOISE)
            } else {
                w
            }
        };
        self.weights_ih.mapv_inplace(&mut perturb);
        self.weights_ho.mapv_inplace(&mut perturb);
    }

    /// Flattens all weights into a single vector, input layer first.
    pub fn to_flat_vector(&self) -> Vec<f32> {
        self.weights_ih
            .iter()
            .chain(self.weights_ho.iter())
            .copied()
            .collect()
    }
}
