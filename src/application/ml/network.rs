//! Dense feed-forward network trained with Adam on mini-batches.
//!
//! Every instance is built, trained and dropped inside a single predictor
//! call. The random generator is passed in by the caller so a fixed seed
//! reproduces the same weights and the same batch order.

use ndarray::{Array, Array1, Array2, Axis, Dimension, Zip};
use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use thiserror::Error;

/// Probabilities are clamped to `[EPSILON, 1 - EPSILON]` before taking logs
const BCE_EPSILON: f64 = 1e-7;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum NetworkError {
    #[error("Non-finite loss at epoch {epoch}")]
    NonFiniteLoss { epoch: usize },

    #[error("Non-finite prediction")]
    NonFiniteOutput,

    #[error("Non-finite value in {0}")]
    NonFiniteInput(&'static str),

    #[error("Shape mismatch: expected {expected} columns, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Empty training set")]
    EmptyTrainingSet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Tanh,
    Relu,
    Sigmoid,
    Linear,
}

impl Activation {
    fn apply(self, z: &Array2<f64>) -> Array2<f64> {
        match self {
            Activation::Tanh => z.mapv(f64::tanh),
            // NaN must survive so a poisoned batch still fails the loss check
            Activation::Relu => z.mapv(|v| if v > 0.0 || v.is_nan() { v } else { 0.0 }),
            Activation::Sigmoid => z.mapv(|v| 1.0 / (1.0 + (-v).exp())),
            Activation::Linear => z.clone(),
        }
    }

    /// Derivative expressed through the activation output.
    fn derivative(self, a: &Array2<f64>) -> Array2<f64> {
        match self {
            Activation::Tanh => a.mapv(|v| 1.0 - v * v),
            Activation::Relu => a.mapv(|v| {
                if v.is_nan() {
                    v
                } else if v > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }),
            Activation::Sigmoid => a.mapv(|v| v * (1.0 - v)),
            Activation::Linear => Array2::ones(a.dim()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Loss {
    BinaryCrossEntropy,
    MeanSquaredError,
}

impl Loss {
    fn value(self, predictions: &Array2<f64>, targets: &Array2<f64>) -> f64 {
        let n = predictions.len() as f64;
        match self {
            Loss::MeanSquaredError => {
                let diff = predictions - targets;
                (&diff * &diff).sum() / n
            }
            Loss::BinaryCrossEntropy => {
                let p = predictions.mapv(|v| v.clamp(BCE_EPSILON, 1.0 - BCE_EPSILON));
                let q = p.mapv(|v| 1.0 - v);
                let ll = targets * &p.mapv(f64::ln) + &targets.mapv(|t| 1.0 - t) * &q.mapv(f64::ln);
                -ll.sum() / n
            }
        }
    }

    /// Gradient of the loss with respect to the output layer pre-activation.
    fn output_delta(
        self,
        activation: Activation,
        predictions: &Array2<f64>,
        targets: &Array2<f64>,
    ) -> Array2<f64> {
        let n = predictions.len() as f64;
        match (self, activation) {
            (Loss::BinaryCrossEntropy, Activation::Sigmoid) => (predictions - targets) / n,
            (Loss::BinaryCrossEntropy, other) => {
                let p = predictions.mapv(|v| v.clamp(BCE_EPSILON, 1.0 - BCE_EPSILON));
                let denom = p.mapv(|v| v * (1.0 - v));
                ((&p - targets) / &denom) / n * &other.derivative(predictions)
            }
            (Loss::MeanSquaredError, act) => {
                (predictions - targets) * (2.0 / n) * &act.derivative(predictions)
            }
        }
    }
}

/// Layer stack description, built fluently.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkConfig {
    pub input_size: usize,
    pub layers: Vec<(usize, Activation)>,
    pub loss: Loss,
}

impl NetworkConfig {
    pub fn new(input_size: usize) -> Self {
        Self {
            input_size,
            layers: Vec::new(),
            loss: Loss::MeanSquaredError,
        }
    }

    pub fn add_layer(mut self, units: usize, activation: Activation) -> Self {
        self.layers.push((units, activation));
        self
    }

    pub fn with_loss(mut self, loss: Loss) -> Self {
        self.loss = loss;
        self
    }
}

/// Adam with a single step counter shared by every parameter tensor
#[derive(Debug, Clone)]
pub struct Adam {
    pub learning_rate: f64,
    pub beta1: f64,
    pub beta2: f64,
    pub epsilon: f64,
    t: i32,
}

impl Adam {
    pub fn new(learning_rate: f64) -> Self {
        Self {
            learning_rate,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-7,
            t: 0,
        }
    }

    fn step(&mut self) {
        self.t = self.t.saturating_add(1);
    }

    fn apply<D: Dimension>(
        &self,
        param: &mut Array<f64, D>,
        grad: &Array<f64, D>,
        m: &mut Array<f64, D>,
        v: &mut Array<f64, D>,
    ) {
        let (b1, b2) = (self.beta1, self.beta2);
        let bias1 = 1.0 - b1.powi(self.t);
        let bias2 = 1.0 - b2.powi(self.t);
        let lr = self.learning_rate;
        let eps = self.epsilon;

        Zip::from(param)
            .and(grad)
            .and(m)
            .and(v)
            .for_each(|p, &g, m, v| {
                *m = b1 * *m + (1.0 - b1) * g;
                *v = b2 * *v + (1.0 - b2) * g * g;
                let m_hat = *m / bias1;
                let v_hat = *v / bias2;
                *p -= lr * m_hat / (v_hat.sqrt() + eps);
            });
    }
}

#[derive(Debug, Clone)]
struct DenseLayer {
    weights: Array2<f64>,
    biases: Array1<f64>,
    activation: Activation,
    m_w: Array2<f64>,
    v_w: Array2<f64>,
    m_b: Array1<f64>,
    v_b: Array1<f64>,
}

impl DenseLayer {
    /// Glorot-uniform weights, zero biases
    fn new(inputs: usize, units: usize, activation: Activation, rng: &mut StdRng) -> Self {
        let limit = (6.0 / (inputs + units) as f64).sqrt();
        let weights = Array2::from_shape_fn((inputs, units), |_| rng.random_range(-limit..limit));
        Self {
            weights,
            biases: Array1::zeros(units),
            activation,
            m_w: Array2::zeros((inputs, units)),
            v_w: Array2::zeros((inputs, units)),
            m_b: Array1::zeros(units),
            v_b: Array1::zeros(units),
        }
    }

    fn forward(&self, input: &Array2<f64>) -> Array2<f64> {
        let z = input.dot(&self.weights) + &self.biases;
        self.activation.apply(&z)
    }
}

pub struct FeedForwardNetwork {
    input_size: usize,
    layers: Vec<DenseLayer>,
    loss: Loss,
    optimizer: Adam,
}

impl FeedForwardNetwork {
    pub fn from_config(config: &NetworkConfig, learning_rate: f64, rng: &mut StdRng) -> Self {
        let mut layers = Vec::with_capacity(config.layers.len());
        let mut fan_in = config.input_size;
        for &(units, activation) in &config.layers {
            layers.push(DenseLayer::new(fan_in, units, activation, rng));
            fan_in = units;
        }

        Self {
            input_size: config.input_size,
            layers,
            loss: config.loss,
            optimizer: Adam::new(learning_rate),
        }
    }

    pub fn num_parameters(&self) -> usize {
        self.layers
            .iter()
            .map(|l| l.weights.len() + l.biases.len())
            .sum()
    }

    /// Trains for `epochs` full passes over shuffled mini-batches.
    ///
    /// Returns the mean batch loss of the final epoch.
    pub fn fit(
        &mut self,
        x: &Array2<f64>,
        y: &Array2<f64>,
        epochs: usize,
        batch_size: usize,
        rng: &mut StdRng,
    ) -> Result<f64, NetworkError> {
        let n = x.nrows();
        if n == 0 {
            return Err(NetworkError::EmptyTrainingSet);
        }
        self.check_input(x)?;
        if y.nrows() != n {
            return Err(NetworkError::ShapeMismatch {
                expected: n,
                actual: y.nrows(),
            });
        }
        if y.iter().any(|v| !v.is_finite()) {
            return Err(NetworkError::NonFiniteInput("targets"));
        }

        let batch_size = batch_size.max(1);
        let mut indices: Vec<usize> = (0..n).collect();
        let mut last_loss = f64::NAN;

        for epoch in 0..epochs {
            indices.shuffle(rng);
            let mut total = 0.0;
            let mut batches = 0usize;

            for chunk in indices.chunks(batch_size) {
                let xb = x.select(Axis(0), chunk);
                let yb = y.select(Axis(0), chunk);
                let loss = self.train_batch(&xb, &yb);
                if !loss.is_finite() {
                    return Err(NetworkError::NonFiniteLoss { epoch });
                }
                total += loss;
                batches += 1;
            }

            last_loss = total / batches as f64;
        }

        Ok(last_loss)
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array2<f64>, NetworkError> {
        self.check_input(x)?;
        let mut current = x.clone();
        for layer in &self.layers {
            current = layer.forward(&current);
        }
        if current.iter().any(|v| !v.is_finite()) {
            return Err(NetworkError::NonFiniteOutput);
        }
        Ok(current)
    }

    fn check_input(&self, x: &Array2<f64>) -> Result<(), NetworkError> {
        if x.ncols() != self.input_size {
            return Err(NetworkError::ShapeMismatch {
                expected: self.input_size,
                actual: x.ncols(),
            });
        }
        if x.iter().any(|v| !v.is_finite()) {
            return Err(NetworkError::NonFiniteInput("features"));
        }
        Ok(())
    }

    /// One forward/backward pass and Adam update. Returns the batch loss
    /// computed before the update.
    fn train_batch(&mut self, xb: &Array2<f64>, yb: &Array2<f64>) -> f64 {
        let mut inputs: Vec<Array2<f64>> = Vec::with_capacity(self.layers.len());
        let mut outputs: Vec<Array2<f64>> = Vec::with_capacity(self.layers.len());
        let mut current = xb.clone();
        for layer in &self.layers {
            let a = layer.forward(&current);
            inputs.push(current);
            current = a.clone();
            outputs.push(a);
        }

        let loss = self.loss.value(&current, yb);
        if !loss.is_finite() {
            return loss;
        }

        let Some(last) = self.layers.last() else {
            return loss;
        };
        let mut delta = self.loss.output_delta(last.activation, &current, yb);

        let mut grads: Vec<(Array2<f64>, Array1<f64>)> = Vec::with_capacity(self.layers.len());
        for l in (0..self.layers.len()).rev() {
            let grad_w = inputs[l].t().dot(&delta);
            let grad_b = delta.sum_axis(Axis(0));
            if l > 0 {
                let upstream = delta.dot(&self.layers[l].weights.t());
                delta = upstream * &self.layers[l - 1].activation.derivative(&outputs[l - 1]);
            }
            grads.push((grad_w, grad_b));
        }
        grads.reverse();

        self.optimizer.step();
        for (layer, (grad_w, grad_b)) in self.layers.iter_mut().zip(grads) {
            self.optimizer
                .apply(&mut layer.weights, &grad_w, &mut layer.m_w, &mut layer.v_w);
            self.optimizer
                .apply(&mut layer.biases, &grad_b, &mut layer.m_b, &mut layer.v_b);
        }

        loss
    }
}
