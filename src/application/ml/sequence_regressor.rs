use super::network::{Activation, FeedForwardNetwork, Loss, NetworkConfig};
use super::predictor::SignalPredictor;
use crate::domain::config::ModelConfig;
use crate::domain::errors::PipelineError;
use crate::domain::market::ObservationPoint;
use crate::domain::market::observation::prices;
use crate::domain::ml::signal::SEQUENCE_REGRESSOR_NAME;
use crate::domain::ml::{ModelSignal, SignalKind};
use ndarray::Array2;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, warn};

pub const MIN_REGRESSOR_OBSERVATIONS: usize = 20;
pub const SEQUENCE_LENGTH: usize = 8;
/// Normalized move below which the regressor stays flat
const DIFF_THRESHOLD: f64 = 0.0002;

/// Next-value regressor over fixed windows of min-max normalized prices.
///
/// 8 -> 16 tanh -> 1 linear, mean squared error.
#[derive(Debug, Clone)]
pub struct SequenceRegressor {
    learning_rate: f64,
    epochs: usize,
    batch_size: usize,
}

/// Scales prices into [0, 1] over the supplied window. A flat window maps
/// every value to 0.
pub fn normalize(values: &[f64]) -> Vec<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    let divisor = if range == 0.0 { 1.0 } else { range };
    values.iter().map(|v| (v - min) / divisor).collect()
}

impl SequenceRegressor {
    pub fn new(config: &ModelConfig) -> Self {
        Self {
            learning_rate: config.regressor_learning_rate,
            epochs: config.epochs,
            batch_size: config.batch_size,
        }
    }

    fn network_config() -> NetworkConfig {
        NetworkConfig::new(SEQUENCE_LENGTH)
            .add_layer(16, Activation::Tanh)
            .add_layer(1, Activation::Linear)
            .with_loss(Loss::MeanSquaredError)
    }

    /// Maps the predicted normalized move onto a signal.
    pub fn signal_from_diff(diff: f64) -> ModelSignal {
        let signal = if diff > DIFF_THRESHOLD {
            SignalKind::Buy
        } else if diff < -DIFF_THRESHOLD {
            SignalKind::Sell
        } else {
            SignalKind::Hold
        };
        let confidence = (diff.abs() * 10_000.0).round().min(100.0) as u8;
        ModelSignal::new(SEQUENCE_REGRESSOR_NAME, signal, confidence)
    }

    fn training_failure(reason: impl ToString) -> PipelineError {
        let reason = reason.to_string();
        warn!(model = SEQUENCE_REGRESSOR_NAME, %reason, "Training failed");
        PipelineError::training(SEQUENCE_REGRESSOR_NAME, reason)
    }
}

impl Default for SequenceRegressor {
    fn default() -> Self {
        Self::new(&ModelConfig::default())
    }
}

impl SignalPredictor for SequenceRegressor {
    fn predict(
        &self,
        window: &[ObservationPoint],
        seed: u64,
    ) -> Result<ModelSignal, PipelineError> {
        if window.len() < MIN_REGRESSOR_OBSERVATIONS {
            return Ok(ModelSignal::hold(SEQUENCE_REGRESSOR_NAME));
        }

        let normalized = normalize(&prices(window));
        let samples = normalized.len() - SEQUENCE_LENGTH;

        let x = Array2::from_shape_fn((samples, SEQUENCE_LENGTH), |(i, j)| normalized[i + j]);
        let y = Array2::from_shape_fn((samples, 1), |(i, _)| normalized[i + SEQUENCE_LENGTH]);

        let mut rng = StdRng::seed_from_u64(seed);
        let mut network =
            FeedForwardNetwork::from_config(&Self::network_config(), self.learning_rate, &mut rng);
        let loss = network
            .fit(&x, &y, self.epochs, self.batch_size, &mut rng)
            .map_err(Self::training_failure)?;

        let tail = Array2::from_shape_vec(
            (1, SEQUENCE_LENGTH),
            normalized[normalized.len() - SEQUENCE_LENGTH..].to_vec(),
        )
        .map_err(Self::training_failure)?;
        let output = network.predict(&tail).map_err(Self::training_failure)?;
        let predicted = output
            .get((0, 0))
            .copied()
            .ok_or_else(|| Self::training_failure("empty prediction"))?;

        let last = normalized[normalized.len() - 1];
        let diff = predicted - last;

        debug!(
            model = SEQUENCE_REGRESSOR_NAME,
            samples,
            loss,
            predicted,
            diff,
            "Regressor trained"
        );

        Ok(Self::signal_from_diff(diff))
    }

    fn name(&self) -> &str {
        SEQUENCE_REGRESSOR_NAME
    }

    fn min_observations(&self) -> usize {
        MIN_REGRESSOR_OBSERVATIONS
    }
}
