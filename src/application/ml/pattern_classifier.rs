use super::network::{Activation, FeedForwardNetwork, Loss, NetworkConfig};
use super::predictor::SignalPredictor;
use crate::domain::config::ModelConfig;
use crate::domain::errors::PipelineError;
use crate::domain::market::ObservationPoint;
use crate::domain::ml::feature_registry::{self, FEATURE_NAMES};
use crate::domain::ml::signal::PATTERN_CLASSIFIER_NAME;
use crate::domain::ml::{ModelSignal, SignalKind};
use ndarray::Array2;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, warn};

pub const MIN_CLASSIFIER_OBSERVATIONS: usize = 30;
const BUY_THRESHOLD: f64 = 0.60;
const SELL_THRESHOLD: f64 = 0.40;

/// Feed-forward up/down classifier over the four engineered features.
///
/// 4 -> 12 tanh -> 6 relu -> 1 sigmoid, binary cross-entropy.
#[derive(Debug, Clone)]
pub struct PatternClassifier {
    learning_rate: f64,
    epochs: usize,
    batch_size: usize,
}

impl PatternClassifier {
    pub fn new(config: &ModelConfig) -> Self {
        Self {
            learning_rate: config.classifier_learning_rate,
            epochs: config.epochs,
            batch_size: config.batch_size,
        }
    }

    fn network_config() -> NetworkConfig {
        NetworkConfig::new(FEATURE_NAMES.len())
            .add_layer(12, Activation::Tanh)
            .add_layer(6, Activation::Relu)
            .add_layer(1, Activation::Sigmoid)
            .with_loss(Loss::BinaryCrossEntropy)
    }

    /// Maps an up-probability onto a signal and a 0..=100 confidence.
    pub fn signal_from_probability(probability: f64) -> ModelSignal {
        let signal = if probability > BUY_THRESHOLD {
            SignalKind::Buy
        } else if probability < SELL_THRESHOLD {
            SignalKind::Sell
        } else {
            SignalKind::Hold
        };
        let confidence = ((probability - 0.5).abs() * 200.0).round().clamp(0.0, 100.0) as u8;
        ModelSignal::new(PATTERN_CLASSIFIER_NAME, signal, confidence).with_probability(probability)
    }

    fn training_failure(reason: impl ToString) -> PipelineError {
        let reason = reason.to_string();
        warn!(model = PATTERN_CLASSIFIER_NAME, %reason, "Training failed");
        PipelineError::training(PATTERN_CLASSIFIER_NAME, reason)
    }
}

impl Default for PatternClassifier {
    fn default() -> Self {
        Self::new(&ModelConfig::default())
    }
}

impl SignalPredictor for PatternClassifier {
    fn predict(
        &self,
        window: &[ObservationPoint],
        seed: u64,
    ) -> Result<ModelSignal, PipelineError> {
        if window.len() < MIN_CLASSIFIER_OBSERVATIONS {
            return Ok(ModelSignal::hold(PATTERN_CLASSIFIER_NAME));
        }

        let samples = feature_registry::build_training_set(window);
        let Some(latest) = feature_registry::latest_features(window) else {
            return Ok(ModelSignal::hold(PATTERN_CLASSIFIER_NAME));
        };
        if samples.is_empty() {
            return Ok(ModelSignal::hold(PATTERN_CLASSIFIER_NAME));
        }

        let width = FEATURE_NAMES.len();
        let x = Array2::from_shape_vec(
            (samples.len(), width),
            samples.iter().flat_map(|s| s.features.to_array()).collect(),
        )
        .map_err(Self::training_failure)?;
        let y = Array2::from_shape_vec(
            (samples.len(), 1),
            samples
                .iter()
                .map(|s| if s.label { 1.0 } else { 0.0 })
                .collect(),
        )
        .map_err(Self::training_failure)?;

        let mut rng = StdRng::seed_from_u64(seed);
        let mut network =
            FeedForwardNetwork::from_config(&Self::network_config(), self.learning_rate, &mut rng);
        let loss = network
            .fit(&x, &y, self.epochs, self.batch_size, &mut rng)
            .map_err(Self::training_failure)?;

        let query = Array2::from_shape_vec((1, width), latest.to_array().to_vec())
            .map_err(Self::training_failure)?;
        let output = network.predict(&query).map_err(Self::training_failure)?;
        let probability = output
            .get((0, 0))
            .copied()
            .ok_or_else(|| Self::training_failure("empty prediction"))?;

        debug!(
            model = PATTERN_CLASSIFIER_NAME,
            samples = samples.len(),
            loss,
            probability,
            "Classifier trained"
        );

        Ok(Self::signal_from_probability(probability))
    }

    fn name(&self) -> &str {
        PATTERN_CLASSIFIER_NAME
    }

    fn min_observations(&self) -> usize {
        MIN_CLASSIFIER_OBSERVATIONS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(len: usize, f: impl Fn(usize) -> f64) -> Vec<ObservationPoint> {
        (0..len)
            .map(|i| ObservationPoint::new(format!("t{i}"), f(i), 100.0 + (i % 7) as f64))
            .collect()
    }

    #[test]
    fn test_short_window_holds_without_training() {
        let classifier = PatternClassifier::default();
        let window = series(29, |i| 100.0 + i as f64);
        let signal = classifier.predict(&window, 1).unwrap();
        assert_eq!(signal.signal, SignalKind::Hold);
        assert_eq!(signal.confidence, 0);
        assert!(signal.probability.is_none());
    }

    #[test]
    fn test_probability_mapping() {
        let buy = PatternClassifier::signal_from_probability(0.9);
        assert_eq!(buy.signal, SignalKind::Buy);
        assert_eq!(buy.confidence, 80);

        let sell = PatternClassifier::signal_from_probability(0.25);
        assert_eq!(sell.signal, SignalKind::Sell);
        assert_eq!(sell.confidence, 50);

        let hold = PatternClassifier::signal_from_probability(0.55);
        assert_eq!(hold.signal, SignalKind::Hold);
        assert_eq!(hold.confidence, 10);

        // Boundaries are exclusive
        assert_eq!(
            PatternClassifier::signal_from_probability(0.60).signal,
            SignalKind::Hold
        );
        assert_eq!(
            PatternClassifier::signal_from_probability(0.40).signal,
            SignalKind::Hold
        );
    }

    #[test]
    fn test_trained_signal_is_well_formed() {
        let classifier = PatternClassifier::default();
        let window = series(60, |i| 100.0 + (i as f64 * 0.7).sin() * 2.0 + i as f64 * 0.05);
        let signal = classifier.predict(&window, 11).unwrap();
        assert_eq!(signal.model_name, PATTERN_CLASSIFIER_NAME);
        assert!(signal.confidence <= 100);
        let p = signal.probability.unwrap();
        assert!((0.0..=1.0).contains(&p));
    }

    #[test]
    fn test_fixed_seed_is_reproducible() {
        let classifier = PatternClassifier::default();
        let window = series(45, |i| 50.0 + ((i * 37) % 11) as f64);
        let a = classifier.predict(&window, 2024).unwrap();
        let b = classifier.predict(&window, 2024).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_non_finite_price_is_training_failure() {
        let classifier = PatternClassifier::default();
        let mut window = series(40, |i| 100.0 + i as f64);
        window[5].price = f64::NAN;
        let err = classifier.predict(&window, 3).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::TrainingFailure { ref model, .. } if model == PATTERN_CLASSIFIER_NAME
        ));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_non_finite_latest_price_is_training_failure() {
        // Training rows stop before the last bar, so only inference sees it
        let classifier = PatternClassifier::default();
        let mut window = series(41, |i| 100.0 + (i as f64 * 0.3).sin());
        window[40].price = f64::NAN;
        let err = classifier.predict(&window, 1).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::TrainingFailure { ref model, .. } if model == PATTERN_CLASSIFIER_NAME
        ));
    }
}
