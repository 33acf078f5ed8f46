use super::pattern_classifier::PatternClassifier;
use super::predictor::SignalPredictor;
use super::sequence_regressor::SequenceRegressor;
use crate::domain::config::ModelConfig;
use crate::domain::errors::PipelineError;
use crate::domain::market::ObservationPoint;
use crate::domain::ml::ModelSignal;
use rand::Rng;
use std::sync::Arc;
use tracing::debug;

/// Per-inference seeds, one per predictor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnsembleSeeds {
    pub classifier: u64,
    pub regressor: u64,
}

impl EnsembleSeeds {
    /// Deterministic seeds for inference number `step` of a seeded run.
    pub fn derive(base: u64, step: u64) -> Self {
        let root = base.wrapping_add(step.wrapping_mul(2));
        Self {
            classifier: root,
            regressor: root.wrapping_add(1),
        }
    }

    pub fn random() -> Self {
        let mut rng = rand::rng();
        Self {
            classifier: rng.random(),
            regressor: rng.random(),
        }
    }

    /// Seeded when `base` is set, fresh entropy otherwise.
    pub fn for_step(base: Option<u64>, step: u64) -> Self {
        match base {
            Some(base) => Self::derive(base, step),
            None => Self::random(),
        }
    }
}

/// Runs both predictors of one inference side by side.
#[derive(Clone)]
pub struct EnsembleRunner {
    classifier: Arc<dyn SignalPredictor>,
    regressor: Arc<dyn SignalPredictor>,
}

impl EnsembleRunner {
    pub fn new(config: &ModelConfig) -> Self {
        Self {
            classifier: Arc::new(PatternClassifier::new(config)),
            regressor: Arc::new(SequenceRegressor::new(config)),
        }
    }

    pub fn with_predictors(
        classifier: Arc<dyn SignalPredictor>,
        regressor: Arc<dyn SignalPredictor>,
    ) -> Self {
        Self {
            classifier,
            regressor,
        }
    }

    /// Returns `[classifier, regressor]` signals. The first predictor error
    /// (classifier first) aborts the inference.
    pub fn run(
        &self,
        window: &[ObservationPoint],
        seeds: EnsembleSeeds,
    ) -> Result<[ModelSignal; 2], PipelineError> {
        for predictor in [&self.classifier, &self.regressor] {
            if window.len() < predictor.min_observations() {
                debug!(
                    model = predictor.name(),
                    points = window.len(),
                    required = predictor.min_observations(),
                    "Window below training minimum, holding"
                );
            }
        }

        let (classified, regressed) = rayon::join(
            || self.classifier.predict(window, seeds.classifier),
            || self.regressor.predict(window, seeds.regressor),
        );
        let classified = classified?;
        let regressed = regressed?;

        debug!(
            points = window.len(),
            classifier = %classified.signal,
            classifier_confidence = classified.confidence,
            regressor = %regressed.signal,
            regressor_confidence = regressed.confidence,
            "Ensemble inference"
        );

        Ok([classified, regressed])
    }
}
