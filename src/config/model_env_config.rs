//! Predictor hyper-parameters from environment variables.

use super::parse_or;
use crate::domain::config::ModelConfig;
use anyhow::{Context, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct ModelEnvConfig {
    pub classifier_learning_rate: f64,
    pub regressor_learning_rate: f64,
    pub epochs: usize,
    pub batch_size: usize,
    pub seed: Option<u64>,
}

impl ModelEnvConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(&|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = ModelConfig::default();
        let seed = match lookup("MODEL_SEED") {
            Some(raw) if !raw.trim().is_empty() => Some(
                raw.trim()
                    .parse::<u64>()
                    .with_context(|| format!("Invalid MODEL_SEED: {raw}"))?,
            ),
            _ => None,
        };

        Ok(Self {
            classifier_learning_rate: parse_or(
                lookup,
                "CLASSIFIER_LEARNING_RATE",
                defaults.classifier_learning_rate,
            )?,
            regressor_learning_rate: parse_or(
                lookup,
                "REGRESSOR_LEARNING_RATE",
                defaults.regressor_learning_rate,
            )?,
            epochs: parse_or(lookup, "TRAINING_EPOCHS", defaults.epochs)?,
            batch_size: parse_or(lookup, "TRAINING_BATCH_SIZE", defaults.batch_size)?,
            seed,
        })
    }

    /// Validated domain value object
    pub fn to_model_config(&self) -> Result<ModelConfig> {
        ModelConfig::new(
            self.classifier_learning_rate,
            self.regressor_learning_rate,
            self.epochs,
            self.batch_size,
            self.seed,
        )
        .context("Invalid model configuration")
    }
}
