//! Model Configuration Domain Value Object
//!
//! Hyper-parameters shared by the two self-training predictors. Every
//! inference call trains from scratch with these settings.
//!
//! # Invariants
//!
//! - Learning rates are positive and finite
//! - `epochs` and `batch_size` are at least 1

use crate::domain::errors::ModelConfigError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Adam step size for the pattern classifier
    pub classifier_learning_rate: f64,

    /// Adam step size for the sequence regressor
    pub regressor_learning_rate: f64,

    /// Full passes over the training set
    pub epochs: usize,

    pub batch_size: usize,

    /// Fixed seed for weight initialization and shuffling. `None` draws a
    /// fresh seed per call.
    pub seed: Option<u64>,
}

impl ModelConfig {
    /// Create a new ModelConfig with validation
    ///
    /// # Errors
    ///
    /// Returns `ModelConfigError` if any parameter violates invariants
    pub fn new(
        classifier_learning_rate: f64,
        regressor_learning_rate: f64,
        epochs: usize,
        batch_size: usize,
        seed: Option<u64>,
    ) -> Result<Self, ModelConfigError> {
        let config = Self {
            classifier_learning_rate,
            regressor_learning_rate,
            epochs,
            batch_size,
            seed,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ModelConfigError> {
        Self::validate_rate("classifier_learning_rate", self.classifier_learning_rate)?;
        Self::validate_rate("regressor_learning_rate", self.regressor_learning_rate)?;
        Self::validate_count("epochs", self.epochs)?;
        Self::validate_count("batch_size", self.batch_size)?;
        Ok(())
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn validate_rate(field: &str, value: f64) -> Result<(), ModelConfigError> {
        if !value.is_finite() || value <= 0.0 {
            return Err(ModelConfigError::InvalidLearningRate {
                field: field.to_string(),
                value,
            });
        }
        Ok(())
    }

    fn validate_count(field: &str, value: usize) -> Result<(), ModelConfigError> {
        if value == 0 {
            return Err(ModelConfigError::InvalidCount {
                field: field.to_string(),
                value,
            });
        }
        Ok(())
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            classifier_learning_rate: 0.015,
            regressor_learning_rate: 0.02,
            epochs: 15,
            batch_size: 32,
            seed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = ModelConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.epochs, 15);
    }

    #[test]
    fn test_rejects_non_positive_learning_rate() {
        let result = ModelConfig::new(0.0, 0.02, 15, 32, None);
        assert!(matches!(
            result,
            Err(ModelConfigError::InvalidLearningRate { .. })
        ));

        let result = ModelConfig::new(0.015, f64::NAN, 15, 32, None);
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_zero_epochs() {
        let result = ModelConfig::new(0.015, 0.02, 0, 32, Some(7));
        assert_eq!(
            result,
            Err(ModelConfigError::InvalidCount {
                field: "epochs".to_string(),
                value: 0
            })
        );
    }
}
