use thiserror::Error;

/// Errors surfaced by the feature/prediction/backtest pipeline
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PipelineError {
    #[error("Insufficient data for {component}: need {required} points, got {actual}")]
    InsufficientData {
        component: String,
        required: usize,
        actual: usize,
    },

    #[error("Training failure in {model}: {reason}")]
    TrainingFailure { model: String, reason: String },

    #[error("Upstream {provider} unavailable: {reason}")]
    UpstreamUnavailable { provider: String, reason: String },

    #[error("Backtest cancelled at index {at_index}")]
    Cancelled { at_index: usize },

    #[error("Inference worker failed: {reason}")]
    WorkerFailed { reason: String },
}

impl PipelineError {
    pub fn insufficient(component: &str, required: usize, actual: usize) -> Self {
        PipelineError::InsufficientData {
            component: component.to_string(),
            required,
            actual,
        }
    }

    pub fn training(model: &str, reason: impl Into<String>) -> Self {
        PipelineError::TrainingFailure {
            model: model.to_string(),
            reason: reason.into(),
        }
    }

    pub fn upstream(provider: &str, reason: impl Into<String>) -> Self {
        PipelineError::UpstreamUnavailable {
            provider: provider.to_string(),
            reason: reason.into(),
        }
    }

    /// Advisory errors the caller may retry. A training failure points at a
    /// broken feature contract and a dead worker at a panic; neither is
    /// retryable.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            PipelineError::TrainingFailure { .. } | PipelineError::WorkerFailed { .. }
        )
    }
}

/// Errors related to model hyper-parameter validation
#[derive(Debug, Error, PartialEq)]
pub enum ModelConfigError {
    #[error("Invalid learning rate: {field} = {value}. Must be positive and finite")]
    InvalidLearningRate { field: String, value: f64 },

    #[error("Invalid count: {field} = {value}. Must be at least 1")]
    InvalidCount { field: String, value: usize },
}

/// Errors related to money-management validation
#[derive(Debug, Error, PartialEq)]
pub enum BacktestConfigError {
    #[error("Invalid amount: {field} = {value}. Must be positive and finite")]
    InvalidAmount { field: String, value: f64 },

    #[error("Invalid payout: {value}. Must be in (0.0, 1.0]")]
    InvalidPayout { value: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_data_formatting() {
        let err = PipelineError::insufficient("backtest", 50, 12);

        let msg = err.to_string();
        assert!(msg.contains("backtest"));
        assert!(msg.contains("50"));
        assert!(msg.contains("12"));
    }

    #[test]
    fn test_training_failure_names_the_model() {
        let err = PipelineError::training("TF-LSTM", "loss is NaN");
        assert_eq!(err.to_string(), "Training failure in TF-LSTM: loss is NaN");
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_advisory_errors_are_retryable() {
        assert!(PipelineError::insufficient("physics", 20, 3).is_retryable());
        assert!(PipelineError::upstream("twelvedata", "timeout").is_retryable());
        assert!(PipelineError::Cancelled { at_index: 31 }.is_retryable());
    }

    #[test]
    fn test_worker_failure_is_not_retryable() {
        let err = PipelineError::WorkerFailed {
            reason: "task panicked".to_string(),
        };
        assert!(!err.is_retryable());
    }
}
