use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of the feed-forward pattern classifier.
pub const PATTERN_CLASSIFIER_NAME: &str = "FOREST-ENSEMBLE";
/// Opaque identifier of the windowed sequence regressor.
pub const SEQUENCE_REGRESSOR_NAME: &str = "TF-LSTM";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalKind {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalKind::Buy => write!(f, "BUY"),
            SignalKind::Sell => write!(f, "SELL"),
            SignalKind::Hold => write!(f, "HOLD"),
        }
    }
}

/// Output of one predictor for one inference call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSignal {
    pub model_name: String,
    pub signal: SignalKind,
    /// 0..=100
    pub confidence: u8,
    pub probability: Option<f64>,
}

impl ModelSignal {
    pub fn new(model_name: &str, signal: SignalKind, confidence: u8) -> Self {
        Self {
            model_name: model_name.to_string(),
            signal,
            confidence: confidence.min(100),
            probability: None,
        }
    }

    /// HOLD with zero confidence, returned when a predictor lacks data.
    pub fn hold(model_name: &str) -> Self {
        Self::new(model_name, SignalKind::Hold, 0)
    }

    pub fn with_probability(mut self, probability: f64) -> Self {
        self.probability = Some(probability);
        self
    }
}

/// Ternary trade direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConsensusSignal {
    Call,
    Put,
    Neutral,
}

impl fmt::Display for ConsensusSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsensusSignal::Call => write!(f, "CALL"),
            ConsensusSignal::Put => write!(f, "PUT"),
            ConsensusSignal::Neutral => write!(f, "NEUTRAL"),
        }
    }
}
