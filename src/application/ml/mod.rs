pub mod ensemble;
pub mod network;
pub mod pattern_classifier;
pub mod predictor;
pub mod sequence_regressor;

pub use ensemble::{EnsembleRunner, EnsembleSeeds};
pub use pattern_classifier::PatternClassifier;
pub use predictor::SignalPredictor;
pub use sequence_regressor::SequenceRegressor;
