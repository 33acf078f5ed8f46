pub mod feature_registry;
pub mod signal;

pub use feature_registry::{FeatureVector, TrainingSample};
pub use signal::{ConsensusSignal, ModelSignal, SignalKind};
