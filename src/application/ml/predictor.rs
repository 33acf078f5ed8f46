use crate::domain::errors::PipelineError;
use crate::domain::market::ObservationPoint;
use crate::domain::ml::ModelSignal;

/// Interface for self-training predictors
///
/// Every call trains a fresh model on `window` and discards it on return,
/// so implementations hold only hyper-parameters.
pub trait SignalPredictor: Send + Sync {
    /// Train on `window` and emit a directional signal for the next bar.
    ///
    /// Returns HOLD with confidence 0 when the window is shorter than
    /// `min_observations`.
    fn predict(&self, window: &[ObservationPoint], seed: u64)
    -> Result<ModelSignal, PipelineError>;

    /// Opaque model identifier
    fn name(&self) -> &str;

    /// Smallest window that triggers training
    fn min_observations(&self) -> usize;
}
