use crate::domain::ml::{ConsensusSignal, ModelSignal, SignalKind};

/// Consensus Aggregator
///
/// Unanimous vote over the two predictors:
/// - CALL only when both say BUY
/// - PUT only when both say SELL
/// - NEUTRAL otherwise, including any HOLD
///
/// Confidence plays no part in the vote.
pub fn consensus(classifier: &ModelSignal, regressor: &ModelSignal) -> ConsensusSignal {
    match (classifier.signal, regressor.signal) {
        (SignalKind::Buy, SignalKind::Buy) => ConsensusSignal::Call,
        (SignalKind::Sell, SignalKind::Sell) => ConsensusSignal::Put,
        _ => ConsensusSignal::Neutral,
    }
}
