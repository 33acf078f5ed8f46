use neurotrade::application::ml::{EnsembleRunner, SignalPredictor};
use neurotrade::application::optimization::simulator::{
    BacktestOptions, BacktestSimulator, CancellationToken,
};
use neurotrade::application::pipeline::NeuralPipeline;
use neurotrade::application::strategies::consensus;
use neurotrade::domain::config::{BacktestConfig, ModelConfig};
use neurotrade::domain::errors::PipelineError;
use neurotrade::domain::market::{ObservationPoint, Timeframe};
use neurotrade::domain::ml::signal::{PATTERN_CLASSIFIER_NAME, SEQUENCE_REGRESSOR_NAME};
use neurotrade::domain::ml::{ConsensusSignal, ModelSignal, SignalKind};
use proptest::prelude::*;
use std::sync::Arc;

// --- Helpers ---

fn history(prices: &[f64]) -> Vec<ObservationPoint> {
    prices
        .iter()
        .enumerate()
        .map(|(i, p)| ObservationPoint::new(format!("t{i}"), *p, 100.0 + (i % 5) as f64))
        .collect()
}

/// Rises on even indices and falls on odd ones
fn alternating(len: usize) -> Vec<f64> {
    (0..len).map(|i| if i % 2 == 0 { 1.1000 } else { 1.1010 }).collect()
}

/// Pseudo-random but reproducible direction keyed on window length
struct ScriptedPredictor {
    name: &'static str,
    script: Vec<SignalKind>,
}

impl SignalPredictor for ScriptedPredictor {
    fn predict(
        &self,
        window: &[ObservationPoint],
        _seed: u64,
    ) -> Result<ModelSignal, PipelineError> {
        let kind = self.script[window.len() % self.script.len()];
        Ok(ModelSignal::new(self.name, kind, 50))
    }

    fn name(&self) -> &str {
        self.name
    }

    fn min_observations(&self) -> usize {
        0
    }
}

fn kind_strategy() -> impl Strategy<Value = SignalKind> {
    prop_oneof![
        Just(SignalKind::Buy),
        Just(SignalKind::Sell),
        Just(SignalKind::Hold)
    ]
}

// --- Tests ---

#[test]
fn history_below_fifty_is_rejected() {
    let pipeline = NeuralPipeline::default();
    let err = pipeline
        .run_backtest("EUR/USD", Timeframe::OneMin, &history(&alternating(49)))
        .unwrap_err();
    assert_eq!(
        err,
        PipelineError::InsufficientData {
            component: "backtest".to_string(),
            required: 50,
            actual: 49,
        }
    );
}

#[test]
fn seeded_walk_forward_is_reproducible() {
    let model = ModelConfig::default().with_seed(1234);
    let pipeline = NeuralPipeline::new(model, BacktestConfig::default());
    let data = history(&alternating(100));

    let first = pipeline
        .run_backtest("EUR/USD", Timeframe::OneMin, &data)
        .unwrap();
    let second = pipeline
        .run_backtest("EUR/USD", Timeframe::OneMin, &data)
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(first.period, "100 Bars");
    assert_eq!(first.wins + first.losses, first.total_trades);
    assert!(first.total_trades <= 69);
}

#[test]
fn per_run_seed_overrides_config() {
    let pipeline = NeuralPipeline::default();
    let data = history(&alternating(60));
    let options = BacktestOptions::seeded(99);

    let a = pipeline
        .run_backtest_with("EUR/USD", Timeframe::OneMin, &data, &options)
        .unwrap();
    let b = pipeline
        .run_backtest_with("EUR/USD", Timeframe::OneMin, &data, &options)
        .unwrap();
    assert_eq!(a, b);
}

#[test]
fn cancelled_token_aborts_real_pipeline() {
    let pipeline = NeuralPipeline::default();
    let token = CancellationToken::new();
    token.cancel();
    let err = pipeline
        .run_backtest_with(
            "EUR/USD",
            Timeframe::OneMin,
            &history(&alternating(80)),
            &BacktestOptions::default().with_cancel(token),
        )
        .unwrap_err();
    assert_eq!(err, PipelineError::Cancelled { at_index: 30 });
}

#[test]
fn non_finite_price_aborts_backtest() {
    let pipeline = NeuralPipeline::new(
        ModelConfig::default().with_seed(5),
        BacktestConfig::default(),
    );
    let mut data = history(&alternating(60));
    data[40].price = f64::NAN;

    let err = pipeline
        .run_backtest("EUR/USD", Timeframe::OneMin, &data)
        .unwrap_err();
    assert!(matches!(
        err,
        PipelineError::TrainingFailure { ref model, .. } if model == PATTERN_CLASSIFIER_NAME
    ));
    assert!(!err.is_retryable());
}

#[test]
fn consensus_requires_agreement() {
    let buy = ModelSignal::new(PATTERN_CLASSIFIER_NAME, SignalKind::Buy, 100);
    let hold = ModelSignal::new(SEQUENCE_REGRESSOR_NAME, SignalKind::Hold, 100);
    let sell = ModelSignal::new(SEQUENCE_REGRESSOR_NAME, SignalKind::Sell, 100);
    assert_eq!(consensus(&buy, &hold), ConsensusSignal::Neutral);
    assert_eq!(consensus(&buy, &sell), ConsensusSignal::Neutral);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn result_invariants_hold(
        prices in prop::collection::vec(0.9f64..1.1, 50..120),
        script_a in prop::collection::vec(kind_strategy(), 1..7),
        script_b in prop::collection::vec(kind_strategy(), 1..7),
    ) {
        let simulator = BacktestSimulator::with_ensemble(
            EnsembleRunner::with_predictors(
                Arc::new(ScriptedPredictor { name: PATTERN_CLASSIFIER_NAME, script: script_a }),
                Arc::new(ScriptedPredictor { name: SEQUENCE_REGRESSOR_NAME, script: script_b }),
            ),
            BacktestConfig::default(),
        );
        let bars = prices.len();
        let result = simulator
            .run("EUR/USD", Timeframe::OneMin, &history(&prices))
            .unwrap();

        prop_assert_eq!(result.wins + result.losses, result.total_trades);
        prop_assert!((0.0..=100.0).contains(&result.win_rate));
        prop_assert!(result.drawdown >= 0.0);
        prop_assert!(result.consecutive_wins <= result.total_trades);
        prop_assert!(result.total_trades <= bars - 31);

        let expected_profit = result.wins as f64 * 8.5 - result.losses as f64 * 10.0;
        prop_assert!((result.profit_simulation - expected_profit).abs() < 1e-6);
    }

    #[test]
    fn consensus_is_call_or_put_only_on_unanimity(a in kind_strategy(), b in kind_strategy()) {
        let x = ModelSignal::new(PATTERN_CLASSIFIER_NAME, a, 10);
        let y = ModelSignal::new(SEQUENCE_REGRESSOR_NAME, b, 90);
        let signal = consensus(&x, &y);
        prop_assert_eq!(
            signal == ConsensusSignal::Call,
            a == SignalKind::Buy && b == SignalKind::Buy
        );
        prop_assert_eq!(
            signal == ConsensusSignal::Put,
            a == SignalKind::Sell && b == SignalKind::Sell
        );
    }
}
