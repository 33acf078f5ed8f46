use crate::application::optimization::simulator::{BacktestOptions, BacktestSimulator};
use crate::domain::errors::PipelineError;
use crate::domain::market::{ObservationPoint, Timeframe};
use crate::domain::performance::BacktestResult;
use rayon::prelude::*;
use tracing::info;

/// One symbol/timeframe to replay
#[derive(Debug, Clone)]
pub struct BacktestJob {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub history: Vec<ObservationPoint>,
}

/// Result of a single backtest run in a batch
#[derive(Debug, Clone)]
pub struct BatchBacktestResult {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub result: Result<BacktestResult, PipelineError>,
}

/// Parallel runner for multi-symbol backtests
///
/// Each job gets its own simulation state; a failing job does not affect
/// the others. Results come back in job order.
///
/// # Example
///
/// ```no_run
/// use neurotrade::application::optimization::parallel_benchmark::{BacktestJob, ParallelBacktestRunner};
/// use neurotrade::application::optimization::simulator::{BacktestOptions, BacktestSimulator};
/// use neurotrade::domain::config::{BacktestConfig, ModelConfig};
/// use neurotrade::domain::market::Timeframe;
///
/// let simulator = BacktestSimulator::new(&ModelConfig::default(), BacktestConfig::default());
/// let runner = ParallelBacktestRunner::new(simulator);
/// let jobs = vec![BacktestJob { symbol: "EUR/USD".into(), timeframe: Timeframe::OneMin, history: vec![] }];
/// for batch in runner.run_parallel(jobs, &BacktestOptions::default()) {
///     match batch.result {
///         Ok(r) => println!("{}: {:.1}%", batch.symbol, r.win_rate),
///         Err(e) => println!("{}: {}", batch.symbol, e),
///     }
/// }
/// ```
pub struct ParallelBacktestRunner {
    simulator: BacktestSimulator,
}

impl ParallelBacktestRunner {
    pub fn new(simulator: BacktestSimulator) -> Self {
        Self { simulator }
    }

    pub fn run_parallel(
        &self,
        jobs: Vec<BacktestJob>,
        options: &BacktestOptions,
    ) -> Vec<BatchBacktestResult> {
        info!(jobs = jobs.len(), "Running backtests in parallel");

        jobs.into_par_iter()
            .map(|job| {
                let result =
                    self.simulator
                        .run_with(&job.symbol, job.timeframe, &job.history, options);
                BatchBacktestResult {
                    symbol: job.symbol,
                    timeframe: job.timeframe,
                    result,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ml::ensemble::EnsembleRunner;
    use crate::application::ml::predictor::SignalPredictor;
    use crate::domain::config::BacktestConfig;
    use crate::domain::ml::signal::{PATTERN_CLASSIFIER_NAME, SEQUENCE_REGRESSOR_NAME};
    use crate::domain::ml::{ModelSignal, SignalKind};
    use std::sync::Arc;

    struct AlwaysBuy(&'static str);

    impl SignalPredictor for AlwaysBuy {
        fn predict(
            &self,
            _window: &[ObservationPoint],
            _seed: u64,
        ) -> Result<ModelSignal, PipelineError> {
            Ok(ModelSignal::new(self.0, SignalKind::Buy, 60))
        }

        fn name(&self) -> &str {
            self.0
        }

        fn min_observations(&self) -> usize {
            0
        }
    }

    fn job(symbol: &str, len: usize) -> BacktestJob {
        BacktestJob {
            symbol: symbol.to_string(),
            timeframe: Timeframe::OneMin,
            history: (0..len)
                .map(|i| ObservationPoint::new(i.to_string(), 1.0 + i as f64, 10.0))
                .collect(),
        }
    }

    #[test]
    fn test_failures_are_isolated_per_job() {
        let simulator = BacktestSimulator::with_ensemble(
            EnsembleRunner::with_predictors(
                Arc::new(AlwaysBuy(PATTERN_CLASSIFIER_NAME)),
                Arc::new(AlwaysBuy(SEQUENCE_REGRESSOR_NAME)),
            ),
            BacktestConfig::default(),
        );
        let runner = ParallelBacktestRunner::new(simulator);
        let results = runner.run_parallel(
            vec![job("EUR/USD", 60), job("GBP/USD", 10), job("BTC/USD", 55)],
            &BacktestOptions::default(),
        );

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].symbol, "EUR/USD");
        assert_eq!(results[0].result.as_ref().unwrap().wins, 29);
        assert!(matches!(
            results[1].result,
            Err(PipelineError::InsufficientData { actual: 10, .. })
        ));
        assert_eq!(results[2].result.as_ref().unwrap().symbol, "BTC/USD");
    }
}
