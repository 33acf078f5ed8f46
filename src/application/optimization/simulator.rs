use crate::application::ml::ensemble::{EnsembleRunner, EnsembleSeeds};
use crate::application::strategies::consensus::consensus;
use crate::domain::config::{BacktestConfig, ModelConfig};
use crate::domain::errors::PipelineError;
use crate::domain::market::{ObservationPoint, Timeframe};
use crate::domain::ml::ConsensusSignal;
use crate::domain::performance::{BacktestResult, SimulationState};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

/// 40 analyzable bars plus 10 bars of feature look-back
pub const MIN_BACKTEST_HISTORY: usize = 50;
/// First index at which the walk-forward loop trades
pub const FIRST_TRADE_INDEX: usize = 30;

/// Cooperative stop flag shared between a caller and a running backtest.
///
/// Checked once per loop index, never mid-training.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Per-run overrides
#[derive(Debug, Clone, Default)]
pub struct BacktestOptions {
    /// Reproducible model initialization. Falls back to the model config seed.
    pub seed: Option<u64>,
    pub cancel: Option<CancellationToken>,
}

impl BacktestOptions {
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            cancel: None,
        }
    }

    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

/// Walk-forward replay of the ensemble over an expanding window.
///
/// Each index trains both predictors on `history[..=i]` and settles the
/// consensus against the move to `i + 1`. Iterations are strictly
/// sequential; separate runs share nothing.
#[derive(Clone)]
pub struct BacktestSimulator {
    ensemble: EnsembleRunner,
    config: BacktestConfig,
    default_seed: Option<u64>,
}

impl BacktestSimulator {
    pub fn new(model: &ModelConfig, config: BacktestConfig) -> Self {
        Self {
            ensemble: EnsembleRunner::new(model),
            config,
            default_seed: model.seed,
        }
    }

    pub fn with_ensemble(ensemble: EnsembleRunner, config: BacktestConfig) -> Self {
        Self {
            ensemble,
            config,
            default_seed: None,
        }
    }

    pub fn run(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        history: &[ObservationPoint],
    ) -> Result<BacktestResult, PipelineError> {
        self.run_with(symbol, timeframe, history, &BacktestOptions::default())
    }

    pub fn run_with(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        history: &[ObservationPoint],
        options: &BacktestOptions,
    ) -> Result<BacktestResult, PipelineError> {
        if history.len() < MIN_BACKTEST_HISTORY {
            return Err(PipelineError::insufficient(
                "backtest",
                MIN_BACKTEST_HISTORY,
                history.len(),
            ));
        }

        let seed = options.seed.or(self.default_seed);
        let initial_balance = self.config.initial_balance;
        let credit = self.config.stake * self.config.payout;
        let mut state = SimulationState::new(initial_balance);

        info!(
            symbol,
            %timeframe,
            bars = history.len(),
            seeded = seed.is_some(),
            "Backtest started"
        );

        for i in FIRST_TRADE_INDEX..=history.len() - 2 {
            if options.cancel.as_ref().is_some_and(CancellationToken::is_cancelled) {
                info!(symbol, at_index = i, "Backtest cancelled");
                return Err(PipelineError::Cancelled { at_index: i });
            }

            let window = &history[..=i];
            let [classified, regressed] = self
                .ensemble
                .run(window, EnsembleSeeds::for_step(seed, i as u64))?;

            let signal = consensus(&classified, &regressed);
            let realized_move = history[i + 1].price - history[i].price;
            let won = match signal {
                ConsensusSignal::Neutral => continue,
                ConsensusSignal::Call => realized_move > 0.0,
                ConsensusSignal::Put => realized_move < 0.0,
            };

            if won {
                state.record_win(credit);
            } else {
                state.record_loss(self.config.stake, initial_balance);
            }

            debug!(
                index = i,
                %signal,
                realized_move,
                won,
                balance = state.balance,
                "Trade recorded"
            );
        }

        let result =
            BacktestResult::from_state(&state, initial_balance, symbol, timeframe, history.len());

        info!(
            symbol,
            trades = result.total_trades,
            win_rate = result.win_rate,
            profit = result.profit_simulation,
            drawdown = result.drawdown,
            "Backtest finished"
        );

        Ok(result)
    }
}
