use crate::domain::market::Timeframe;
use serde::{Deserialize, Serialize};

/// Mutable bookkeeping of one walk-forward simulation.
///
/// Owned by a single run and dropped when it returns its result.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationState {
    pub balance: f64,
    pub wins: usize,
    pub losses: usize,
    pub consecutive_wins: usize,
    pub max_consecutive_wins: usize,
    pub max_drawdown_pct: f64,
}

impl SimulationState {
    pub fn new(initial_balance: f64) -> Self {
        Self {
            balance: initial_balance,
            wins: 0,
            losses: 0,
            consecutive_wins: 0,
            max_consecutive_wins: 0,
            max_drawdown_pct: 0.0,
        }
    }

    pub fn record_win(&mut self, credit: f64) {
        self.wins += 1;
        self.consecutive_wins += 1;
        self.max_consecutive_wins = self.max_consecutive_wins.max(self.consecutive_wins);
        self.balance += credit;
    }

    /// Drawdown is measured against the starting balance, not a running peak.
    pub fn record_loss(&mut self, stake: f64, initial_balance: f64) {
        self.losses += 1;
        self.consecutive_wins = 0;
        self.balance -= stake;
        let drawdown = (initial_balance - self.balance) / initial_balance * 100.0;
        if drawdown > self.max_drawdown_pct {
            self.max_drawdown_pct = drawdown;
        }
    }

    pub fn total_trades(&self) -> usize {
        self.wins + self.losses
    }

    pub fn win_rate(&self) -> f64 {
        let total = self.total_trades();
        if total == 0 {
            return 0.0;
        }
        self.wins as f64 / total as f64 * 100.0
    }
}

/// Summary of one walk-forward simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Percentage in [0, 100]
    pub win_rate: f64,
    pub total_trades: usize,
    pub wins: usize,
    pub losses: usize,
    /// Final balance minus initial balance
    pub profit_simulation: f64,
    /// Worst drawdown observed, in percent
    pub drawdown: f64,
    /// Best winning streak
    pub consecutive_wins: usize,
    pub symbol: String,
    pub timeframe: Timeframe,
    pub period: String,
}

impl BacktestResult {
    pub fn from_state(
        state: &SimulationState,
        initial_balance: f64,
        symbol: &str,
        timeframe: Timeframe,
        bars: usize,
    ) -> Self {
        Self {
            win_rate: state.win_rate(),
            total_trades: state.total_trades(),
            wins: state.wins,
            losses: state.losses,
            profit_simulation: state.balance - initial_balance,
            drawdown: state.max_drawdown_pct,
            consecutive_wins: state.max_consecutive_wins,
            symbol: symbol.to_string(),
            timeframe,
            period: format!("{} Bars", bars),
        }
    }
}
