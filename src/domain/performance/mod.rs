// Backtest bookkeeping
pub mod backtest_result;

pub use backtest_result::{BacktestResult, SimulationState};
