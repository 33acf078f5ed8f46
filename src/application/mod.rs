// Self-training predictors and the ensemble runner
pub mod ml;

// Walk-forward backtesting
pub mod optimization;

// Signal aggregation
pub mod strategies;

// Pipeline facade
pub mod pipeline;
