// Validated configuration value objects
pub mod config;

// Market analysis domain
pub mod market;

// Feature and signal domain
pub mod ml;

// Backtest bookkeeping
pub mod performance;

// Port interfaces
pub mod ports;

// Domain-specific error types
pub mod errors;
