//! Domain configuration value objects, validated on construction.

pub mod backtest_config;
pub mod model_config;

pub use backtest_config::BacktestConfig;
pub use model_config::ModelConfig;
