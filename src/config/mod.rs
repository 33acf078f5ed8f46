//! Configuration module for Neurotrade.
//!
//! Loads structured configuration from environment variables, organized by
//! concern: Model, Backtest and Market Data.

mod backtest_env_config;
mod market_data_config;
mod model_env_config;

pub use backtest_env_config::BacktestEnvConfig;
pub use market_data_config::MarketDataEnvConfig;
pub use model_env_config::ModelEnvConfig;

use anyhow::{Context, Result};
use std::str::FromStr;

/// Parses `key` when present and non-empty, otherwise returns `default`.
pub(crate) fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Invalid {key}: {raw}")),
        _ => Ok(default),
    }
}

/// Main application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub model: ModelEnvConfig,
    pub backtest: BacktestEnvConfig,
    pub market_data: MarketDataEnvConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            model: ModelEnvConfig::from_env().context("Failed to load model config")?,
            backtest: BacktestEnvConfig::from_env().context("Failed to load backtest config")?,
            market_data: MarketDataEnvConfig::from_env()
                .context("Failed to load market data config")?,
        })
    }

    /// Same as [`Config::from_env`] with an injectable variable source.
    pub fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            model: ModelEnvConfig::from_lookup(lookup).context("Failed to load model config")?,
            backtest: BacktestEnvConfig::from_lookup(lookup)
                .context("Failed to load backtest config")?,
            market_data: MarketDataEnvConfig::from_lookup(lookup)
                .context("Failed to load market data config")?,
        })
    }
}
