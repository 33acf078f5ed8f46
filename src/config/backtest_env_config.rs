use super::parse_or;
use crate::domain::config::BacktestConfig;
use anyhow::{Context, Result};

/// Money-management settings for backtests
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestEnvConfig {
    pub initial_balance: f64,
    pub stake: f64,
    pub payout: f64,
}

impl BacktestEnvConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(&|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = BacktestConfig::default();
        Ok(Self {
            initial_balance: parse_or(
                lookup,
                "BACKTEST_INITIAL_BALANCE",
                defaults.initial_balance,
            )?,
            stake: parse_or(lookup, "BACKTEST_STAKE", defaults.stake)?,
            payout: parse_or(lookup, "BACKTEST_PAYOUT", defaults.payout)?,
        })
    }

    pub fn to_backtest_config(&self) -> Result<BacktestConfig> {
        BacktestConfig::new(self.initial_balance, self.stake, self.payout)
            .context("Invalid backtest configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_domain() {
        let config = BacktestEnvConfig::from_lookup(&|_| None).unwrap();
        assert_eq!(config.to_backtest_config().unwrap(), BacktestConfig::default());
    }

    #[test]
    fn test_payout_override() {
        let config = BacktestEnvConfig::from_lookup(&|key| {
            (key == "BACKTEST_PAYOUT").then(|| "0.92".to_string())
        })
        .unwrap();
        assert_eq!(config.payout, 0.92);
        assert_eq!(config.stake, 10.0);
    }

    #[test]
    fn test_payout_above_one_is_rejected() {
        let config = BacktestEnvConfig::from_lookup(&|key| {
            (key == "BACKTEST_PAYOUT").then(|| "1.8".to_string())
        })
        .unwrap();
        assert!(config.to_backtest_config().is_err());
    }
}
