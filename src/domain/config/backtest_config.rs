//! Money-management rules replayed by the backtest simulator.

use crate::domain::errors::BacktestConfigError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestConfig {
    pub initial_balance: f64,

    /// Amount risked per trade
    pub stake: f64,

    /// Fraction of the stake credited on a win (binary-option style)
    pub payout: f64,
}

impl BacktestConfig {
    pub fn new(initial_balance: f64, stake: f64, payout: f64) -> Result<Self, BacktestConfigError> {
        let config = Self {
            initial_balance,
            stake,
            payout,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), BacktestConfigError> {
        for (field, value) in [("initial_balance", self.initial_balance), ("stake", self.stake)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(BacktestConfigError::InvalidAmount {
                    field: field.to_string(),
                    value,
                });
            }
        }
        if !(self.payout > 0.0 && self.payout <= 1.0) {
            return Err(BacktestConfigError::InvalidPayout { value: self.payout });
        }
        Ok(())
    }
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            initial_balance: 1000.0,
            stake: 10.0,
            payout: 0.85,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_simulation_constants() {
        let config = BacktestConfig::default();
        assert_eq!(config.initial_balance, 1000.0);
        assert_eq!(config.stake, 10.0);
        assert_eq!(config.payout, 0.85);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_amounts() {
        assert!(matches!(
            BacktestConfig::new(0.0, 10.0, 0.85),
            Err(BacktestConfigError::InvalidAmount { .. })
        ));
        assert!(matches!(
            BacktestConfig::new(1000.0, -1.0, 0.85),
            Err(BacktestConfigError::InvalidAmount { .. })
        ));
    }

    #[test]
    fn test_rejects_bad_payout() {
        assert_eq!(
            BacktestConfig::new(1000.0, 10.0, 1.5),
            Err(BacktestConfigError::InvalidPayout { value: 1.5 })
        );
        assert!(BacktestConfig::new(1000.0, 10.0, 0.0).is_err());
    }
}
