use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Bar intervals supported by the market data layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    OneMin,
    FiveMin,
    FifteenMin,
    OneHour,
    FourHour,
}

impl Timeframe {
    /// Returns the duration of this timeframe in minutes
    pub fn to_minutes(&self) -> usize {
        match self {
            Timeframe::OneMin => 1,
            Timeframe::FiveMin => 5,
            Timeframe::FifteenMin => 15,
            Timeframe::OneHour => 60,
            Timeframe::FourHour => 240,
        }
    }

    /// Converts to the Twelve Data `interval` query value
    pub fn to_twelve_data_string(&self) -> &'static str {
        match self {
            Timeframe::OneMin => "1min",
            Timeframe::FiveMin => "5min",
            Timeframe::FifteenMin => "15min",
            Timeframe::OneHour => "1h",
            Timeframe::FourHour => "4h",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_twelve_data_string())
    }
}

impl FromStr for Timeframe {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "1min" | "1m" => Ok(Timeframe::OneMin),
            "5min" | "5m" => Ok(Timeframe::FiveMin),
            "15min" | "15m" => Ok(Timeframe::FifteenMin),
            "1h" | "60min" => Ok(Timeframe::OneHour),
            "4h" | "240min" => Ok(Timeframe::FourHour),
            _ => Err(anyhow!(
                "Invalid timeframe: {}. Must be one of 1min, 5min, 15min, 1h, 4h",
                s
            )),
        }
    }
}
