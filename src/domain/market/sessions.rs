//! Trading-session calendar (UTC).

use super::symbol::is_crypto;
use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    Open,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketSession {
    pub name: String,
    pub status: SessionStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolatilityBias {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalMarketStatus {
    pub sessions: Vec<MarketSession>,
    pub volatility_bias: VolatilityBias,
    pub recommendation: String,
}

/// Crypto trades around the clock; everything else pauses from Friday
/// 22:00 UTC until Sunday 22:00 UTC.
pub fn is_asset_open(symbol: &str, now: DateTime<Utc>) -> bool {
    if is_crypto(symbol) {
        return true;
    }

    let hour = now.hour();
    let weekend = match now.weekday() {
        Weekday::Sat => true,
        Weekday::Fri => hour >= 22,
        Weekday::Sun => hour < 22,
        _ => false,
    };
    !weekend
}

pub fn global_market_status(now: DateTime<Utc>) -> GlobalMarketStatus {
    let hour = now.hour();
    let weekend = matches!(now.weekday(), Weekday::Sat | Weekday::Sun);

    let session = |name: &str, open: bool| MarketSession {
        name: name.to_string(),
        status: if !weekend && open {
            SessionStatus::Open
        } else {
            SessionStatus::Closed
        },
    };

    let sessions = vec![
        session("SYDNEY", hour >= 22 || hour < 7),
        session("TOKYO", hour < 9),
        session("LONDON", (8..17).contains(&hour)),
        session("NEW YORK", (13..22).contains(&hour)),
    ];

    let (volatility_bias, recommendation) = if weekend {
        (
            VolatilityBias::Low,
            "Weekend Protocol: Institutional liquidity is offline. Crypto markets may see high manipulation.",
        )
    } else if (13..17).contains(&hour) {
        (
            VolatilityBias::High,
            "Peak Liquidity: London/NY Overlap. Optimal session for precision scalping.",
        )
    } else {
        (
            VolatilityBias::Medium,
            "Active Markets: Standard volatility expected. Follow HTF trend alignment.",
        )
    };

    GlobalMarketStatus {
        sessions,
        volatility_bias,
        recommendation: recommendation.to_string(),
    }
}
