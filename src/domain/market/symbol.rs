use serde::{Deserialize, Serialize};
use std::fmt;

const OTC_SUFFIX: &str = " (OTC)";

const CRYPTO_TICKERS: &[&str] = &[
    "BTC", "ETH", "SOL", "BNB", "XRP", "ADA", "DOT", "DOGE", "LINK", "MATIC", "PEPE", "SHIB",
    "LTC", "AVAX", "TRX", "UNI",
];

/// Liquidity context a symbol trades in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketType {
    Live,
    Otc,
}

impl MarketType {
    pub fn from_symbol(symbol: &str) -> Self {
        if is_otc(symbol) {
            MarketType::Otc
        } else {
            MarketType::Live
        }
    }

    pub fn is_otc(&self) -> bool {
        matches!(self, MarketType::Otc)
    }
}

impl fmt::Display for MarketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketType::Live => write!(f, "LIVE"),
            MarketType::Otc => write!(f, "OTC"),
        }
    }
}

pub fn is_otc(symbol: &str) -> bool {
    symbol.contains("(OTC)")
}

pub fn is_crypto(symbol: &str) -> bool {
    CRYPTO_TICKERS.iter().any(|t| symbol.starts_with(t))
}

/// Strip the OTC marker, leaving the underlying pair (e.g. `EUR/USD`).
pub fn base_symbol(symbol: &str) -> &str {
    symbol.strip_suffix(OTC_SUFFIX).unwrap_or(symbol)
}
