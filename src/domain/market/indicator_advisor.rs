//! Indicator selection policy driven by market physics.
//!
//! Pure mapping from a [`PhysicsDescriptor`] and the market context to the
//! set of overlays a host should enable, together with the reasons for each
//! choice.

use super::physics::{MomentumDirection, PhysicsDescriptor};
use super::symbol::MarketType;
use serde::{Deserialize, Serialize};

const HIGH_NOISE_FLOOR: f64 = 0.00015;
const STAIRCASE_NOISE_FLOOR: f64 = 0.0003;
const OTC_SMC_MIN_VOLATILITY: f64 = 0.0005;
const VOLATILITY_SURGE: f64 = 0.001;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorFlags {
    pub rsi: bool,
    pub macd: bool,
    pub bollinger_bands: bool,
    pub ichimoku: bool,
    pub smc: bool,
    pub vsa: bool,
    pub liquidity: bool,
    pub multi_htf: bool,
    pub neural_cross_check: bool,
    pub vwap: bool,
    pub atr: bool,
    pub manipulation_overlay: bool,
}

impl IndicatorFlags {
    pub fn enabled_count(&self) -> usize {
        [
            self.rsi,
            self.macd,
            self.bollinger_bands,
            self.ichimoku,
            self.smc,
            self.vsa,
            self.liquidity,
            self.multi_htf,
            self.neural_cross_check,
            self.vwap,
            self.atr,
            self.manipulation_overlay,
        ]
        .iter()
        .filter(|enabled| **enabled)
        .count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRecommendation {
    pub flags: IndicatorFlags,
    pub reasoning: Vec<String>,
}

pub fn recommend_indicators(
    physics: &PhysicsDescriptor,
    market_type: MarketType,
) -> IndicatorRecommendation {
    let otc = market_type.is_otc();
    let mut reasoning = Vec::new();

    let mut flags = IndicatorFlags {
        rsi: true,
        bollinger_bands: true,
        vsa: !otc && physics.volatility > 0.0,
        neural_cross_check: true,
        atr: true,
        macd: false,
        ichimoku: false,
        smc: !otc,
        liquidity: !otc,
        vwap: !otc,
        multi_htf: true,
        manipulation_overlay: false,
    };

    if physics.noise_floor > HIGH_NOISE_FLOOR {
        flags.manipulation_overlay = true;
        flags.bollinger_bands = true;
        reasoning.push(format!(
            "HIGH NOISE [{:.2}]: Broker-side algorithmic jitter detected. Activating wick-filtering and expansion bands.",
            physics.noise_floor * 10000.0
        ));
    } else {
        reasoning.push(
            "LOW NOISE: Structural stability confirmed. Suppressing manipulation filters for raw price analysis."
                .to_string(),
        );
    }

    if physics.momentum_direction != MomentumDirection::Flat {
        flags.macd = true;
        flags.ichimoku = !otc;
        reasoning.push(format!(
            "STRUCTURAL MOMENTUM: Strong {} bias (Velocity: {:.2}). Activating trend-stability layers.",
            physics.momentum_direction,
            (physics.velocity * 1000.0).abs()
        ));
    } else {
        flags.bollinger_bands = true;
        reasoning.push(
            "NEUTRAL BIAS: Equilibrium detected. Prioritizing mean-reversion (BB/RSI) for oscillating range play."
                .to_string(),
        );
    }

    if otc {
        flags.smc = physics.volatility > OTC_SMC_MIN_VOLATILITY;
        flags.vsa = false;
        reasoning.push(
            "OTC CONTEXT: Synthetic liquidity detected. Disabling VSA to prevent false-volume signals."
                .to_string(),
        );
        if physics.noise_floor > STAIRCASE_NOISE_FLOOR {
            reasoning.push(
                "ALGO SIGNATURE: 'Staircase' pattern likely. Expansion target probability increased."
                    .to_string(),
            );
        }
    } else {
        flags.smc = true;
        flags.liquidity = true;
        reasoning.push(
            "INSTITUTIONAL CONTEXT: Real-world liquidity pools identified. Enabling SMC/Flow layers."
                .to_string(),
        );
    }

    if physics.volatility > VOLATILITY_SURGE {
        flags.atr = true;
        reasoning.push(
            "VOLATILITY SURGE: Expansion phase active. Calibrating ATR for high-velocity exit targets."
                .to_string(),
        );
    }

    IndicatorRecommendation { flags, reasoning }
}
