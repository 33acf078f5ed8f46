use crate::domain::errors::PipelineError;
use crate::domain::market::{ObservationPoint, Timeframe};
use crate::domain::ports::MarketDataProvider;
use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;

pub const PROVIDER_NAME: &str = "mock";

/// Shape of the synthetic series
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SyntheticPattern {
    /// `base + step * i`
    Trend { step: f64 },
    /// Up after even bars, down after odd bars
    Sawtooth { amplitude: f64 },
    /// Slow sine with a small drift
    Wave { amplitude: f64, period: f64 },
}

/// Deterministic in-memory provider for tests and demos.
///
/// Can be flipped into an outage to exercise upstream error handling.
#[derive(Clone)]
pub struct MockMarketDataProvider {
    length: usize,
    base_price: f64,
    pattern: SyntheticPattern,
    unavailable: Arc<RwLock<bool>>,
}

impl MockMarketDataProvider {
    pub fn new(length: usize, pattern: SyntheticPattern) -> Self {
        Self {
            length,
            base_price: 1.1,
            pattern,
            unavailable: Arc::new(RwLock::new(false)),
        }
    }

    pub fn with_base_price(mut self, base_price: f64) -> Self {
        self.base_price = base_price;
        self
    }

    pub async fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.write().await = unavailable;
    }

    pub fn generate(&self, timeframe: Timeframe) -> Vec<ObservationPoint> {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().unwrap_or_default();
        let bar = Duration::minutes(timeframe.to_minutes() as i64);

        (0..self.length)
            .map(|i| {
                let x = i as f64;
                let price = match self.pattern {
                    SyntheticPattern::Trend { step } => self.base_price + step * x,
                    SyntheticPattern::Sawtooth { amplitude } => {
                        if i % 2 == 0 {
                            self.base_price
                        } else {
                            self.base_price + amplitude
                        }
                    }
                    SyntheticPattern::Wave { amplitude, period } => {
                        self.base_price
                            + amplitude * (x * std::f64::consts::TAU / period).sin()
                            + amplitude * 0.01 * x
                    }
                };
                let spread = price * 0.0002;
                let time = (start + bar * i as i32).format("%Y-%m-%d %H:%M:%S").to_string();
                ObservationPoint::new(time, price, 1000.0 + ((i * 37) % 200) as f64)
                    .with_range(price + spread, price - spread)
            })
            .collect()
    }
}

impl Default for MockMarketDataProvider {
    fn default() -> Self {
        Self::new(100, SyntheticPattern::Wave { amplitude: 0.002, period: 24.0 })
    }
}

#[async_trait]
impl MarketDataProvider for MockMarketDataProvider {
    async fn fetch(
        &self,
        _symbol: &str,
        timeframe: Timeframe,
    ) -> Result<Vec<ObservationPoint>, PipelineError> {
        if *self.unavailable.read().await {
            return Err(PipelineError::upstream(PROVIDER_NAME, "simulated outage"));
        }
        Ok(self.generate(timeframe))
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }
}
