//! Entry point tying market data, physics, the predictor ensemble and the
//! backtest simulator together.

use crate::application::ml::ensemble::{EnsembleRunner, EnsembleSeeds};
use crate::application::optimization::simulator::{BacktestOptions, BacktestSimulator};
use crate::application::strategies::consensus::consensus;
use crate::domain::config::{BacktestConfig, ModelConfig};
use crate::domain::errors::PipelineError;
use crate::domain::market::indicator_advisor::{IndicatorRecommendation, recommend_indicators};
use crate::domain::market::sessions::{GlobalMarketStatus, global_market_status, is_asset_open};
use crate::domain::market::{
    MarketType, ObservationPoint, PhysicsDescriptor, Timeframe, compute_physics,
};
use crate::domain::ml::{ConsensusSignal, ModelSignal};
use crate::domain::performance::BacktestResult;
use crate::domain::ports::MarketDataProvider;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

/// Everything the dashboard shows for one symbol at one point in time
#[derive(Debug, Clone, Serialize)]
pub struct MarketAnalysis {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub market_type: MarketType,
    pub observations: usize,
    pub last_price: Option<f64>,
    pub physics: PhysicsDescriptor,
    pub signals: Vec<ModelSignal>,
    pub consensus: ConsensusSignal,
    pub indicators: IndicatorRecommendation,
    pub market_open: bool,
    pub sessions: GlobalMarketStatus,
}

#[derive(Clone)]
pub struct NeuralPipeline {
    model: ModelConfig,
    ensemble: EnsembleRunner,
    simulator: BacktestSimulator,
}

impl NeuralPipeline {
    pub fn new(model: ModelConfig, backtest: BacktestConfig) -> Self {
        Self {
            ensemble: EnsembleRunner::new(&model),
            simulator: BacktestSimulator::new(&model, backtest),
            model,
        }
    }

    pub fn model_config(&self) -> &ModelConfig {
        &self.model
    }

    pub fn simulator(&self) -> &BacktestSimulator {
        &self.simulator
    }

    pub fn compute_physics(&self, window: &[ObservationPoint]) -> PhysicsDescriptor {
        compute_physics(window)
    }

    /// Both predictor signals and their consensus for the latest bar.
    pub fn run_ensemble(
        &self,
        window: &[ObservationPoint],
    ) -> Result<(Vec<ModelSignal>, ConsensusSignal), PipelineError> {
        let [classified, regressed] = self
            .ensemble
            .run(window, EnsembleSeeds::for_step(self.model.seed, 0))?;
        let signal = consensus(&classified, &regressed);
        Ok((vec![classified, regressed], signal))
    }

    pub fn run_backtest(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        history: &[ObservationPoint],
    ) -> Result<BacktestResult, PipelineError> {
        self.simulator.run(symbol, timeframe, history)
    }

    pub fn run_backtest_with(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        history: &[ObservationPoint],
        options: &BacktestOptions,
    ) -> Result<BacktestResult, PipelineError> {
        self.simulator.run_with(symbol, timeframe, history, options)
    }

    /// Fetch, then analyze at the current wall-clock time. Training runs on
    /// the blocking pool so the async worker stays free.
    pub async fn analyze(
        &self,
        provider: &dyn MarketDataProvider,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<MarketAnalysis, PipelineError> {
        let data = provider.fetch(symbol, timeframe).await?;
        info!(
            provider = provider.name(),
            symbol,
            points = data.len(),
            "Market data received"
        );

        let pipeline = self.clone();
        let symbol = symbol.to_string();
        tokio::task::spawn_blocking(move || {
            pipeline.analyze_window(&symbol, timeframe, &data, Utc::now())
        })
        .await
        .map_err(|e| PipelineError::WorkerFailed {
            reason: e.to_string(),
        })?
    }

    pub fn analyze_window(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        data: &[ObservationPoint],
        now: DateTime<Utc>,
    ) -> Result<MarketAnalysis, PipelineError> {
        if data.is_empty() {
            return Err(PipelineError::insufficient("analysis", 1, 0));
        }

        let market_type = MarketType::from_symbol(symbol);
        let physics = self.compute_physics(data);
        let (signals, consensus) = self.run_ensemble(data)?;
        let indicators = recommend_indicators(&physics, market_type);

        Ok(MarketAnalysis {
            symbol: symbol.to_string(),
            timeframe,
            market_type,
            observations: data.len(),
            last_price: data.last().map(|p| p.price),
            physics,
            signals,
            consensus,
            indicators,
            market_open: is_asset_open(symbol, now),
            sessions: global_market_status(now),
        })
    }
}

impl Default for NeuralPipeline {
    fn default() -> Self {
        Self::new(ModelConfig::default(), BacktestConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market::MomentumDirection;
    use chrono::TimeZone;

    fn rising(len: usize) -> Vec<ObservationPoint> {
        (0..len)
            .map(|i| ObservationPoint::new(i.to_string(), 100.0 + i as f64, 100.0))
            .collect()
    }

    #[test]
    fn test_analysis_of_short_window_is_neutral() {
        let pipeline = NeuralPipeline::default();
        // Sunday 2024-06-09 12:00 UTC
        let now = Utc.with_ymd_and_hms(2024, 6, 9, 12, 0, 0).unwrap();
        let analysis = pipeline
            .analyze_window("EUR/USD (OTC)", Timeframe::OneMin, &rising(15), now)
            .unwrap();

        assert_eq!(analysis.market_type, MarketType::Otc);
        assert_eq!(analysis.consensus, ConsensusSignal::Neutral);
        assert_eq!(analysis.physics, PhysicsDescriptor::neutral());
        assert_eq!(analysis.signals.len(), 2);
        assert!(!analysis.market_open);
        assert_eq!(analysis.last_price, Some(114.0));
    }

    #[test]
    fn test_empty_window_is_rejected() {
        let pipeline = NeuralPipeline::default();
        let err = pipeline
            .analyze_window("EUR/USD", Timeframe::OneMin, &[], Utc::now())
            .unwrap_err();
        assert_eq!(err, PipelineError::insufficient("analysis", 1, 0));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_analyze_on_single_threaded_runtime() {
        use crate::infrastructure::{MockMarketDataProvider, SyntheticPattern};

        let pipeline = NeuralPipeline::default();
        let provider = MockMarketDataProvider::new(40, SyntheticPattern::Trend { step: 0.001 });
        let (analysis, ticked) = tokio::join!(
            pipeline.analyze(&provider, "EUR/USD", Timeframe::OneMin),
            async {
                tokio::task::yield_now().await;
                true
            }
        );
        assert!(ticked);
        assert_eq!(analysis.unwrap().observations, 40);

        let empty = MockMarketDataProvider::new(0, SyntheticPattern::Trend { step: 0.001 });
        let err = pipeline
            .analyze(&empty, "EUR/USD", Timeframe::OneMin)
            .await
            .unwrap_err();
        assert_eq!(err, PipelineError::insufficient("analysis", 1, 0));
    }

    #[test]
    fn test_physics_passthrough() {
        let pipeline = NeuralPipeline::default();
        let physics = pipeline.compute_physics(&rising(30));
        assert_eq!(physics.momentum_direction, MomentumDirection::Bull);
    }

    #[test]
    fn test_seeded_ensemble_is_reproducible() {
        let model = ModelConfig::default().with_seed(77);
        let pipeline = NeuralPipeline::new(model, BacktestConfig::default());
        let window: Vec<ObservationPoint> = (0..40)
            .map(|i| ObservationPoint::new(i.to_string(), 100.0 + ((i * 7) % 5) as f64, 50.0))
            .collect();
        assert_eq!(
            pipeline.run_ensemble(&window).unwrap(),
            pipeline.run_ensemble(&window).unwrap()
        );
    }
}
