use crate::domain::errors::PipelineError;
use crate::domain::market::symbol::base_symbol;
use crate::domain::market::{ObservationPoint, Timeframe};
use crate::domain::ports::{ApiKeyRotator, MarketDataProvider};
use crate::infrastructure::core::http_client_factory::{HttpClientFactory, build_url_with_query};
use anyhow::{Result, bail};
use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, warn};

pub const PROVIDER_NAME: &str = "twelvedata";
pub const DEFAULT_BASE_URL: &str = "https://api.twelvedata.com";

#[derive(Debug, Deserialize)]
struct TimeSeriesResponse {
    values: Option<Vec<TimeSeriesValue>>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TimeSeriesValue {
    datetime: String,
    close: String,
    volume: Option<String>,
    high: Option<String>,
    low: Option<String>,
}

/// Decodes a `time_series` payload into ascending observations.
///
/// The API lists newest first. Missing volume reads as 0 and missing
/// high/low fall back to the close. Rows with an unreadable close are
/// dropped.
pub fn parse_time_series(body: &str) -> Result<Vec<ObservationPoint>, PipelineError> {
    let response: TimeSeriesResponse = serde_json::from_str(body)
        .map_err(|e| PipelineError::upstream(PROVIDER_NAME, format!("malformed payload: {e}")))?;

    let Some(values) = response.values else {
        let reason = response
            .message
            .unwrap_or_else(|| "response has no values".to_string());
        return Err(PipelineError::upstream(PROVIDER_NAME, reason));
    };

    let parse = |raw: Option<&str>| {
        raw.filter(|s| !s.is_empty())
            .and_then(|s| s.parse::<f64>().ok())
    };

    let mut points: Vec<ObservationPoint> = values
        .into_iter()
        .filter_map(|v| {
            let close = v.close.parse::<f64>().ok()?;
            let volume = parse(v.volume.as_deref()).unwrap_or(0.0);
            let high = parse(v.high.as_deref()).unwrap_or(close);
            let low = parse(v.low.as_deref()).unwrap_or(close);
            Some(ObservationPoint::new(v.datetime, close, volume).with_range(high, low))
        })
        .collect();
    points.reverse();
    Ok(points)
}

/// Twelve Data `time_series` adapter
pub struct TwelveDataProvider {
    client: ClientWithMiddleware,
    base_url: String,
    output_size: usize,
    keys: ApiKeyRotator,
}

impl TwelveDataProvider {
    pub fn builder() -> TwelveDataProviderBuilder {
        TwelveDataProviderBuilder::default()
    }

    fn request_url(&self, symbol: &str, timeframe: Timeframe, api_key: &str) -> String {
        let output_size = self.output_size.to_string();
        build_url_with_query(
            &format!("{}/time_series", self.base_url.trim_end_matches('/')),
            &[
                ("symbol", base_symbol(symbol)),
                ("interval", timeframe.to_twelve_data_string()),
                ("apikey", api_key),
                ("outputsize", output_size.as_str()),
            ],
        )
    }

    fn redact(err: reqwest_middleware::Error) -> String {
        match err {
            reqwest_middleware::Error::Reqwest(e) => e.without_url().to_string(),
            other => other.to_string(),
        }
    }
}

#[derive(Default)]
pub struct TwelveDataProviderBuilder {
    base_url: Option<String>,
    api_keys: Vec<String>,
    output_size: Option<usize>,
    timeout: Option<Duration>,
    max_retries: Option<u32>,
}

impl TwelveDataProviderBuilder {
    pub fn base_url(mut self, base_url: String) -> Self {
        self.base_url = Some(base_url);
        self
    }

    pub fn api_keys(mut self, keys: Vec<String>) -> Self {
        self.api_keys = keys;
        self
    }

    pub fn output_size(mut self, output_size: usize) -> Self {
        self.output_size = Some(output_size);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    pub fn build(self) -> Result<TwelveDataProvider> {
        let keys = ApiKeyRotator::new(self.api_keys);
        if keys.is_empty() {
            bail!("Twelve Data provider requires at least one API key");
        }

        Ok(TwelveDataProvider {
            client: HttpClientFactory::create_client(
                self.timeout.unwrap_or(Duration::from_secs(30)),
                self.max_retries.unwrap_or(3),
            ),
            base_url: self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            output_size: self.output_size.unwrap_or(100),
            keys,
        })
    }
}

#[async_trait]
impl MarketDataProvider for TwelveDataProvider {
    async fn fetch(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<Vec<ObservationPoint>, PipelineError> {
        let api_key = self
            .keys
            .next_key()
            .ok_or_else(|| PipelineError::upstream(PROVIDER_NAME, "no API key available"))?;
        let url = self.request_url(symbol, timeframe, api_key);

        let response = self.client.get(&url).send().await.map_err(|e| {
            let reason = Self::redact(e);
            warn!(symbol, %reason, "Twelve Data request failed");
            PipelineError::upstream(PROVIDER_NAME, reason)
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(symbol, %status, "Twelve Data returned an error status");
            return Err(PipelineError::upstream(PROVIDER_NAME, format!("HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| PipelineError::upstream(PROVIDER_NAME, e.without_url().to_string()))?;

        let points = parse_time_series(&body)?;
        info!(symbol, %timeframe, points = points.len(), "Fetched Twelve Data history");
        Ok(points)
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }
}
