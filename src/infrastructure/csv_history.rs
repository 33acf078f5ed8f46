use crate::domain::errors::PipelineError;
use crate::domain::market::{ObservationPoint, Timeframe};
use crate::domain::ports::MarketDataProvider;
use async_trait::async_trait;
use serde::Deserialize;
use std::io::Read;
use std::path::PathBuf;
use tracing::info;

pub const PROVIDER_NAME: &str = "csv";

#[derive(Debug, Deserialize)]
struct CsvRow {
    time: String,
    price: f64,
    #[serde(default)]
    volume: Option<f64>,
    #[serde(default)]
    high: Option<f64>,
    #[serde(default)]
    low: Option<f64>,
}

/// Reads `time,price,volume,high,low` rows, oldest first. Only `time` and
/// `price` are required.
pub fn read_history<R: Read>(reader: R) -> Result<Vec<ObservationPoint>, PipelineError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut points = Vec::new();
    for (line, row) in rdr.deserialize::<CsvRow>().enumerate() {
        let row = row.map_err(|e| {
            PipelineError::upstream(PROVIDER_NAME, format!("row {}: {}", line + 1, e))
        })?;
        let high = row.high.unwrap_or(row.price);
        let low = row.low.unwrap_or(row.price);
        points.push(
            ObservationPoint::new(row.time, row.price, row.volume.unwrap_or(0.0))
                .with_range(high, low),
        );
    }
    Ok(points)
}

/// Serves the same file for every symbol and timeframe.
pub struct CsvHistoryProvider {
    path: PathBuf,
}

impl CsvHistoryProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl MarketDataProvider for CsvHistoryProvider {
    async fn fetch(
        &self,
        symbol: &str,
        _timeframe: Timeframe,
    ) -> Result<Vec<ObservationPoint>, PipelineError> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            PipelineError::upstream(PROVIDER_NAME, format!("{}: {}", self.path.display(), e))
        })?;
        let points = read_history(bytes.as_slice())?;
        info!(symbol, path = %self.path.display(), points = points.len(), "Loaded CSV history");
        Ok(points)
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_reads_full_and_partial_rows() {
        let data = "time,price,volume,high,low\n\
                    2024-01-01 00:00,1.10,50,1.11,1.09\n\
                    2024-01-01 00:01,1.12,,,\n";
        let points = read_history(data.as_bytes()).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].high, 1.11);
        assert_eq!(points[1].volume, 0.0);
        assert_eq!(points[1].low, 1.12);
    }

    #[test]
    fn test_bad_price_names_the_row() {
        let data = "time,price\nt0,1.0\nt1,abc\n";
        let err = read_history(data.as_bytes()).unwrap_err();
        match err {
            PipelineError::UpstreamUnavailable { reason, .. } => {
                assert!(reason.starts_with("row 2"))
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_provider_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "time,price,volume").unwrap();
        for i in 0..5 {
            writeln!(file, "t{i},{},10", 100 + i).unwrap();
        }

        let provider = CsvHistoryProvider::new(file.path());
        let points = provider.fetch("EUR/USD", Timeframe::OneMin).await.unwrap();
        assert_eq!(points.len(), 5);
        assert_eq!(points[4].price, 104.0);
    }

    #[tokio::test]
    async fn test_missing_file_is_upstream_error() {
        let provider = CsvHistoryProvider::new("/nonexistent/history.csv");
        let err = provider.fetch("EUR/USD", Timeframe::OneMin).await.unwrap_err();
        assert!(matches!(err, PipelineError::UpstreamUnavailable { .. }));
    }
}
