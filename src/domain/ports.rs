use crate::domain::errors::PipelineError;
use crate::domain::market::{ObservationPoint, Timeframe};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Source of chronologically ordered observations (oldest first).
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn fetch(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<Vec<ObservationPoint>, PipelineError>;

    /// Identifier used in logs and `UpstreamUnavailable` errors
    fn name(&self) -> &str;
}

/// Round-robin selector over a pool of API keys.
///
/// Owned by the adapter that spends the keys; safe to share across tasks.
#[derive(Debug)]
pub struct ApiKeyRotator {
    keys: Vec<String>,
    cursor: AtomicUsize,
}

impl ApiKeyRotator {
    pub fn new(keys: Vec<String>) -> Self {
        let keys = keys
            .into_iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        Self {
            keys,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Next key in rotation, `None` when the pool is empty.
    pub fn next_key(&self) -> Option<&str> {
        if self.keys.is_empty() {
            return None;
        }
        let idx = self.cursor.fetch_add(1, Ordering::Relaxed) % self.keys.len();
        self.keys.get(idx).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
