use serde::{Deserialize, Serialize};

/// A single price/volume observation.
///
/// Sequences are expected in ascending time order. `high >= price >= low`
/// is assumed by consumers but never enforced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationPoint {
    pub time: String,
    pub price: f64,
    pub volume: f64,
    pub high: f64,
    pub low: f64,
}

impl ObservationPoint {
    pub fn new(time: impl Into<String>, price: f64, volume: f64) -> Self {
        Self {
            time: time.into(),
            price,
            volume,
            high: price,
            low: price,
        }
    }

    pub fn with_range(mut self, high: f64, low: f64) -> Self {
        self.high = high;
        self.low = low;
        self
    }
}

/// Extract the price column of a window.
pub fn prices(window: &[ObservationPoint]) -> Vec<f64> {
    window.iter().map(|p| p.price).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_point_has_degenerate_range() {
        let p = ObservationPoint::new("2024-01-01 00:00:00", 1.2345, 10.0);
        assert_eq!(p.high, 1.2345);
        assert_eq!(p.low, 1.2345);
    }

    #[test]
    fn test_prices_preserves_order() {
        let window = vec![
            ObservationPoint::new("t0", 1.0, 0.0),
            ObservationPoint::new("t1", 2.0, 0.0),
            ObservationPoint::new("t2", 3.0, 0.0),
        ];
        assert_eq!(prices(&window), vec![1.0, 2.0, 3.0]);
    }
}
