use crate::domain::market::ObservationPoint;
use crate::domain::market::physics::floor_divisor;
use serde::{Deserialize, Serialize};

/// Trailing window length used by every feature.
pub const FEATURE_WINDOW: usize = 10;

/// Ordered list of feature names.
/// This order MUST match [`FeatureVector::to_array`]; the classifier's input
/// layer is wired positionally.
pub const FEATURE_NAMES: &[&str] = &["return", "volume_z_score", "range_position", "momentum"];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub ret: f64,
    pub volume_z_score: f64,
    pub range_position: f64,
    pub momentum: f64,
}

impl FeatureVector {
    pub fn to_array(&self) -> [f64; 4] {
        [self.ret, self.volume_z_score, self.range_position, self.momentum]
    }

    /// Features of `current` against a trailing `window`; `previous_price`
    /// feeds the one-step momentum.
    fn compute(
        window: &[ObservationPoint],
        current: &ObservationPoint,
        previous_price: f64,
    ) -> Self {
        let window_start = window[0].price;
        let mean_volume = window.iter().map(|p| p.volume).sum::<f64>() / window.len() as f64;

        let (min, max) = window.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p.price), hi.max(p.price))
        });

        Self {
            ret: current.price / window_start - 1.0,
            volume_z_score: (current.volume - mean_volume) / floor_divisor(mean_volume),
            range_position: (current.price - min) / floor_divisor(max - min),
            momentum: current.price / previous_price - 1.0,
        }
    }
}

/// A feature vector with its next-step direction label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingSample {
    pub features: FeatureVector,
    /// `true` when the following price is strictly higher.
    pub label: bool,
}

/// One sample per index `i` in `[FEATURE_WINDOW, len - 2]`, each built from the
/// `FEATURE_WINDOW` points strictly before `i`.
pub fn build_training_set(data: &[ObservationPoint]) -> Vec<TrainingSample> {
    if data.len() < FEATURE_WINDOW + 2 {
        return Vec::new();
    }

    (FEATURE_WINDOW..data.len() - 1)
        .map(|i| {
            let window = &data[i - FEATURE_WINDOW..i];
            TrainingSample {
                features: FeatureVector::compute(window, &data[i], data[i - 1].price),
                label: data[i + 1].price > data[i].price,
            }
        })
        .collect()
}

/// Feature vector describing the most recent point, used for inference.
///
/// The window here is the last `FEATURE_WINDOW` points *including* the current
/// one. Returns `None` when fewer than `FEATURE_WINDOW` points are supplied.
pub fn latest_features(data: &[ObservationPoint]) -> Option<FeatureVector> {
    if data.len() < FEATURE_WINDOW.max(2) {
        return None;
    }
    let window = &data[data.len() - FEATURE_WINDOW..];
    let current = &data[data.len() - 1];
    Some(FeatureVector::compute(window, current, data[data.len() - 2].price))
}
