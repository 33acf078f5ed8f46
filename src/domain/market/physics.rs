//! Aggregate "physics" descriptors of a price window.
//!
//! Everything here is a pure function of the supplied window: no caching,
//! no hidden state. Degenerate windows (flat price) are handled by flooring
//! divisors to 1 rather than by returning errors.

use super::observation::ObservationPoint;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::fmt;

/// Minimum window length for a meaningful descriptor
pub const MIN_PHYSICS_WINDOW: usize = 20;

const MOMENTUM_LOOKBACK: usize = 5;
const VELOCITY_LOOKBACK: usize = 10;
const MOMENTUM_TOLERANCE: f64 = 0.0001;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MomentumDirection {
    Bull,
    Bear,
    Flat,
}

impl fmt::Display for MomentumDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MomentumDirection::Bull => write!(f, "BULL"),
            MomentumDirection::Bear => write!(f, "BEAR"),
            MomentumDirection::Flat => write!(f, "FLAT"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsDescriptor {
    /// Mean absolute tick-to-tick change
    pub volatility: f64,
    /// Signed rate of change over the velocity lookback
    pub velocity: f64,
    pub spread: f64,
    /// Efficiency ratio scaled to 0..=100
    pub regime_strength: f64,
    pub momentum_direction: MomentumDirection,
    /// Standard deviation of absolute tick changes
    pub noise_floor: f64,
}

impl PhysicsDescriptor {
    /// Neutral descriptor returned for windows shorter than [`MIN_PHYSICS_WINDOW`]
    pub fn neutral() -> Self {
        Self {
            volatility: 0.0,
            velocity: 0.0,
            spread: 0.0001,
            regime_strength: 50.0,
            momentum_direction: MomentumDirection::Flat,
            noise_floor: 0.0,
        }
    }
}

impl Default for PhysicsDescriptor {
    fn default() -> Self {
        Self::neutral()
    }
}

/// Summarize a window into a [`PhysicsDescriptor`]. Never fails.
pub fn compute_physics(window: &[ObservationPoint]) -> PhysicsDescriptor {
    if window.len() < MIN_PHYSICS_WINDOW {
        return PhysicsDescriptor::neutral();
    }

    let prices: Vec<f64> = window.iter().map(|p| p.price).collect();
    let last = prices.len() - 1;
    let current = prices[last];

    let momentum_direction = momentum_direction(&prices[prices.len() - MOMENTUM_LOOKBACK..]);

    let abs_changes: Vec<f64> = prices.windows(2).map(|w| (w[1] - w[0]).abs()).collect();
    let volatility = abs_changes.iter().mean();
    let noise_floor = abs_changes.iter().population_std_dev();

    let displacement = (current - prices[0]).abs();
    let path: f64 = abs_changes.iter().sum();
    let efficiency_ratio = displacement / floor_divisor(path);

    PhysicsDescriptor {
        volatility,
        velocity: (current - prices[last - VELOCITY_LOOKBACK]) / VELOCITY_LOOKBACK as f64,
        spread: volatility * 0.1,
        regime_strength: (efficiency_ratio * 100.0).min(100.0),
        momentum_direction,
        noise_floor,
    }
}

fn momentum_direction(tail: &[f64]) -> MomentumDirection {
    let (first, last) = match (tail.first(), tail.last()) {
        (Some(f), Some(l)) => (*f, *l),
        _ => return MomentumDirection::Flat,
    };

    if last > first * (1.0 + MOMENTUM_TOLERANCE) {
        MomentumDirection::Bull
    } else if last < first * (1.0 - MOMENTUM_TOLERANCE) {
        MomentumDirection::Bear
    } else {
        MomentumDirection::Flat
    }
}

/// Zero divisors are replaced by 1.
pub(crate) fn floor_divisor(value: f64) -> f64 {
    if value == 0.0 { 1.0 } else { value }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(prices: impl IntoIterator<Item = f64>) -> Vec<ObservationPoint> {
        prices
            .into_iter()
            .enumerate()
            .map(|(i, p)| ObservationPoint::new(format!("t{}", i), p, 100.0))
            .collect()
    }

    #[test]
    fn test_short_window_returns_neutral_default() {
        let window = series((0..19).map(|i| 100.0 + i as f64));
        assert_eq!(compute_physics(&window), PhysicsDescriptor::neutral());
        assert_eq!(compute_physics(&[]), PhysicsDescriptor::neutral());
    }

    #[test]
    fn test_monotonic_series_is_bull_with_positive_velocity() {
        let window = series((0..20).map(|i| 100.0 + i as f64));
        let physics = compute_physics(&window);

        assert_eq!(physics.momentum_direction, MomentumDirection::Bull);
        assert!(physics.velocity > 0.0);
        assert_eq!(physics.velocity, 1.0);
    }

    #[test]
    fn test_linear_trend_has_full_efficiency_and_no_noise() {
        let window = series((0..60).map(|i| 100.0 + i as f64));
        let physics = compute_physics(&window);

        assert!((physics.regime_strength - 100.0).abs() < 1e-9);
        assert!(physics.noise_floor.abs() < 1e-12);
        assert!((physics.volatility - 1.0).abs() < 1e-12);
        assert!((physics.spread - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_flat_series_is_flat_with_zero_dispersion() {
        let window = series(std::iter::repeat_n(1.25, 30));
        let physics = compute_physics(&window);

        assert_eq!(physics.momentum_direction, MomentumDirection::Flat);
        assert_eq!(physics.volatility, 0.0);
        assert_eq!(physics.noise_floor, 0.0);
        assert_eq!(physics.regime_strength, 0.0);
    }

    #[test]
    fn test_falling_tail_is_bear() {
        let mut prices: Vec<f64> = vec![100.0; 20];
        prices.extend([100.0, 99.0, 98.0, 97.0, 96.0]);
        let physics = compute_physics(&series(prices));
        assert_eq!(physics.momentum_direction, MomentumDirection::Bear);
        assert!(physics.velocity < 0.0);
    }

    #[test]
    fn test_choppy_series_has_low_regime_strength() {
        // mid, mid+1, mid-1, mid+1, ...
        let prices = (0..60).map(|i| match i {
            0 => 50.0,
            i if i % 2 == 1 => 51.0,
            _ => 49.0,
        });
        let physics = compute_physics(&series(prices));

        assert!(physics.regime_strength < 5.0);
        assert!(physics.noise_floor > 0.0);
    }

    #[test]
    fn test_is_pure() {
        let window = series((0..40).map(|i| 10.0 + (i as f64 * 0.7).sin()));
        assert_eq!(compute_physics(&window), compute_physics(&window));
    }
}
