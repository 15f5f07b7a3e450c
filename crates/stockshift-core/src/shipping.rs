//! Tracking codes and shipping quotes for approved transfers.

use rand::Rng;
use serde::Serialize;

/// Lower bound of a simulated carrier quote.
pub const MIN_SHIPPING_COST: f64 = 20.0;
/// Upper bound (exclusive) of a simulated carrier quote.
pub const MAX_SHIPPING_COST: f64 = 120.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ShippingQuote {
    pub cost: f64,
    pub eta_days: u32,
}

/// Issues tracking codes and carrier quotes at approval time.
pub trait ShippingEstimator: Send + Sync {
    fn tracking_code(&self, suggestion_id: &str) -> String;
    fn quote(&self, distance_miles: f64) -> ShippingQuote;
}

/// Simulated carrier: random cost and a one-to-three day ETA.
#[derive(Debug, Clone, Copy)]
pub struct RandomShippingEstimator {
    pub max_cost: f64,
}

impl Default for RandomShippingEstimator {
    fn default() -> Self {
        Self {
            max_cost: MAX_SHIPPING_COST,
        }
    }
}

impl RandomShippingEstimator {
    #[must_use]
    pub fn new(max_cost: f64) -> Self {
        Self {
            max_cost: max_cost.max(MIN_SHIPPING_COST),
        }
    }
}

impl ShippingEstimator for RandomShippingEstimator {
    fn tracking_code(&self, suggestion_id: &str) -> String {
        let n: u32 = rand::rng().random_range(0..10_000);
        format!("TRK-{suggestion_id}-{n}")
    }

    fn quote(&self, _distance_miles: f64) -> ShippingQuote {
        let mut rng = rand::rng();
        let cost = if self.max_cost > MIN_SHIPPING_COST {
            rng.random_range(MIN_SHIPPING_COST..self.max_cost)
        } else {
            MIN_SHIPPING_COST
        };
        ShippingQuote {
            cost: (cost * 100.0).round() / 100.0,
            eta_days: rng.random_range(1..=3),
        }
    }
}

/// Deterministic estimator for tests and dry runs.
#[derive(Debug, Clone)]
pub struct FixedShippingEstimator {
    pub tracking_suffix: String,
    pub quote: ShippingQuote,
}

impl Default for FixedShippingEstimator {
    fn default() -> Self {
        Self {
            tracking_suffix: "0001".to_string(),
            quote: ShippingQuote {
                cost: 45.0,
                eta_days: 2,
            },
        }
    }
}

impl ShippingEstimator for FixedShippingEstimator {
    fn tracking_code(&self, suggestion_id: &str) -> String {
        format!("TRK-{suggestion_id}-{}", self.tracking_suffix)
    }

    fn quote(&self, _distance_miles: f64) -> ShippingQuote {
        self.quote
    }
}
