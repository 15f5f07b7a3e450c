//! Fuel and CO₂ cost of executing a transfer.

use serde::{Deserialize, Serialize};

pub const FUEL_RATE: f64 = 0.03;
/// kg CO₂-equivalent per mile.
pub const CO2_PER_MILE: f64 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostModel {
    pub fuel_rate: f64,
    pub co2_per_mile: f64,
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            fuel_rate: FUEL_RATE,
            co2_per_mile: CO2_PER_MILE,
        }
    }
}

impl CostModel {
    /// Fuel cost, driven by the destination store's price index.
    #[must_use]
    pub fn fuel_cost(&self, destination_cpi_index: f64) -> f64 {
        destination_cpi_index * self.fuel_rate
    }

    #[must_use]
    pub fn co2_impact(&self, distance_miles: f64) -> f64 {
        distance_miles * self.co2_per_mile
    }
}

/// Net benefit of a transfer: savings minus fuel and CO₂ cost.
#[must_use]
pub fn cost_effectiveness(estimated_savings: f64, fuel_cost: f64, co2_impact: f64) -> f64 {
    estimated_savings - (fuel_cost + co2_impact)
}
