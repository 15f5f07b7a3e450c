use serde::{Deserialize, Serialize};

use crate::cost::{CostModel, CO2_PER_MILE, FUEL_RATE};

/// Minimum surplus (exclusive) a donor store must hold before it may give stock away.
pub const SURPLUS_THRESHOLD: u32 = 40;
/// Minimum shortage (exclusive) a recipient store must report before it is served.
pub const SHORTAGE_THRESHOLD: u32 = 30;
/// Placeholder value of one unit of avoided loss (stockout or markdown).
pub const AVOIDED_LOSS_PER_UNIT: f64 = 2.0;
/// Price index at which a store costs exactly the network average.
pub const NOMINAL_CPI: f64 = 100.0;

/// Tunable constants of the suggestion engine.
///
/// `Default` yields the production constants; [`crate::config`] lets the
/// environment override each one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineSettings {
    pub surplus_threshold: u32,
    pub shortage_threshold: u32,
    pub avoided_loss_per_unit: f64,
    pub fuel_rate: f64,
    pub co2_per_mile: f64,
    pub nominal_cpi: f64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            surplus_threshold: SURPLUS_THRESHOLD,
            shortage_threshold: SHORTAGE_THRESHOLD,
            avoided_loss_per_unit: AVOIDED_LOSS_PER_UNIT,
            fuel_rate: FUEL_RATE,
            co2_per_mile: CO2_PER_MILE,
            nominal_cpi: NOMINAL_CPI,
        }
    }
}

impl EngineSettings {
    #[must_use]
    pub fn cost_model(&self) -> CostModel {
        CostModel {
            fuel_rate: self.fuel_rate,
            co2_per_mile: self.co2_per_mile,
        }
    }

    /// Avoided-loss value of moving `quantity` units.
    #[must_use]
    pub fn avoided_loss(&self, quantity: u32) -> f64 {
        f64::from(quantity) * self.avoided_loss_per_unit
    }

    /// Normalize a raw store price index (nominal ≈ 100) to a multiplier around 1.0.
    #[must_use]
    pub fn cpi_factor(&self, cpi_index: f64) -> f64 {
        cpi_index / self.nominal_cpi
    }
}
