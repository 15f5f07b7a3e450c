//! Derived fields of a transfer.
//!
//! [`recompute`] is the only place distance, cost, savings, score and urgency
//! are derived. Candidate generation and edits both go through it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cost::cost_effectiveness;
use crate::distance::distance_miles;
use crate::network::StoreNetwork;
use crate::settings::EngineSettings;
use crate::urgency::Urgency;

/// The inputs a transfer is assessed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferPlan {
    pub from_store_id: String,
    pub to_store_id: String,
    pub sku: String,
    pub product_name: String,
    /// Units above max threshold at the source.
    pub surplus: u32,
    /// Units below min threshold at the destination.
    pub shortage: u32,
    pub quantity: u32,
    /// Authoritative savings from the data source. `None` derives savings
    /// from the avoided-loss proxy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplied_savings: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SavingsBasis {
    Derived,
    Supplied,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub distance_miles: f64,
    pub fuel_cost: f64,
    pub co2_impact: f64,
    pub estimated_savings: f64,
    pub savings_basis: SavingsBasis,
    pub cost_effectiveness_score: f64,
    /// Source store price index normalized around 1.0.
    pub cpi_factor: f64,
    pub urgency: Urgency,
}

impl Assessment {
    /// Combined fuel and CO₂ cost.
    #[must_use]
    pub fn transfer_cost(&self) -> f64 {
        self.fuel_cost + self.co2_impact
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssessError {
    #[error("unknown store '{0}'")]
    UnknownStore(String),
}

/// Derive every computed field of a transfer from its plan.
///
/// # Errors
///
/// Returns [`AssessError::UnknownStore`] if either route endpoint is not in
/// the network.
pub fn recompute(
    plan: &TransferPlan,
    network: &StoreNetwork,
    settings: &EngineSettings,
) -> Result<Assessment, AssessError> {
    let from = network
        .store(&plan.from_store_id)
        .ok_or_else(|| AssessError::UnknownStore(plan.from_store_id.clone()))?;
    let to = network
        .store(&plan.to_store_id)
        .ok_or_else(|| AssessError::UnknownStore(plan.to_store_id.clone()))?;

    let costs = settings.cost_model();
    let distance = distance_miles(from.coordinates(), to.coordinates());
    let fuel_cost = costs.fuel_cost(to.cpi_index);
    let co2_impact = costs.co2_impact(distance);

    let (estimated_savings, savings_basis) = match plan.supplied_savings {
        Some(savings) => (savings, SavingsBasis::Supplied),
        None => (
            settings.avoided_loss(plan.quantity.min(plan.surplus)),
            SavingsBasis::Derived,
        ),
    };

    Ok(Assessment {
        distance_miles: distance,
        fuel_cost,
        co2_impact,
        estimated_savings,
        savings_basis,
        cost_effectiveness_score: cost_effectiveness(estimated_savings, fuel_cost, co2_impact),
        cpi_factor: settings.cpi_factor(from.cpi_index),
        urgency: Urgency::classify(plan.shortage),
    })
}
