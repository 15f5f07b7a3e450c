//! Admission rules for transfer candidates.
//!
//! A candidate is admitted only when all four rules hold. Rejected candidates
//! are never surfaced as errors; they are returned alongside their failures
//! so callers can log them.

use serde::Serialize;
use thiserror::Error;

use crate::generator::TransferCandidate;
use crate::settings::EngineSettings;

#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum AdmissionFailure {
    #[error("surplus {surplus} does not exceed threshold {threshold}")]
    SurplusBelowThreshold { surplus: u32, threshold: u32 },

    #[error("shortage {shortage} does not exceed threshold {threshold}")]
    ShortageBelowThreshold { shortage: u32, threshold: u32 },

    #[error("avoided loss {avoided_loss:.2} does not exceed transfer cost {transfer_cost:.2}")]
    NotProfitable {
        avoided_loss: f64,
        transfer_cost: f64,
    },

    #[error("source cost factor {cpi_factor:.3} is above 1.0")]
    UnfavorableCpi { cpi_factor: f64 },
}

/// Candidates partitioned by the admission rules.
#[derive(Debug, Clone, Default)]
pub struct Admission {
    pub admitted: Vec<TransferCandidate>,
    pub rejected: Vec<(TransferCandidate, Vec<AdmissionFailure>)>,
}

/// Every rule the candidate breaks; empty means admissible.
#[must_use]
pub fn admission_failures(
    candidate: &TransferCandidate,
    settings: &EngineSettings,
) -> Vec<AdmissionFailure> {
    let plan = &candidate.plan;
    let assessment = &candidate.assessment;
    let mut failures = Vec::new();

    if plan.surplus <= settings.surplus_threshold {
        failures.push(AdmissionFailure::SurplusBelowThreshold {
            surplus: plan.surplus,
            threshold: settings.surplus_threshold,
        });
    }
    if plan.shortage <= settings.shortage_threshold {
        failures.push(AdmissionFailure::ShortageBelowThreshold {
            shortage: plan.shortage,
            threshold: settings.shortage_threshold,
        });
    }

    // Compared against the supplied figure or the proxy, not the computed score.
    let avoided_loss = plan
        .supplied_savings
        .unwrap_or_else(|| settings.avoided_loss(plan.surplus.min(plan.shortage)));
    let transfer_cost = assessment.transfer_cost();
    // NaN on either side fails the rule.
    if avoided_loss.is_nan() || transfer_cost.is_nan() || avoided_loss <= transfer_cost {
        failures.push(AdmissionFailure::NotProfitable {
            avoided_loss,
            transfer_cost,
        });
    }

    if assessment.cpi_factor.is_nan() || assessment.cpi_factor > 1.0 {
        failures.push(AdmissionFailure::UnfavorableCpi {
            cpi_factor: assessment.cpi_factor,
        });
    }

    failures
}

#[must_use]
pub fn is_admissible(candidate: &TransferCandidate, settings: &EngineSettings) -> bool {
    admission_failures(candidate, settings).is_empty()
}

/// Partition candidates into admitted and rejected.
#[must_use]
pub fn admit(candidates: Vec<TransferCandidate>, settings: &EngineSettings) -> Admission {
    let mut admission = Admission::default();
    for candidate in candidates {
        let failures = admission_failures(&candidate, settings);
        if failures.is_empty() {
            admission.admitted.push(candidate);
        } else {
            tracing::debug!(
                from = %candidate.plan.from_store_id,
                to = %candidate.plan.to_store_id,
                sku = %candidate.plan.sku,
                failures = ?failures,
                "candidate not admitted"
            );
            admission.rejected.push((candidate, failures));
        }
    }
    admission
}
