//! Pairs surplus with shortage for each SKU.
//!
//! Every (donor, recipient) pair of distinct stores holding the same SKU is
//! a candidate. Candidates come out in SKU, donor, recipient order; ranking
//! is the query layer's job.

use serde::Serialize;

use crate::admission::{admit, Admission};
use crate::economics::{recompute, Assessment, TransferPlan};
use crate::network::StoreNetwork;
use crate::settings::EngineSettings;
use crate::signals::SignalSource;

/// Confidence used when no external signal covers a route.
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferCandidate {
    pub plan: TransferPlan,
    pub assessment: Assessment,
    pub confidence: f64,
    pub reason: String,
}

/// Build every surplus/shortage pairing in the network.
#[must_use]
pub fn generate_candidates(
    network: &StoreNetwork,
    signals: &dyn SignalSource,
    settings: &EngineSettings,
) -> Vec<TransferCandidate> {
    let mut candidates = Vec::new();

    for (sku, records) in network.records_by_sku() {
        for donor in records.iter().filter(|r| r.surplus() > 0) {
            for recipient in records.iter().filter(|r| r.shortage() > 0) {
                if donor.store_id == recipient.store_id {
                    continue;
                }

                let surplus = donor.surplus();
                let shortage = recipient.shortage();
                let signal = signals
                    .signal(&donor.store_id, &recipient.store_id, sku)
                    .unwrap_or_default();

                let plan = TransferPlan {
                    from_store_id: donor.store_id.clone(),
                    to_store_id: recipient.store_id.clone(),
                    sku: sku.to_string(),
                    product_name: donor.product_name.clone(),
                    surplus,
                    shortage,
                    quantity: surplus.min(shortage),
                    supplied_savings: signal.estimated_savings,
                };

                let assessment = match recompute(&plan, network, settings) {
                    Ok(a) => a,
                    Err(e) => {
                        tracing::warn!(sku, error = %e, "skipping candidate with unresolvable route");
                        continue;
                    }
                };

                let reason = signal.reason.unwrap_or_else(|| {
                    format!(
                        "Surplus of {surplus} at {} matched with shortage of {shortage} at {}",
                        network.store_name(&plan.from_store_id),
                        network.store_name(&plan.to_store_id),
                    )
                });

                candidates.push(TransferCandidate {
                    plan,
                    assessment,
                    confidence: signal.confidence.unwrap_or(DEFAULT_CONFIDENCE),
                    reason,
                });
            }
        }
    }

    candidates
}

/// Generate candidates and run them through admission.
#[must_use]
pub fn suggest(
    network: &StoreNetwork,
    signals: &dyn SignalSource,
    settings: &EngineSettings,
) -> Admission {
    let candidates = generate_candidates(network, signals, settings);
    let admission = admit(candidates, settings);
    tracing::info!(
        admitted = admission.admitted.len(),
        rejected = admission.rejected.len(),
        "transfer candidates evaluated"
    );
    admission
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::economics::SavingsBasis;
    use crate::signals::{NoSignals, SignalEntry, StaticSignals};
    use crate::test_support::{record, surplus_shortage_network};
    use crate::urgency::Urgency;

    #[test]
    fn pairs_donor_with_recipient() {
        let network = surplus_shortage_network(31);
        let candidates = generate_candidates(&network, &NoSignals, &EngineSettings::default());
        assert_eq!(candidates.len(), 1);

        let c = &candidates[0];
        assert_eq!(c.plan.from_store_id, "store-x");
        assert_eq!(c.plan.to_store_id, "store-y");
        assert_eq!(c.plan.surplus, 160);
        assert_eq!(c.plan.shortage, 31);
        assert_eq!(c.plan.quantity, 31);
        assert!((c.assessment.estimated_savings - 62.0).abs() < 1e-9);
        assert_eq!(c.assessment.urgency, Urgency::Low);
        assert!((c.confidence - DEFAULT_CONFIDENCE).abs() < f64::EPSILON);
        assert!(c.reason.contains("Surplus of 160 at Store store-x"));
    }

    #[test]
    fn quantity_is_capped_by_surplus() {
        let mut network = surplus_shortage_network(0);
        network.inventory[0] = record("store-x", "SKU-1", 110, 20, 60);
        network.inventory[1] = record("store-y", "SKU-1", 0, 120, 200);
        let candidates = generate_candidates(&network, &NoSignals, &EngineSettings::default());
        assert_eq!(candidates[0].plan.quantity, 50);
    }

    #[test]
    fn skus_are_never_crossed() {
        let mut network = surplus_shortage_network(0);
        network.inventory[1] = record("store-y", "SKU-2", 0, 120, 200);
        let candidates = generate_candidates(&network, &NoSignals, &EngineSettings::default());
        assert!(candidates.is_empty());
    }

    #[test]
    fn signal_supplies_savings_confidence_and_reason() {
        let mut network = surplus_shortage_network(31);
        network.signals.push(SignalEntry {
            from_store_id: "store-x".to_string(),
            to_store_id: "store-y".to_string(),
            sku: "SKU-1".to_string(),
            estimated_savings: Some(320.0),
            confidence: Some(0.93),
            reason: Some("High surplus matched with critical shortage".to_string()),
        });
        let signals = StaticSignals::from_entries(&network.signals);
        let candidates = generate_candidates(&network, &signals, &EngineSettings::default());

        let c = &candidates[0];
        assert!((c.assessment.estimated_savings - 320.0).abs() < 1e-9);
        assert_eq!(c.assessment.savings_basis, SavingsBasis::Supplied);
        assert!((c.confidence - 0.93).abs() < f64::EPSILON);
        assert_eq!(c.reason, "High surplus matched with critical shortage");
    }

    #[test]
    fn suggest_drops_exact_threshold_shortage() {
        let network = surplus_shortage_network(30);
        let admission = suggest(&network, &NoSignals, &EngineSettings::default());
        assert!(admission.admitted.is_empty());
        assert_eq!(admission.rejected.len(), 1);
    }

    #[test]
    fn suggest_over_real_network_file() {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("config")
            .join("network.yaml");
        let network = crate::network::load_network(&path).expect("network.yaml");
        let signals = StaticSignals::from_entries(&network.signals);
        let admission = suggest(&network, &signals, &EngineSettings::default());

        assert_eq!(admission.admitted.len() + admission.rejected.len(), 10);
        let routes: Vec<(&str, &str)> = admission
            .admitted
            .iter()
            .map(|c| (c.plan.from_store_id.as_str(), c.plan.to_store_id.as_str()))
            .collect();
        assert_eq!(
            routes,
            [
                ("store-006", "store-003"),
                ("store-006", "store-001"),
                ("store-008", "store-007"),
                ("store-006", "store-009"),
                ("store-008", "store-009"),
                ("store-008", "store-001"),
            ]
        );
        assert!(admission
            .admitted
            .iter()
            .all(|c| c.assessment.cost_effectiveness_score > 0.0));
    }

    #[test]
    fn suggest_admits_shortage_just_over_threshold() {
        let network = surplus_shortage_network(31);
        let admission = suggest(&network, &NoSignals, &EngineSettings::default());
        assert_eq!(admission.admitted.len(), 1);
        assert_eq!(admission.admitted[0].plan.quantity, 31);
    }
}
