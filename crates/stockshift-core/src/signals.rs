//! Externally supplied hints about a route: authoritative savings,
//! forecast confidence, and a human rationale.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Signal {
    /// Overrides the avoided-loss proxy when present.
    pub estimated_savings: Option<f64>,
    pub confidence: Option<f64>,
    pub reason: Option<String>,
}

/// One `signals:` entry of the network file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalEntry {
    pub from_store_id: String,
    pub to_store_id: String,
    pub sku: String,
    #[serde(default)]
    pub estimated_savings: Option<f64>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub reason: Option<String>,
}

pub trait SignalSource {
    fn signal(&self, from_store_id: &str, to_store_id: &str, sku: &str) -> Option<Signal>;
}

/// No external data; every route falls back to engine defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSignals;

impl SignalSource for NoSignals {
    fn signal(&self, _from_store_id: &str, _to_store_id: &str, _sku: &str) -> Option<Signal> {
        None
    }
}

type RouteKey = (String, String, String);

#[derive(Debug, Clone, Default)]
pub struct StaticSignals {
    by_route: HashMap<RouteKey, Signal>,
}

impl StaticSignals {
    /// Later entries for the same route replace earlier ones.
    #[must_use]
    pub fn from_entries(entries: &[SignalEntry]) -> Self {
        let by_route = entries
            .iter()
            .map(|e| {
                (
                    (e.from_store_id.clone(), e.to_store_id.clone(), e.sku.clone()),
                    Signal {
                        estimated_savings: e.estimated_savings,
                        confidence: e.confidence,
                        reason: e.reason.clone(),
                    },
                )
            })
            .collect();
        Self { by_route }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_route.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_route.is_empty()
    }
}

impl SignalSource for StaticSignals {
    fn signal(&self, from_store_id: &str, to_store_id: &str, sku: &str) -> Option<Signal> {
        self.by_route
            .get(&(
                from_store_id.to_string(),
                to_store_id.to_string(),
                sku.to_string(),
            ))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(from: &str, to: &str, savings: Option<f64>) -> SignalEntry {
        SignalEntry {
            from_store_id: from.to_string(),
            to_store_id: to.to_string(),
            sku: "SKU-1".to_string(),
            estimated_savings: savings,
            confidence: Some(0.9),
            reason: Some("Demand spike".to_string()),
        }
    }

    #[test]
    fn static_signals_match_exact_route_only() {
        let signals = StaticSignals::from_entries(&[entry("a", "b", Some(320.0))]);
        let hit = signals.signal("a", "b", "SKU-1").expect("route signal");
        assert_eq!(hit.estimated_savings, Some(320.0));
        assert!(signals.signal("b", "a", "SKU-1").is_none());
        assert!(signals.signal("a", "b", "SKU-2").is_none());
    }

    #[test]
    fn later_entries_win() {
        let signals =
            StaticSignals::from_entries(&[entry("a", "b", Some(1.0)), entry("a", "b", Some(2.0))]);
        assert_eq!(signals.len(), 1);
        assert_eq!(
            signals.signal("a", "b", "SKU-1").unwrap().estimated_savings,
            Some(2.0)
        );
    }

    #[test]
    fn no_signals_is_always_empty() {
        assert!(NoSignals.signal("a", "b", "SKU-1").is_none());
    }
}
