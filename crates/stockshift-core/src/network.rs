//! Store and inventory reference data.
//!
//! The network is a read-only snapshot: stores with their coordinates and
//! price index, plus per-store stock levels for every SKU they carry. It is
//! loaded from a YAML file and validated before the engine sees it.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::distance::Coordinates;
use crate::signals::SignalEntry;
use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
    pub id: String,
    pub name: String,
    pub address: String,
    pub lat: f64,
    pub lng: f64,
    pub region: String,
    pub manager: String,
    /// Contact phone or email.
    pub contact: String,
    /// Raw price index, nominal ≈ 100.
    pub cpi_index: f64,
    /// Static rating carried for display; the engine does not use it.
    #[serde(default)]
    pub cost_effectiveness_score: f64,
}

impl Store {
    #[must_use]
    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            lat: self.lat,
            lng: self.lng,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub store_id: String,
    pub sku: String,
    pub product_name: String,
    #[serde(default)]
    pub category: Option<String>,
    pub current_stock: u32,
    pub min_threshold: u32,
    pub max_threshold: u32,
    #[serde(default)]
    pub forecast_demand: u32,
    pub unit_price: f64,
    pub last_updated: DateTime<Utc>,
}

impl InventoryRecord {
    /// Units held above the maximum threshold.
    #[must_use]
    pub fn surplus(&self) -> u32 {
        self.current_stock.saturating_sub(self.max_threshold)
    }

    /// Units missing below the minimum threshold.
    #[must_use]
    pub fn shortage(&self) -> u32 {
        self.min_threshold.saturating_sub(self.current_stock)
    }

    #[must_use]
    pub fn is_low(&self) -> bool {
        self.current_stock < self.min_threshold
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        self.current_stock > self.max_threshold
    }

    #[must_use]
    pub fn stock_value(&self) -> f64 {
        f64::from(self.current_stock) * self.unit_price
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreNetwork {
    pub stores: Vec<Store>,
    #[serde(default)]
    pub inventory: Vec<InventoryRecord>,
    #[serde(default)]
    pub signals: Vec<SignalEntry>,
}

/// Per-store roll-up of stock value and threshold breaches.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreInventorySummary {
    pub store_id: String,
    pub store_name: String,
    pub total_value: f64,
    pub sku_count: usize,
    pub low_stock_count: usize,
    pub over_stock_count: usize,
}

/// Stock of one SKU at one store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkuOverview {
    pub store_id: String,
    pub items: Vec<InventoryRecord>,
    pub low_stock_count: usize,
    pub over_stock_count: usize,
}

impl StoreNetwork {
    /// Parse and validate a network from YAML text.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the text is not valid YAML or fails validation.
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let network: StoreNetwork = serde_yaml::from_str(content)?;
        validate_network(&network)?;
        Ok(network)
    }

    #[must_use]
    pub fn store(&self, id: &str) -> Option<&Store> {
        self.stores.iter().find(|s| s.id == id)
    }

    /// Display name for a store id, or `"Unknown Store"` if absent.
    #[must_use]
    pub fn store_name(&self, id: &str) -> &str {
        self.store(id).map_or("Unknown Store", |s| s.name.as_str())
    }

    /// Inventory records grouped by SKU, in SKU order.
    #[must_use]
    pub fn records_by_sku(&self) -> BTreeMap<&str, Vec<&InventoryRecord>> {
        let mut grouped: BTreeMap<&str, Vec<&InventoryRecord>> = BTreeMap::new();
        for record in &self.inventory {
            grouped.entry(record.sku.as_str()).or_default().push(record);
        }
        grouped
    }

    #[must_use]
    pub fn store_summaries(&self) -> Vec<StoreInventorySummary> {
        self.stores
            .iter()
            .map(|store| {
                let items: Vec<&InventoryRecord> = self
                    .inventory
                    .iter()
                    .filter(|r| r.store_id == store.id)
                    .collect();
                StoreInventorySummary {
                    store_id: store.id.clone(),
                    store_name: store.name.clone(),
                    total_value: items.iter().map(|r| r.stock_value()).sum(),
                    sku_count: items.len(),
                    low_stock_count: items.iter().filter(|r| r.is_low()).count(),
                    over_stock_count: items.iter().filter(|r| r.is_over()).count(),
                }
            })
            .collect()
    }

    /// Every store's stock of `sku`, including stores that do not carry it.
    #[must_use]
    pub fn sku_overview(&self, sku: &str) -> Vec<SkuOverview> {
        self.stores
            .iter()
            .map(|store| {
                let items: Vec<InventoryRecord> = self
                    .inventory
                    .iter()
                    .filter(|r| r.store_id == store.id && r.sku == sku)
                    .cloned()
                    .collect();
                SkuOverview {
                    store_id: store.id.clone(),
                    low_stock_count: items.iter().filter(|r| r.is_low()).count(),
                    over_stock_count: items.iter().filter(|r| r.is_over()).count(),
                    items,
                }
            })
            .collect()
    }
}

/// Load and validate a store network from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_network(path: &Path) -> Result<StoreNetwork, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::NetworkFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    StoreNetwork::from_yaml_str(&content)
}

fn validate_network(network: &StoreNetwork) -> Result<(), ConfigError> {
    let mut seen_ids = HashSet::new();
    for store in &network.stores {
        if store.id.trim().is_empty() {
            return Err(ConfigError::Validation(
                "store id must be non-empty".to_string(),
            ));
        }
        if !seen_ids.insert(store.id.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate store id: '{}'",
                store.id
            )));
        }
        if !store.lat.is_finite() || !store.lng.is_finite() {
            return Err(ConfigError::Validation(format!(
                "store '{}' has non-finite coordinates ({}, {})",
                store.id, store.lat, store.lng
            )));
        }
        if !store.cpi_index.is_finite() || store.cpi_index <= 0.0 {
            return Err(ConfigError::Validation(format!(
                "store '{}' has invalid cpi_index {}",
                store.id, store.cpi_index
            )));
        }
    }

    let mut seen_records = HashSet::new();
    for record in &network.inventory {
        if !seen_ids.contains(record.store_id.as_str()) {
            return Err(ConfigError::Validation(format!(
                "inventory for {} references unknown store '{}'",
                record.sku, record.store_id
            )));
        }
        if record.min_threshold > record.max_threshold {
            return Err(ConfigError::Validation(format!(
                "{} at '{}' has min_threshold {} above max_threshold {}",
                record.sku, record.store_id, record.min_threshold, record.max_threshold
            )));
        }
        if !seen_records.insert((record.store_id.as_str(), record.sku.as_str())) {
            return Err(ConfigError::Validation(format!(
                "duplicate inventory record for {} at '{}'",
                record.sku, record.store_id
            )));
        }
    }

    for signal in &network.signals {
        for id in [&signal.from_store_id, &signal.to_store_id] {
            if !seen_ids.contains(id.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "signal for {} references unknown store '{id}'",
                    signal.sku
                )));
            }
        }
        if let Some(savings) = signal.estimated_savings {
            if !savings.is_finite() || savings < 0.0 {
                return Err(ConfigError::Validation(format!(
                    "signal for {} has invalid estimated_savings {savings}",
                    signal.sku
                )));
            }
        }
        if let Some(confidence) = signal.confidence {
            if !(0.0..=1.0).contains(&confidence) {
                return Err(ConfigError::Validation(format!(
                    "signal for {} has confidence {confidence} outside [0, 1]",
                    signal.sku
                )));
            }
        }
    }

    Ok(())
}

/// Source of fresh network snapshots; each query may reload.
pub trait NetworkSource: Send + Sync {
    /// # Errors
    ///
    /// Returns `ConfigError` if the snapshot cannot be produced.
    fn load(&self) -> Result<StoreNetwork, ConfigError>;
}

/// Re-reads a YAML network file on every load.
#[derive(Debug, Clone)]
pub struct FileNetworkSource {
    path: PathBuf,
}

impl FileNetworkSource {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl NetworkSource for FileNetworkSource {
    fn load(&self) -> Result<StoreNetwork, ConfigError> {
        load_network(&self.path)
    }
}

/// Serves a fixed snapshot held in memory.
#[derive(Debug, Clone)]
pub struct StaticNetworkSource(pub StoreNetwork);

impl NetworkSource for StaticNetworkSource {
    fn load(&self) -> Result<StoreNetwork, ConfigError> {
        Ok(self.0.clone())
    }
}

#[cfg(test)]
#[path = "network_test.rs"]
mod tests;
