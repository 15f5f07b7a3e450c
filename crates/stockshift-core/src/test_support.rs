//! Small hand-built networks shared by unit tests.

use chrono::{TimeZone, Utc};

use crate::network::{InventoryRecord, Store, StoreNetwork};

pub(crate) fn store(id: &str, lat: f64, lng: f64, cpi_index: f64) -> Store {
    Store {
        id: id.to_string(),
        name: format!("Store {id}"),
        address: format!("{id} Main St"),
        lat,
        lng,
        region: "North Texas".to_string(),
        manager: "Test Manager".to_string(),
        contact: "(214) 555-0100".to_string(),
        cpi_index,
        cost_effectiveness_score: 0.8,
    }
}

pub(crate) fn record(store_id: &str, sku: &str, stock: u32, min: u32, max: u32) -> InventoryRecord {
    InventoryRecord {
        store_id: store_id.to_string(),
        sku: sku.to_string(),
        product_name: format!("Product {sku}"),
        category: Some("Electronics".to_string()),
        current_stock: stock,
        min_threshold: min,
        max_threshold: max,
        forecast_demand: 10,
        unit_price: 10.0,
        last_updated: Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap(),
    }
}

/// Store X holds 220 units of SKU-1 against a max of 60 (surplus 160);
/// store Y is short by `shortage` units against a min of 40.
pub(crate) fn surplus_shortage_network(shortage: u32) -> StoreNetwork {
    StoreNetwork {
        stores: vec![
            store("store-x", 32.7767, -96.7970, 98.0),
            store("store-y", 32.7877, -96.8070, 102.0),
            store("store-z", 32.7667, -96.7870, 101.0),
        ],
        inventory: vec![
            record("store-x", "SKU-1", 220, 20, 60),
            record("store-y", "SKU-1", 40 - shortage.min(40), 40, 90),
        ],
        signals: vec![],
    }
}

/// Like [`surplus_shortage_network`] but with a shortage large enough to
/// exceed the 40-unit minimum threshold.
pub(crate) fn deep_shortage_network(shortage: u32) -> StoreNetwork {
    let mut network = surplus_shortage_network(0);
    network.inventory[1] = record("store-y", "SKU-1", 5, 5 + shortage, 5 + shortage + 50);
    network
}
