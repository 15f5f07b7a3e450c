use super::*;
use crate::test_support::{record, store, surplus_shortage_network};

#[test]
fn surplus_and_shortage_floor_at_zero() {
    let over = record("s1", "SKU-1", 220, 20, 60);
    assert_eq!(over.surplus(), 160);
    assert_eq!(over.shortage(), 0);

    let under = record("s1", "SKU-1", 10, 40, 90);
    assert_eq!(under.surplus(), 0);
    assert_eq!(under.shortage(), 30);

    let balanced = record("s1", "SKU-1", 50, 40, 90);
    assert_eq!(balanced.surplus(), 0);
    assert_eq!(balanced.shortage(), 0);
}

#[test]
fn store_name_falls_back_for_unknown_id() {
    let network = surplus_shortage_network(31);
    assert_eq!(network.store_name("store-x"), "Store store-x");
    assert_eq!(network.store_name("nope"), "Unknown Store");
}

#[test]
fn store_summaries_count_threshold_breaches() {
    let mut network = surplus_shortage_network(31);
    network
        .inventory
        .push(record("store-x", "SKU-2", 5, 10, 20));

    let summaries = network.store_summaries();
    let x = summaries.iter().find(|s| s.store_id == "store-x").unwrap();
    assert_eq!(x.sku_count, 2);
    assert_eq!(x.over_stock_count, 1);
    assert_eq!(x.low_stock_count, 1);
    assert!((x.total_value - 2250.0).abs() < 1e-9);

    let z = summaries.iter().find(|s| s.store_id == "store-z").unwrap();
    assert_eq!(z.sku_count, 0);
    assert!(z.total_value.abs() < f64::EPSILON);
}

#[test]
fn sku_overview_lists_every_store() {
    let network = surplus_shortage_network(31);
    let overview = network.sku_overview("SKU-1");
    assert_eq!(overview.len(), 3);

    let y = overview.iter().find(|o| o.store_id == "store-y").unwrap();
    assert_eq!(y.items.len(), 1);
    assert_eq!(y.low_stock_count, 1);
    assert_eq!(y.over_stock_count, 0);

    let z = overview.iter().find(|o| o.store_id == "store-z").unwrap();
    assert!(z.items.is_empty());
}

#[test]
fn validate_rejects_duplicate_store_ids() {
    let mut network = surplus_shortage_network(31);
    network.stores.push(store("store-x", 30.0, -97.0, 100.0));
    let err = validate_network(&network).unwrap_err();
    assert!(err.to_string().contains("duplicate store id"));
}

#[test]
fn validate_rejects_min_above_max() {
    let mut network = surplus_shortage_network(31);
    network.inventory.push(record("store-z", "SKU-9", 10, 50, 40));
    let err = validate_network(&network).unwrap_err();
    assert!(err.to_string().contains("above max_threshold"));
}

#[test]
fn validate_rejects_unknown_store_reference() {
    let mut network = surplus_shortage_network(31);
    network.inventory.push(record("store-q", "SKU-9", 10, 5, 40));
    let err = validate_network(&network).unwrap_err();
    assert!(err.to_string().contains("unknown store"));
}

#[test]
fn validate_rejects_out_of_range_confidence() {
    let mut network = surplus_shortage_network(31);
    network.signals.push(SignalEntry {
        from_store_id: "store-x".to_string(),
        to_store_id: "store-y".to_string(),
        sku: "SKU-1".to_string(),
        estimated_savings: None,
        confidence: Some(1.5),
        reason: None,
    });
    let err = validate_network(&network).unwrap_err();
    assert!(err.to_string().contains("outside [0, 1]"));
}

#[test]
fn validate_rejects_non_finite_coordinates() {
    let mut network = surplus_shortage_network(31);
    network.stores[0].lat = f64::NAN;
    let err = validate_network(&network).unwrap_err();
    assert!(err.to_string().contains("non-finite coordinates"));

    let mut network = surplus_shortage_network(31);
    network.stores[1].lng = f64::INFINITY;
    assert!(validate_network(&network).is_err());
}

#[test]
fn yaml_nan_latitude_fails_to_load() {
    let yaml = r#"
stores:
  - id: a
    name: Store A
    address: 1 First St
    lat: .nan
    lng: -96.0
    region: North
    manager: Ann
    contact: "555-0001"
    cpi_index: 99.0
inventory: []
"#;
    let err = StoreNetwork::from_yaml_str(yaml).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(_)));
}

#[test]
fn validate_rejects_bad_signal_savings() {
    for savings in [f64::NAN, f64::INFINITY, -5.0] {
        let mut network = surplus_shortage_network(31);
        network.signals.push(SignalEntry {
            from_store_id: "store-x".to_string(),
            to_store_id: "store-y".to_string(),
            sku: "SKU-1".to_string(),
            estimated_savings: Some(savings),
            confidence: None,
            reason: None,
        });
        let err = validate_network(&network).unwrap_err();
        assert!(err.to_string().contains("invalid estimated_savings"));
    }
}

#[test]
fn parses_yaml_with_defaults() {
    let yaml = r#"
stores:
  - id: a
    name: Store A
    address: 1 First St
    lat: 32.0
    lng: -96.0
    region: North
    manager: Ann
    contact: "555-0001"
    cpi_index: 99.0
inventory:
  - store_id: a
    sku: SKU-1
    product_name: Widget
    current_stock: 5
    min_threshold: 1
    max_threshold: 10
    unit_price: 3.5
    last_updated: "2024-01-15T09:00:00Z"
"#;
    let network = StoreNetwork::from_yaml_str(yaml).expect("parse");
    assert_eq!(network.stores.len(), 1);
    assert!(network.stores[0].cost_effectiveness_score.abs() < f64::EPSILON);
    assert_eq!(network.inventory[0].forecast_demand, 0);
    assert!(network.inventory[0].category.is_none());
    assert!(network.signals.is_empty());
}

#[test]
fn load_network_from_real_file() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("config")
        .join("network.yaml");
    assert!(
        path.exists(),
        "network.yaml missing at {path:?}; required for this test"
    );
    let network = load_network(&path).expect("failed to load network.yaml");
    assert_eq!(network.stores.len(), 9);
    assert!(!network.inventory.is_empty());
    assert_eq!(network.signals.len(), 3);
}

#[test]
fn static_source_returns_snapshot() {
    let network = surplus_shortage_network(31);
    let source = StaticNetworkSource(network.clone());
    assert_eq!(source.load().unwrap(), network);
}
