use std::path::PathBuf;

use stockshift_core::{load_network, StoreNetwork};

pub(crate) fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("config")
        .join("network.yaml")
}

/// The checked-in development network: nine stores, six admissible routes.
pub(crate) fn fixture_network() -> StoreNetwork {
    load_network(&fixture_path()).expect("config/network.yaml should load")
}
