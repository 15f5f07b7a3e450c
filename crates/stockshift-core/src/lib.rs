//! Transfer suggestion engine for store-network inventory redistribution.
//!
//! Stores report stock per SKU; the engine pairs surplus with shortage,
//! scores each candidate transfer, admits the profitable ones, and tracks
//! every admitted suggestion through review and shipping.

pub mod admission;
pub mod app_config;
pub mod book;
pub mod config;
pub mod cost;
pub mod distance;
pub mod economics;
pub mod export;
pub mod generator;
pub mod lifecycle;
pub mod network;
pub mod notify;
pub mod query;
pub mod settings;
pub mod shipping;
pub mod signals;
pub mod suggestion;
pub mod urgency;

use thiserror::Error;

pub use admission::{admit, Admission, AdmissionFailure};
pub use app_config::{AppConfig, Environment};
pub use book::{claimed_routes, cmp_suggestion_ids, suggestion_id, suggestion_seq, SuggestionBook};
pub use config::{load_app_config, load_app_config_from_env};
pub use economics::{recompute, Assessment, SavingsBasis, TransferPlan};
pub use export::{export_rows, parse_csv, to_csv_string, write_csv, ExportError, ExportRow};
pub use generator::{generate_candidates, suggest, TransferCandidate};
pub use lifecycle::{EditRequest, LifecycleError, LifecycleManager};
pub use network::{
    load_network, FileNetworkSource, InventoryRecord, NetworkSource, SkuOverview,
    StaticNetworkSource, Store, StoreInventorySummary, StoreNetwork,
};
pub use notify::{LogNotifier, NotifyError, Notifier, TransferAction, TransferEvent};
pub use query::{run_query, QueryResult, SortKey, SuggestionQuery, SuggestionStats, UrgencyFilter};
pub use settings::EngineSettings;
pub use shipping::{
    FixedShippingEstimator, RandomShippingEstimator, ShippingEstimator, ShippingQuote,
};
pub use signals::{NoSignals, Signal, SignalEntry, SignalSource, StaticSignals};
pub use suggestion::{
    Approval, Rejection, RejectionReason, RouteKey, ShippingStage, SuggestionStatus,
    TransferSuggestion,
};
pub use urgency::Urgency;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read network file {path}: {source}")]
    NetworkFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse network file: {0}")]
    NetworkFileParse(#[from] serde_yaml::Error),

    #[error("network validation failed: {0}")]
    Validation(String),
}

#[cfg(test)]
pub(crate) mod test_support;
