use std::net::SocketAddr;
use std::path::PathBuf;

use crate::settings::EngineSettings;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub network_path: PathBuf,
    /// Unset means notifications only go to the log.
    pub notify_webhook_url: Option<String>,
    pub notify_timeout_secs: u64,
    pub max_shipping_cost: f64,
    pub engine: EngineSettings,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Webhook URLs commonly embed a token.
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("network_path", &self.network_path)
            .field(
                "notify_webhook_url",
                &self.notify_webhook_url.as_ref().map(|_| "[redacted]"),
            )
            .field("notify_timeout_secs", &self.notify_timeout_secs)
            .field("max_shipping_cost", &self.max_shipping_cost)
            .field("engine", &self.engine)
            .finish()
    }
}
