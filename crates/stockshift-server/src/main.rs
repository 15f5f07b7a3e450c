mod api;
mod middleware;
mod notifier;
mod registry;
#[cfg(test)]
mod test_support;

use std::sync::Arc;

use chrono::Utc;
use stockshift_core::{
    suggest, AppConfig, FileNetworkSource, LifecycleManager, LogNotifier, NetworkSource, Notifier,
    RandomShippingEstimator, StaticSignals, SuggestionBook,
};
use tokio::sync::RwLock;
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, default_rate_limit_state, AppState},
    middleware::AuthState,
    notifier::WebhookNotifier,
    registry::SuggestionRegistry,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(stockshift_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::info!(env = %config.env, network = ?config.network_path, "starting stockshift-server");

    let state = build_state(&config)?;
    let auth = AuthState::from_env(matches!(
        config.env,
        stockshift_core::Environment::Development
    ))?;
    let app = build_app(state, auth, default_rate_limit_state());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

fn build_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let source: Arc<dyn NetworkSource> = Arc::new(FileNetworkSource::new(&config.network_path));
    let network = source.load()?;

    let notifier: Arc<dyn Notifier> = match &config.notify_webhook_url {
        Some(url) => Arc::new(WebhookNotifier::new(url, config.notify_timeout_secs)?),
        None => {
            tracing::info!("no webhook configured; transfer notifications go to the log");
            Arc::new(LogNotifier)
        }
    };
    let manager = LifecycleManager::new(
        config.engine,
        Arc::new(RandomShippingEstimator::new(config.max_shipping_cost)),
        notifier,
    );

    let signals = StaticSignals::from_entries(&network.signals);
    let admission = suggest(&network, &signals, &config.engine);
    let book = SuggestionBook::from_candidates(admission.admitted, Utc::now());
    tracing::info!(
        stores = network.stores.len(),
        suggestions = book.len(),
        "network loaded"
    );

    Ok(AppState {
        source,
        network: Arc::new(RwLock::new(network)),
        registry: Arc::new(SuggestionRegistry::from_book(book)),
        manager: Arc::new(manager),
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
