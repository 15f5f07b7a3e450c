mod network;
mod suggestions;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use stockshift_core::{LifecycleError, LifecycleManager, NetworkSource, StoreNetwork};
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{
    enforce_rate_limit, request_id, require_bearer_auth, AuthState, RateLimitState, RequestId,
};
use crate::registry::SuggestionRegistry;

#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn NetworkSource>,
    /// Snapshot the suggestions were derived from; replaced on refresh.
    pub network: Arc<RwLock<StoreNetwork>>,
    pub registry: Arc<SuggestionRegistry>,
    pub manager: Arc<LifecycleManager>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    stores: usize,
    suggestions: usize,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub(super) fn new(data: T, request_id: String) -> Self {
        Self {
            data,
            meta: ResponseMeta::new(request_id),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "conflict" | "guard_violation" => StatusCode::CONFLICT,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn map_lifecycle_error(request_id: String, error: &LifecycleError) -> ApiError {
    tracing::debug!(error = %error, code = error.code(), "lifecycle operation refused");
    ApiError::new(request_id, error.code(), error.to_string())
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

fn protected_router(auth: AuthState, rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/stores", get(network::list_stores))
        .route("/api/v1/stores/summary", get(network::list_store_summaries))
        .route("/api/v1/inventory", get(network::get_inventory))
        .route("/api/v1/suggestions", get(suggestions::list_suggestions))
        .route(
            "/api/v1/suggestions/export",
            get(suggestions::export_suggestions),
        )
        .route(
            "/api/v1/suggestions/refresh",
            post(suggestions::refresh_suggestions),
        )
        .route("/api/v1/suggestions/{id}", get(suggestions::get_suggestion))
        .route(
            "/api/v1/suggestions/{id}/edit",
            post(suggestions::begin_edit),
        )
        .route(
            "/api/v1/suggestions/{id}/edit/save",
            post(suggestions::save_edit),
        )
        .route(
            "/api/v1/suggestions/{id}/edit/cancel",
            post(suggestions::cancel_edit),
        )
        .route(
            "/api/v1/suggestions/{id}/approve",
            post(suggestions::approve),
        )
        .route("/api/v1/suggestions/{id}/reject", post(suggestions::reject))
        .route(
            "/api/v1/suggestions/{id}/advance",
            post(suggestions::advance_shipping),
        )
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    rate_limit,
                    enforce_rate_limit,
                ))
                .layer(axum::middleware::from_fn_with_state(
                    auth,
                    require_bearer_auth,
                )),
        )
}

pub fn build_app(state: AppState, auth: AuthState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new().route("/api/v1/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(protected_router(auth, rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let stores = state.network.read().await.stores.len();
    let suggestions = state.registry.len().await;
    Json(ApiResponse::new(
        HealthData {
            status: "ok",
            stores,
            suggestions,
        },
        req_id.0,
    ))
}

pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(120, Duration::from_secs(60))
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
