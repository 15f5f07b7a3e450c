//! Suggestion listing, export, refresh and lifecycle handlers.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Path, Query, State},
    http::header,
    response::IntoResponse,
    Extension, Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use stockshift_core::{
    export_rows, run_query, suggest, to_csv_string, EditRequest, LifecycleError, LifecycleManager,
    RejectionReason, ShippingStage, SortKey, StaticSignals, StoreNetwork, SuggestionQuery,
    SuggestionStats, TransferSuggestion, UrgencyFilter,
};

use crate::middleware::RequestId;

use super::{map_lifecycle_error, ApiError, ApiResponse, AppState};

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(super) struct ListQuery {
    pub urgency: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct VersionGuard {
    #[serde(default)]
    pub expected_version: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct SaveEditBody {
    pub from_store_id: String,
    pub to_store_id: String,
    pub quantity: i64,
    #[serde(default)]
    pub reason: Option<String>,
    pub editor: String,
    #[serde(default)]
    pub expected_version: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ApproveBody {
    pub approved_by: String,
    #[serde(default)]
    pub expected_version: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RejectBody {
    pub rejected_by: String,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub expected_version: Option<u64>,
}

// ---------------------------------------------------------------------------
// Response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(super) struct SuggestionView {
    #[serde(flatten)]
    pub suggestion: TransferSuggestion,
    pub from_store_name: String,
    pub to_store_name: String,
    pub status_label: &'static str,
}

impl SuggestionView {
    fn new(suggestion: &TransferSuggestion, network: &StoreNetwork) -> Self {
        Self {
            from_store_name: network.store_name(&suggestion.plan.from_store_id).to_string(),
            to_store_name: network.store_name(&suggestion.plan.to_store_id).to_string(),
            status_label: suggestion.status_label(),
            suggestion: suggestion.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct SuggestionList {
    pub suggestions: Vec<SuggestionView>,
    pub stats: SuggestionStats,
}

#[derive(Debug, Serialize)]
pub(super) struct RefreshSummary {
    pub added: Vec<String>,
    pub admitted: usize,
    pub rejected: usize,
    pub tracked: usize,
}

#[derive(Debug, Serialize)]
pub(super) struct ShippingProgress {
    pub shipping: ShippingStage,
    pub suggestion: SuggestionView,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_query(req_id: &str, params: &ListQuery) -> Result<SuggestionQuery, ApiError> {
    let urgency = params
        .urgency
        .as_deref()
        .map_or(Ok(UrgencyFilter::All), |s| s.parse::<UrgencyFilter>())
        .map_err(|e| ApiError::new(req_id, "bad_request", e.to_string()))?;
    let sort = params
        .sort
        .as_deref()
        .map_or(Ok(SortKey::default()), |s| s.parse::<SortKey>())
        .map_err(|e| ApiError::new(req_id, "bad_request", e.to_string()))?;
    Ok(SuggestionQuery {
        urgency,
        search: params.search.clone().unwrap_or_default(),
        sort,
    })
}

/// Optional `{"expected_version": N}` body. Empty means no version check.
fn version_guard(req_id: &str, body: &Bytes) -> Result<VersionGuard, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(VersionGuard::default());
    }
    serde_json::from_slice(body).map_err(|e| {
        ApiError::new(req_id, "bad_request", format!("invalid request body: {e}"))
    })
}

fn json_body<T>(req_id: &str, body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(b)| b)
        .map_err(|e| ApiError::new(req_id, "bad_request", e.body_text()))
}

/// Run one lifecycle operation under the suggestion's lock.
async fn apply<T, F>(state: &AppState, req_id: &str, id: &str, op: F) -> Result<(T, SuggestionView), ApiError>
where
    F: FnOnce(&LifecycleManager, &mut TransferSuggestion, &StoreNetwork) -> Result<T, LifecycleError>,
{
    let handle = state.registry.get(id).await.ok_or_else(|| {
        map_lifecycle_error(req_id.to_string(), &LifecycleError::NotFound(id.to_string()))
    })?;

    let network = state.network.read().await;
    let mut suggestion = handle.lock().await;
    let out = op(state.manager.as_ref(), &mut *suggestion, &*network)
        .map_err(|e| map_lifecycle_error(req_id.to_string(), &e))?;
    Ok((out, SuggestionView::new(&suggestion, &network)))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

pub(super) async fn list_suggestions(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<ListQuery>,
) -> Result<Json<ApiResponse<SuggestionList>>, ApiError> {
    let query = parse_query(&req_id.0, &params)?;
    let snapshot = state.registry.snapshot().await;
    let result = run_query(&snapshot, &query);

    let network = state.network.read().await;
    let suggestions = result
        .suggestions
        .iter()
        .map(|s| SuggestionView::new(s, &network))
        .collect();

    Ok(Json(ApiResponse::new(
        SuggestionList {
            suggestions,
            stats: result.stats,
        },
        req_id.0,
    )))
}

pub(super) async fn export_suggestions(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let query = parse_query(&req_id.0, &params)?;
    let snapshot = state.registry.snapshot().await;
    let result = run_query(&snapshot, &query);

    let rows = {
        let network = state.network.read().await;
        export_rows(&result.suggestions, &network)
    };
    let csv = to_csv_string(&rows).map_err(|e| {
        tracing::error!(error = %e, "csv export failed");
        ApiError::new(req_id.0.clone(), "internal_error", "csv export failed")
    })?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"transfer-suggestions.csv\"",
            ),
        ],
        csv,
    ))
}

pub(super) async fn get_suggestion(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<SuggestionView>>, ApiError> {
    let handle = state.registry.get(&id).await.ok_or_else(|| {
        ApiError::new(
            req_id.0.clone(),
            "not_found",
            format!("suggestion '{id}' not found"),
        )
    })?;
    let suggestion = handle.lock().await.clone();
    let view = SuggestionView::new(&suggestion, &*state.network.read().await);
    Ok(Json(ApiResponse::new(view, req_id.0)))
}

/// Reload the network and track admitted routes not already tracked.
pub(super) async fn refresh_suggestions(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<RefreshSummary>>, ApiError> {
    let source = Arc::clone(&state.source);
    let reloaded = tokio::task::spawn_blocking(move || source.load())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "network reload task failed");
            ApiError::new(req_id.0.clone(), "internal_error", "network reload failed")
        })?
        .map_err(|e| {
            tracing::error!(error = %e, "network reload failed");
            ApiError::new(req_id.0.clone(), "internal_error", "network reload failed")
        })?;

    let signals = StaticSignals::from_entries(&reloaded.signals);
    let admission = suggest(&reloaded, &signals, state.manager.settings());
    let admitted = admission.admitted.len();
    let rejected = admission.rejected.len();

    *state.network.write().await = reloaded;
    let added = state.registry.admit(admission.admitted, Utc::now()).await;
    let tracked = state.registry.len().await;
    tracing::info!(added = added.len(), tracked, "suggestions refreshed");

    Ok(Json(ApiResponse::new(
        RefreshSummary {
            added,
            admitted,
            rejected,
            tracked,
        },
        req_id.0,
    )))
}

pub(super) async fn begin_edit(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<ApiResponse<SuggestionView>>, ApiError> {
    let body = version_guard(&req_id.0, &body)?;
    let ((), view) = apply(&state, &req_id.0, &id, |mgr, s, _| {
        mgr.begin_edit(s, body.expected_version)
    })
    .await?;
    Ok(Json(ApiResponse::new(view, req_id.0)))
}

pub(super) async fn cancel_edit(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<ApiResponse<SuggestionView>>, ApiError> {
    let body = version_guard(&req_id.0, &body)?;
    let ((), view) = apply(&state, &req_id.0, &id, |mgr, s, _| {
        mgr.cancel_edit(s, body.expected_version)
    })
    .await?;
    Ok(Json(ApiResponse::new(view, req_id.0)))
}

pub(super) async fn save_edit(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
    body: Result<Json<SaveEditBody>, JsonRejection>,
) -> Result<Json<ApiResponse<SuggestionView>>, ApiError> {
    let body = json_body(&req_id.0, body)?;
    let edit = EditRequest {
        from_store_id: body.from_store_id,
        to_store_id: body.to_store_id,
        quantity: body.quantity,
        reason: body.reason,
    };

    let network = state.network.read().await;
    let view = state
        .registry
        .with_other_routes(&id, |s, occupied| {
            state
                .manager
                .save_edit(s, &edit, &body.editor, &network, occupied, body.expected_version)
                .map(|()| SuggestionView::new(s, &network))
        })
        .await
        .ok_or_else(|| {
            map_lifecycle_error(req_id.0.clone(), &LifecycleError::NotFound(id.clone()))
        })?
        .map_err(|e| map_lifecycle_error(req_id.0.clone(), &e))?;
    drop(network);

    Ok(Json(ApiResponse::new(view, req_id.0)))
}

pub(super) async fn approve(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
    body: Result<Json<ApproveBody>, JsonRejection>,
) -> Result<Json<ApiResponse<SuggestionView>>, ApiError> {
    let body = json_body(&req_id.0, body)?;
    let ((), view) = apply(&state, &req_id.0, &id, |mgr, s, network| {
        mgr.approve(s, &body.approved_by, network, body.expected_version)
    })
    .await?;
    Ok(Json(ApiResponse::new(view, req_id.0)))
}

pub(super) async fn reject(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
    body: Result<Json<RejectBody>, JsonRejection>,
) -> Result<Json<ApiResponse<SuggestionView>>, ApiError> {
    let body = json_body(&req_id.0, body)?;
    let reason = body.reason.as_deref().and_then(RejectionReason::parse);
    let ((), view) = apply(&state, &req_id.0, &id, |mgr, s, network| {
        mgr.reject(s, &body.rejected_by, reason, network, body.expected_version)
    })
    .await?;
    Ok(Json(ApiResponse::new(view, req_id.0)))
}

pub(super) async fn advance_shipping(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<ApiResponse<ShippingProgress>>, ApiError> {
    let body = version_guard(&req_id.0, &body)?;
    let (shipping, suggestion) = apply(&state, &req_id.0, &id, |mgr, s, _| {
        mgr.advance_shipping(s, body.expected_version)
    })
    .await?;
    Ok(Json(ApiResponse::new(
        ShippingProgress {
            shipping,
            suggestion,
        },
        req_id.0,
    )))
}
