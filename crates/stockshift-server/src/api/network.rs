use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;
use stockshift_core::{SkuOverview, Store, StoreInventorySummary};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct InventoryQuery {
    pub sku: Option<String>,
}

pub(super) async fn list_stores(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<Vec<Store>>> {
    let stores = state.network.read().await.stores.clone();
    Json(ApiResponse::new(stores, req_id.0))
}

pub(super) async fn list_store_summaries(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<Vec<StoreInventorySummary>>> {
    let summaries = state.network.read().await.store_summaries();
    Json(ApiResponse::new(summaries, req_id.0))
}

/// Per-store stock of one SKU.
pub(super) async fn get_inventory(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<InventoryQuery>,
) -> Result<Json<ApiResponse<Vec<SkuOverview>>>, ApiError> {
    let sku = params
        .sku
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::new(req_id.0.clone(), "bad_request", "sku is required"))?;

    let overview = state.network.read().await.sku_overview(sku);
    Ok(Json(ApiResponse::new(overview, req_id.0)))
}
