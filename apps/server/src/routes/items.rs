//! Item history endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use srs_core::{ItemKey, ReviewHistory};

use crate::error::{ApiError, Result};
use crate::models::ItemResponse;
use crate::AppState;

/// GET /api/items/:key
pub async fn get_item(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<ItemResponse>> {
    let key = ItemKey::new(key);
    let engine = state.engine()?;

    let history = engine
        .history(&key)
        .cloned()
        .ok_or_else(|| ApiError::NotFound(format!("no review history for {key}")))?;

    Ok(Json(ItemResponse {
        item: engine.find_item(&key).cloned(),
        accuracy: history.accuracy(),
        history,
        key,
    }))
}

/// DELETE /api/items/:key
pub async fn reset_item(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<ReviewHistory>> {
    let key = ItemKey::new(key);
    let mut engine = state.engine()?;

    let removed = engine
        .reset_item(&key)
        .ok_or_else(|| ApiError::NotFound(format!("no review history for {key}")))?;
    tracing::info!(key = %key, "item history reset");

    Ok(Json(removed))
}
