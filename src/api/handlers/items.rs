//! Catalog endpoint handlers

use axum::{extract::State, Json};
use tracing::debug;

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::domain::Item;

/// GET /items
pub async fn list_items(State(state): State<AppState>) -> Result<Json<Vec<Item>>, ApiError> {
    let items = state.catalog_service.all_items().await?;

    debug!(count = items.len(), "Listing catalog items");

    Ok(Json(items))
}
