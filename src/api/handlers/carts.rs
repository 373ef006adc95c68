//! Cart endpoint handlers

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::debug;

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::domain::{CartId, ResolvedCartEntry, UserId};

/// GET /carts/{cart_id}
pub async fn get_cart(
    State(state): State<AppState>,
    Path(cart_id): Path<String>,
) -> Result<Json<Vec<ResolvedCartEntry>>, ApiError> {
    let cart_id = CartId::new(parse_id(&cart_id, "cart_id")?);
    debug!(cart_id = %cart_id, "Resolving cart");

    let entries = state.cart_service.resolve_cart(cart_id).await?;

    Ok(Json(entries))
}

/// GET /users/{user_id}/cart
pub async fn get_user_cart(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<ResolvedCartEntry>>, ApiError> {
    let user_id = UserId::new(parse_id(&user_id, "user_id")?);
    debug!(user_id = %user_id, "Resolving open cart of user");

    let entries = state.cart_service.resolve_open_cart(user_id).await?;

    Ok(Json(entries))
}

fn parse_id(raw: &str, param: &str) -> Result<i64, ApiError> {
    raw.trim().parse::<i64>().map_err(|_| {
        ApiError::bad_request(format!("Invalid {}: '{}' is not an integer", param, raw))
            .with_param(param)
    })
}
