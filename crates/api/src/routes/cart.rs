//! Cart route handlers.
//!
//! The cart is a convenience for the frontend; order creation takes its items
//! from the request body, not from here. Entries with the same product, size,
//! and color merge into one row.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use orchard_core::{CartItemId, ProductId};

use crate::db::UserRepository;
use crate::error::{ApiError, Result};
use crate::middleware::CurrentUser;
use crate::models::CartItem;
use crate::state::AppState;

/// Request body for adding a cart item.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: ProductId,
    pub quantity: i32,
    pub size: String,
    pub color: String,
}

/// Request body for changing a cart item's quantity.
#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: i32,
}

/// List the caller's cart.
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn index(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<CartItem>>> {
    let items = UserRepository::new(state.pool()).cart(user.user_id).await?;
    Ok(Json(items))
}

/// Add an item to the caller's cart.
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn add(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<AddItemRequest>,
) -> Result<(StatusCode, Json<CartItem>)> {
    if body.quantity < 1 {
        return Err(ApiError::Validation("quantity must be at least 1".to_string()));
    }

    let item = UserRepository::new(state.pool())
        .add_to_cart(
            user.user_id,
            body.product_id,
            body.quantity,
            &body.size,
            &body.color,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Set a cart item's quantity.
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<CartItemId>,
    Json(body): Json<UpdateItemRequest>,
) -> Result<Json<CartItem>> {
    if body.quantity < 1 {
        return Err(ApiError::Validation("quantity must be at least 1".to_string()));
    }

    let item = UserRepository::new(state.pool())
        .set_cart_quantity(user.user_id, id, body.quantity)
        .await?;
    Ok(Json(item))
}

/// Remove a cart item.
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn remove(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<CartItemId>,
) -> Result<StatusCode> {
    let removed = UserRepository::new(state.pool())
        .remove_from_cart(user.user_id, id)
        .await?;
    if !removed {
        return Err(ApiError::NotFound(format!("cart item {id}")));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Empty the caller's cart.
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn clear(State(state): State<AppState>, user: CurrentUser) -> Result<StatusCode> {
    UserRepository::new(state.pool())
        .clear_cart(user.user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
