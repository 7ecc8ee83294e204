//! User and cart models.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use orchard_core::{CartItemId, ProductId, UserId};

/// A registered customer or admin.
///
/// Authentication is external: the API only consumes signed bearer tokens,
/// so no credentials are stored here.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AppUser {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

/// One entry in a user's cart.
///
/// Deduplicated by the (product, size, color) triple: adding the same triple
/// again increments `quantity` instead of inserting a new row. The cart is
/// cleared in the same transaction that creates an order from it.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CartItem {
    pub id: CartItemId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: i32,
    pub size: String,
    pub color: String,
}
