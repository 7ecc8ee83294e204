//! Product route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use tracing::instrument;

use orchard_core::ProductId;

use crate::db::ProductRepository;
use crate::db::products::ProductFilter;
use crate::error::{ApiError, Result};
use crate::models::Product;
use crate::state::AppState;

/// Query parameters for the product listing.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// Category slug to filter by.
    pub category: Option<String>,
    /// Restrict to featured products.
    pub featured: Option<bool>,
}

/// List active products, newest first.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Product>>> {
    let filter = ProductFilter {
        category_slug: params.category,
        featured: params.featured,
    };
    let products = ProductRepository::new(state.pool()).list(&filter).await?;
    Ok(Json(products))
}

/// Show a single product.
///
/// Inactive products still resolve so order-history links keep working.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    let product = ProductRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("product {id}")))?;
    Ok(Json(product))
}
