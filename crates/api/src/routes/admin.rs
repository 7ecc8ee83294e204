//! Admin route handlers.
//!
//! Every handler takes the [`CurrentAdmin`] extractor, so a customer token
//! gets 403 before any work happens. Fulfilment status is the only order
//! field an admin can write; payment status belongs to the webhook alone.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use orchard_core::{CategoryId, DiscountType, OrderId, OrderStatus, ProductId, PromoCodeId};

use crate::db::reports::DashboardReport;
use crate::db::{
    CategoryRepository, OrderRepository, ProductRepository, PromoCodeRepository,
    ReportsRepository,
    categories::CategoryDraft,
    products::ProductDraft,
    promo_codes::PromoCodeDraft,
};
use crate::error::{ApiError, Result};
use crate::middleware::CurrentAdmin;
use crate::models::{Category, Order, Product, PromoCode};
use crate::routes::orders::OrderResponse;
use crate::services::orders::OrderService;
use crate::state::AppState;

// =============================================================================
// Products
// =============================================================================

/// Request body for creating or replacing a product.
#[derive(Debug, Deserialize)]
pub struct ProductRequest {
    pub title: String,
    pub brand: String,
    pub description: String,
    pub price: Decimal,
    pub discount_price: Option<Decimal>,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub stock: i32,
    pub category_id: CategoryId,
    pub images: Vec<String>,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

const fn default_true() -> bool {
    true
}

impl ProductRequest {
    fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(ApiError::Validation("title must not be empty".to_string()));
        }
        if self.price <= Decimal::ZERO {
            return Err(ApiError::Validation("price must be positive".to_string()));
        }
        if let Some(discount) = self.discount_price
            && discount >= self.price
        {
            return Err(ApiError::Validation(
                "discount_price must be below price".to_string(),
            ));
        }
        if self.stock < 0 {
            return Err(ApiError::Validation("stock must not be negative".to_string()));
        }
        Ok(())
    }

    fn into_draft(self) -> ProductDraft {
        ProductDraft {
            title: self.title,
            brand: self.brand,
            description: self.description,
            price: self.price,
            discount_price: self.discount_price,
            sizes: self.sizes,
            colors: self.colors,
            stock: self.stock,
            category_id: self.category_id,
            images: self.images,
            is_featured: self.is_featured,
            is_active: self.is_active,
        }
    }
}

/// Create a product.
#[instrument(skip(state, admin, body), fields(admin_id = %admin.user_id))]
pub async fn create_product(
    State(state): State<AppState>,
    admin: CurrentAdmin,
    Json(body): Json<ProductRequest>,
) -> Result<(StatusCode, Json<Product>)> {
    body.validate()?;

    let product = ProductRepository::new(state.pool())
        .create(&body.into_draft())
        .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Replace a product's editable fields.
#[instrument(skip(state, admin, body), fields(admin_id = %admin.user_id))]
pub async fn update_product(
    State(state): State<AppState>,
    admin: CurrentAdmin,
    Path(id): Path<ProductId>,
    Json(body): Json<ProductRequest>,
) -> Result<Json<Product>> {
    body.validate()?;

    let product = ProductRepository::new(state.pool())
        .update(id, &body.into_draft())
        .await?;
    Ok(Json(product))
}

/// Deactivate a product. Order history keeps its snapshots.
#[instrument(skip(state, admin), fields(admin_id = %admin.user_id))]
pub async fn deactivate_product(
    State(state): State<AppState>,
    admin: CurrentAdmin,
    Path(id): Path<ProductId>,
) -> Result<StatusCode> {
    let existed = ProductRepository::new(state.pool()).deactivate(id).await?;
    if !existed {
        return Err(ApiError::NotFound(format!("product {id}")));
    }
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Categories
// =============================================================================

/// Request body for creating or replacing a category.
#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
}

impl CategoryRequest {
    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ApiError::Validation("name must not be empty".to_string()));
        }
        let slug_ok = !self.slug.is_empty()
            && self
                .slug
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        if !slug_ok {
            return Err(ApiError::Validation(
                "slug must be lowercase letters, digits, and hyphens".to_string(),
            ));
        }
        Ok(())
    }

    fn into_draft(self) -> CategoryDraft {
        CategoryDraft {
            name: self.name,
            slug: self.slug,
            description: self.description,
        }
    }
}

/// Create a category.
#[instrument(skip(state, admin, body), fields(admin_id = %admin.user_id))]
pub async fn create_category(
    State(state): State<AppState>,
    admin: CurrentAdmin,
    Json(body): Json<CategoryRequest>,
) -> Result<(StatusCode, Json<Category>)> {
    body.validate()?;

    let category = CategoryRepository::new(state.pool())
        .create(&body.into_draft())
        .await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// Replace a category.
#[instrument(skip(state, admin, body), fields(admin_id = %admin.user_id))]
pub async fn update_category(
    State(state): State<AppState>,
    admin: CurrentAdmin,
    Path(id): Path<CategoryId>,
    Json(body): Json<CategoryRequest>,
) -> Result<Json<Category>> {
    body.validate()?;

    let category = CategoryRepository::new(state.pool())
        .update(id, &body.into_draft())
        .await?;
    Ok(Json(category))
}

/// Delete a category. Fails with 409 while products still reference it.
#[instrument(skip(state, admin), fields(admin_id = %admin.user_id))]
pub async fn delete_category(
    State(state): State<AppState>,
    admin: CurrentAdmin,
    Path(id): Path<CategoryId>,
) -> Result<StatusCode> {
    let existed = CategoryRepository::new(state.pool()).delete(id).await?;
    if !existed {
        return Err(ApiError::NotFound(format!("category {id}")));
    }
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Promo codes
// =============================================================================

/// Request body for creating or replacing a promo code.
#[derive(Debug, Deserialize)]
pub struct PromoCodeRequest {
    pub code: String,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    #[serde(default)]
    pub min_purchase_amount: Decimal,
    pub max_discount_amount: Option<Decimal>,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub usage_limit: Option<i32>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl PromoCodeRequest {
    fn validate(&self) -> Result<()> {
        if self.code.trim().is_empty() {
            return Err(ApiError::Validation("code must not be empty".to_string()));
        }
        if self.discount_value <= Decimal::ZERO {
            return Err(ApiError::Validation(
                "discount_value must be positive".to_string(),
            ));
        }
        if self.discount_type == DiscountType::Percentage
            && self.discount_value > Decimal::from(100)
        {
            return Err(ApiError::Validation(
                "percentage discount cannot exceed 100".to_string(),
            ));
        }
        if self.valid_until <= self.valid_from {
            return Err(ApiError::Validation(
                "valid_until must be after valid_from".to_string(),
            ));
        }
        if let Some(limit) = self.usage_limit
            && limit < 1
        {
            return Err(ApiError::Validation(
                "usage_limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    fn into_draft(self) -> PromoCodeDraft {
        PromoCodeDraft {
            code: self.code,
            discount_type: self.discount_type,
            discount_value: self.discount_value,
            min_purchase_amount: self.min_purchase_amount,
            max_discount_amount: self.max_discount_amount,
            valid_from: self.valid_from,
            valid_until: self.valid_until,
            usage_limit: self.usage_limit,
            is_active: self.is_active,
        }
    }
}

/// List promo codes, newest first.
#[instrument(skip(state, admin), fields(admin_id = %admin.user_id))]
pub async fn list_promos(
    State(state): State<AppState>,
    admin: CurrentAdmin,
) -> Result<Json<Vec<PromoCode>>> {
    let promos = PromoCodeRepository::new(state.pool()).list().await?;
    Ok(Json(promos))
}

/// Create a promo code.
#[instrument(skip(state, admin, body), fields(admin_id = %admin.user_id))]
pub async fn create_promo(
    State(state): State<AppState>,
    admin: CurrentAdmin,
    Json(body): Json<PromoCodeRequest>,
) -> Result<(StatusCode, Json<PromoCode>)> {
    body.validate()?;

    let promo = PromoCodeRepository::new(state.pool())
        .create(&body.into_draft())
        .await?;
    Ok((StatusCode::CREATED, Json(promo)))
}

/// Replace a promo code's terms. `used_count` is never editable.
#[instrument(skip(state, admin, body), fields(admin_id = %admin.user_id))]
pub async fn update_promo(
    State(state): State<AppState>,
    admin: CurrentAdmin,
    Path(id): Path<PromoCodeId>,
    Json(body): Json<PromoCodeRequest>,
) -> Result<Json<PromoCode>> {
    body.validate()?;

    let promo = PromoCodeRepository::new(state.pool())
        .update(id, &body.into_draft())
        .await?;
    Ok(Json(promo))
}

/// Delete a promo code. Orders that used it keep their recorded discount.
#[instrument(skip(state, admin), fields(admin_id = %admin.user_id))]
pub async fn delete_promo(
    State(state): State<AppState>,
    admin: CurrentAdmin,
    Path(id): Path<PromoCodeId>,
) -> Result<StatusCode> {
    let existed = PromoCodeRepository::new(state.pool()).delete(id).await?;
    if !existed {
        return Err(ApiError::NotFound(format!("promo code {id}")));
    }
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Orders
// =============================================================================

/// Query parameters for the admin order listing.
#[derive(Debug, Deserialize)]
pub struct OrderListParams {
    pub status: Option<OrderStatus>,
}

/// Request body for changing an order's fulfilment status.
///
/// `deny_unknown_fields` makes a request that tries to smuggle in a
/// `payment_status` fail loudly instead of being silently ignored.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderStatusRequest {
    pub order_status: OrderStatus,
}

/// List all orders, optionally filtered by fulfilment status.
#[instrument(skip(state, admin), fields(admin_id = %admin.user_id))]
pub async fn list_orders(
    State(state): State<AppState>,
    admin: CurrentAdmin,
    Query(params): Query<OrderListParams>,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderRepository::new(state.pool())
        .list_all(params.status)
        .await?;
    Ok(Json(orders))
}

/// Show any order with its line items.
#[instrument(skip(state, admin), fields(admin_id = %admin.user_id))]
pub async fn show_order(
    State(state): State<AppState>,
    admin: CurrentAdmin,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderResponse>> {
    let repo = OrderRepository::new(state.pool());
    let order = repo
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("order {id}")))?;
    let items = repo.items(id).await?;
    Ok(Json(OrderResponse { order, items }))
}

/// Advance an order's fulfilment status.
///
/// Transitions must move forward (`OrderStatus::can_transition_to`); a
/// delivered order cannot be flipped back to pending. Cancellation goes
/// through the order service so the line items are restocked, same as a
/// customer cancellation.
#[instrument(skip(state, admin), fields(admin_id = %admin.user_id))]
pub async fn update_order_status(
    State(state): State<AppState>,
    admin: CurrentAdmin,
    Path(id): Path<OrderId>,
    Json(body): Json<OrderStatusRequest>,
) -> Result<Json<Order>> {
    if body.order_status == OrderStatus::Cancelled {
        let order = OrderService::new(state.pool(), state.pricing())
            .cancel_order(None, id)
            .await?;
        return Ok(Json(order));
    }

    let repo = OrderRepository::new(state.pool());
    let order = repo
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("order {id}")))?;
    if !order.order_status.can_transition_to(body.order_status) {
        return Err(ApiError::Conflict(format!(
            "order {id} cannot move from {} to {}",
            order.order_status, body.order_status
        )));
    }

    let order = repo.update_status(id, body.order_status).await?;
    Ok(Json(order))
}

// =============================================================================
// Reports
// =============================================================================

/// Aggregated storefront dashboard.
#[instrument(skip(state, admin), fields(admin_id = %admin.user_id))]
pub async fn dashboard(
    State(state): State<AppState>,
    admin: CurrentAdmin,
) -> Result<Json<DashboardReport>> {
    let report = ReportsRepository::new(state.pool()).dashboard().await?;
    Ok(Json(report))
}
