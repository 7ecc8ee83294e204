//! Order assembly and cancellation.
//!
//! All order pricing happens here, server-side, from the product rows and the
//! promo code terms. Client-submitted prices are never trusted; the request
//! only carries product ids, quantities, and variant selections.
//!
//! Order creation runs as one transaction: stock decrements, the promo usage
//! counter, the order header, the line-item snapshots, and the cart clear
//! either all commit or all roll back.

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;
use tracing::instrument;

use orchard_core::{
    OrderId, OrderStatus, OrderTotals, PaymentMethod, PaymentStatus, PricingConfig, ProductId,
    UserId, round_money,
};

use crate::db::{self, RepositoryError};
use crate::db::orders::{OrderDraft, OrderItemDraft};
use crate::models::{Order, OrderItem, ShippingAddress};

/// Errors that can occur while assembling or cancelling an order.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The order had no line items.
    #[error("order must contain at least one item")]
    EmptyOrder,

    /// A required shipping address field was blank.
    #[error("shipping address is missing {0}")]
    IncompleteAddress(&'static str),

    /// A line item asked for a non-positive quantity.
    #[error("quantity must be at least 1, got {0}")]
    InvalidQuantity(i32),

    /// A line item referenced a product that doesn't exist or is inactive.
    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    /// The order being cancelled doesn't exist (or isn't the caller's).
    #[error("order not found")]
    OrderNotFound,

    /// A line item asked for more stock than the product has.
    #[error("insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        requested: i32,
        available: i32,
    },

    /// A line item selected a size or color the product doesn't offer.
    #[error("product {product_id} is not offered in {kind} \"{value}\"")]
    InvalidVariant {
        product_id: ProductId,
        kind: &'static str,
        value: String,
    },

    /// The promo code was unknown, inactive, or its terms weren't met.
    #[error("promo code rejected: {0}")]
    InvalidPromo(String),

    /// The order has progressed past the point of cancellation.
    #[error("order in status {0} can no longer be cancelled")]
    NotCancellable(OrderStatus),

    /// Database operation failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// One requested line item. Prices are looked up, never taken from here.
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub quantity: i32,
    pub size: String,
    pub color: String,
}

/// Input for creating an order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub items: Vec<NewOrderItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub promo_code: Option<String>,
}

/// Order assembly service.
pub struct OrderService<'a> {
    pool: &'a PgPool,
    pricing: &'a PricingConfig,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, pricing: &'a PricingConfig) -> Self {
        Self { pool, pricing }
    }

    /// Assemble and persist an order.
    ///
    /// # Errors
    ///
    /// Returns an `OrderError` if validation fails, stock is insufficient,
    /// the promo code is rejected, or a database statement fails.
    #[instrument(skip(self, input), fields(user_id = %user_id, items = input.items.len()))]
    pub async fn create_order(
        &self,
        user_id: UserId,
        input: NewOrder,
    ) -> Result<(Order, Vec<OrderItem>), OrderError> {
        if input.items.is_empty() {
            return Err(OrderError::EmptyOrder);
        }
        input
            .shipping_address
            .validate()
            .map_err(OrderError::IncompleteAddress)?;
        for item in &input.items {
            if item.quantity < 1 {
                return Err(OrderError::InvalidQuantity(item.quantity));
            }
        }

        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        let mut subtotal = Decimal::ZERO;
        let mut snapshots = Vec::with_capacity(input.items.len());

        for item in &input.items {
            let product = db::products::load_active(&mut *tx, item.product_id)
                .await?
                .ok_or(OrderError::ProductNotFound(item.product_id))?;

            if !product.has_size(&item.size) {
                return Err(OrderError::InvalidVariant {
                    product_id: product.id,
                    kind: "size",
                    value: item.size.clone(),
                });
            }
            if !product.has_color(&item.color) {
                return Err(OrderError::InvalidVariant {
                    product_id: product.id,
                    kind: "color",
                    value: item.color.clone(),
                });
            }

            // Single-statement check-and-decrement; concurrent orders cannot
            // both take the last unit.
            let decremented =
                db::products::decrement_stock(&mut *tx, product.id, item.quantity).await?;
            if !decremented {
                return Err(OrderError::InsufficientStock {
                    product_id: product.id,
                    requested: item.quantity,
                    available: product.stock,
                });
            }

            let unit_price = product.unit_price();
            subtotal += unit_price * Decimal::from(item.quantity);
            snapshots.push(OrderItemDraft {
                product_id: product.id,
                title: product.title.clone(),
                image: product.primary_image().to_string(),
                size: item.size.clone(),
                color: item.color.clone(),
                quantity: item.quantity,
                unit_price,
            });
        }

        let subtotal = round_money(subtotal);

        let mut applied_code = None;
        let mut discount = Decimal::ZERO;
        if let Some(raw_code) = input
            .promo_code
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
        {
            let now = Utc::now();
            let promo = db::promo_codes::lock_by_code(&mut *tx, raw_code)
                .await?
                .ok_or_else(|| OrderError::InvalidPromo("unknown promo code".to_string()))?;

            let terms = promo.terms();
            if !terms.is_redeemable(now) {
                return Err(OrderError::InvalidPromo(
                    "promo code is inactive, expired, or exhausted".to_string(),
                ));
            }
            if subtotal < terms.min_purchase_amount {
                return Err(OrderError::InvalidPromo(format!(
                    "order subtotal is below the {} minimum",
                    terms.min_purchase_amount
                )));
            }

            discount = terms.discount_for(subtotal, now);
            db::promo_codes::increment_usage(&mut *tx, promo.id).await?;
            applied_code = Some(promo.code);
        }

        let totals = OrderTotals::compute(subtotal, discount, self.pricing);

        let draft = OrderDraft {
            user_id,
            shipping_address: input.shipping_address,
            payment_method: input.payment_method,
            subtotal: totals.subtotal,
            promo_code: applied_code,
            promo_discount: totals.discount,
            shipping_cost: totals.shipping_cost,
            tax: totals.tax,
            total_amount: totals.total,
        };

        let order = db::orders::insert_order(&mut *tx, &draft, PaymentStatus::Pending).await?;

        let mut items = Vec::with_capacity(snapshots.len());
        for snapshot in &snapshots {
            items.push(db::orders::insert_item(&mut *tx, order.id, snapshot).await?);
        }

        db::users::clear_cart(&mut *tx, user_id).await?;

        tx.commit().await.map_err(RepositoryError::from)?;

        tracing::info!(
            order_id = %order.id,
            total = %order.total_amount,
            "Order created"
        );

        Ok((order, items))
    }

    /// Cancel an order and return its stock.
    ///
    /// Pass `owner` to enforce that a customer only cancels their own orders;
    /// admins pass `None`. An order another customer owns reads as not found
    /// rather than forbidden.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotCancellable` once the order has shipped.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn cancel_order(
        &self,
        owner: Option<UserId>,
        order_id: OrderId,
    ) -> Result<Order, OrderError> {
        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        let order = db::orders::lock_order(&mut *tx, order_id)
            .await?
            .ok_or(OrderError::OrderNotFound)?;

        if let Some(user_id) = owner
            && order.user_id != user_id
        {
            return Err(OrderError::OrderNotFound);
        }

        if !order.order_status.cancellable_by_customer() {
            return Err(OrderError::NotCancellable(order.order_status));
        }

        db::orders::restock_items(&mut *tx, order_id).await?;
        let order = db::orders::set_status(&mut *tx, order_id, OrderStatus::Cancelled).await?;

        tx.commit().await.map_err(RepositoryError::from)?;

        tracing::info!(order_id = %order_id, "Order cancelled");
        Ok(order)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    // Request validation runs before the transaction opens, so a pool that
    // never connects proves these rejections happen without touching the
    // database.
    fn lazy_pool() -> PgPool {
        PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unreachable")
            .unwrap()
    }

    fn address() -> ShippingAddress {
        ShippingAddress {
            recipient: "Avery Quinn".to_string(),
            line1: "12 Orchard Way".to_string(),
            line2: None,
            city: "Portland".to_string(),
            state: "OR".to_string(),
            postal_code: "97201".to_string(),
            country: "US".to_string(),
            phone: "+1 555 0100".to_string(),
        }
    }

    fn order_of(items: Vec<NewOrderItem>) -> NewOrder {
        NewOrder {
            items,
            shipping_address: address(),
            payment_method: PaymentMethod::GatewayCard,
            promo_code: None,
        }
    }

    #[tokio::test]
    async fn order_with_no_items_is_rejected() {
        let pool = lazy_pool();
        let pricing = PricingConfig::default();
        let err = OrderService::new(&pool, &pricing)
            .create_order(UserId::new(1), order_of(vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::EmptyOrder));
    }

    #[tokio::test]
    async fn non_positive_quantity_is_rejected() {
        let pool = lazy_pool();
        let pricing = PricingConfig::default();
        let items = vec![NewOrderItem {
            product_id: ProductId::new(1),
            quantity: 0,
            size: "M".to_string(),
            color: "Black".to_string(),
        }];
        let err = OrderService::new(&pool, &pricing)
            .create_order(UserId::new(1), order_of(items))
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::InvalidQuantity(0)));
    }

    #[tokio::test]
    async fn blank_address_field_is_rejected() {
        let pool = lazy_pool();
        let pricing = PricingConfig::default();
        let items = vec![NewOrderItem {
            product_id: ProductId::new(1),
            quantity: 1,
            size: "M".to_string(),
            color: "Black".to_string(),
        }];
        let mut input = order_of(items);
        input.shipping_address.city = "  ".to_string();
        let err = OrderService::new(&pool, &pricing)
            .create_order(UserId::new(1), input)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::IncompleteAddress("city")));
    }

    #[test]
    fn order_error_messages_name_the_product() {
        let err = OrderError::InsufficientStock {
            product_id: ProductId::new(7),
            requested: 3,
            available: 1,
        };
        assert_eq!(
            err.to_string(),
            "insufficient stock for product 7: requested 3, available 1"
        );

        let err = OrderError::InvalidVariant {
            product_id: ProductId::new(7),
            kind: "size",
            value: "XXL".to_string(),
        };
        assert_eq!(err.to_string(), "product 7 is not offered in size \"XXL\"");
    }
}
