//! Order repository.

use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use orchard_core::{OrderId, OrderStatus, PaymentMethod, PaymentStatus, ProductId, UserId};

use super::RepositoryError;
use crate::models::{Order, OrderItem, ShippingAddress};

const COLUMNS: &str = "id, user_id, recipient, line1, line2, city, state, postal_code, country, \
                       phone, payment_method, payment_status, payment_intent_id, order_status, \
                       subtotal, promo_code, promo_discount, shipping_cost, tax, total_amount, \
                       created_at, updated_at";

const ITEM_COLUMNS: &str =
    "id, order_id, product_id, title, image, size, color, quantity, unit_price";

/// Header fields for a new order; written once inside the creation transaction.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub user_id: UserId,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub subtotal: Decimal,
    pub promo_code: Option<String>,
    pub promo_discount: Decimal,
    pub shipping_cost: Decimal,
    pub tax: Decimal,
    pub total_amount: Decimal,
}

/// A line item pending insertion, snapshotted from the product row.
#[derive(Debug, Clone)]
pub struct OrderItemDraft {
    pub product_id: ProductId,
    pub title: String,
    pub image: String,
    pub size: String,
    pub color: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, Order>(&format!(
            "SELECT {COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// Fetch the line items of an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items(&self, id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM order_item WHERE order_id = $1 ORDER BY id ASC"
        ))
        .bind(id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// List a user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, Order>(&format!(
            "SELECT {COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// List all orders, newest first, optionally filtered by fulfilment status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(
        &self,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, Order>(&format!(
            "SELECT {COLUMNS} FROM orders
             WHERE ($1::order_status IS NULL OR order_status = $1)
             ORDER BY created_at DESC"
        ))
        .bind(status)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Set an order's fulfilment status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        sqlx::query_as::<_, Order>(&format!(
            "UPDATE orders
             SET order_status = $2, updated_at = now()
             WHERE id = $1
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Attach a gateway payment intent to an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn set_payment_intent(
        &self,
        id: OrderId,
        intent_id: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE orders SET payment_intent_id = $2, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(intent_id)
        .execute(self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Mark the order carrying a payment intent as paid and move it into
    /// fulfilment.
    ///
    /// Matches `pending` and `failed` orders: gateways retry a declined
    /// intent, so a success event arriving after a failed one must still
    /// settle the order. Idempotent - an order already marked `paid` is left
    /// untouched, and the call reports whether any row changed so webhook
    /// redelivery is harmless.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn mark_paid_by_intent(&self, intent_id: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE orders
             SET payment_status = 'paid', order_status = 'processing', updated_at = now()
             WHERE payment_intent_id = $1 AND payment_status IN ('pending', 'failed')",
        )
        .bind(intent_id)
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark the order carrying a payment intent as failed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn mark_failed_by_intent(&self, intent_id: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE orders
             SET payment_status = 'failed', updated_at = now()
             WHERE payment_intent_id = $1 AND payment_status = 'pending'",
        )
        .bind(intent_id)
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

// =============================================================================
// Transaction-scoped helpers
// =============================================================================

/// Insert the order header inside the creation transaction.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn insert_order(
    conn: &mut PgConnection,
    draft: &OrderDraft,
    payment_status: PaymentStatus,
) -> Result<Order, RepositoryError> {
    let addr = &draft.shipping_address;
    let row = sqlx::query_as::<_, Order>(&format!(
        "INSERT INTO orders (user_id, recipient, line1, line2, city, state, postal_code,
                             country, phone, payment_method, payment_status, subtotal,
                             promo_code, promo_discount, shipping_cost, tax, total_amount)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
         RETURNING {COLUMNS}"
    ))
    .bind(draft.user_id)
    .bind(&addr.recipient)
    .bind(&addr.line1)
    .bind(&addr.line2)
    .bind(&addr.city)
    .bind(&addr.state)
    .bind(&addr.postal_code)
    .bind(&addr.country)
    .bind(&addr.phone)
    .bind(draft.payment_method)
    .bind(payment_status)
    .bind(draft.subtotal)
    .bind(&draft.promo_code)
    .bind(draft.promo_discount)
    .bind(draft.shipping_cost)
    .bind(draft.tax)
    .bind(draft.total_amount)
    .fetch_one(conn)
    .await?;
    Ok(row)
}

/// Insert one line-item snapshot inside the creation transaction.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn insert_item(
    conn: &mut PgConnection,
    order_id: OrderId,
    item: &OrderItemDraft,
) -> Result<OrderItem, RepositoryError> {
    let row = sqlx::query_as::<_, OrderItem>(&format!(
        "INSERT INTO order_item (order_id, product_id, title, image, size, color, quantity,
                                 unit_price)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         RETURNING {ITEM_COLUMNS}"
    ))
    .bind(order_id)
    .bind(item.product_id)
    .bind(&item.title)
    .bind(&item.image)
    .bind(&item.size)
    .bind(&item.color)
    .bind(item.quantity)
    .bind(item.unit_price)
    .fetch_one(conn)
    .await?;
    Ok(row)
}

/// Lock an order row for the cancellation flow.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn lock_order(
    conn: &mut PgConnection,
    id: OrderId,
) -> Result<Option<Order>, RepositoryError> {
    let row = sqlx::query_as::<_, Order>(&format!(
        "SELECT {COLUMNS} FROM orders WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(row)
}

/// Set an order's fulfilment status inside a transaction.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the order doesn't exist.
pub async fn set_status(
    conn: &mut PgConnection,
    id: OrderId,
    status: OrderStatus,
) -> Result<Order, RepositoryError> {
    sqlx::query_as::<_, Order>(&format!(
        "UPDATE orders
         SET order_status = $2, updated_at = now()
         WHERE id = $1
         RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(status)
    .fetch_optional(conn)
    .await?
    .ok_or(RepositoryError::NotFound)
}

/// Return each line item's quantity to product stock, for cancellations.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the update fails.
pub async fn restock_items(conn: &mut PgConnection, id: OrderId) -> Result<(), RepositoryError> {
    sqlx::query(
        "UPDATE product p
         SET stock = p.stock + oi.quantity, updated_at = now()
         FROM order_item oi
         WHERE oi.order_id = $1 AND oi.product_id = p.id",
    )
    .bind(id)
    .execute(conn)
    .await?;
    Ok(())
}
