//! Admin dashboard aggregation queries.

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use orchard_core::OrderStatus;

use super::RepositoryError;
use crate::models::{Order, Product};

/// One bucket of the fulfilment-status histogram.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StatusCount {
    pub order_status: OrderStatus,
    pub count: i64,
}

/// Paid revenue for one calendar month.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MonthlyRevenue {
    /// First day of the month, `YYYY-MM-DD`.
    pub month: chrono::NaiveDate,
    pub revenue: Decimal,
    pub orders: i64,
}

/// Everything the admin dashboard renders in one payload.
///
/// Revenue figures only count orders whose payment status is `paid`, so
/// abandoned card checkouts never inflate the numbers.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub total_orders: i64,
    pub total_products: i64,
    pub total_categories: i64,
    pub total_users: i64,
    pub total_revenue: Decimal,
    pub average_order_value: Decimal,
    pub orders_by_status: Vec<StatusCount>,
    pub monthly_revenue: Vec<MonthlyRevenue>,
    pub recent_orders: Vec<Order>,
    pub low_stock_products: Vec<Product>,
}

/// How few units counts as "low stock" on the dashboard.
const LOW_STOCK_THRESHOLD: i32 = 10;

/// Repository for admin reporting queries.
pub struct ReportsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReportsRepository<'a> {
    /// Create a new reports repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Assemble the admin dashboard report.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any query fails.
    pub async fn dashboard(&self) -> Result<DashboardReport, RepositoryError> {
        let total_orders: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(self.pool)
            .await?;

        let total_products: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM product WHERE is_active = TRUE")
                .fetch_one(self.pool)
                .await?;

        let total_categories: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM category")
            .fetch_one(self.pool)
            .await?;

        let total_users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM app_user")
            .fetch_one(self.pool)
            .await?;

        let (total_revenue, average_order_value): (Decimal, Decimal) = sqlx::query_as(
            "SELECT COALESCE(SUM(total_amount), 0), COALESCE(AVG(total_amount), 0)
             FROM orders WHERE payment_status = 'paid'",
        )
        .fetch_one(self.pool)
        .await?;

        let orders_by_status = sqlx::query_as::<_, StatusCount>(
            "SELECT order_status, COUNT(*) AS count
             FROM orders
             GROUP BY order_status
             ORDER BY order_status",
        )
        .fetch_all(self.pool)
        .await?;

        let monthly_revenue = sqlx::query_as::<_, MonthlyRevenue>(
            "SELECT date_trunc('month', created_at)::date AS month,
                    COALESCE(SUM(total_amount), 0) AS revenue,
                    COUNT(*) AS orders
             FROM orders
             WHERE payment_status = 'paid'
               AND created_at >= date_trunc('month', now()) - INTERVAL '5 months'
             GROUP BY month
             ORDER BY month",
        )
        .fetch_all(self.pool)
        .await?;

        let recent_orders = sqlx::query_as::<_, Order>(
            "SELECT id, user_id, recipient, line1, line2, city, state, postal_code, country,
                    phone, payment_method, payment_status, payment_intent_id, order_status,
                    subtotal, promo_code, promo_discount, shipping_cost, tax, total_amount,
                    created_at, updated_at
             FROM orders ORDER BY created_at DESC LIMIT 5",
        )
        .fetch_all(self.pool)
        .await?;

        let low_stock_products = sqlx::query_as::<_, Product>(
            "SELECT id, title, brand, description, price, discount_price, sizes, colors,
                    stock, category_id, images, rating, num_reviews, is_featured, is_active,
                    created_at, updated_at
             FROM product
             WHERE is_active = TRUE AND stock <= $1
             ORDER BY stock ASC, title ASC",
        )
        .bind(LOW_STOCK_THRESHOLD)
        .fetch_all(self.pool)
        .await?;

        Ok(DashboardReport {
            total_orders,
            total_products,
            total_categories,
            total_users,
            total_revenue,
            average_order_value,
            orders_by_status,
            monthly_revenue,
            recent_orders,
            low_stock_products,
        })
    }
}
