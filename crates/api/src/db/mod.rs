//! Database operations for the Orchard `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `category` - Product categories
//! - `product` - Catalog with stock, variants, and denormalized review stats
//! - `app_user` - Customers and admins (credentials live elsewhere)
//! - `cart_item` - Per-user cart entries, deduped by (product, size, color)
//! - `orders` / `order_item` - Placed orders and immutable line-item snapshots
//! - `promo_code` - Discount codes with validity windows and usage counters
//! - `review` - Product reviews, one per (product, user)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p orchard-cli -- migrate
//! ```
//!
//! # Conventions
//!
//! Repository structs borrow the pool for reads and standalone writes.
//! Multi-statement flows (order creation, review aggregates) run inside a
//! transaction and use the `&mut PgConnection` helpers so every statement
//! shares the same scope.

pub mod categories;
pub mod orders;
pub mod products;
pub mod promo_codes;
pub mod reports;
pub mod reviews;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use categories::CategoryRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use promo_codes::PromoCodeRepository;
pub use reports::ReportsRepository;
pub use reviews::ReviewRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate unique field).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Map a sqlx error, turning unique violations into `Conflict`.
pub(crate) fn map_unique_violation(err: sqlx::Error, message: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(message.to_owned());
    }
    RepositoryError::Database(err)
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
