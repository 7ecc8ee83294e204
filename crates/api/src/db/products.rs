//! Product repository.

use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use orchard_core::{CategoryId, ProductId};

use super::RepositoryError;
use crate::models::Product;

const COLUMNS: &str = "id, title, brand, description, price, discount_price, sizes, colors, \
                       stock, category_id, images, rating, num_reviews, is_featured, is_active, \
                       created_at, updated_at";

/// Input for creating or updating a product.
#[derive(Debug, Clone)]
pub struct ProductDraft {
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
    pub is_featured: bool,
    pub is_active: bool,
}

/// Catalog listing filters.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Restrict to a category by slug.
    pub category_slug: Option<String>,
    /// Restrict to featured (or non-featured) products.
    pub featured: Option<bool>,
}

/// Turn the category foreign-key violation into a `Conflict`.
fn map_category_violation(err: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_foreign_key_violation()
    {
        return RepositoryError::Conflict("category does not exist".to_owned());
    }
    RepositoryError::Database(err)
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List active products, newest first, with optional filters.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, Product>(
            "SELECT p.id, p.title, p.brand, p.description, p.price, p.discount_price,
                    p.sizes, p.colors, p.stock, p.category_id, p.images, p.rating,
                    p.num_reviews, p.is_featured, p.is_active, p.created_at, p.updated_at
             FROM product p
             LEFT JOIN category c ON c.id = p.category_id
             WHERE p.is_active = TRUE
               AND ($1::text IS NULL OR c.slug = $1)
               AND ($2::bool IS NULL OR p.is_featured = $2)
             ORDER BY p.created_at DESC",
        )
        .bind(&filter.category_slug)
        .bind(filter.featured)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Get a product by ID, active or not.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, Product>(&format!(
            "SELECT {COLUMNS} FROM product WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// Create a new product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if `category_id` references no
    /// category.
    pub async fn create(&self, draft: &ProductDraft) -> Result<Product, RepositoryError> {
        sqlx::query_as::<_, Product>(&format!(
            "INSERT INTO product (title, brand, description, price, discount_price, sizes,
                                  colors, stock, category_id, images, is_featured, is_active)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             RETURNING {COLUMNS}"
        ))
        .bind(&draft.title)
        .bind(&draft.brand)
        .bind(&draft.description)
        .bind(draft.price)
        .bind(draft.discount_price)
        .bind(&draft.sizes)
        .bind(&draft.colors)
        .bind(draft.stock)
        .bind(draft.category_id)
        .bind(&draft.images)
        .bind(draft.is_featured)
        .bind(draft.is_active)
        .fetch_one(self.pool)
        .await
        .map_err(map_category_violation)
    }

    /// Replace a product's editable fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn update(
        &self,
        id: ProductId,
        draft: &ProductDraft,
    ) -> Result<Product, RepositoryError> {
        sqlx::query_as::<_, Product>(&format!(
            "UPDATE product
             SET title = $2, brand = $3, description = $4, price = $5, discount_price = $6,
                 sizes = $7, colors = $8, stock = $9, category_id = $10, images = $11,
                 is_featured = $12, is_active = $13, updated_at = now()
             WHERE id = $1
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(&draft.title)
        .bind(&draft.brand)
        .bind(&draft.description)
        .bind(draft.price)
        .bind(draft.discount_price)
        .bind(&draft.sizes)
        .bind(&draft.colors)
        .bind(draft.stock)
        .bind(draft.category_id)
        .bind(&draft.images)
        .bind(draft.is_featured)
        .bind(draft.is_active)
        .fetch_optional(self.pool)
        .await
        .map_err(map_category_violation)?
        .ok_or(RepositoryError::NotFound)
    }

    /// Soft-delete a product by deactivating it.
    ///
    /// # Returns
    ///
    /// Returns `true` if the product existed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn deactivate(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result =
            sqlx::query("UPDATE product SET is_active = FALSE, updated_at = now() WHERE id = $1")
                .bind(id)
                .execute(self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}

// =============================================================================
// Transaction-scoped helpers (order creation)
// =============================================================================

/// Load an active product inside an order-creation transaction.
///
/// Returns `None` for missing *and* inactive products; the order flow treats
/// both as `NotFound`.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn load_active(
    conn: &mut PgConnection,
    id: ProductId,
) -> Result<Option<Product>, RepositoryError> {
    let row = sqlx::query_as::<_, Product>(&format!(
        "SELECT {COLUMNS} FROM product WHERE id = $1 AND is_active = TRUE"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(row)
}

/// Atomically decrement stock if enough remains.
///
/// The `stock >= $2` guard makes the check-then-decrement a single statement,
/// so two concurrent orders cannot both take the last unit.
///
/// # Returns
///
/// Returns `true` if the decrement applied, `false` if stock was insufficient.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the update fails.
pub async fn decrement_stock(
    conn: &mut PgConnection,
    id: ProductId,
    quantity: i32,
) -> Result<bool, RepositoryError> {
    let result = sqlx::query(
        "UPDATE product
         SET stock = stock - $2, updated_at = now()
         WHERE id = $1 AND stock >= $2",
    )
    .bind(id)
    .bind(quantity)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}
