//! Review repository.

use sqlx::{PgConnection, PgPool};

use orchard_core::{ProductId, ReviewId, UserId};

use super::{RepositoryError, map_unique_violation};
use crate::models::Review;

const COLUMNS: &str = "id, product_id, user_id, rating, comment, created_at";

/// Repository for review database operations.
pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List a product's reviews, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<Review>, RepositoryError> {
        let rows = sqlx::query_as::<_, Review>(&format!(
            "SELECT {COLUMNS} FROM review WHERE product_id = $1 ORDER BY created_at DESC"
        ))
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Get a review by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ReviewId) -> Result<Option<Review>, RepositoryError> {
        let row = sqlx::query_as::<_, Review>(&format!(
            "SELECT {COLUMNS} FROM review WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// Create a review and refresh the product's rating aggregates.
    ///
    /// Both writes run in one transaction so the denormalized `rating` and
    /// `num_reviews` on the product always match the review rows.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user already reviewed this
    /// product.
    pub async fn create(
        &self,
        product_id: ProductId,
        user_id: UserId,
        rating: i32,
        comment: &str,
    ) -> Result<Review, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let review = sqlx::query_as::<_, Review>(&format!(
            "INSERT INTO review (product_id, user_id, rating, comment)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        ))
        .bind(product_id)
        .bind(user_id)
        .bind(rating)
        .bind(comment)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, "product already reviewed by this user"))?;

        refresh_aggregates(&mut *tx, product_id).await?;
        tx.commit().await?;
        Ok(review)
    }

    /// Delete a review and refresh the product's rating aggregates.
    ///
    /// # Returns
    ///
    /// Returns `true` if the review existed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a statement fails.
    pub async fn delete(&self, id: ReviewId) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query_as::<_, Review>(&format!(
            "DELETE FROM review WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(review) = deleted else {
            return Ok(false);
        };

        refresh_aggregates(&mut *tx, review.product_id).await?;
        tx.commit().await?;
        Ok(true)
    }
}

/// Recompute a product's denormalized `rating` and `num_reviews`.
async fn refresh_aggregates(
    conn: &mut PgConnection,
    product_id: ProductId,
) -> Result<(), RepositoryError> {
    sqlx::query(
        "UPDATE product
         SET rating = COALESCE((SELECT ROUND(AVG(rating)::numeric, 2)
                                FROM review WHERE product_id = $1), 0),
             num_reviews = (SELECT COUNT(*) FROM review WHERE product_id = $1),
             updated_at = now()
         WHERE id = $1",
    )
    .bind(product_id)
    .execute(conn)
    .await?;
    Ok(())
}
