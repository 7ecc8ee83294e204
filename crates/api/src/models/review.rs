//! Product review model.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use orchard_core::{ProductId, ReviewId, UserId};

/// A customer review, one per (product, user).
///
/// Creating or deleting a review recomputes the product's denormalized
/// `rating` and `num_reviews` in the same transaction.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub user_id: UserId,
    /// 1 to 5 stars.
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}
