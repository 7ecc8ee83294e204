//! Review route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use orchard_core::{ProductId, ReviewId};

use crate::db::{ProductRepository, ReviewRepository};
use crate::error::{ApiError, Result};
use crate::middleware::{CurrentUser, Role};
use crate::models::Review;
use crate::state::AppState;

/// Request body for creating a review.
#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    /// 1 to 5 stars.
    pub rating: i32,
    pub comment: String,
}

/// List a product's reviews, newest first.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
) -> Result<Json<Vec<Review>>> {
    let reviews = ReviewRepository::new(state.pool())
        .list_for_product(product_id)
        .await?;
    Ok(Json(reviews))
}

/// Review a product. One review per user per product.
#[instrument(skip(state, user, body), fields(user_id = %user.user_id))]
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(product_id): Path<ProductId>,
    Json(body): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<Review>)> {
    if !(1..=5).contains(&body.rating) {
        return Err(ApiError::Validation(
            "rating must be between 1 and 5".to_string(),
        ));
    }
    if body.comment.trim().is_empty() {
        return Err(ApiError::Validation("comment must not be empty".to_string()));
    }

    // 404 before 409: a review for a missing product should never conflict
    ProductRepository::new(state.pool())
        .get(product_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("product {product_id}")))?;

    let review = ReviewRepository::new(state.pool())
        .create(product_id, user.user_id, body.rating, body.comment.trim())
        .await?;
    Ok((StatusCode::CREATED, Json(review)))
}

/// Delete a review. Customers can only delete their own; admins can delete any.
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn remove(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<ReviewId>,
) -> Result<StatusCode> {
    let repo = ReviewRepository::new(state.pool());
    let review = repo
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("review {id}")))?;

    if user.role != Role::Admin && review.user_id != user.user_id {
        return Err(ApiError::Forbidden(
            "cannot delete another user's review".to_string(),
        ));
    }

    repo.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
