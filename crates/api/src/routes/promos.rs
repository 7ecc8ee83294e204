//! Promo preview route handler.

use axum::{Json, extract::State};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use orchard_core::round_money;

use crate::db::PromoCodeRepository;
use crate::error::{ApiError, Result};
use crate::state::AppState;

/// Request body for quoting a promo discount.
#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    pub code: String,
    /// Cart subtotal the discount would apply to.
    pub subtotal: Decimal,
}

/// A quoted discount. Not a reservation; the code is re-checked (and its
/// usage counter only moves) at order creation.
#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub code: String,
    pub discount: Decimal,
    pub subtotal_after_discount: Decimal,
}

/// Quote the discount a promo code would grant on a subtotal.
#[instrument(skip(state, body), fields(code = %body.code))]
pub async fn preview(
    State(state): State<AppState>,
    Json(body): Json<PreviewRequest>,
) -> Result<Json<PreviewResponse>> {
    if body.subtotal < Decimal::ZERO {
        return Err(ApiError::Validation("subtotal must not be negative".to_string()));
    }

    let promo = PromoCodeRepository::new(state.pool())
        .get_by_code(&body.code)
        .await?
        .ok_or_else(|| ApiError::NotFound("promo code not found".to_string()))?;

    let now = Utc::now();
    let terms = promo.terms();
    if !terms.is_redeemable(now) {
        return Err(ApiError::Validation(
            "promo code is inactive, expired, or exhausted".to_string(),
        ));
    }
    if body.subtotal < terms.min_purchase_amount {
        return Err(ApiError::Validation(format!(
            "subtotal is below the {} minimum for this code",
            terms.min_purchase_amount
        )));
    }

    let subtotal = round_money(body.subtotal);
    let discount = terms.discount_for(subtotal, now);

    Ok(Json(PreviewResponse {
        code: promo.code,
        discount,
        subtotal_after_discount: subtotal - discount,
    }))
}
