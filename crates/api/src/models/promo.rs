//! Promo code model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

use orchard_core::{DiscountType, PromoCodeId, PromoTerms};

/// A promo code row.
///
/// `code` is stored upper-cased; lookups normalize the same way so redemption
/// is case-insensitive. `used_count` is incremented exactly once per order
/// that applies the code, inside the order-creation transaction.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PromoCode {
    pub id: PromoCodeId,
    pub code: String,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    pub min_purchase_amount: Decimal,
    pub max_discount_amount: Option<Decimal>,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub usage_limit: Option<i32>,
    pub used_count: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl PromoCode {
    /// The pure redemption terms for the promo engine.
    #[must_use]
    pub fn terms(&self) -> PromoTerms {
        PromoTerms {
            discount_type: self.discount_type,
            discount_value: self.discount_value,
            min_purchase_amount: self.min_purchase_amount,
            max_discount_amount: self.max_discount_amount,
            valid_from: self.valid_from,
            valid_until: self.valid_until,
            usage_limit: self.usage_limit,
            used_count: self.used_count,
            is_active: self.is_active,
        }
    }
}
