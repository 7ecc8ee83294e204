//! Promo-code redemption rules and discount math.
//!
//! [`PromoTerms`] is a pure value object: it carries the redemption window,
//! usage counters, and discount shape of a promo code, and computes discounts
//! without touching storage. Recording a redemption (incrementing the usage
//! counter) is a repository concern in the `api` crate and happens only after
//! the owning order is actually created.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::money::round_money;

/// Shape of a promo discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "discount_type", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    /// `discount_value` percent off the subtotal.
    Percentage,
    /// `discount_value` off as a flat amount.
    Fixed,
}

/// The redemption terms of a promo code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromoTerms {
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    /// Minimum order subtotal before the code applies.
    pub min_purchase_amount: Decimal,
    /// Optional ceiling on the computed discount.
    pub max_discount_amount: Option<Decimal>,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    /// Total allowed redemptions; `None` means unlimited.
    pub usage_limit: Option<i32>,
    pub used_count: i32,
    pub is_active: bool,
}

impl PromoTerms {
    /// Whether the code can be redeemed at `now`.
    ///
    /// A code is redeemable iff it is active, `now` falls inside
    /// `[valid_from, valid_until]`, and the usage limit (when set) has not
    /// been reached.
    #[must_use]
    pub fn is_redeemable(&self, now: DateTime<Utc>) -> bool {
        self.is_active
            && now >= self.valid_from
            && now <= self.valid_until
            && self.usage_limit.is_none_or(|limit| self.used_count < limit)
    }

    /// Discount granted against `subtotal` at `now`.
    ///
    /// Returns zero for non-redeemable codes and for subtotals below the
    /// minimum purchase amount. The raw discount is capped by
    /// `max_discount_amount` (when set), can never exceed the subtotal, and
    /// is rounded half-up to two decimal places.
    #[must_use]
    pub fn discount_for(&self, subtotal: Decimal, now: DateTime<Utc>) -> Decimal {
        if !self.is_redeemable(now) || subtotal < self.min_purchase_amount {
            return Decimal::ZERO;
        }

        let raw = match self.discount_type {
            DiscountType::Percentage => subtotal * self.discount_value / Decimal::ONE_HUNDRED,
            DiscountType::Fixed => self.discount_value,
        };

        let capped = match self.max_discount_amount {
            Some(cap) => raw.min(cap),
            None => raw,
        };

        round_money(capped.min(subtotal).max(Decimal::ZERO))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn active_percentage(value: &str) -> PromoTerms {
        let now = Utc::now();
        PromoTerms {
            discount_type: DiscountType::Percentage,
            discount_value: dec(value),
            min_purchase_amount: Decimal::ZERO,
            max_discount_amount: None,
            valid_from: now - Duration::days(1),
            valid_until: now + Duration::days(1),
            usage_limit: None,
            used_count: 0,
            is_active: true,
        }
    }

    #[test]
    fn ten_percent_off_one_thousand() {
        // SAVE10: percentage 10, no minimum, no cap
        let promo = active_percentage("10");
        let discount = promo.discount_for(dec("1000"), Utc::now());
        assert_eq!(discount, dec("100.00"));
    }

    #[test]
    fn fixed_discount_clamps_to_cap_then_subtotal() {
        // FLAT50CAP30: fixed 50 capped at 30, subtotal 40 -> discount 30
        let mut promo = active_percentage("0");
        promo.discount_type = DiscountType::Fixed;
        promo.discount_value = dec("50");
        promo.max_discount_amount = Some(dec("30"));
        assert_eq!(promo.discount_for(dec("40"), Utc::now()), dec("30.00"));

        // Without the cap the discount still cannot exceed the subtotal
        promo.max_discount_amount = None;
        assert_eq!(promo.discount_for(dec("40"), Utc::now()), dec("40.00"));
    }

    #[test]
    fn exhausted_usage_limit_blocks_redemption_regardless_of_window() {
        let mut promo = active_percentage("10");
        promo.usage_limit = Some(5);
        promo.used_count = 5;
        assert!(!promo.is_redeemable(Utc::now()));
        assert_eq!(promo.discount_for(dec("1000"), Utc::now()), Decimal::ZERO);
    }

    #[test]
    fn outside_validity_window_blocks_redemption_regardless_of_usage() {
        let now = Utc::now();
        let mut promo = active_percentage("10");
        promo.valid_from = now - Duration::days(10);
        promo.valid_until = now - Duration::days(5);
        assert!(!promo.is_redeemable(now));

        promo.valid_from = now + Duration::days(5);
        promo.valid_until = now + Duration::days(10);
        assert!(!promo.is_redeemable(now));
    }

    #[test]
    fn inactive_code_is_never_redeemable() {
        let mut promo = active_percentage("10");
        promo.is_active = false;
        assert!(!promo.is_redeemable(Utc::now()));
    }

    #[test]
    fn subtotal_below_minimum_purchase_gives_zero() {
        let mut promo = active_percentage("10");
        promo.min_purchase_amount = dec("100");
        assert_eq!(promo.discount_for(dec("99.99"), Utc::now()), Decimal::ZERO);
        assert_eq!(promo.discount_for(dec("100"), Utc::now()), dec("10.00"));
    }

    #[test]
    fn discount_is_always_within_bounds() {
        let now = Utc::now();
        let subtotals = ["0", "0.01", "12.34", "500", "99999.99"];
        let mut promo = active_percentage("25");
        promo.max_discount_amount = Some(dec("75"));

        for s in subtotals {
            let subtotal = dec(s);
            let discount = promo.discount_for(subtotal, now);
            assert!(discount >= Decimal::ZERO);
            assert!(discount <= subtotal);
            assert!(discount <= dec("75"));
        }
    }

    #[test]
    fn percentage_discount_rounds_half_up() {
        let promo = active_percentage("15");
        // 15% of 33.33 = 4.9995 -> 5.00
        assert_eq!(promo.discount_for(dec("33.33"), Utc::now()), dec("5.00"));
    }
}
