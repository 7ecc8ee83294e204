//! Order pricing: tax and total computation.
//!
//! The tax rate and flat shipping cost are injected through
//! [`PricingConfig`] rather than read from process environment, so the order
//! flow can be constructed with explicit numbers (and tests can pin them).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::money::round_money;

/// Pricing knobs applied to every order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Tax rate applied to the discounted subtotal (0.10 = 10%).
    pub tax_rate: Decimal,
    /// Flat shipping cost added to every order.
    pub shipping_cost: Decimal,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            tax_rate: Decimal::new(10, 2), // 10%
            shipping_cost: Decimal::ZERO,
        }
    }
}

/// The monetary breakdown persisted on an order.
///
/// Computed exactly once at order creation and never recomputed; the stored
/// values are the record of what the customer was charged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub shipping_cost: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl OrderTotals {
    /// Compute totals for an order.
    ///
    /// `tax = (subtotal - discount) * tax_rate`, and
    /// `total = subtotal - discount + shipping_cost + tax`. All values are
    /// rounded half-up to two decimal places.
    #[must_use]
    pub fn compute(subtotal: Decimal, discount: Decimal, config: &PricingConfig) -> Self {
        let subtotal = round_money(subtotal);
        let discount = round_money(discount);
        let taxable = subtotal - discount;
        let tax = round_money(taxable * config.tax_rate);
        let shipping_cost = round_money(config.shipping_cost);
        let total = round_money(taxable + shipping_cost + tax);

        Self {
            subtotal,
            discount,
            shipping_cost,
            tax,
            total,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn thousand_with_ten_percent_tax_totals_eleven_hundred() {
        let totals = OrderTotals::compute(dec("1000"), Decimal::ZERO, &PricingConfig::default());
        assert_eq!(totals.tax, dec("100.00"));
        assert_eq!(totals.shipping_cost, dec("0.00"));
        assert_eq!(totals.total, dec("1100.00"));
    }

    #[test]
    fn discount_reduces_the_taxable_base() {
        let totals = OrderTotals::compute(dec("1000"), dec("100"), &PricingConfig::default());
        assert_eq!(totals.tax, dec("90.00"));
        assert_eq!(totals.total, dec("990.00"));
    }

    #[test]
    fn total_invariant_holds_for_persisted_values() {
        let config = PricingConfig {
            tax_rate: dec("0.0825"),
            shipping_cost: dec("4.95"),
        };
        let totals = OrderTotals::compute(dec("123.45"), dec("12.34"), &config);
        assert_eq!(
            totals.total,
            totals.subtotal - totals.discount + totals.shipping_cost + totals.tax
        );
    }

    #[test]
    fn zero_subtotal_still_charges_shipping() {
        let config = PricingConfig {
            tax_rate: dec("0.10"),
            shipping_cost: dec("5.00"),
        };
        let totals = OrderTotals::compute(Decimal::ZERO, Decimal::ZERO, &config);
        assert_eq!(totals.total, dec("5.00"));
    }
}
