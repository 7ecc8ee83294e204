//! Money helpers over [`rust_decimal::Decimal`].
//!
//! All amounts in Orchard are `Decimal` values in the currency's standard
//! unit (dollars, not cents). The payment gateway speaks minor units, so
//! conversions live here alongside the single rounding policy.

use rust_decimal::{Decimal, RoundingStrategy};

/// Round a monetary amount to two decimal places, half-up.
///
/// This is the only rounding policy in the codebase; discounts, tax, and
/// totals all go through it so persisted values stay consistent.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert a standard-unit amount to minor currency units (e.g. cents).
///
/// Rounds half-up first, so `10.005` becomes `1001` cents. Returns `None`
/// if the amount does not fit in an `i64`.
#[must_use]
pub fn to_minor_units(amount: Decimal) -> Option<i64> {
    use rust_decimal::prelude::ToPrimitive;
    (round_money(amount) * Decimal::ONE_HUNDRED).to_i64()
}

/// Convert minor currency units back to a standard-unit amount.
#[must_use]
pub fn from_minor_units(minor: i64) -> Decimal {
    Decimal::new(minor, 2)
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
    fn rounds_half_up_at_two_places() {
        assert_eq!(round_money(dec("10.005")), dec("10.01"));
        assert_eq!(round_money(dec("10.004")), dec("10.00"));
        assert_eq!(round_money(dec("99.999")), dec("100.00"));
    }

    #[test]
    fn minor_unit_round_trip() {
        assert_eq!(to_minor_units(dec("19.99")), Some(1999));
        assert_eq!(from_minor_units(1999), dec("19.99"));
        assert_eq!(to_minor_units(dec("0")), Some(0));
    }

    #[test]
    fn minor_units_round_before_scaling() {
        assert_eq!(to_minor_units(dec("10.005")), Some(1001));
    }
}
