//! Status enums for orders and payments.
//!
//! All enums map to Postgres enum types (see the `api` crate migrations) via
//! the `postgres` feature, and serialize as `snake_case` strings on the wire.

use serde::{Deserialize, Serialize};

/// Payment state of an order.
///
/// Starts at `Pending` when the order is created. `Paid` is only ever set by
/// the payment webhook handler - no client-facing endpoint accepts it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "payment_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl PaymentStatus {
    /// Whether payment can still be collected for an order in this state.
    ///
    /// A failed attempt may be retried, so `Failed` stays payable: the
    /// gateway can re-run the same intent and a later success must still
    /// settle the order. `Paid` and `Refunded` are settled.
    #[must_use]
    pub const fn payable(self) -> bool {
        matches!(self, Self::Pending | Self::Failed)
    }
}

/// Fulfillment state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "order_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Whether a customer may still cancel an order in this state.
    ///
    /// Cancellation is allowed until the order ships.
    #[must_use]
    pub const fn cancellable_by_customer(self) -> bool {
        matches!(self, Self::Pending | Self::Processing)
    }

    /// Whether fulfilment may move from this state to `next`.
    ///
    /// Fulfilment only moves forward: pending orders enter processing (or
    /// ship directly), processing orders ship, shipped orders are delivered.
    /// Cancellation is allowed until the order ships. `Delivered` and
    /// `Cancelled` are terminal.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Processing | Self::Shipped | Self::Cancelled)
                | (Self::Processing, Self::Shipped | Self::Cancelled)
                | (Self::Shipped, Self::Delivered)
        )
    }
}

/// How the customer pays for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "payment_method", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Card payment through the external gateway.
    GatewayCard,
    /// Cash collected on delivery.
    CashOnDelivery,
    /// Anything arranged out of band.
    Other,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Processing => write!(f, "processing"),
            Self::Shipped => write!(f, "shipped"),
            Self::Delivered => write!(f, "delivered"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn payment_status_defaults_to_pending() {
        assert_eq!(PaymentStatus::default(), PaymentStatus::Pending);
    }

    #[test]
    fn failed_payments_stay_payable() {
        // A gateway retry on the same intent must still be able to settle
        // an order whose first attempt failed.
        assert!(PaymentStatus::Pending.payable());
        assert!(PaymentStatus::Failed.payable());
        assert!(!PaymentStatus::Paid.payable());
        assert!(!PaymentStatus::Refunded.payable());
    }

    #[test]
    fn fulfilment_moves_forward_only() {
        use OrderStatus::{Cancelled, Delivered, Pending, Processing, Shipped};

        assert!(Pending.can_transition_to(Processing));
        assert!(Pending.can_transition_to(Shipped));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Processing.can_transition_to(Shipped));
        assert!(Processing.can_transition_to(Cancelled));
        assert!(Shipped.can_transition_to(Delivered));

        // No backwards moves, no cancelling after shipment.
        assert!(!Shipped.can_transition_to(Cancelled));
        assert!(!Shipped.can_transition_to(Pending));
        assert!(!Delivered.can_transition_to(Pending));
        assert!(!Delivered.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Pending));
        assert!(!Cancelled.can_transition_to(Processing));
    }

    #[test]
    fn customer_cancellation_window() {
        assert!(OrderStatus::Pending.cancellable_by_customer());
        assert!(OrderStatus::Processing.cancellable_by_customer());
        assert!(!OrderStatus::Shipped.cancellable_by_customer());
        assert!(!OrderStatus::Delivered.cancellable_by_customer());
        assert!(!OrderStatus::Cancelled.cancellable_by_customer());
    }

    #[test]
    fn order_status_round_trips_through_str() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Processing,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(OrderStatus::from_str(&status.to_string()).unwrap(), status);
        }
    }

    #[test]
    fn statuses_serialize_as_snake_case() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::CashOnDelivery).unwrap(),
            "\"cash_on_delivery\""
        );
        assert_eq!(
            serde_json::to_string(&PaymentStatus::Paid).unwrap(),
            "\"paid\""
        );
    }
}
