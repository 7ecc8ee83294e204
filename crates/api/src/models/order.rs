//! Order and line-item models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use orchard_core::{OrderId, OrderItemId, OrderStatus, PaymentMethod, PaymentStatus, ProductId, UserId};

/// A placed order.
///
/// Monetary fields are computed once at creation and never recomputed:
/// `total_amount = subtotal - promo_discount + shipping_cost + tax`.
/// `payment_status` starts at `pending` and only the payment webhook can move
/// it to `paid`.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    #[sqlx(flatten)]
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    /// External gateway correlation id, set when the client pays by card.
    pub payment_intent_id: Option<String>,
    pub order_status: OrderStatus,
    pub subtotal: Decimal,
    pub promo_code: Option<String>,
    pub promo_discount: Decimal,
    pub shipping_cost: Decimal,
    pub tax: Decimal,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An immutable line-item snapshot.
///
/// Title, image, and unit price are copied from the product at purchase time
/// so later product edits don't alter order history.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub title: String,
    pub image: String,
    pub size: String,
    pub color: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}

/// A structured shipping address; every field except `line2` is required.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ShippingAddress {
    pub recipient: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub phone: String,
}

impl ShippingAddress {
    /// Check that every required field is populated.
    ///
    /// # Errors
    ///
    /// Returns the name of the first missing field.
    pub fn validate(&self) -> Result<(), &'static str> {
        let required = [
            ("recipient", &self.recipient),
            ("line1", &self.line1),
            ("city", &self.city),
            ("state", &self.state),
            ("postal_code", &self.postal_code),
            ("country", &self.country),
            ("phone", &self.phone),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(name);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn address() -> ShippingAddress {
        ShippingAddress {
            recipient: "Avery Quinn".to_string(),
            line1: "12 Orchard Way".to_string(),
            line2: None,
            city: "Portland".to_string(),
            state: "OR".to_string(),
            postal_code: "97201".to_string(),
            country: "US".to_string(),
            phone: "+1 555 0100".to_string(),
        }
    }

    #[test]
    fn complete_address_validates() {
        assert!(address().validate().is_ok());
    }

    #[test]
    fn line2_is_optional() {
        let mut addr = address();
        addr.line2 = Some(String::new());
        assert!(addr.validate().is_ok());
    }

    #[test]
    fn blank_required_field_is_reported_by_name() {
        let mut addr = address();
        addr.postal_code = "  ".to_string();
        assert_eq!(addr.validate(), Err("postal_code"));
    }
}
