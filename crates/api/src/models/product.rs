//! Product model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

use orchard_core::{CategoryId, ProductId};

/// A sellable product.
///
/// `rating` and `num_reviews` are denormalized aggregates recomputed whenever
/// a review is created or deleted. `stock` is only ever mutated through the
/// conditional decrement in the order repository.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub brand: String,
    pub description: String,
    pub price: Decimal,
    /// Sale price; must be below `price` when set.
    pub discount_price: Option<Decimal>,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub stock: i32,
    pub category_id: CategoryId,
    pub images: Vec<String>,
    pub rating: Decimal,
    pub num_reviews: i32,
    pub is_featured: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// The price a customer pays right now.
    #[must_use]
    pub fn unit_price(&self) -> Decimal {
        self.discount_price.unwrap_or(self.price)
    }

    /// Whether the product is offered in `size` (exact match).
    #[must_use]
    pub fn has_size(&self, size: &str) -> bool {
        self.sizes.iter().any(|s| s == size)
    }

    /// Whether the product is offered in `color` (case-insensitive).
    #[must_use]
    pub fn has_color(&self, color: &str) -> bool {
        self.colors.iter().any(|c| c.eq_ignore_ascii_case(color))
    }

    /// First image, used for order line-item snapshots.
    #[must_use]
    pub fn primary_image(&self) -> &str {
        self.images.first().map_or("", String::as_str)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn sample() -> Product {
        Product {
            id: ProductId::new(1),
            title: "Trail Jacket".to_string(),
            brand: "Orchard".to_string(),
            description: "Lightweight shell".to_string(),
            price: Decimal::from_str("120.00").unwrap(),
            discount_price: None,
            sizes: vec!["S".to_string(), "M".to_string(), "L".to_string()],
            colors: vec!["Forest Green".to_string(), "Black".to_string()],
            stock: 10,
            category_id: CategoryId::new(1),
            images: vec!["https://img.test/jacket.jpg".to_string()],
            rating: Decimal::ZERO,
            num_reviews: 0,
            is_featured: false,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn unit_price_prefers_discount_price() {
        let mut product = sample();
        assert_eq!(product.unit_price(), Decimal::from_str("120.00").unwrap());

        product.discount_price = Some(Decimal::from_str("99.00").unwrap());
        assert_eq!(product.unit_price(), Decimal::from_str("99.00").unwrap());
    }

    #[test]
    fn color_match_is_case_insensitive() {
        let product = sample();
        assert!(product.has_color("forest green"));
        assert!(product.has_color("BLACK"));
        assert!(!product.has_color("red"));
    }

    #[test]
    fn size_match_is_exact() {
        let product = sample();
        assert!(product.has_size("M"));
        assert!(!product.has_size("m"));
        assert!(!product.has_size("XL"));
    }
}
