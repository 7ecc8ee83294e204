//! Orchard Core - Shared domain types library.
//!
//! This crate provides common types used across all Orchard components:
//! - `api` - REST API backend (storefront + admin surface)
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, money helpers, and status enums
//! - [`promo`] - Promo-code redemption rules and discount math
//! - [`pricing`] - Order subtotal/tax/total computation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod pricing;
pub mod promo;
pub mod types;

pub use pricing::{OrderTotals, PricingConfig};
pub use promo::{DiscountType, PromoTerms};
pub use types::*;
