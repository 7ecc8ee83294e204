//! Database-facing domain models.
//!
//! One module per collection; request/response shapes live with their route
//! handlers, these are the rows the repositories read and write.

pub mod category;
pub mod order;
pub mod product;
pub mod promo;
pub mod review;
pub mod user;

pub use category::Category;
pub use order::{Order, OrderItem, ShippingAddress};
pub use product::Product;
pub use promo::PromoCode;
pub use review::Review;
pub use user::{AppUser, CartItem};
