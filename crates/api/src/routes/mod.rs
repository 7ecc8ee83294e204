//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                        - Health check
//! GET    /health/ready                  - Readiness check (pings the database)
//!
//! # Catalog (public)
//! GET    /products                      - Product listing (?category=slug&featured=true)
//! GET    /products/{id}                 - Product detail
//! GET    /products/{id}/reviews         - Product reviews
//! GET    /categories                    - Category listing
//! GET    /categories/{slug}             - Category detail
//! POST   /promos/preview                - Quote a promo discount for a subtotal
//!
//! # Cart (requires auth)
//! GET    /cart                          - List cart items
//! POST   /cart                          - Add item (merges duplicate variants)
//! PATCH  /cart/{id}                     - Set item quantity
//! DELETE /cart/{id}                     - Remove item
//! DELETE /cart                          - Empty the cart
//!
//! # Orders (requires auth)
//! POST   /orders                        - Create an order from submitted items
//! GET    /orders                        - Own order history
//! GET    /orders/{id}                   - Own order with line items
//! POST   /orders/{id}/cancel            - Cancel own order (pending/processing only)
//! POST   /orders/{id}/payment-intent    - Create a gateway payment intent
//!
//! # Reviews (requires auth)
//! POST   /products/{id}/reviews         - Review a product (one per user)
//! DELETE /reviews/{id}                  - Delete own review (admins: any)
//!
//! # Webhooks
//! POST   /webhooks/payments             - Payment gateway events (HMAC-signed)
//!
//! # Admin (requires admin token)
//! POST   /admin/products                - Create product
//! PUT    /admin/products/{id}           - Update product
//! DELETE /admin/products/{id}           - Deactivate product
//! POST   /admin/categories              - Create category
//! PUT    /admin/categories/{id}         - Update category
//! DELETE /admin/categories/{id}         - Delete category
//! GET    /admin/promos                  - List promo codes
//! POST   /admin/promos                  - Create promo code
//! PUT    /admin/promos/{id}             - Update promo code
//! DELETE /admin/promos/{id}             - Delete promo code
//! GET    /admin/orders                  - All orders (?status=shipped)
//! GET    /admin/orders/{id}             - Any order with line items
//! PATCH  /admin/orders/{id}/status      - Advance fulfilment status
//! GET    /admin/reports/dashboard       - Aggregated storefront report
//! ```

pub mod admin;
pub mod cart;
pub mod categories;
pub mod health;
pub mod orders;
pub mod products;
pub mod promos;
pub mod reviews;
pub mod webhooks;

use axum::{
    Router,
    routing::{delete, get, patch, post, put},
};

use crate::state::AppState;

/// Create the public catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::index))
        .route("/products/{id}", get(products::show))
        .route(
            "/products/{id}/reviews",
            get(reviews::index).post(reviews::create),
        )
        .route("/categories", get(categories::index))
        .route("/categories/{slug}", get(categories::show))
        .route("/promos/preview", post(promos::preview))
        .route("/reviews/{id}", delete(reviews::remove))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/cart",
            get(cart::index).post(cart::add).delete(cart::clear),
        )
        .route("/cart/{id}", patch(cart::update).delete(cart::remove))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", post(orders::create).get(orders::index))
        .route("/orders/{id}", get(orders::show))
        .route("/orders/{id}/cancel", post(orders::cancel))
        .route("/orders/{id}/payment-intent", post(orders::payment_intent))
}

/// Create the admin routes router, nested under `/admin`.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/products", post(admin::create_product))
        .route(
            "/products/{id}",
            put(admin::update_product).delete(admin::deactivate_product),
        )
        .route("/categories", post(admin::create_category))
        .route(
            "/categories/{id}",
            put(admin::update_category).delete(admin::delete_category),
        )
        .route(
            "/promos",
            get(admin::list_promos).post(admin::create_promo),
        )
        .route(
            "/promos/{id}",
            put(admin::update_promo).delete(admin::delete_promo),
        )
        .route("/orders", get(admin::list_orders))
        .route("/orders/{id}", get(admin::show_order))
        .route("/orders/{id}/status", patch(admin::update_order_status))
        .route("/reports/dashboard", get(admin::dashboard))
}

/// Create the webhook routes router.
pub fn webhook_routes() -> Router<AppState> {
    Router::new().route("/webhooks/payments", post(webhooks::payments))
}
