//! HTTP middleware stack for the API.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. CORS
//!
//! Authentication is not a layer: handlers opt in via the [`auth::CurrentUser`]
//! and [`auth::CurrentAdmin`] extractors.

pub mod auth;
pub mod request_id;

pub use auth::{CurrentAdmin, CurrentUser, Role};
pub use request_id::request_id_middleware;
