//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use orchard_core::PricingConfig;

use crate::config::ApiConfig;
use crate::services::payments::{PaymentsClient, PaymentsError};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    pool: PgPool,
    payments: PaymentsClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the payment gateway client fails to build.
    pub fn new(config: ApiConfig, pool: PgPool) -> Result<Self, PaymentsError> {
        let payments = PaymentsClient::new(&config.gateway)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                payments,
            }),
        })
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the payment gateway client.
    #[must_use]
    pub fn payments(&self) -> &PaymentsClient {
        &self.inner.payments
    }

    /// Get the pricing configuration applied at order creation.
    #[must_use]
    pub fn pricing(&self) -> &PricingConfig {
        &self.inner.config.pricing
    }
}
