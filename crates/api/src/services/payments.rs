//! Payment gateway API client.
//!
//! Talks to the card gateway's server-side API to create payment intents.
//! The client never sees card data; it exchanges an order total for an
//! intent id plus a client secret the frontend hands to the gateway's JS SDK.
//!
//! Confirmation arrives asynchronously on the webhook route, never here.

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use crate::config::GatewayConfig;

/// Errors that can occur when talking to the payment gateway.
#[derive(Debug, Error)]
pub enum PaymentsError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Gateway returned an error response.
    #[error("gateway error: {status} - {message}")]
    Gateway { status: u16, message: String },

    /// Failed to parse a gateway response.
    #[error("parse error: {0}")]
    Parse(String),

    /// Unauthorized (invalid secret key).
    #[error("unauthorized: invalid gateway secret key")]
    Unauthorized,
}

/// A payment intent created at the gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntent {
    /// Gateway-assigned identifier, stored on the order for webhook matching.
    pub id: String,
    /// Opaque secret the frontend uses to confirm the payment.
    pub client_secret: String,
}

#[derive(Debug, Serialize)]
struct CreateIntentRequest<'a> {
    /// Amount in minor units (cents).
    amount: i64,
    currency: &'a str,
    description: &'a str,
}

#[derive(Debug, Deserialize)]
struct GatewayErrorBody {
    message: Option<String>,
}

/// Payment gateway API client.
#[derive(Clone)]
pub struct PaymentsClient {
    inner: Arc<PaymentsClientInner>,
}

struct PaymentsClientInner {
    client: reqwest::Client,
    base_url: String,
}

impl PaymentsClient {
    /// Create a new payment gateway client.
    ///
    /// # Errors
    ///
    /// Returns an error if the secret key is not valid header material or the
    /// HTTP client fails to build.
    pub fn new(config: &GatewayConfig) -> Result<Self, PaymentsError> {
        let mut headers = HeaderMap::new();

        let auth_value = format!("Bearer {}", config.secret_key.expose_secret());
        let mut value = HeaderValue::from_str(&auth_value)
            .map_err(|e| PaymentsError::Parse(format!("invalid secret key format: {e}")))?;
        value.set_sensitive(true);
        headers.insert("Authorization", value);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            inner: Arc::new(PaymentsClientInner {
                client,
                base_url: config.base_url.trim_end_matches('/').to_string(),
            }),
        })
    }

    /// Create a payment intent for an order total.
    ///
    /// # Arguments
    ///
    /// * `amount_minor` - Order total in minor units (cents)
    /// * `currency` - ISO 4217 currency code, lower case
    /// * `description` - Human-readable reference shown in the gateway console
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the gateway rejects it.
    #[instrument(skip(self), fields(amount = amount_minor, currency))]
    pub async fn create_payment_intent(
        &self,
        amount_minor: i64,
        currency: &str,
        description: &str,
    ) -> Result<PaymentIntent, PaymentsError> {
        let url = format!("{}/v1/payment_intents", self.inner.base_url);
        let body = CreateIntentRequest {
            amount: amount_minor,
            currency,
            description,
        };

        let response = self.inner.client.post(&url).json(&body).send().await?;
        self.handle_response(response).await
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, PaymentsError> {
        let status = response.status();

        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| PaymentsError::Parse(format!("failed to parse response: {e}")));
        }

        if status.as_u16() == 401 {
            return Err(PaymentsError::Unauthorized);
        }

        let code = status.as_u16();
        let message = response
            .json::<GatewayErrorBody>()
            .await
            .ok()
            .and_then(|b| b.message)
            .unwrap_or_else(|| "unknown gateway error".to_string());

        Err(PaymentsError::Gateway {
            status: code,
            message,
        })
    }
}
