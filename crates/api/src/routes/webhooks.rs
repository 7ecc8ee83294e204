//! Payment gateway webhook handler.
//!
//! The gateway confirms payments asynchronously by POSTing signed events
//! here. This is the only code path that moves an order's payment status;
//! clients can't claim their own orders are paid.
//!
//! Verification runs over the raw request body: HMAC-SHA256 keyed with the
//! shared webhook secret, hex-encoded, compared against the
//! `X-Webhook-Signature` header in constant time. Verified events are always
//! acknowledged with 200 so the gateway stops redelivering, even when the
//! event type is one we don't handle or the intent matches no order.

use axum::{Json, body::Bytes, extract::State, http::HeaderMap};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{Value, json};
use sha2::Sha256;
use tracing::instrument;

use crate::db::OrderRepository;
use crate::error::{ApiError, Result};
use crate::state::AppState;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the hex HMAC of the raw body.
pub const SIGNATURE_HEADER: &str = "x-webhook-signature";

/// The envelope every gateway event arrives in.
#[derive(Debug, Deserialize)]
struct WebhookEvent {
    #[serde(rename = "type")]
    event_type: String,
    data: EventData,
}

#[derive(Debug, Deserialize)]
struct EventData {
    /// The payment intent the event concerns.
    intent_id: String,
}

/// Verify the webhook signature over the raw body.
///
/// Decodes the claimed hex signature and lets the `hmac` crate do a
/// constant-time comparison against the recomputed MAC.
fn verify_signature(secret: &SecretString, body: &[u8], provided: &str) -> bool {
    let Ok(claimed) = hex::decode(provided) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.expose_secret().as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&claimed).is_ok()
}

/// Receive a payment gateway event.
#[instrument(skip(state, headers, body))]
pub async fn payments(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>> {
    let provided = headers
        .get(SIGNATURE_HEADER)
        .and_then(|h| h.to_str().ok())
        .ok_or(ApiError::InvalidSignature)?;

    if !verify_signature(&state.config().webhook_secret, &body, provided) {
        tracing::warn!("Webhook signature verification failed");
        return Err(ApiError::InvalidSignature);
    }

    let event: WebhookEvent = serde_json::from_slice(&body)
        .map_err(|e| ApiError::Validation(format!("malformed webhook payload: {e}")))?;

    let repo = OrderRepository::new(state.pool());
    match event.event_type.as_str() {
        "payment_intent.succeeded" => {
            let updated = repo.mark_paid_by_intent(&event.data.intent_id).await?;
            if updated {
                tracing::info!(intent_id = %event.data.intent_id, "Order marked paid");
            } else {
                // Redelivery, or an intent we never issued. Acknowledge anyway.
                tracing::warn!(
                    intent_id = %event.data.intent_id,
                    "Payment success event matched no pending order"
                );
            }
        }
        "payment_intent.failed" => {
            let updated = repo.mark_failed_by_intent(&event.data.intent_id).await?;
            if updated {
                tracing::info!(intent_id = %event.data.intent_id, "Order marked failed");
            }
        }
        other => {
            tracing::debug!(event_type = other, "Ignoring unhandled webhook event type");
        }
    }

    Ok(Json(json!({ "received": true })))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn secret() -> SecretString {
        SecretString::from("whsec_9f8e7d6c5b4a39281706f5e4d3c2b1a0")
    }

    fn sign(body: &[u8]) -> String {
        let mut mac =
            HmacSha256::new_from_slice(secret().expose_secret().as_bytes()).unwrap();
        mac.update(body);
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn valid_signature_verifies() {
        let body = br#"{"type":"payment_intent.succeeded","data":{"intent_id":"pi_123"}}"#;
        let signature = sign(body);
        assert!(verify_signature(&secret(), body, &signature));
    }

    #[test]
    fn modified_body_fails_verification() {
        let body = br#"{"type":"payment_intent.succeeded","data":{"intent_id":"pi_123"}}"#;
        let signature = sign(body);

        let tampered = br#"{"type":"payment_intent.succeeded","data":{"intent_id":"pi_999"}}"#;
        assert!(!verify_signature(&secret(), tampered, &signature));
    }

    #[test]
    fn non_hex_signature_fails_verification() {
        assert!(!verify_signature(&secret(), b"{}", "not-hex!"));
    }

    #[test]
    fn event_envelope_parses() {
        let body = br#"{"type":"payment_intent.failed","data":{"intent_id":"pi_42"}}"#;
        let event: WebhookEvent = serde_json::from_slice(body).unwrap();
        assert_eq!(event.event_type, "payment_intent.failed");
        assert_eq!(event.data.intent_id, "pi_42");
    }
}
