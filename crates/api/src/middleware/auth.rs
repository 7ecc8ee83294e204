//! Bearer-token authentication and extractors.
//!
//! Tokens are compact signed strings minted out of band (the CLI can issue
//! them for development). Format:
//!
//! ```text
//! <user_id>.<role>.<expires_unix>.<signature>
//! ```
//!
//! where `signature` is the hex HMAC-SHA256 of the first three fields keyed
//! by `AUTH_TOKEN_SECRET`. Verification is constant-time via the `hmac`
//! crate; the server never stores sessions.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use thiserror::Error;

use orchard_core::UserId;

use crate::error::ApiError;
use crate::state::AppState;

type HmacSha256 = Hmac<Sha256>;

/// What a token asserts about its bearer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Customer,
    Admin,
}

impl Role {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Admin => "admin",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "customer" => Some(Self::Customer),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

/// Verified claims extracted from a bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenClaims {
    pub user_id: UserId,
    pub role: Role,
    pub expires_at: DateTime<Utc>,
}

/// Token verification failures. Collapsed to 401 at the HTTP boundary.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("bad signature")]
    BadSignature,
    #[error("token expired")]
    Expired,
}

/// Mint a signed token. Used by the CLI, never by a route handler.
#[must_use]
pub fn mint_token(
    secret: &SecretString,
    user_id: UserId,
    role: Role,
    expires_at: DateTime<Utc>,
) -> String {
    let payload = format!("{user_id}.{}.{}", role.as_str(), expires_at.timestamp());
    let signature = sign(secret, &payload);
    format!("{payload}.{signature}")
}

/// Verify a token's signature and expiry against `now`.
///
/// # Errors
///
/// Returns `TokenError` if the token is malformed, forged, or expired.
pub fn verify_token(
    secret: &SecretString,
    token: &str,
    now: DateTime<Utc>,
) -> Result<TokenClaims, TokenError> {
    let (payload, signature) = token.rsplit_once('.').ok_or(TokenError::Malformed)?;

    let mut parts = payload.split('.');
    let user_id: i32 = parts
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or(TokenError::Malformed)?;
    let role = parts
        .next()
        .and_then(Role::parse)
        .ok_or(TokenError::Malformed)?;
    let expires_unix: i64 = parts
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or(TokenError::Malformed)?;
    if parts.next().is_some() {
        return Err(TokenError::Malformed);
    }

    let raw_signature = hex::decode(signature).map_err(|_| TokenError::Malformed)?;
    let mut mac = mac_for(secret);
    mac.update(payload.as_bytes());
    mac.verify_slice(&raw_signature)
        .map_err(|_| TokenError::BadSignature)?;

    let expires_at =
        DateTime::from_timestamp(expires_unix, 0).ok_or(TokenError::Malformed)?;
    if now >= expires_at {
        return Err(TokenError::Expired);
    }

    Ok(TokenClaims {
        user_id: UserId::new(user_id),
        role,
        expires_at,
    })
}

// HMAC-SHA256 accepts keys of any length, so construction cannot fail.
#[allow(clippy::expect_used)]
fn mac_for(secret: &SecretString) -> HmacSha256 {
    HmacSha256::new_from_slice(secret.expose_secret().as_bytes())
        .expect("HMAC can take key of any size")
}

fn sign(secret: &SecretString, payload: &str) -> String {
    let mut mac = mac_for(secret);
    mac.update(payload.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

fn bearer_token(parts: &Parts) -> Result<&str, ApiError> {
    parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or_else(|| ApiError::Unauthorized("missing bearer token".to_string()))
}

/// Extractor that requires a valid customer (or admin) token.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(user: CurrentUser) -> impl IntoResponse {
///     format!("user {}", user.user_id)
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser {
    pub user_id: UserId,
    pub role: Role,
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let token = bearer_token(parts)?;
        let claims = verify_token(&state.config().auth_token_secret, token, Utc::now())
            .map_err(|e| ApiError::Unauthorized(e.to_string()))?;
        Ok(Self {
            user_id: claims.user_id,
            role: claims.role,
        })
    }
}

/// Extractor that additionally requires the admin role.
#[derive(Debug, Clone, Copy)]
pub struct CurrentAdmin {
    pub user_id: UserId,
}

impl<S> FromRequestParts<S> for CurrentAdmin
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        if user.role != Role::Admin {
            return Err(ApiError::Forbidden("admin access required".to_string()));
        }
        Ok(Self {
            user_id: user.user_id,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn secret() -> SecretString {
        SecretString::from("kM2xV9pQ4rT7wZ1bN6cF8hJ3dG5sA0eLyU")
    }

    #[test]
    fn round_trip_preserves_claims() {
        let expires = Utc::now() + Duration::hours(1);
        let token = mint_token(&secret(), UserId::new(42), Role::Admin, expires);

        let claims = verify_token(&secret(), &token, Utc::now()).unwrap();
        assert_eq!(claims.user_id, UserId::new(42));
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.expires_at.timestamp(), expires.timestamp());
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let expires = Utc::now() + Duration::hours(1);
        let token = mint_token(&secret(), UserId::new(42), Role::Customer, expires);

        // Promote customer to admin without re-signing
        let forged = token.replace(".customer.", ".admin.");
        assert_eq!(
            verify_token(&secret(), &forged, Utc::now()),
            Err(TokenError::BadSignature)
        );
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let expires = Utc::now() + Duration::hours(1);
        let token = mint_token(&secret(), UserId::new(1), Role::Customer, expires);

        let other = SecretString::from("aB3cD4eF5gH6iJ7kL8mN9oP0qR1sT2uVxY");
        assert_eq!(
            verify_token(&other, &token, Utc::now()),
            Err(TokenError::BadSignature)
        );
    }

    #[test]
    fn expired_token_is_rejected() {
        let expires = Utc::now() - Duration::minutes(1);
        let token = mint_token(&secret(), UserId::new(1), Role::Customer, expires);

        assert_eq!(
            verify_token(&secret(), &token, Utc::now()),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn garbage_is_malformed() {
        assert_eq!(
            verify_token(&secret(), "not-a-token", Utc::now()),
            Err(TokenError::Malformed)
        );
        assert_eq!(
            verify_token(&secret(), "1.customer.abc.00", Utc::now()),
            Err(TokenError::Malformed)
        );
    }
}
