//! Development token minting command.

use chrono::{Duration, Utc};
use secrecy::SecretString;

use orchard_api::middleware::auth::{Role, mint_token};
use orchard_core::UserId;

use super::CommandError;

/// Mint a signed bearer token and print it.
///
/// # Errors
///
/// Returns an error if `AUTH_TOKEN_SECRET` is unset or the role is unknown.
pub fn run(user_id: i32, role: &str, ttl_hours: i64) -> Result<(), CommandError> {
    dotenvy::dotenv().ok();

    let secret = std::env::var("AUTH_TOKEN_SECRET")
        .map(SecretString::from)
        .map_err(|_| CommandError::MissingEnvVar("AUTH_TOKEN_SECRET"))?;

    let role = match role {
        "customer" => Role::Customer,
        "admin" => Role::Admin,
        other => {
            return Err(CommandError::InvalidArgument(format!(
                "unknown role '{other}' (expected 'customer' or 'admin')"
            )));
        }
    };

    let expires_at = Utc::now() + Duration::hours(ttl_hours);
    let token = mint_token(&secret, UserId::new(user_id), role, expires_at);

    #[allow(clippy::print_stdout)]
    {
        println!("{token}");
    }
    Ok(())
}
