//! Token issuance and verification.
//!
//! Tokens are stateless: possession of a structurally valid, unexpired,
//! correctly signed token IS authentication. There is no revocation: a
//! token stays valid until its expiry, even across a password change.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use super::{AuthError, TokenError};
use crate::models::auth::TokenClaims;

/// Access token lifetime: 24 hours.
pub const TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

/// Issue a signed access token (HS256, 24 h expiry) for a user.
pub fn issue_token(user_id: &str, email: &str, secret: &[u8]) -> Result<String, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::Token(TokenError::MissingSecret));
    }
    let now = Utc::now();
    let claims = TokenClaims {
        sub: user_id.to_string(),
        email: email.to_string(),
        exp: (now + Duration::seconds(TOKEN_TTL_SECS)).timestamp(),
        iat: now.timestamp(),
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret))
        .map_err(|e| AuthError::Internal(format!("jwt encode: {e}")))
}

/// Verify an access token: signature integrity, structure, expiry, and
/// presence of the required claims.
pub fn verify_token(token: &str, secret: &[u8]) -> Result<TokenClaims, TokenError> {
    if secret.is_empty() {
        return Err(TokenError::MissingSecret);
    }
    let mut validation = Validation::default();
    validation.validate_exp = true;
    let data = decode::<TokenClaims>(token, &DecodingKey::from_secret(secret), &validation)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::ImmatureSignature => TokenError::NotYetValid,
            _ => TokenError::Malformed,
        })?;
    if data.claims.sub.is_empty() || data.claims.email.is_empty() {
        return Err(TokenError::Malformed);
    }
    Ok(data.claims)
}
