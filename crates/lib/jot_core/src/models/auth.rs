//! Authentication domain models.
//!
//! These are internal domain models, distinct from the API wire models
//! (which carry `#[serde(rename)]` for camelCase field names).

use serde::{Deserialize, Serialize};

/// Domain user, the public view. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub phone: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// User plus stored credential, for internal auth flows only.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub user: User,
    pub password_hash: String,
}

/// JWT claims embedded in access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject claim: the user ID.
    pub sub: String,
    /// User email.
    pub email: String,
    /// Expiry (unix timestamp).
    pub exp: i64,
    /// Issued at (unix timestamp).
    pub iat: i64,
}

/// Verified identity the auth gate attaches to a request.
///
/// Exactly these four fields; decoded claims are never forwarded wholesale.
/// Lives only as long as the request that carries it.
#[derive(Debug, Clone)]
pub struct AuthenticatedIdentity {
    pub user_id: String,
    pub email: String,
    pub issued_at: i64,
    pub expires_at: i64,
}

impl From<TokenClaims> for AuthenticatedIdentity {
    fn from(claims: TokenClaims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
            issued_at: claims.iat,
            expires_at: claims.exp,
        }
    }
}
