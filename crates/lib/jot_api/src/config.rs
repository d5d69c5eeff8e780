//! API server configuration.

use jot_core::auth::password::PasswordPolicy;

/// Configuration for the API server.
///
/// Built once at startup and carried in the router state; components receive
/// it explicitly; nothing reads the environment after boot.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:3000").
    pub bind_addr: String,
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// JWT signing secret. `None` means authentication is unconfigured: the
    /// gate and the issuance path refuse to operate rather than run open.
    pub jwt_secret: Option<String>,
    /// Password complexity policy for registration and password change.
    pub password_policy: PasswordPolicy,
}

impl ApiConfig {
    /// Reads configuration from environment variables.
    ///
    /// | Variable                     | Default                         |
    /// |------------------------------|---------------------------------|
    /// | `BIND_ADDR`                  | `127.0.0.1:3000`                |
    /// | `DATABASE_URL`               | `postgres://localhost:5432/jot` |
    /// | `JWT_SECRET` / `AUTH_SECRET` | unset                           |
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".into()),
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost:5432/jot".into()),
            jwt_secret: resolve_jwt_secret(),
            password_policy: PasswordPolicy::default(),
        }
    }

    /// The signing secret, if one is configured and non-empty.
    pub fn signing_secret(&self) -> Option<&[u8]> {
        self.jwt_secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(str::as_bytes)
    }
}

/// Resolve the JWT secret: env var `JWT_SECRET`, falling back to
/// `AUTH_SECRET`. No generated fallback: a missing secret must stay loud,
/// not silently papered over.
pub fn resolve_jwt_secret() -> Option<String> {
    for var in ["JWT_SECRET", "AUTH_SECRET"] {
        if let Ok(secret) = std::env::var(var)
            && !secret.is_empty()
        {
            return Some(secret);
        }
    }
    None
}
