//! Authentication and authorization logic.
//!
//! Password hashing, token issuance/verification, field validation, and the
//! credential store queries shared by the API layer.

pub mod password;
pub mod queries;
pub mod token;
pub mod validate;

use thiserror::Error;

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("email already registered")]
    DuplicateEmail,

    #[error("validation error: {0}")]
    Validation(String),

    #[error("user not found")]
    NotFound,

    #[error("new password must differ from the current password")]
    SamePassword,

    #[error("credential store unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Token failures: one kind per caller-visible signal, so the gate can
/// emit distinct diagnostics for each.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,

    #[error("token expired")]
    Expired,

    #[error("token not yet valid")]
    NotYetValid,

    #[error("signing secret is not configured")]
    MissingSecret,
}
