//! Application error types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use jot_core::auth::{AuthError, TokenError};
use jot_core::notes::NoteError;

use crate::models::ErrorResponse;

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// Why the auth gate rejected a request. Each reason carries its own
/// machine-readable code so clients can tell "log in again" from "bad token"
/// without parsing prose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    /// No token in either accepted header.
    MissingToken,
    /// Bad structure or signature.
    MalformedToken,
    /// Valid signature, past expiry.
    ExpiredToken,
    /// Valid signature, not-before still in the future.
    NotYetValidToken,
    /// Token verified but the account no longer exists.
    UserNotFound,
}

impl AuthRejection {
    pub fn code(self) -> &'static str {
        match self {
            Self::MissingToken => "token_missing",
            Self::MalformedToken => "token_malformed",
            Self::ExpiredToken => "token_expired",
            Self::NotYetValidToken => "token_not_yet_valid",
            Self::UserNotFound => "user_not_found",
        }
    }

    fn message(self) -> &'static str {
        match self {
            Self::MissingToken => "Access denied. No token provided.",
            Self::MalformedToken => "Invalid token",
            Self::ExpiredToken => "Token has expired, log in again",
            Self::NotYetValidToken => "Token is not valid yet",
            Self::UserNotFound => "User not found",
        }
    }
}

/// Application-level errors with HTTP status mapping.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("New password must differ from the current password")]
    SamePassword,

    #[error("Unavailable: {0}")]
    Unavailable(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Unauthenticated: {}", .0.code())]
    Unauthenticated(AuthRejection),

    #[error("Internal server error")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(m) => (StatusCode::BAD_REQUEST, "validation_failed", m.clone()),
            AppError::AlreadyExists(m) => (StatusCode::CONFLICT, "already_exists", m.clone()),
            // Identical body whether the email is unknown or the password is
            // wrong: account enumeration resistance.
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "invalid_credentials",
                "Invalid email or password".to_string(),
            ),
            AppError::NotFound(m) => (StatusCode::NOT_FOUND, "not_found", m.clone()),
            AppError::SamePassword => (
                StatusCode::BAD_REQUEST,
                "same_password",
                "New password must differ from the current password".to_string(),
            ),
            AppError::Unavailable(m) => {
                error!(detail = %m, "store unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "unavailable",
                    "Service temporarily unavailable".to_string(),
                )
            }
            AppError::Configuration(m) => {
                // An unconfigured secret silently disables all authentication;
                // keep this impossible to miss in the logs.
                error!(detail = %m, "configuration error, authentication cannot operate");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "configuration_error",
                    "Server configuration error".to_string(),
                )
            }
            AppError::Unauthenticated(rejection) => (
                StatusCode::UNAUTHORIZED,
                rejection.code(),
                rejection.message().to_string(),
            ),
            AppError::Internal(m) => {
                // Full detail stays server-side.
                error!(detail = %m, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error".to_string(),
                )
            }
        };
        let body = Json(ErrorResponse {
            error: code.to_string(),
            message,
        });
        (status, body).into_response()
    }
}

impl From<TokenError> for AppError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Malformed => AppError::Unauthenticated(AuthRejection::MalformedToken),
            TokenError::Expired => AppError::Unauthenticated(AuthRejection::ExpiredToken),
            TokenError::NotYetValid => AppError::Unauthenticated(AuthRejection::NotYetValidToken),
            TokenError::MissingSecret => {
                AppError::Configuration("JWT signing secret is not set".into())
            }
        }
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials => AppError::InvalidCredentials,
            AuthError::DuplicateEmail => AppError::AlreadyExists("email already registered".into()),
            AuthError::Validation(m) => AppError::Validation(m),
            AuthError::NotFound => AppError::NotFound("user not found".into()),
            AuthError::SamePassword => AppError::SamePassword,
            AuthError::Unavailable(m) => AppError::Unavailable(m),
            AuthError::Token(e) => AppError::from(e),
            AuthError::Db(e) => AppError::Internal(e.to_string()),
            AuthError::Internal(m) => AppError::Internal(m),
        }
    }
}

impl From<NoteError> for AppError {
    fn from(e: NoteError) -> Self {
        match e {
            NoteError::NotFound => AppError::NotFound("note not found".into()),
            NoteError::Validation(m) => AppError::Validation(m),
            NoteError::Unavailable(m) => AppError::Unavailable(m),
            NoteError::Db(e) => AppError::Internal(e.to_string()),
        }
    }
}
