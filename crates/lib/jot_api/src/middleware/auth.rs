//! Authentication middleware: bearer token extraction and verification.

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use jot_core::auth::{queries, token};
use jot_core::models::auth::{AuthenticatedIdentity, User};

use crate::AppState;
use crate::error::{AppError, AuthRejection};

/// Secondary plain-token header accepted alongside `Authorization`.
const AUTH_TOKEN_HEADER: &str = "x-auth-token";

/// Full user record (minus hash) attached by [`require_auth_with_user`].
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Pull a token out of the accepted headers. A `Bearer ` prefix on the
/// primary header is stripped; otherwise the value is used verbatim.
fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        return Some(value.strip_prefix("Bearer ").unwrap_or(value).to_string());
    }
    headers
        .get(AUTH_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Verify the request's token and produce the identity it asserts.
fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<AuthenticatedIdentity, AppError> {
    let token =
        extract_token(headers).ok_or(AppError::Unauthenticated(AuthRejection::MissingToken))?;
    let secret = state
        .config
        .signing_secret()
        .ok_or_else(|| AppError::Configuration("JWT signing secret is not set".into()))?;
    let claims = token::verify_token(&token, secret)?;
    Ok(AuthenticatedIdentity::from(claims))
}

/// Stateless gate: verifies the token and attaches `AuthenticatedIdentity`
/// to the request. No database lookup; the signed claims are trusted.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let identity = authenticate(&state, request.headers())?;
    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

/// Gate variant that additionally confirms the account still exists in the
/// credential store. Attaches both `AuthenticatedIdentity` and the stored
/// [`CurrentUser`] view.
pub async fn require_auth_with_user(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let identity = authenticate(&state, request.headers())?;
    let record = queries::find_user_by_id(&state.pool, &identity.user_id)
        .await
        .map_err(AppError::from)?
        .ok_or(AppError::Unauthenticated(AuthRejection::UserNotFound))?;
    request.extensions_mut().insert(CurrentUser(record.user));
    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}
