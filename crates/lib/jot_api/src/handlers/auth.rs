//! Authentication request handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};

use jot_core::models::auth::AuthenticatedIdentity;

use crate::AppState;
use crate::error::AppResult;
use crate::models::{
    AuthResponse, ChangePasswordRequest, LoginRequest, MessageResponse, RegisterRequest,
    UpdateProfileRequest, UserView,
};
use crate::services::account;

/// `POST /api/auth/register`: create a new account.
pub async fn register_handler(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let resp = account::register(
        &state.pool,
        &state.config.password_policy,
        &body.email,
        &body.password,
        &body.phone,
        state.config.signing_secret(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

/// `POST /api/auth/login`: authenticate with email + password.
pub async fn login_handler(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let resp = account::login(
        &state.pool,
        &body.email,
        &body.password,
        state.config.signing_secret(),
    )
    .await?;
    Ok(Json(resp))
}

/// `GET /api/auth/profile`: public view of the authenticated account.
pub async fn get_profile_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthenticatedIdentity>,
) -> AppResult<Json<UserView>> {
    let view = account::get_profile(&state.pool, &identity.user_id).await?;
    Ok(Json(view))
}

/// `PUT /api/auth/profile`: update email and/or phone.
pub async fn update_profile_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthenticatedIdentity>,
    Json(body): Json<UpdateProfileRequest>,
) -> AppResult<Json<UserView>> {
    let view = account::update_profile(
        &state.pool,
        &identity.user_id,
        body.email.as_deref(),
        body.phone.as_deref(),
    )
    .await?;
    Ok(Json(view))
}

/// `PUT /api/auth/change-password`: rotate the account credential.
pub async fn change_password_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthenticatedIdentity>,
    Json(body): Json<ChangePasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    let resp = account::change_password(
        &state.pool,
        &state.config.password_policy,
        &identity.user_id,
        &body.current_password,
        &body.new_password,
    )
    .await?;
    Ok(Json(resp))
}
