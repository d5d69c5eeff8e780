//! Account service: registration, login, profile, password change.
//!
//! Orchestrates the credential store, the password hasher, and the token
//! service. Every failure is returned as a structured `AppError`; nothing
//! credential-related leaks past this boundary.

use sqlx::PgPool;
use tracing::info;

use jot_core::auth::password::{self, PasswordPolicy};
use jot_core::auth::validate::{normalize_email, validate_email, validate_phone};
use jot_core::auth::{queries, token};
use jot_core::models::auth::UserRecord;

use crate::error::{AppError, AppResult};
use crate::models::{AuthResponse, MessageResponse, UserView};

fn missing_secret() -> AppError {
    AppError::Configuration("JWT signing secret is not set".into())
}

/// Register a new account and issue its first token.
pub async fn register(
    pool: &PgPool,
    policy: &PasswordPolicy,
    email: &str,
    password: &str,
    phone: &str,
    secret: Option<&[u8]>,
) -> AppResult<AuthResponse> {
    if email.trim().is_empty() {
        return Err(AppError::Validation("email is required".into()));
    }
    if password.is_empty() {
        return Err(AppError::Validation("password is required".into()));
    }
    if phone.trim().is_empty() {
        return Err(AppError::Validation("phone is required".into()));
    }

    let email = normalize_email(email);
    validate_email(&email)?;
    validate_phone(phone)?;
    policy.validate(password)?;

    // Pre-check for a friendly failure; the unique index still decides races.
    if queries::find_user_by_email(pool, &email).await?.is_some() {
        return Err(AppError::AlreadyExists("email already registered".into()));
    }

    let secret = secret.ok_or_else(missing_secret)?;
    let password_hash = password::hash_password(password.to_string()).await?;

    // A concurrent registration can still win between the pre-check and this
    // insert; the store then reports DuplicateEmail, which maps to the same
    // AlreadyExists outcome.
    let user = queries::create_user(pool, &email, phone.trim(), &password_hash).await?;

    let token = token::issue_token(&user.id, &user.email, secret)?;
    info!(user_id = %user.id, "account registered");

    Ok(AuthResponse {
        message: "User created successfully".into(),
        token,
        user: UserView::from(user),
    })
}

/// Authenticate with email + password.
///
/// An unknown email and a wrong password produce the identical failure, so
/// responses never reveal whether an address is registered.
pub async fn login(
    pool: &PgPool,
    email: &str,
    password: &str,
    secret: Option<&[u8]>,
) -> AppResult<AuthResponse> {
    let email = normalize_email(email);
    let UserRecord {
        user,
        password_hash,
    } = queries::find_user_by_email(pool, &email)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !password::verify_password(password.to_string(), password_hash).await? {
        return Err(AppError::InvalidCredentials);
    }

    let secret = secret.ok_or_else(missing_secret)?;
    let token = token::issue_token(&user.id, &user.email, secret)?;
    info!(user_id = %user.id, "login succeeded");

    Ok(AuthResponse {
        message: "Login successful".into(),
        token,
        user: UserView::from(user),
    })
}

/// Fetch the public view of an account.
pub async fn get_profile(pool: &PgPool, user_id: &str) -> AppResult<UserView> {
    let record = queries::find_user_by_id(pool, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".into()))?;
    Ok(UserView::from(record.user))
}

/// Update email and/or phone; at least one field must be supplied.
pub async fn update_profile(
    pool: &PgPool,
    user_id: &str,
    email: Option<&str>,
    phone: Option<&str>,
) -> AppResult<UserView> {
    if email.is_none() && phone.is_none() {
        return Err(AppError::Validation(
            "at least one of email or phone is required".into(),
        ));
    }

    let email = match email {
        Some(raw) => {
            let normalized = normalize_email(raw);
            validate_email(&normalized)?;
            if queries::email_taken_by_other(pool, &normalized, user_id).await? {
                return Err(AppError::AlreadyExists("email already registered".into()));
            }
            Some(normalized)
        }
        None => None,
    };
    if let Some(phone) = phone {
        validate_phone(phone)?;
    }

    let user = queries::update_profile(pool, user_id, email.as_deref(), phone.map(str::trim))
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".into()))?;
    Ok(UserView::from(user))
}

/// Change the account password.
///
/// Tokens issued before the change stay valid until natural expiry; tokens
/// are stateless and carry no revocation hook.
pub async fn change_password(
    pool: &PgPool,
    policy: &PasswordPolicy,
    user_id: &str,
    current_password: &str,
    new_password: &str,
) -> AppResult<MessageResponse> {
    if current_password.is_empty() {
        return Err(AppError::Validation("current password is required".into()));
    }
    policy.validate(new_password)?;

    let record = queries::find_user_by_id(pool, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".into()))?;

    if !password::verify_password(current_password.to_string(), record.password_hash.clone())
        .await?
    {
        return Err(AppError::InvalidCredentials);
    }

    // Reject the no-op before touching the store.
    if password::verify_password(new_password.to_string(), record.password_hash).await? {
        return Err(AppError::SamePassword);
    }

    let new_hash = password::hash_password(new_password.to_string()).await?;
    if !queries::update_password(pool, user_id, &new_hash).await? {
        return Err(AppError::NotFound("user not found".into()));
    }
    info!(user_id, "password changed");

    Ok(MessageResponse {
        message: "Password changed successfully".into(),
    })
}
