//! Credential store queries.
//!
//! Every operation runs under a bounded timeout so a stalled database
//! surfaces as `Unavailable` instead of hanging the request. Reads retry at
//! most once on a timeout; writes never retry (duplicate side effects).

use std::future::Future;
use std::time::Duration;

use sqlx::PgPool;
use tracing::warn;

use super::AuthError;
use crate::models::auth::{User, UserRecord};

/// Upper bound for a single store operation.
const STORE_TIMEOUT: Duration = Duration::from_secs(5);

type UserRow = (
    String,
    String,
    String,
    String,
    chrono::DateTime<chrono::Utc>,
    chrono::DateTime<chrono::Utc>,
);

fn record_from_row(row: UserRow) -> UserRecord {
    let (id, email, phone, password_hash, created_at, updated_at) = row;
    UserRecord {
        user: User {
            id,
            email,
            phone,
            created_at,
            updated_at,
        },
        password_hash,
    }
}

/// Map driver errors, folding the unique-index violation into `DuplicateEmail`.
fn map_db_error(e: sqlx::Error) -> AuthError {
    if let Some(db) = e.as_database_error()
        && db.is_unique_violation()
    {
        return AuthError::DuplicateEmail;
    }
    AuthError::Db(e)
}

/// Run one store operation under the timeout bound.
async fn bounded<T>(fut: impl Future<Output = Result<T, sqlx::Error>>) -> Result<T, AuthError> {
    match tokio::time::timeout(STORE_TIMEOUT, fut).await {
        Ok(res) => res.map_err(map_db_error),
        Err(_) => Err(AuthError::Unavailable(format!(
            "store operation exceeded {STORE_TIMEOUT:?}"
        ))),
    }
}

/// Run a read under the timeout bound, retrying once on a timeout.
async fn bounded_read<T, F, Fut>(mut op: F) -> Result<T, AuthError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, sqlx::Error>>,
{
    match bounded(op()).await {
        Err(AuthError::Unavailable(_)) => {
            warn!("credential store read timed out, retrying once");
            bounded(op()).await
        }
        res => res,
    }
}

/// Fetch a user (with credential) by email, case-insensitive.
pub async fn find_user_by_email(
    pool: &PgPool,
    email: &str,
) -> Result<Option<UserRecord>, AuthError> {
    let row = bounded_read(|| {
        sqlx::query_as::<_, UserRow>(
            "SELECT id::text, email, phone, password_hash, created_at, updated_at \
             FROM users WHERE lower(email) = lower($1)",
        )
        .bind(email)
        .fetch_optional(pool)
    })
    .await?;
    Ok(row.map(record_from_row))
}

/// Fetch a user (with credential) by id.
pub async fn find_user_by_id(
    pool: &PgPool,
    user_id: &str,
) -> Result<Option<UserRecord>, AuthError> {
    let row = bounded_read(|| {
        sqlx::query_as::<_, UserRow>(
            "SELECT id::text, email, phone, password_hash, created_at, updated_at \
             FROM users WHERE id = $1::uuid",
        )
        .bind(user_id)
        .fetch_optional(pool)
    })
    .await?;
    Ok(row.map(record_from_row))
}

/// Insert a new user. The unique index on `lower(email)` makes a racing
/// duplicate insert fail with `DuplicateEmail` even after a pre-check passed.
pub async fn create_user(
    pool: &PgPool,
    email: &str,
    phone: &str,
    password_hash: &str,
) -> Result<User, AuthError> {
    let row = bounded(
        sqlx::query_as::<_, UserRow>(
            "INSERT INTO users (email, phone, password_hash) VALUES ($1, $2, $3) \
             RETURNING id::text, email, phone, password_hash, created_at, updated_at",
        )
        .bind(email)
        .bind(phone)
        .bind(password_hash)
        .fetch_one(pool),
    )
    .await?;
    Ok(record_from_row(row).user)
}

/// Update only the supplied fields; always refreshes `updated_at`.
pub async fn update_profile(
    pool: &PgPool,
    user_id: &str,
    email: Option<&str>,
    phone: Option<&str>,
) -> Result<Option<User>, AuthError> {
    let row = bounded(
        sqlx::query_as::<_, UserRow>(
            "UPDATE users SET \
                 email = COALESCE($2, email), \
                 phone = COALESCE($3, phone), \
                 updated_at = now() \
             WHERE id = $1::uuid \
             RETURNING id::text, email, phone, password_hash, created_at, updated_at",
        )
        .bind(user_id)
        .bind(email)
        .bind(phone)
        .fetch_optional(pool),
    )
    .await?;
    Ok(row.map(|r| record_from_row(r).user))
}

/// Replace the stored credential; refreshes `updated_at`. Returns whether a
/// row was touched.
pub async fn update_password(
    pool: &PgPool,
    user_id: &str,
    password_hash: &str,
) -> Result<bool, AuthError> {
    let result = bounded(
        sqlx::query("UPDATE users SET password_hash = $2, updated_at = now() WHERE id = $1::uuid")
            .bind(user_id)
            .bind(password_hash)
            .execute(pool),
    )
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Whether another user (`id != user_id`) already owns this email.
pub async fn email_taken_by_other(
    pool: &PgPool,
    email: &str,
    user_id: &str,
) -> Result<bool, AuthError> {
    bounded_read(|| {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE lower(email) = lower($1) AND id <> $2::uuid)",
        )
        .bind(email)
        .bind(user_id)
        .fetch_one(pool)
    })
    .await
}
