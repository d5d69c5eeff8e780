//! Notes domain: per-user CRUD with tag filtering.
//!
//! Consumes the verified user id the auth gate produces; every query is
//! scoped to that owner, so another user's note is indistinguishable from a
//! missing one.

pub mod queries;

use thiserror::Error;

/// Note operation errors.
#[derive(Debug, Error)]
pub enum NoteError {
    #[error("note not found")]
    NotFound,

    #[error("validation error: {0}")]
    Validation(String),

    #[error("note store unavailable: {0}")]
    Unavailable(String),

    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}
