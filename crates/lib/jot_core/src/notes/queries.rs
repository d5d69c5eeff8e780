//! Note store queries, all scoped by owner id.
//!
//! Same timeout discipline as the credential store: bounded operations that
//! surface `Unavailable` instead of hanging.

use std::future::Future;
use std::time::Duration;

use sqlx::PgPool;
use uuid::Uuid;

use super::NoteError;
use crate::models::note::Note;
use crate::uuid::uuidv7;

/// Upper bound for a single store operation.
const STORE_TIMEOUT: Duration = Duration::from_secs(5);

type NoteRow = (
    String,
    String,
    String,
    String,
    Vec<String>,
    chrono::DateTime<chrono::Utc>,
    chrono::DateTime<chrono::Utc>,
);

fn note_from_row(row: NoteRow) -> Note {
    let (id, user_id, title, content, tags, created_at, updated_at) = row;
    Note {
        id,
        user_id,
        title,
        content,
        tags,
        created_at,
        updated_at,
    }
}

async fn bounded<T>(fut: impl Future<Output = Result<T, sqlx::Error>>) -> Result<T, NoteError> {
    match tokio::time::timeout(STORE_TIMEOUT, fut).await {
        Ok(res) => res.map_err(NoteError::from),
        Err(_) => Err(NoteError::Unavailable(format!(
            "store operation exceeded {STORE_TIMEOUT:?}"
        ))),
    }
}

/// Insert a note for the owner.
pub async fn create_note(
    pool: &PgPool,
    user_id: &str,
    title: &str,
    content: &str,
    tags: &[String],
) -> Result<Note, NoteError> {
    let row = bounded(
        sqlx::query_as::<_, NoteRow>(
            "INSERT INTO notes (id, user_id, title, content, tags) \
             VALUES ($1, $2::uuid, $3, $4, $5) \
             RETURNING id::text, user_id::text, title, content, tags, created_at, updated_at",
        )
        .bind(uuidv7())
        .bind(user_id)
        .bind(title)
        .bind(content)
        .bind(tags)
        .fetch_one(pool),
    )
    .await?;
    Ok(note_from_row(row))
}

/// List the owner's notes, newest first. A non-empty `tags` filters to notes
/// carrying any of the given tags.
pub async fn list_notes(
    pool: &PgPool,
    user_id: &str,
    tags: &[String],
) -> Result<Vec<Note>, NoteError> {
    let rows = if tags.is_empty() {
        bounded(
            sqlx::query_as::<_, NoteRow>(
                "SELECT id::text, user_id::text, title, content, tags, created_at, updated_at \
                 FROM notes WHERE user_id = $1::uuid ORDER BY created_at DESC",
            )
            .bind(user_id)
            .fetch_all(pool),
        )
        .await?
    } else {
        bounded(
            sqlx::query_as::<_, NoteRow>(
                "SELECT id::text, user_id::text, title, content, tags, created_at, updated_at \
                 FROM notes WHERE user_id = $1::uuid AND tags && $2 \
                 ORDER BY created_at DESC",
            )
            .bind(user_id)
            .bind(tags)
            .fetch_all(pool),
        )
        .await?
    };
    Ok(rows.into_iter().map(note_from_row).collect())
}

/// Fetch one of the owner's notes.
pub async fn get_note(
    pool: &PgPool,
    user_id: &str,
    note_id: &str,
) -> Result<Option<Note>, NoteError> {
    // A non-uuid path segment can never name a note.
    let Ok(note_id) = note_id.parse::<Uuid>() else {
        return Ok(None);
    };
    let row = bounded(
        sqlx::query_as::<_, NoteRow>(
            "SELECT id::text, user_id::text, title, content, tags, created_at, updated_at \
             FROM notes WHERE id = $2 AND user_id = $1::uuid",
        )
        .bind(user_id)
        .bind(note_id)
        .fetch_optional(pool),
    )
    .await?;
    Ok(row.map(note_from_row))
}

/// Update supplied fields on the owner's note; refreshes `updated_at`.
pub async fn update_note(
    pool: &PgPool,
    user_id: &str,
    note_id: &str,
    title: Option<&str>,
    content: Option<&str>,
    tags: Option<&[String]>,
) -> Result<Option<Note>, NoteError> {
    let Ok(note_id) = note_id.parse::<Uuid>() else {
        return Ok(None);
    };
    let row = bounded(
        sqlx::query_as::<_, NoteRow>(
            "UPDATE notes SET \
                 title = COALESCE($3, title), \
                 content = COALESCE($4, content), \
                 tags = COALESCE($5, tags), \
                 updated_at = now() \
             WHERE id = $2 AND user_id = $1::uuid \
             RETURNING id::text, user_id::text, title, content, tags, created_at, updated_at",
        )
        .bind(user_id)
        .bind(note_id)
        .bind(title)
        .bind(content)
        .bind(tags)
        .fetch_optional(pool),
    )
    .await?;
    Ok(row.map(note_from_row))
}

/// Delete the owner's note. Returns whether a row was removed.
pub async fn delete_note(pool: &PgPool, user_id: &str, note_id: &str) -> Result<bool, NoteError> {
    let Ok(note_id) = note_id.parse::<Uuid>() else {
        return Ok(false);
    };
    let result = bounded(
        sqlx::query("DELETE FROM notes WHERE id = $2 AND user_id = $1::uuid")
            .bind(user_id)
            .bind(note_id)
            .execute(pool),
    )
    .await?;
    Ok(result.rows_affected() > 0)
}
