//! Note request handlers: consumers of the auth gate's verified identity.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};

use jot_core::models::auth::AuthenticatedIdentity;
use jot_core::notes::queries;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{
    CreateNoteRequest, MessageResponse, NoteListQuery, NoteView, UpdateNoteRequest,
};

/// Trim tags and drop empties.
fn clean_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// `POST /api/notes`: create a note for the authenticated user.
pub async fn create_note_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthenticatedIdentity>,
    Json(body): Json<CreateNoteRequest>,
) -> AppResult<(StatusCode, Json<NoteView>)> {
    let title = body.title.trim();
    let content = body.content.trim();
    if title.is_empty() {
        return Err(AppError::Validation("title is required".into()));
    }
    if content.is_empty() {
        return Err(AppError::Validation("content is required".into()));
    }
    let tags = clean_tags(body.tags);
    let note = queries::create_note(&state.pool, &identity.user_id, title, content, &tags).await?;
    Ok((StatusCode::CREATED, Json(NoteView::from(note))))
}

/// `GET /api/notes`: list the user's notes, newest first, optionally
/// filtered by `?tag=` or `?tags=a,b`.
pub async fn list_notes_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthenticatedIdentity>,
    Query(query): Query<NoteListQuery>,
) -> AppResult<Json<Vec<NoteView>>> {
    let filter = query.tag_filter();
    let notes = queries::list_notes(&state.pool, &identity.user_id, &filter).await?;
    Ok(Json(notes.into_iter().map(NoteView::from).collect()))
}

/// `GET /api/notes/{id}`: fetch one of the user's notes.
pub async fn get_note_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthenticatedIdentity>,
    Path(note_id): Path<String>,
) -> AppResult<Json<NoteView>> {
    let note = queries::get_note(&state.pool, &identity.user_id, &note_id)
        .await?
        .ok_or_else(|| AppError::NotFound("note not found".into()))?;
    Ok(Json(NoteView::from(note)))
}

/// `PUT /api/notes/{id}`: update supplied fields on one of the user's notes.
pub async fn update_note_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthenticatedIdentity>,
    Path(note_id): Path<String>,
    Json(body): Json<UpdateNoteRequest>,
) -> AppResult<Json<NoteView>> {
    let title = body.title.as_deref().map(str::trim);
    if title.is_some_and(str::is_empty) {
        return Err(AppError::Validation("title must not be empty".into()));
    }
    let content = body.content.as_deref().map(str::trim);
    if content.is_some_and(str::is_empty) {
        return Err(AppError::Validation("content must not be empty".into()));
    }
    let tags = body.tags.map(clean_tags);

    let note = queries::update_note(
        &state.pool,
        &identity.user_id,
        &note_id,
        title,
        content,
        tags.as_deref(),
    )
    .await?
    .ok_or_else(|| AppError::NotFound("note not found".into()))?;
    Ok(Json(NoteView::from(note)))
}

/// `DELETE /api/notes/{id}`: delete one of the user's notes.
pub async fn delete_note_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthenticatedIdentity>,
    Path(note_id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    if !queries::delete_note(&state.pool, &identity.user_id, &note_id).await? {
        return Err(AppError::NotFound("note not found".into()));
    }
    Ok(Json(MessageResponse {
        message: "Note deleted successfully".into(),
    }))
}
