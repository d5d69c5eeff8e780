//! # jot_api
//!
//! HTTP API library for Jot.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use axum::Router;
use axum::routing::{get, post, put};
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};

use crate::handlers::{auth, health, notes};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool.
    pub pool: PgPool,
    /// API configuration.
    pub config: config::ApiConfig,
}

/// Run embedded database migrations.
///
/// Delegates to `jot_core::migrate::migrate()` which owns the migration files.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    jot_core::migrate::migrate(pool).await
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public routes (no auth required)
    let public = Router::new()
        .route("/api/health", get(health::health))
        .route("/api/auth/register", post(auth::register_handler))
        .route("/api/auth/login", post(auth::login_handler));

    // Account routes: the gate additionally confirms the user still exists.
    let account = Router::new()
        .route(
            "/api/auth/profile",
            get(auth::get_profile_handler).put(auth::update_profile_handler),
        )
        .route(
            "/api/auth/change-password",
            put(auth::change_password_handler),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth_with_user,
        ));

    // Note routes: stateless gate, the signed claims are trusted.
    let notes_routes = Router::new()
        .route(
            "/api/notes",
            post(notes::create_note_handler).get(notes::list_notes_handler),
        )
        .route(
            "/api/notes/{id}",
            get(notes::get_note_handler)
                .put(notes::update_note_handler)
                .delete(notes::delete_note_handler),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    Router::new()
        .merge(public)
        .merge(account)
        .merge(notes_routes)
        .layer(cors)
        .with_state(state)
}
