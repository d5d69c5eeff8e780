//! Liveness handler.

use axum::Json;
use chrono::Utc;

use crate::models::HealthResponse;

/// `GET /api/health`: service liveness.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".into(),
        service: "jot".into(),
        timestamp: Utc::now().to_rfc3339(),
    })
}
