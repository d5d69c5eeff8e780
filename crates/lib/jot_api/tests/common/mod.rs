//! Shared harness: ephemeral PostgreSQL plus a router wired with a test secret.
#![allow(dead_code)] // not every test binary uses every helper

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use jot_api::{AppState, config::ApiConfig};
use jot_core::db::EphemeralDb;

pub const TEST_SECRET: &str = "test-secret";

pub struct TestApp {
    pub app: Router,
    pub pool: sqlx::PgPool,
    pub db: EphemeralDb,
}

/// Spin up an ephemeral PostgreSQL instance, run migrations, and build a
/// router whose gate signs and verifies with [`TEST_SECRET`].
pub async fn spawn_app() -> TestApp {
    let mut db = EphemeralDb::new().await.expect("EphemeralDb::new");
    db.start().await.expect("db start");

    let pool = sqlx::PgPool::connect(&db.connection_url())
        .await
        .expect("connect to ephemeral PG");

    jot_api::migrate(&pool).await.expect("migrations");

    let state = AppState {
        pool: pool.clone(),
        config: ApiConfig {
            bind_addr: "127.0.0.1:0".into(),
            database_url: db.connection_url(),
            jwt_secret: Some(TEST_SECRET.into()),
            password_policy: Default::default(),
        },
    };

    TestApp {
        app: jot_api::router(state),
        pool,
        db,
    }
}

/// Drive one request through the router and return (status, parsed body).
pub async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    headers: &[(&str, &str)],
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let req = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let resp = app.clone().oneshot(req).await.expect("request");
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("parse JSON body")
    };
    (status, json)
}

/// Register an account and return (token, user id).
pub async fn register_user(app: &Router, email: &str, password: &str, phone: &str) -> (String, String) {
    let (status, body) = request(
        app,
        "POST",
        "/api/auth/register",
        &[],
        Some(serde_json::json!({
            "email": email,
            "password": password,
            "phone": phone,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
    (
        body["token"].as_str().expect("token").to_string(),
        body["user"]["id"].as_str().expect("user id").to_string(),
    )
}

