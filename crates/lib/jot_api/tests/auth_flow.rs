//! Integration tests for the account endpoints and the auth gate, driven
//! end-to-end against an ephemeral PostgreSQL instance.

mod common;

use axum::http::StatusCode;
use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::json;

use common::{TEST_SECRET, register_user, request, spawn_app};

#[tokio::test]
async fn register_login_and_profile_flow() {
    let mut test = spawn_app().await;
    let app = &test.app;

    // Register: 201, token plus public view, no password material anywhere.
    let (status, body) = request(
        app,
        "POST",
        "/api/auth/register",
        &[],
        Some(json!({
            "email": "a@b.com",
            "password": "Secret1!",
            "phone": "5551234567",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(body["user"]["email"], "a@b.com");
    assert_eq!(body["user"]["phone"], "5551234567");
    assert!(body["user"].get("password").is_none());
    assert!(body["user"].get("passwordHash").is_none());
    let user_id = body["user"]["id"].as_str().unwrap().to_string();

    // Same email, different case: the normalized email is already taken.
    let (status, body) = request(
        app,
        "POST",
        "/api/auth/register",
        &[],
        Some(json!({
            "email": "A@B.Com",
            "password": "Other2de!",
            "phone": "5559876543",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "already_exists");

    // Login: decoded claims carry the registered user's id.
    let (status, body) = request(
        app,
        "POST",
        "/api/auth/login",
        &[],
        Some(json!({"email": "a@b.com", "password": "Secret1!"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();
    let claims =
        jot_core::auth::token::verify_token(&token, TEST_SECRET.as_bytes()).expect("valid token");
    assert_eq!(claims.sub, user_id);
    assert_eq!(claims.email, "a@b.com");

    // Profile read through the gate.
    let auth = format!("Bearer {token}");
    let headers = [("authorization", auth.as_str())];
    let (status, body) = request(app, "GET", "/api/auth/profile", &headers, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "a@b.com");

    // Update must name at least one field.
    let (status, body) = request(app, "PUT", "/api/auth/profile", &headers, Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_failed");

    // Phone update refreshes the view.
    let (status, body) = request(
        app,
        "PUT",
        "/api/auth/profile",
        &headers,
        Some(json!({"phone": "+1 (555) 000-1111"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phone"], "+1 (555) 000-1111");
    assert!(body["updatedAt"].as_str().unwrap() >= body["createdAt"].as_str().unwrap());

    test.db.stop().await.expect("db stop");
}

#[tokio::test]
async fn login_failures_resist_account_enumeration() {
    let mut test = spawn_app().await;
    let app = &test.app;

    register_user(app, "existing@x.com", "Secret1!", "5551234567").await;

    let (wrong_status, wrong_body) = request(
        app,
        "POST",
        "/api/auth/login",
        &[],
        Some(json!({"email": "existing@x.com", "password": "wrongpassword"})),
    )
    .await;
    let (missing_status, missing_body) = request(
        app,
        "POST",
        "/api/auth/login",
        &[],
        Some(json!({"email": "nonexistent@x.com", "password": "anything"})),
    )
    .await;

    // Identical status and body whether the email exists or not.
    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing_status, wrong_status);
    assert_eq!(missing_body, wrong_body);
    assert_eq!(wrong_body["error"], "invalid_credentials");

    test.db.stop().await.expect("db stop");
}

#[tokio::test]
async fn gate_rejections_carry_distinct_reason_codes() {
    let mut test = spawn_app().await;
    let app = &test.app;

    let (token, user_id) = register_user(app, "gate@x.com", "Secret1!", "5551234567").await;

    // No token at all.
    let (status, body) = request(app, "GET", "/api/auth/profile", &[], None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "token_missing");

    // Tampered token.
    let tampered = {
        let mut bytes = token.clone().into_bytes();
        let mid = bytes.len() / 2;
        bytes[mid] = if bytes[mid] == b'a' { b'b' } else { b'a' };
        String::from_utf8(bytes).unwrap()
    };
    let auth = format!("Bearer {tampered}");
    let headers = [("authorization", auth.as_str())];
    let (status, body) = request(app, "GET", "/api/auth/profile", &headers, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "token_malformed");

    // Expired token: correctly signed, past expiry.
    let now = Utc::now().timestamp();
    let expired_claims = jot_core::models::auth::TokenClaims {
        sub: user_id.clone(),
        email: "gate@x.com".into(),
        exp: now - 3600,
        iat: now - 7200,
    };
    let expired = encode(
        &Header::default(),
        &expired_claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap();
    let auth = format!("Bearer {expired}");
    let headers = [("authorization", auth.as_str())];
    let (status, body) = request(app, "GET", "/api/auth/profile", &headers, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "token_expired");

    // Token signed with a different secret.
    let foreign = jot_core::auth::token::issue_token(&user_id, "gate@x.com", b"other-secret")
        .expect("issue with other secret");
    let auth = format!("Bearer {foreign}");
    let headers = [("authorization", auth.as_str())];
    let (status, body) = request(app, "GET", "/api/auth/profile", &headers, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "token_malformed");

    // The secondary plain-token header is accepted.
    let headers = [("x-auth-token", token.as_str())];
    let (status, body) = request(app, "GET", "/api/auth/profile", &headers, None).await;
    assert_eq!(status, StatusCode::OK, "{body}");

    // A verified token for a deleted account fails the user-check variant.
    sqlx::query("DELETE FROM users WHERE id = $1::uuid")
        .bind(&user_id)
        .execute(&test.pool)
        .await
        .expect("delete user");
    let auth = format!("Bearer {token}");
    let headers = [("authorization", auth.as_str())];
    let (status, body) = request(app, "GET", "/api/auth/profile", &headers, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "user_not_found");

    test.db.stop().await.expect("db stop");
}

#[tokio::test]
async fn change_password_rejects_no_op_and_rotates_credential() {
    let mut test = spawn_app().await;
    let app = &test.app;

    let (token, _) = register_user(app, "rotate@x.com", "Secret1!", "5551234567").await;
    let auth = format!("Bearer {token}");
    let headers = [("authorization", auth.as_str())];

    // Wrong current password.
    let (status, body) = request(
        app,
        "PUT",
        "/api/auth/change-password",
        &headers,
        Some(json!({"currentPassword": "NotIt99x", "newPassword": "Fresh3rOne"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid_credentials");

    // New password identical to the current one: rejected, nothing stored.
    let (status, body) = request(
        app,
        "PUT",
        "/api/auth/change-password",
        &headers,
        Some(json!({"currentPassword": "Secret1!", "newPassword": "Secret1!"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "same_password");

    // The old credential still logs in, proving no mutation happened.
    let (status, _) = request(
        app,
        "POST",
        "/api/auth/login",
        &[],
        Some(json!({"email": "rotate@x.com", "password": "Secret1!"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // A real change swaps which password logs in.
    let (status, _) = request(
        app,
        "PUT",
        "/api/auth/change-password",
        &headers,
        Some(json!({"currentPassword": "Secret1!", "newPassword": "Fresh3rOne"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = request(
        app,
        "POST",
        "/api/auth/login",
        &[],
        Some(json!({"email": "rotate@x.com", "password": "Secret1!"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = request(
        app,
        "POST",
        "/api/auth/login",
        &[],
        Some(json!({"email": "rotate@x.com", "password": "Fresh3rOne"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // The pre-change token is still honored until it expires naturally.
    let (status, _) = request(app, "GET", "/api/auth/profile", &headers, None).await;
    assert_eq!(status, StatusCode::OK);

    test.db.stop().await.expect("db stop");
}

#[tokio::test]
async fn unconfigured_secret_is_a_loud_server_error() {
    let mut test = spawn_app().await;

    // Rebuild the router with no signing secret configured.
    let state = jot_api::AppState {
        pool: test.pool.clone(),
        config: jot_api::config::ApiConfig {
            bind_addr: "127.0.0.1:0".into(),
            database_url: test.db.connection_url(),
            jwt_secret: None,
            password_policy: Default::default(),
        },
    };
    let app = jot_api::router(state);

    // Registration refuses to mint a token.
    let (status, body) = request(
        &app,
        "POST",
        "/api/auth/register",
        &[],
        Some(json!({
            "email": "noauth@x.com",
            "password": "Secret1!",
            "phone": "5551234567",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "configuration_error");

    // The gate rejects with an operator-fault signal, not a caller-fault 401.
    let headers = [("authorization", "Bearer whatever")];
    let (status, body) = request(&app, "GET", "/api/auth/profile", &headers, None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "configuration_error");

    test.db.stop().await.expect("db stop");
}
