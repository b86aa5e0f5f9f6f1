//! 통합 테스트 공용 헬퍼.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use fieldserve_api::auth::hash_password;
use fieldserve_api::middleware::{RateLimitConfig, RateLimiter};
use fieldserve_api::store::MemoryStore;
use fieldserve_api::{create_api_router, AppState};
use fieldserve_core::{AuthConfig, UserRecord};
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "integration-test-secret-key-at-least-32-bytes";
pub const PASSWORD: &str = "password123";

pub const ACME: i64 = 1;
pub const GLOBEX: i64 = 2;
pub const PLATFORM: i64 = 99;

pub fn auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: Some(SecretString::from(TEST_SECRET.to_string())),
        hashing_workers: 2,
        ..AuthConfig::default()
    }
}

/// 테스트 사용자가 등록된 앱 (로그인 rate limit 완화).
pub async fn test_app(config: AuthConfig) -> (Router, MemoryStore) {
    let (state, store) = AppState::in_memory(&config).unwrap();
    seed_users(&store).await;

    let state = state.with_login_limiter(RateLimiter::new(RateLimitConfig::per_minute(6000)));
    (create_api_router(Arc::new(state)), store)
}

pub async fn seed_users(store: &MemoryStore) {
    let hash = hash_password(PASSWORD).unwrap();
    let users = [
        (1, "login@example.com", "Admin", ACME),
        (2, "manager@acme.test", "Manager", ACME),
        (3, "employee@acme.test", "Employee", ACME),
        (4, "admin@globex.test", "Admin", GLOBEX),
        (5, "root@platform.test", "PlatformAdmin", PLATFORM),
    ];

    for (id, email, role, company_id) in users {
        store
            .insert_user(UserRecord {
                id,
                email: email.to_string(),
                password_hash: hash.clone(),
                role: role.to_string(),
                company_id,
            })
            .await;
    }
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// 로그인 후 토큰 반환.
pub async fn login(app: &Router, email: &str) -> String {
    let (status, body) = send(
        app,
        post_json(
            "/auth/login",
            None,
            serde_json::json!({"email": email, "password": PASSWORD}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed for {}: {}", email, body);
    body["token"].as_str().unwrap().to_string()
}
