//! 로그인 → 토큰 → 보호 라우트 흐름 통합 테스트

mod common;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{header, Request, StatusCode};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use fieldserve_api::middleware::{RateLimitConfig, RateLimiter};
use fieldserve_api::{create_api_router, AppState};
use fieldserve_core::AuthConfig;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use common::*;

fn decode_payload(token: &str) -> Value {
    let payload = token.split('.').nth(1).unwrap();
    serde_json::from_slice(&URL_SAFE_NO_PAD.decode(payload).unwrap()).unwrap()
}

#[tokio::test]
async fn test_login_issues_token_with_admin_role() {
    let (app, _) = test_app(auth_config()).await;

    let (status, body) = send(
        &app,
        post_json(
            "/auth/login",
            None,
            json!({"email": "login@example.com", "password": "password123"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "Admin");

    let claims = decode_payload(body["token"].as_str().unwrap());
    assert_eq!(claims["role"], "Admin");
    assert_eq!(claims["userId"], 1);
    assert_eq!(claims["companyId"], ACME);
    assert_eq!(
        claims["exp"].as_i64().unwrap() - claims["iat"].as_i64().unwrap(),
        3600
    );
}

#[tokio::test]
async fn test_login_email_is_case_insensitive() {
    let (app, _) = test_app(auth_config()).await;

    let (status, body) = send(
        &app,
        post_json(
            "/auth/login",
            None,
            json!({"email": "  Login@Example.COM ", "password": "password123"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "Admin");
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let (app, _) = test_app(auth_config()).await;

    let (wrong_status, wrong_body) = send(
        &app,
        post_json(
            "/auth/login",
            None,
            json!({"email": "login@example.com", "password": "nope"}),
        ),
    )
    .await;
    let (unknown_status, unknown_body) = send(
        &app,
        post_json(
            "/auth/login",
            None,
            json!({"email": "ghost@example.com", "password": "nope"}),
        ),
    )
    .await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_status, unknown_status);
    assert_eq!(wrong_body, unknown_body);
    assert_eq!(wrong_body["message"], "Invalid email or password");
}

#[tokio::test]
async fn test_profile_reflects_token_identity() {
    let (app, _) = test_app(auth_config()).await;
    let token = login(&app, "manager@acme.test").await;

    let (status, body) = send(&app, get("/profile", Some(&token))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["userId"], 2);
    assert_eq!(body["role"], "Manager");
    assert_eq!(body["companyId"], ACME);
    assert_eq!(body["scope"]["kind"], "company");
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let (app, _) = test_app(auth_config()).await;

    let (status, body) = send(&app, get("/profile", None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Missing token");
}

#[tokio::test]
async fn test_non_bearer_scheme_is_missing_token() {
    let (app, _) = test_app(auth_config()).await;
    let request = Request::builder()
        .uri("/clients")
        .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Missing token");
}

#[tokio::test]
async fn test_garbage_token_is_forbidden() {
    let (app, _) = test_app(auth_config()).await;

    let (status, body) = send(&app, get("/profile", Some("invalid-token"))).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Invalid or expired token");
}

#[tokio::test]
async fn test_token_from_other_secret_is_forbidden() {
    let (app, _) = test_app(auth_config()).await;
    let other = AuthConfig {
        jwt_secret: Some(secrecy::SecretString::from(
            "a-completely-different-secret-of-sufficient-length".to_string(),
        )),
        ..auth_config()
    };
    let (other_app, _) = test_app(other).await;
    let foreign_token = login(&other_app, "login@example.com").await;

    let (status, body) = send(&app, get("/profile", Some(&foreign_token))).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Invalid or expired token");
}

#[tokio::test]
async fn test_zero_ttl_token_is_rejected_immediately() {
    let config = AuthConfig {
        token_ttl_secs: 0,
        ..auth_config()
    };
    let (app, _) = test_app(config).await;
    let token = login(&app, "login@example.com").await;

    let (status, body) = send(&app, get("/profile", Some(&token))).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Invalid or expired token");
}

#[tokio::test]
async fn test_employee_cannot_create_service_request() {
    let (app, _) = test_app(auth_config()).await;
    let token = login(&app, "employee@acme.test").await;

    let (status, body) = send(
        &app,
        post_json(
            "/service-requests",
            Some(&token),
            json!({"clientId": 1, "title": "Broken boiler"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Access denied: insufficient role");
}

#[tokio::test]
async fn test_employee_can_read_service_requests() {
    let (app, _) = test_app(auth_config()).await;
    let token = login(&app, "employee@acme.test").await;

    let (status, body) = send(&app, get("/service-requests", Some(&token))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn test_manager_creates_service_request() {
    let (app, _) = test_app(auth_config()).await;
    let token = login(&app, "manager@acme.test").await;

    let (status, client) = send(
        &app,
        post_json("/clients", Some(&token), json!({"name": "Initech"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, request) = send(
        &app,
        post_json(
            "/service-requests",
            Some(&token),
            json!({"clientId": client["id"], "title": "Annual inspection"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(request["companyId"], ACME);
    assert_eq!(request["createdBy"], 2);
    assert_eq!(request["status"], "open");
}

#[tokio::test]
async fn test_invalid_client_body_is_bad_request() {
    let (app, _) = test_app(auth_config()).await;
    let token = login(&app, "login@example.com").await;

    let (status, body) = send(
        &app,
        post_json(
            "/clients",
            Some(&token),
            json!({"name": "", "email": "not-an-email"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid request body");
    assert!(body["details"].get("name").is_some());
    assert!(body["details"].get("email").is_some());
}

#[tokio::test]
async fn test_login_is_rate_limited_per_ip() {
    let (state, store) = AppState::in_memory(&auth_config()).unwrap();
    seed_users(&store).await;
    let limited = RateLimitConfig {
        burst_size: 2,
        ..RateLimitConfig::per_minute(2)
    };
    let app = create_api_router(Arc::new(
        state.with_login_limiter(RateLimiter::new(limited)),
    ));

    let attempt = || {
        post_json(
            "/auth/login",
            None,
            json!({"email": "login@example.com", "password": "wrong"}),
        )
    };

    assert_eq!(send(&app, attempt()).await.0, StatusCode::UNAUTHORIZED);
    assert_eq!(send(&app, attempt()).await.0, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, attempt()).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["message"], "Too many requests");

    // 보호 라우트는 로그인 rate limit과 무관
    let (status, _) = send(&app, get("/profile", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

fn login_attempt_from(peer: [u8; 4], forwarded_for: Option<&str>) -> Request<Body> {
    let mut request = post_json("/auth/login", None, json!({}));
    request
        .extensions_mut()
        .insert(ConnectInfo(SocketAddr::from((peer, 40000))));
    if let Some(ip) = forwarded_for {
        request
            .headers_mut()
            .insert("x-forwarded-for", ip.parse().unwrap());
    }
    request
}

#[tokio::test(start_paused = true)]
async fn test_login_limiter_forgets_idle_clients() {
    let (state, _) = AppState::in_memory(&auth_config()).unwrap();
    let limiter = state.login_limiter.clone();
    let app = create_api_router(Arc::new(state));

    for n in 0..50u8 {
        let (status, _) = send(&app, login_attempt_from([10, 0, 1, n], None)).await;
        assert_ne!(status, StatusCode::TOO_MANY_REQUESTS);
    }
    assert_eq!(limiter.tracked_ips().await, 50);

    tokio::time::advance(Duration::from_secs(3600)).await;
    send(&app, login_attempt_from([10, 0, 2, 1], None)).await;

    assert_eq!(limiter.tracked_ips().await, 1);
}

#[tokio::test]
async fn test_forwarded_headers_ignored_by_default() {
    let config = AuthConfig {
        login_requests_per_minute: 6,
        ..auth_config()
    };
    let (state, _) = AppState::in_memory(&config).unwrap();
    let app = create_api_router(Arc::new(state));

    let (status, _) = send(&app, login_attempt_from([192, 0, 2, 1], Some("203.0.113.1"))).await;
    assert_ne!(status, StatusCode::TOO_MANY_REQUESTS);

    // 같은 연결 주소이므로 헤더가 달라도 같은 버킷
    let (status, _) = send(&app, login_attempt_from([192, 0, 2, 1], Some("203.0.113.2"))).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_forwarded_headers_used_when_trusted() {
    let config = AuthConfig {
        login_requests_per_minute: 6,
        trust_forwarded_headers: true,
        ..auth_config()
    };
    let (state, _) = AppState::in_memory(&config).unwrap();
    let app = create_api_router(Arc::new(state));

    let (status, _) = send(&app, login_attempt_from([192, 0, 2, 1], Some("203.0.113.1"))).await;
    assert_ne!(status, StatusCode::TOO_MANY_REQUESTS);
    let (status, _) = send(&app, login_attempt_from([192, 0, 2, 1], Some("203.0.113.2"))).await;
    assert_ne!(status, StatusCode::TOO_MANY_REQUESTS);

    let (status, _) = send(&app, login_attempt_from([192, 0, 2, 1], Some("203.0.113.1"))).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_create_without_token_is_missing_token() {
    let (app, _) = test_app(auth_config()).await;

    let (status, body) = send(
        &app,
        post_json(
            "/service-requests",
            None,
            json!({"clientId": 1, "title": "Broken boiler"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Missing token");
}
