//! 로그인 endpoint.
//!
//! `POST /auth/login` - 이메일/비밀번호를 검증하고 서명 토큰을 발급합니다.
//! 클라이언트 IP별 rate limit이 적용됩니다.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    middleware,
    routing::post,
    Json, Router,
};
use chrono::Utc;
use fieldserve_core::Role;
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use validator::Validate;

use crate::auth::AuthError;
use crate::error::ApiResult;
use crate::metrics::record_login;
use crate::middleware::{rate_limit_middleware, RateLimiter};
use crate::state::AppState;

/// 로그인 요청.
///
/// 누락된 필드는 빈 문자열로 받아 `MissingCredentials`로 처리합니다.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(length(max = 254, message = "email must be at most 254 characters"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(max = 1024, message = "password must be at most 1024 characters"))]
    pub password: String,
}

/// 로그인 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub role: Role,
}

/// 로그인.
///
/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let Json(request) = payload?;
    request.validate()?;

    let identity = match state
        .credentials
        .verify(&request.email, &request.password)
        .await
    {
        Ok(identity) => identity,
        Err(e) => {
            record_login(e.label());
            return Err(e.into());
        }
    };

    let issued = state.issuer.issue(&identity, Utc::now()).map_err(|e| {
        error!(user_id = %identity.user_id, error = %e, "Token issuance failed");
        record_login("issue_failed");
        AuthError::UpstreamUnavailable
    })?;

    record_login("success");
    info!(
        user_id = %identity.user_id,
        company_id = %identity.company_id,
        role = %identity.role,
        outcome = "success",
        "Login succeeded"
    );

    Ok(Json(LoginResponse {
        token: issued.token,
        role: identity.role,
    }))
}

/// 로그인 라우터 생성 (rate limit 포함).
pub fn auth_router(limiter: RateLimiter) -> Router<Arc<AppState>> {
    Router::new().route(
        "/auth/login",
        post(login).route_layer(middleware::from_fn_with_state(
            limiter,
            rate_limit_middleware,
        )),
    )
}
