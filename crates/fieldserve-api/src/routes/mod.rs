//! API 라우트.
//!
//! # 라우트 구조
//!
//! - `POST /auth/login` - 로그인 (IP별 rate limit)
//! - `GET /profile` - 호출자 신원
//! - `GET|POST /clients` - 고객 (테넌트 범위)
//! - `GET|POST /service-requests` - 서비스 요청 (생성은 역할 제한)
//! - `/health`, `/health/ready` - 헬스 체크
//! - `/metrics` - Prometheus 메트릭
//!
//! `/auth/login`, `/health`, `/metrics`를 제외한 모든 라우트는
//! 토큰 검증 미들웨어를 통과해야 합니다.

pub mod auth;
pub mod clients;
pub mod health;
pub mod profile;
pub mod service_requests;

pub use auth::{auth_router, LoginRequest, LoginResponse};
pub use clients::{clients_router, ClientListResponse, CompanyQuery};
pub use health::{health_router, HealthResponse};
pub use profile::{profile_router, ProfileResponse};
pub use service_requests::{service_requests_router, ServiceRequestListResponse, REQUEST_CREATORS};

use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::sync::Arc;

use crate::auth::auth_middleware;
use crate::middleware::metrics_layer;
use crate::state::AppState;

/// 전체 API 라우터 생성.
///
/// 보호 라우트에는 `route_layer`로 인증 파이프라인을 적용하므로
/// 존재하지 않는 경로는 인증 없이 404를 반환합니다. 역할 제한 라우트는
/// 역할 단계가 포함된 파이프라인을 직접 받습니다.
pub fn create_api_router(state: Arc<AppState>) -> Router {
    let pipeline = state.auth_pipeline();
    let protected = Router::new()
        .merge(profile_router())
        .merge(clients_router())
        .route_layer(middleware::from_fn_with_state(
            pipeline.clone(),
            auth_middleware,
        ))
        .merge(service_requests_router(pipeline));

    Router::new()
        .merge(auth_router(state.login_limiter.clone()))
        .merge(protected)
        .merge(health_router())
        .route("/metrics", get(metrics_handler))
        .layer(middleware::from_fn(metrics_layer))
        .with_state(state)
}

/// /metrics 엔드포인트 핸들러.
async fn metrics_handler(State(state): State<Arc<AppState>>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
