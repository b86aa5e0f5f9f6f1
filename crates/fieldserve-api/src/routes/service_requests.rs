//! 서비스 요청 endpoint.
//!
//! - `GET /service-requests?companyId=` - 인증된 모든 역할
//! - `POST /service-requests` - Admin, Manager, Supervisor, PlatformAdmin

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use fieldserve_core::Role;
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use super::clients::CompanyQuery;
use crate::auth::{auth_middleware, AuthPipeline, IdentityContext};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::store::{NewServiceRequest, ServiceRequestRecord};

/// 서비스 요청을 생성할 수 있는 역할.
pub const REQUEST_CREATORS: [Role; 4] = [
    Role::Admin,
    Role::Manager,
    Role::Supervisor,
    Role::PlatformAdmin,
];

/// 서비스 요청 목록 응답.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequestListResponse {
    pub service_requests: Vec<ServiceRequestRecord>,
    pub total: usize,
}

/// GET /service-requests
pub async fn list_service_requests(
    State(state): State<Arc<AppState>>,
    identity: IdentityContext,
    query: Result<Query<CompanyQuery>, QueryRejection>,
) -> ApiResult<Json<ServiceRequestListResponse>> {
    let Query(query) = query?;
    let scope = identity.tenant_scope().narrow(query.company_id)?;

    let service_requests = state.records.list_service_requests(&scope).await?;
    Ok(Json(ServiceRequestListResponse {
        total: service_requests.len(),
        service_requests,
    }))
}

/// POST /service-requests
///
/// 고객이 대상 회사 소속이 아니면 404를 반환합니다.
pub async fn create_service_request(
    State(state): State<Arc<AppState>>,
    identity: IdentityContext,
    payload: Result<Json<NewServiceRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ServiceRequestRecord>)> {
    let Json(input) = payload?;
    input.validate()?;

    let company_id = identity.tenant_scope().write_target(input.company_id)?;
    let request = state
        .records
        .create_service_request(company_id, identity.user_id(), &input)
        .await?
        .ok_or(ApiError::NotFound("Client"))?;

    info!(
        request_id = request.id,
        client_id = request.client_id,
        company_id = %company_id,
        user_id = %identity.user_id(),
        "Service request created"
    );
    Ok((StatusCode::CREATED, Json(request)))
}

/// 서비스 요청 라우터.
///
/// 조회는 토큰 검증만, 생성은 같은 파이프라인에 역할 단계를 더해 적용합니다.
pub fn service_requests_router(pipeline: AuthPipeline) -> Router<Arc<AppState>> {
    let any_role = middleware::from_fn_with_state(pipeline.clone(), auth_middleware);
    let creators_only = middleware::from_fn_with_state(
        pipeline.authorize(REQUEST_CREATORS),
        auth_middleware,
    );

    Router::new().route(
        "/service-requests",
        get(list_service_requests)
            .route_layer(any_role)
            .merge(post(create_service_request).route_layer(creators_only)),
    )
}
