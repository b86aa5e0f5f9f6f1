//! 고객 endpoint.
//!
//! - `GET /clients?companyId=` - 호출자 범위 안의 고객 목록
//! - `POST /clients` - 고객 추가
//!
//! 쿼리/본문의 `companyId`는 호출자 범위를 좁히는 데만 쓰입니다.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use fieldserve_core::CompanyId;
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use crate::auth::IdentityContext;
use crate::error::ApiResult;
use crate::state::AppState;
use crate::store::{ClientRecord, NewClient};

/// 회사 필터 쿼리.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyQuery {
    pub company_id: Option<CompanyId>,
}

/// 고객 목록 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct ClientListResponse {
    pub clients: Vec<ClientRecord>,
    pub total: usize,
}

/// GET /clients
pub async fn list_clients(
    State(state): State<Arc<AppState>>,
    identity: IdentityContext,
    query: Result<Query<CompanyQuery>, QueryRejection>,
) -> ApiResult<Json<ClientListResponse>> {
    let Query(query) = query?;
    let scope = identity.tenant_scope().narrow(query.company_id)?;

    let clients = state.records.list_clients(&scope).await?;
    Ok(Json(ClientListResponse {
        total: clients.len(),
        clients,
    }))
}

/// POST /clients
pub async fn create_client(
    State(state): State<Arc<AppState>>,
    identity: IdentityContext,
    payload: Result<Json<NewClient>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ClientRecord>)> {
    let Json(input) = payload?;
    input.validate()?;

    let company_id = identity.tenant_scope().write_target(input.company_id)?;
    let client = state.records.create_client(company_id, &input).await?;

    info!(
        client_id = client.id,
        company_id = %company_id,
        user_id = %identity.user_id(),
        "Client created"
    );
    Ok((StatusCode::CREATED, Json(client)))
}

pub fn clients_router() -> Router<Arc<AppState>> {
    Router::new().route("/clients", get(list_clients).post(create_client))
}
