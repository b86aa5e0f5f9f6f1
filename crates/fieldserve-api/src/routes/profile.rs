//! 호출자 프로필 endpoint.
//!
//! 신원 정보는 검증된 [`IdentityContext`]에서만 읽습니다.

use std::sync::Arc;

use axum::{routing::get, Json, Router};
use chrono::{DateTime, TimeZone, Utc};
use fieldserve_core::{CompanyId, Role, TenantScope, UserId};
use serde::Serialize;

use crate::auth::IdentityContext;
use crate::state::AppState;

/// 프로필 응답.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub user_id: UserId,
    pub role: Role,
    pub company_id: CompanyId,
    pub scope: TenantScope,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// GET /profile
pub async fn get_profile(identity: IdentityContext) -> Json<ProfileResponse> {
    Json(ProfileResponse {
        user_id: identity.user_id(),
        role: identity.role(),
        company_id: identity.company_id(),
        scope: identity.tenant_scope(),
        expires_at: Utc.timestamp_opt(identity.claims().exp, 0).single(),
    })
}

pub fn profile_router() -> Router<Arc<AppState>> {
    Router::new().route("/profile", get(get_profile))
}
