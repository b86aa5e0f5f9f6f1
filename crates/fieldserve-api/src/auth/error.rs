//! 인증/인가 에러.
//!
//! 모든 실패는 고정된 상태 코드와 메시지로 변환되며,
//! 내부 원인(DB 에러, 서명 실패 사유 등)은 응답에 포함되지 않습니다.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use fieldserve_core::TenantScopeError;
use serde::{Deserialize, Serialize};

/// 인증/인가 에러.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// 이메일 또는 비밀번호 누락
    #[error("Email and password are required")]
    MissingCredentials,
    /// 알 수 없는 이메일 또는 비밀번호 불일치 (구분하지 않음)
    #[error("Invalid email or password")]
    InvalidCredentials,
    /// Authorization 헤더 없음 또는 Bearer 형식 아님
    #[error("Missing token")]
    MissingToken,
    /// 서명 불일치 또는 만료 (구분하지 않음)
    #[error("Invalid or expired token")]
    InvalidToken,
    /// 요청 컨텍스트에 검증된 신원이 없음 (미들웨어 순서 오류)
    #[error("Unauthorized")]
    Unauthorized,
    /// 허용 역할 목록에 없음
    #[error("Access denied: insufficient role")]
    InsufficientRole,
    /// 다른 회사의 리소스 접근 시도
    #[error("Access denied: resource belongs to another company")]
    CrossTenant,
    /// 사용자 저장소 등 외부 의존성 장애
    #[error("Internal server error")]
    UpstreamUnavailable,
}

impl AuthError {
    /// HTTP 상태 코드.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingCredentials => StatusCode::BAD_REQUEST,
            AuthError::InvalidCredentials
            | AuthError::MissingToken
            | AuthError::Unauthorized => StatusCode::UNAUTHORIZED,
            AuthError::InvalidToken | AuthError::InsufficientRole | AuthError::CrossTenant => {
                StatusCode::FORBIDDEN
            }
            AuthError::UpstreamUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 메트릭 라벨용 이름.
    pub fn label(&self) -> &'static str {
        match self {
            AuthError::MissingCredentials => "missing_credentials",
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::MissingToken => "missing_token",
            AuthError::InvalidToken => "invalid_token",
            AuthError::Unauthorized => "unauthorized",
            AuthError::InsufficientRole => "insufficient_role",
            AuthError::CrossTenant => "cross_tenant",
            AuthError::UpstreamUnavailable => "upstream_unavailable",
        }
    }
}

impl From<TenantScopeError> for AuthError {
    fn from(err: TenantScopeError) -> Self {
        tracing::warn!(error = %err, "Tenant scope violation");
        AuthError::CrossTenant
    }
}

/// 에러 응답 본문.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = Json(MessageResponse {
            message: self.to_string(),
        });
        (self.status_code(), body).into_response()
    }
}
