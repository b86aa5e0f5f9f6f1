//! API 핸들러 에러 타입.
//!
//! 인증 에러([`AuthError`])와 입력 검증, 저장소 에러를 하나의 응답 형식으로 통합합니다.
//! 모든 에러 응답은 `{"message": ...}` 형태이며, 검증 에러만 `details`를 추가로 포함합니다.
//!
//! ```json
//! { "message": "Invalid request body", "details": { "name": [ ... ] } }
//! ```

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use fieldserve_core::TenantScopeError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::ValidationErrors;

use crate::auth::AuthError;
use crate::store::StoreError;

/// API 에러 응답 본문.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// 사람이 읽을 수 있는 에러 메시지
    pub message: String,
    /// 추가 에러 상세 정보 (검증 에러)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// API 핸들러 에러.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("입력 검증 실패: {0}")]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    MalformedBody(#[from] JsonRejection),

    #[error(transparent)]
    MalformedQuery(#[from] QueryRejection),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<TenantScopeError> for ApiError {
    fn from(err: TenantScopeError) -> Self {
        Self::Auth(err.into())
    }
}

impl ApiError {
    /// HTTP 상태 코드.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Auth(e) => e.status_code(),
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::MalformedBody(e) => e.status(),
            Self::MalformedQuery(e) => e.status(),
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            Self::Auth(e) => return e.into_response(),
            Self::Validation(ref errors) => ApiErrorResponse {
                message: "Invalid request body".to_string(),
                details: serde_json::to_value(errors).ok(),
            },
            Self::MalformedBody(ref e) => ApiErrorResponse {
                message: e.body_text(),
                details: None,
            },
            Self::MalformedQuery(ref e) => ApiErrorResponse {
                message: e.body_text(),
                details: None,
            },
            Self::NotFound(resource) => ApiErrorResponse {
                message: format!("{} not found", resource),
                details: None,
            },
            Self::Store(ref e) => {
                tracing::error!(error = %e, "Store operation failed");
                ApiErrorResponse {
                    message: "Internal server error".to_string(),
                    details: None,
                }
            }
        };

        (status, Json(body)).into_response()
    }
}

/// API 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<T, ApiError>;
