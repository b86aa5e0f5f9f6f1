//! Axum용 인증/인가 미들웨어.
//!
//! 보호된 라우트는 순서가 고정된 단계를 거칩니다:
//!
//! 1. 토큰 검증 → [`IdentityContext`] 부착
//! 2. (선택) 역할 검사 → 허용 목록에 없으면 `InsufficientRole`
//!
//! 역할 검사는 `IdentityContext`를 입력으로 받기 때문에 토큰 검증 없이 통과할 수 없습니다.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use fieldserve_core::{Role, RoleSet};
use tracing::{debug, warn};

use super::{AuthError, IdentityContext, TokenVerifier};
use crate::metrics::record_token_verification;

/// 역할 기반 인가 검사.
#[derive(Debug, Clone)]
pub struct RoleAuthorizer {
    allowed: RoleSet,
}

/// 허용 역할 목록으로 인가 검사 생성.
///
/// ```rust,ignore
/// let guard = authorize([Role::Admin, Role::Manager, Role::Supervisor]);
/// ```
pub fn authorize(roles: impl IntoIterator<Item = Role>) -> RoleAuthorizer {
    RoleAuthorizer {
        allowed: roles.into_iter().collect(),
    }
}

impl RoleAuthorizer {
    pub fn allowed(&self) -> &RoleSet {
        &self.allowed
    }

    /// 인가 검사.
    ///
    /// 컨텍스트가 없으면 선행 단계 누락이므로 `Unauthorized`,
    /// 역할이 허용 목록에 없으면 `InsufficientRole`.
    pub fn check(&self, context: Option<&IdentityContext>) -> Result<(), AuthError> {
        let context = context.ok_or(AuthError::Unauthorized)?;

        if self.allowed.contains(context.role()) {
            Ok(())
        } else {
            warn!(
                user_id = %context.user_id(),
                role = %context.role(),
                "Access denied: insufficient role"
            );
            Err(AuthError::InsufficientRole)
        }
    }
}

/// 인증 파이프라인.
///
/// 토큰 검증 단계는 항상 먼저 실행되며, 역할 단계는 선택입니다.
#[derive(Clone)]
pub struct AuthPipeline {
    verifier: Arc<TokenVerifier>,
    role_stage: Option<RoleAuthorizer>,
}

impl AuthPipeline {
    /// 토큰 검증 단계로 시작.
    pub fn verify(verifier: Arc<TokenVerifier>) -> Self {
        Self {
            verifier,
            role_stage: None,
        }
    }

    /// 역할 검사 단계 추가. 여러 번 호출하면 허용 역할이 합쳐집니다.
    #[must_use]
    pub fn authorize(mut self, roles: impl IntoIterator<Item = Role>) -> Self {
        let merged = match self.role_stage.take() {
            Some(existing) => authorize(existing.allowed.iter().chain(roles)),
            None => authorize(roles),
        };
        self.role_stage = Some(merged);
        self
    }

    /// 파이프라인 실행.
    pub fn run(&self, headers: &HeaderMap, now: DateTime<Utc>) -> Result<IdentityContext, AuthError> {
        let authorization = headers.get(AUTHORIZATION).and_then(|h| h.to_str().ok());

        let claims = self.verifier.verify(authorization, now);
        record_token_verification(match &claims {
            Ok(_) => "valid",
            Err(e) => e.label(),
        });
        let context = IdentityContext::from_verified(claims?);

        if let Some(role_stage) = &self.role_stage {
            role_stage.check(Some(&context))?;
        }

        debug!(
            user_id = %context.user_id(),
            company_id = %context.company_id(),
            role = %context.role(),
            "Request authenticated"
        );
        Ok(context)
    }
}

/// 인증 파이프라인 미들웨어.
///
/// `axum::middleware::from_fn_with_state(pipeline, auth_middleware)`로 적용합니다.
pub async fn auth_middleware(
    State(pipeline): State<AuthPipeline>,
    mut request: Request,
    next: Next,
) -> Response {
    match pipeline.run(request.headers(), Utc::now()) {
        Ok(context) => {
            request.extensions_mut().insert(context);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

/// 단독 역할 검사 미들웨어.
///
/// `auth_middleware` 뒤에 적용해야 합니다. 앞 단계가 없으면 `Unauthorized`를 반환합니다.
pub async fn role_middleware(
    State(authorizer): State<RoleAuthorizer>,
    request: Request,
    next: Next,
) -> Response {
    match authorizer.check(request.extensions().get::<IdentityContext>()) {
        Ok(()) => next.run(request).await,
        Err(e) => e.into_response(),
    }
}
