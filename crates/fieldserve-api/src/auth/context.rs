//! 요청별 신원 컨텍스트.
//!
//! 토큰 검증을 통과한 Claims만 요청 extensions에 부착됩니다.

use axum::{extract::FromRequestParts, http::request::Parts};
use fieldserve_core::{CompanyId, Role, TenantScope, UserId};

use super::{AuthError, Claims};

/// 검증된 요청 신원.
///
/// 생성자는 auth 모듈 내부에만 공개되며 토큰 검증 성공 후에만 호출됩니다.
/// 요청 본문이나 쿼리에서 만들 수 없습니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityContext {
    claims: Claims,
}

impl IdentityContext {
    pub(super) fn from_verified(claims: Claims) -> Self {
        Self { claims }
    }

    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    pub fn user_id(&self) -> UserId {
        self.claims.user_id
    }

    pub fn role(&self) -> Role {
        self.claims.role
    }

    pub fn company_id(&self) -> CompanyId {
        self.claims.company_id
    }

    /// 호출자의 테넌트 범위.
    pub fn tenant_scope(&self) -> TenantScope {
        self.claims.tenant_scope()
    }
}

impl<S> FromRequestParts<S> for IdentityContext
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<IdentityContext>()
            .cloned()
            .ok_or(AuthError::Unauthorized)
    }
}
