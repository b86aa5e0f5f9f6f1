//! 테넌트(회사) 범위 정책.
//!
//! 모든 데이터 접근 연산은 호출자 신원에서 도출된 [`TenantScope`]를 받습니다.
//! 요청 본문이나 쿼리의 회사 ID는 범위를 좁히는 용도로만 쓰이며,
//! 범위를 넓힐 수 없습니다.

use serde::Serialize;
use thiserror::Error;

use super::{CompanyId, Role};

/// 테넌트 범위 위반.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TenantScopeError {
    /// 다른 회사의 리소스에 접근 시도
    #[error("회사 {requested}에 대한 접근 권한이 없습니다 (소속: {own})")]
    CrossTenant { own: CompanyId, requested: CompanyId },
}

/// 호출자의 데이터 조회 범위.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TenantScope {
    /// 단일 회사로 제한
    Company { company_id: CompanyId },
    /// 모든 회사 조회 가능 (`home`은 호출자 소속 회사)
    AllCompanies { home: CompanyId },
}

impl TenantScope {
    /// 호출자의 역할과 소속 회사로 범위 결정.
    pub fn for_caller(role: Role, company_id: CompanyId) -> Self {
        if role.has_cross_tenant_visibility() {
            TenantScope::AllCompanies { home: company_id }
        } else {
            TenantScope::Company { company_id }
        }
    }

    /// 호출자 소속 회사.
    pub fn home(&self) -> CompanyId {
        match *self {
            TenantScope::Company { company_id } => company_id,
            TenantScope::AllCompanies { home } => home,
        }
    }

    /// 저장소 쿼리에 적용할 회사 필터. `None`이면 필터 없음.
    pub fn company_filter(&self) -> Option<CompanyId> {
        match *self {
            TenantScope::Company { company_id } => Some(company_id),
            TenantScope::AllCompanies { .. } => None,
        }
    }

    /// 해당 회사의 리소스를 볼 수 있는지 확인.
    pub fn permits(&self, company_id: CompanyId) -> bool {
        match *self {
            TenantScope::Company { company_id: own } => own == company_id,
            TenantScope::AllCompanies { .. } => true,
        }
    }

    /// 요청에 포함된 회사 필터를 적용한 조회 범위.
    pub fn narrow(&self, requested: Option<CompanyId>) -> Result<TenantScope, TenantScopeError> {
        match (*self, requested) {
            (scope, None) => Ok(scope),
            (TenantScope::Company { company_id }, Some(requested)) if requested == company_id => {
                Ok(*self)
            }
            (TenantScope::Company { company_id }, Some(requested)) => {
                Err(TenantScopeError::CrossTenant {
                    own: company_id,
                    requested,
                })
            }
            (TenantScope::AllCompanies { .. }, Some(requested)) => Ok(TenantScope::Company {
                company_id: requested,
            }),
        }
    }

    /// 새 레코드를 기록할 회사 결정.
    pub fn write_target(&self, requested: Option<CompanyId>) -> Result<CompanyId, TenantScopeError> {
        match requested {
            None => Ok(self.home()),
            Some(requested) if self.permits(requested) => Ok(requested),
            Some(requested) => Err(TenantScopeError::CrossTenant {
                own: self.home(),
                requested,
            }),
        }
    }
}
