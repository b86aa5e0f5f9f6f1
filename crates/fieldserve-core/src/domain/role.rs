//! 역할 기반 접근 제어 (RBAC).
//!
//! 사용자 역할 및 허용 역할 집합 정의.

use std::collections::HashSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// 사용자 역할.
///
/// 토큰 발급 시점에 검증된 닫힌 집합입니다. 토큰 페이로드에는
/// 변형 이름 그대로(`"Admin"`) 직렬화됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// 플랫폼 관리자 - 모든 회사 데이터 조회 가능
    PlatformAdmin,
    /// 회사 관리자
    Admin,
    /// 매니저
    Manager,
    /// 감독자
    Supervisor,
    /// 일반 직원
    Employee,
}

impl Role {
    /// 정의된 모든 역할.
    pub const ALL: [Role; 5] = [
        Role::PlatformAdmin,
        Role::Admin,
        Role::Manager,
        Role::Supervisor,
        Role::Employee,
    ];

    /// 문자열에서 역할 파싱 (대소문자 무시).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "platformadmin" | "platform_admin" => Some(Role::PlatformAdmin),
            "admin" => Some(Role::Admin),
            "manager" => Some(Role::Manager),
            "supervisor" => Some(Role::Supervisor),
            "employee" => Some(Role::Employee),
            _ => None,
        }
    }

    /// 직렬화에 쓰이는 역할 이름.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::PlatformAdmin => "PlatformAdmin",
            Role::Admin => "Admin",
            Role::Manager => "Manager",
            Role::Supervisor => "Supervisor",
            Role::Employee => "Employee",
        }
    }

    /// 다른 회사의 데이터까지 볼 수 있는 역할인지 확인.
    pub fn has_cross_tenant_visibility(&self) -> bool {
        matches!(self, Role::PlatformAdmin)
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::parse(s).ok_or_else(|| CoreError::UnknownRole(s.to_string()))
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 허용 역할 집합.
///
/// 나열된 역할 중 하나라도 일치하면 허용합니다 (합집합).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleSet(HashSet<Role>);

impl RoleSet {
    /// 빈 집합 생성. 빈 집합은 어떤 역할도 허용하지 않습니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 역할 추가.
    #[must_use]
    pub fn with(mut self, role: Role) -> Self {
        self.0.insert(role);
        self
    }

    /// 역할 포함 여부.
    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// 집합의 역할 순회.
    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[Role; N]> for RoleSet {
    fn from(roles: [Role; N]) -> Self {
        roles.into_iter().collect()
    }
}
