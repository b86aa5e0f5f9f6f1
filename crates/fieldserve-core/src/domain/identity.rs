//! 사용자 신원.
//!
//! 사용자 저장소의 원시 레코드와 검증된 신원을 구분합니다.

use serde::{Deserialize, Serialize};

use super::Role;
use crate::CoreError;

/// 사용자 ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

/// 회사(테넌트) ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompanyId(pub i64);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for CompanyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 자격 증명 검증을 통과한 사용자 신원.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub email: String,
    pub role: Role,
    pub company_id: CompanyId,
}

/// 사용자 저장소가 반환하는 원시 레코드.
///
/// `role`은 저장소에 기록된 문자열 그대로이며,
/// [`UserRecord::into_identity`]에서 [`Role`]로 검증됩니다.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: i64,
    pub email: String,
    /// PHC 형식 비밀번호 해시
    pub password_hash: String,
    pub role: String,
    pub company_id: i64,
}

impl UserRecord {
    /// 검증된 신원으로 변환.
    ///
    /// 알 수 없는 역할 문자열이면 에러를 반환합니다.
    pub fn into_identity(self) -> Result<Identity, CoreError> {
        let role = self.role.parse::<Role>()?;
        Ok(Identity {
            user_id: UserId(self.id),
            email: self.email,
            role,
            company_id: CompanyId(self.company_id),
        })
    }
}
