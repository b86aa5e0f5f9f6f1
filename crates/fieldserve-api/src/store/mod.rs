//! 저장소 인터페이스.
//!
//! 사용자 저장소와 테넌트 범위 업무 레코드(고객, 서비스 요청) 저장소를 정의합니다.
//! 조회 연산은 항상 호출자 신원에서 도출된 [`TenantScope`]를 받으며,
//! 생성 연산은 범위 정책으로 이미 결정된 회사 ID를 받습니다.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fieldserve_core::{CompanyId, TenantScope, UserId, UserRecord};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// 저장소 에러.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("데이터베이스 에러: {0}")]
    Database(#[from] sqlx::Error),
    #[error("저장소를 사용할 수 없습니다: {0}")]
    Unavailable(String),
}

/// 고객 레코드.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ClientRecord {
    pub id: i64,
    pub company_id: i64,
    pub name: String,
    #[sqlx(default)]
    pub email: Option<String>,
    #[sqlx(default)]
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// 새 고객 입력.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewClient {
    #[validate(length(min = 1, max = 200, message = "name must be 1-200 characters"))]
    pub name: String,
    #[serde(default)]
    #[validate(email(message = "email must be a valid address"))]
    pub email: Option<String>,
    #[serde(default)]
    #[validate(length(max = 40, message = "phone must be at most 40 characters"))]
    pub phone: Option<String>,
    /// 대상 회사. 교차 테넌트 역할만 다른 회사를 지정할 수 있습니다.
    #[serde(default)]
    pub company_id: Option<CompanyId>,
}

/// 서비스 요청 레코드.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequestRecord {
    pub id: i64,
    pub company_id: i64,
    pub client_id: i64,
    pub title: String,
    #[sqlx(default)]
    pub description: Option<String>,
    pub status: String,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
}

/// 새 서비스 요청 입력.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewServiceRequest {
    pub client_id: i64,
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 4000, message = "description must be at most 4000 characters"))]
    pub description: Option<String>,
    #[serde(default)]
    pub company_id: Option<CompanyId>,
}

/// 서비스 요청의 초기 상태.
pub const INITIAL_REQUEST_STATUS: &str = "open";

/// 사용자 저장소.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// 이메일로 사용자 조회 (대소문자 무시).
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;
}

/// 테넌트 범위 업무 레코드 저장소.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// 범위 안의 고객 목록.
    async fn list_clients(&self, scope: &TenantScope) -> Result<Vec<ClientRecord>, StoreError>;

    /// 회사에 고객 추가.
    async fn create_client(
        &self,
        company_id: CompanyId,
        input: &NewClient,
    ) -> Result<ClientRecord, StoreError>;

    /// 범위 안의 서비스 요청 목록.
    async fn list_service_requests(
        &self,
        scope: &TenantScope,
    ) -> Result<Vec<ServiceRequestRecord>, StoreError>;

    /// 회사에 서비스 요청 추가.
    ///
    /// 고객이 해당 회사 소속이 아니면 `None`을 반환합니다.
    async fn create_service_request(
        &self,
        company_id: CompanyId,
        created_by: UserId,
        input: &NewServiceRequest,
    ) -> Result<Option<ServiceRequestRecord>, StoreError>;
}

/// 이메일 정규화 (공백 제거 + 소문자).
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
