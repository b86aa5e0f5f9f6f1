//! PostgreSQL 저장소.
//!
//! 스키마는 `migrations/001_auth_schema.sql` 참고.

use async_trait::async_trait;
use fieldserve_core::{CompanyId, TenantScope, UserId, UserRecord};
use sqlx::{FromRow, PgPool};

use super::{
    normalize_email, ClientRecord, NewClient, NewServiceRequest, RecordStore,
    ServiceRequestRecord, StoreError, UserStore, INITIAL_REQUEST_STATUS,
};

/// users 테이블 행.
#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    email: String,
    password_hash: String,
    role: String,
    company_id: i64,
}

impl From<UserRow> for UserRecord {
    fn from(row: UserRow) -> Self {
        UserRecord {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            role: row.role,
            company_id: row.company_id,
        }
    }
}

/// PostgreSQL 저장소.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// 연결 상태 확인.
    pub async fn is_healthy(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, password_hash, role, company_id
            FROM users
            WHERE lower(email) = $1
            "#,
        )
        .bind(normalize_email(email))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(UserRecord::from))
    }
}

#[async_trait]
impl RecordStore for PgStore {
    async fn list_clients(&self, scope: &TenantScope) -> Result<Vec<ClientRecord>, StoreError> {
        let records = sqlx::query_as::<_, ClientRecord>(
            r#"
            SELECT id, company_id, name, email, phone, created_at
            FROM clients
            WHERE ($1::BIGINT IS NULL OR company_id = $1)
            ORDER BY id
            "#,
        )
        .bind(scope.company_filter().map(|c| c.0))
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn create_client(
        &self,
        company_id: CompanyId,
        input: &NewClient,
    ) -> Result<ClientRecord, StoreError> {
        let record = sqlx::query_as::<_, ClientRecord>(
            r#"
            INSERT INTO clients (company_id, name, email, phone)
            VALUES ($1, $2, $3, $4)
            RETURNING id, company_id, name, email, phone, created_at
            "#,
        )
        .bind(company_id.0)
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.phone)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    async fn list_service_requests(
        &self,
        scope: &TenantScope,
    ) -> Result<Vec<ServiceRequestRecord>, StoreError> {
        let records = sqlx::query_as::<_, ServiceRequestRecord>(
            r#"
            SELECT id, company_id, client_id, title, description, status, created_by, created_at
            FROM service_requests
            WHERE ($1::BIGINT IS NULL OR company_id = $1)
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(scope.company_filter().map(|c| c.0))
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn create_service_request(
        &self,
        company_id: CompanyId,
        created_by: UserId,
        input: &NewServiceRequest,
    ) -> Result<Option<ServiceRequestRecord>, StoreError> {
        // 고객이 같은 회사 소속일 때만 INSERT
        let record = sqlx::query_as::<_, ServiceRequestRecord>(
            r#"
            INSERT INTO service_requests (company_id, client_id, title, description, status, created_by)
            SELECT $1, c.id, $3, $4, $5, $6
            FROM clients c
            WHERE c.id = $2 AND c.company_id = $1
            RETURNING id, company_id, client_id, title, description, status, created_by, created_at
            "#,
        )
        .bind(company_id.0)
        .bind(input.client_id)
        .bind(&input.title)
        .bind(&input.description)
        .bind(INITIAL_REQUEST_STATUS)
        .bind(created_by.0)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }
}
