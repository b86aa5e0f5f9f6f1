//! 메모리 저장소.
//!
//! 데이터베이스가 설정되지 않은 개발 환경과 테스트에서 사용합니다.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use fieldserve_core::{CompanyId, TenantScope, UserId, UserRecord};
use tokio::sync::RwLock;

use super::{
    normalize_email, ClientRecord, NewClient, NewServiceRequest, RecordStore,
    ServiceRequestRecord, StoreError, UserStore, INITIAL_REQUEST_STATUS,
};

/// 메모리 저장소.
#[derive(Clone, Default)]
pub struct MemoryStore {
    users: Arc<RwLock<HashMap<String, UserRecord>>>,
    clients: Arc<RwLock<Vec<ClientRecord>>>,
    service_requests: Arc<RwLock<Vec<ServiceRequestRecord>>>,
    next_id: Arc<AtomicI64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 사용자 추가 (같은 이메일이면 교체).
    pub async fn insert_user(&self, user: UserRecord) {
        self.users
            .write()
            .await
            .insert(normalize_email(&user.email), user);
    }

    /// 저장된 사용자 수.
    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }

    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.users.read().await.get(&normalize_email(email)).cloned())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn list_clients(&self, scope: &TenantScope) -> Result<Vec<ClientRecord>, StoreError> {
        let clients = self.clients.read().await;
        Ok(clients
            .iter()
            .filter(|c| scope.permits(CompanyId(c.company_id)))
            .cloned()
            .collect())
    }

    async fn create_client(
        &self,
        company_id: CompanyId,
        input: &NewClient,
    ) -> Result<ClientRecord, StoreError> {
        let record = ClientRecord {
            id: self.next_id(),
            company_id: company_id.0,
            name: input.name.clone(),
            email: input.email.clone(),
            phone: input.phone.clone(),
            created_at: Utc::now(),
        };
        self.clients.write().await.push(record.clone());
        Ok(record)
    }

    async fn list_service_requests(
        &self,
        scope: &TenantScope,
    ) -> Result<Vec<ServiceRequestRecord>, StoreError> {
        let requests = self.service_requests.read().await;
        Ok(requests
            .iter()
            .filter(|r| scope.permits(CompanyId(r.company_id)))
            .cloned()
            .collect())
    }

    async fn create_service_request(
        &self,
        company_id: CompanyId,
        created_by: UserId,
        input: &NewServiceRequest,
    ) -> Result<Option<ServiceRequestRecord>, StoreError> {
        let client_in_company = self
            .clients
            .read()
            .await
            .iter()
            .any(|c| c.id == input.client_id && c.company_id == company_id.0);
        if !client_in_company {
            return Ok(None);
        }

        let record = ServiceRequestRecord {
            id: self.next_id(),
            company_id: company_id.0,
            client_id: input.client_id,
            title: input.title.clone(),
            description: input.description.clone(),
            status: INITIAL_REQUEST_STATUS.to_string(),
            created_by: created_by.0,
            created_at: Utc::now(),
        };
        self.service_requests.write().await.push(record.clone());
        Ok(Some(record))
    }
}
