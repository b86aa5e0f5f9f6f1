//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! AppState는 Arc로 래핑되어 여러 요청 간에 공유됩니다. 세션 저장소는 없으며,
//! 모든 필드는 시작 시 한 번 구성된 후 변경되지 않습니다.

use std::sync::Arc;

use fieldserve_core::{AuthConfig, CoreError};
use metrics_exporter_prometheus::PrometheusHandle;

use crate::auth::{AuthPipeline, CredentialVerifier, HashingPool, TokenIssuer, TokenVerifier};
use crate::middleware::{RateLimitConfig, RateLimiter};
use crate::store::{MemoryStore, PgStore, RecordStore, UserStore};

/// 애플리케이션 공유 상태.
#[derive(Clone)]
pub struct AppState {
    /// 업무 레코드 저장소 (고객, 서비스 요청)
    pub records: Arc<dyn RecordStore>,

    /// 자격 증명 검증기 (사용자 저장소 + 해시 작업자 풀)
    pub credentials: CredentialVerifier,

    /// 토큰 발급기
    pub issuer: Arc<TokenIssuer>,

    /// 토큰 검증기 - 모든 보호 라우트의 관문
    pub verifier: Arc<TokenVerifier>,

    /// 로그인 rate limiter
    pub login_limiter: RateLimiter,

    /// PostgreSQL 저장소 (헬스 체크용, 미설정 시 None)
    pub pg_store: Option<PgStore>,

    /// Prometheus 핸들 (`/metrics` 렌더링)
    pub metrics: Option<PrometheusHandle>,

    /// 서버 시작 시간 (업타임 계산용)
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    /// 새로운 AppState 생성.
    ///
    /// 서명 비밀키가 없거나 너무 짧으면 실패합니다.
    pub fn new(
        auth: &AuthConfig,
        users: Arc<dyn UserStore>,
        records: Arc<dyn RecordStore>,
    ) -> Result<Self, CoreError> {
        let secret = auth.signing_secret()?;
        let hashing = HashingPool::new(auth.hashing_workers());

        Ok(Self {
            records,
            credentials: CredentialVerifier::new(users, hashing),
            issuer: Arc::new(TokenIssuer::new(secret, auth.token_ttl_secs)),
            verifier: Arc::new(TokenVerifier::new(secret)),
            login_limiter: RateLimiter::new(RateLimitConfig {
                trust_forwarded_headers: auth.trust_forwarded_headers,
                ..RateLimitConfig::per_minute(auth.login_requests_per_minute)
            }),
            pg_store: None,
            metrics: None,
            started_at: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        })
    }

    /// PostgreSQL 저장소로 구성.
    pub fn with_postgres(auth: &AuthConfig, store: PgStore) -> Result<Self, CoreError> {
        let shared = Arc::new(store.clone());
        let mut state = Self::new(auth, shared.clone(), shared)?;
        state.pg_store = Some(store);
        Ok(state)
    }

    /// 인메모리 저장소로 구성 (개발 및 테스트용).
    ///
    /// 사용자/레코드 시드를 위해 저장소 핸들을 함께 반환합니다.
    pub fn in_memory(auth: &AuthConfig) -> Result<(Self, MemoryStore), CoreError> {
        let store = MemoryStore::new();
        let state = Self::new(auth, Arc::new(store.clone()), Arc::new(store.clone()))?;
        Ok((state, store))
    }

    /// Prometheus 핸들 설정.
    #[must_use]
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// 로그인 rate limiter 교체.
    #[must_use]
    pub fn with_login_limiter(mut self, limiter: RateLimiter) -> Self {
        self.login_limiter = limiter;
        self
    }

    /// 토큰 검증 단계로 시작하는 인증 파이프라인.
    pub fn auth_pipeline(&self) -> AuthPipeline {
        AuthPipeline::verify(self.verifier.clone())
    }

    /// 서버 업타임(초).
    pub fn uptime_secs(&self) -> i64 {
        (chrono::Utc::now() - self.started_at).num_seconds()
    }

    /// 데이터베이스 연결 상태 확인. 미설정이면 `None`.
    pub async fn is_db_healthy(&self) -> Option<bool> {
        match &self.pg_store {
            Some(store) => Some(store.is_healthy().await),
            None => None,
        }
    }
}

#[cfg(test)]
pub(crate) fn test_auth_config() -> AuthConfig {
    use secrecy::SecretString;

    AuthConfig {
        jwt_secret: Some(SecretString::from(
            "test-secret-key-for-jwt-testing-minimum-32-chars".to_string(),
        )),
        ..AuthConfig::default()
    }
}
