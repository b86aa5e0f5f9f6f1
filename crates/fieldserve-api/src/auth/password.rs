//! 비밀번호 해싱 유틸리티.
//!
//! Argon2id 기반 비밀번호 해싱 및 검증. 해시 연산은 CPU 비용이 크므로
//! [`HashingPool`]을 통해 blocking 스레드에서 제한된 동시성으로 실행합니다.

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use tokio::sync::Semaphore;

/// 존재하지 않는 계정에 대해 검증할 더미 해시 (Argon2 기본 파라미터).
///
/// 알 수 없는 이메일도 실제 계정과 같은 비용을 치르게 합니다.
pub(crate) const DUMMY_PASSWORD_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

/// 비밀번호 처리 에러.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("비밀번호 해싱 실패")]
    HashingFailed,
    #[error("비밀번호 검증 실패")]
    VerificationFailed,
    #[error("잘못된 해시 형식")]
    InvalidHashFormat,
    #[error("해시 작업자를 사용할 수 없습니다")]
    WorkerUnavailable,
}

/// 비밀번호 해싱.
///
/// 솔트는 자동으로 생성되며 PHC 형식 문자열을 반환합니다.
///
/// ```rust,ignore
/// let hash = hash_password("my_secure_password").unwrap();
/// // "$argon2id$v=19$m=19456,t=2,p=1$..."
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| PasswordError::HashingFailed)?;

    Ok(hash.to_string())
}

/// 비밀번호 검증.
///
/// 일치하면 Ok(()), 불일치하면 `VerificationFailed`.
pub fn verify_password(password: &str, hash: &str) -> Result<(), PasswordError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHashFormat)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| PasswordError::VerificationFailed)
}

/// 비밀번호 해시 작업 풀.
///
/// 세마포어로 동시 실행 수를 제한하고 `spawn_blocking`에서 실행합니다.
/// 로그인 폭주 시 요청은 세마포어에서 대기하며, 토큰 검증 경로는 영향을 받지 않습니다.
#[derive(Clone)]
pub struct HashingPool {
    permits: Arc<Semaphore>,
    workers: usize,
}

impl HashingPool {
    /// 동시 실행 수를 지정해 생성 (최소 1).
    pub fn new(workers: usize) -> Self {
        let workers = workers.max(1);
        Self {
            permits: Arc::new(Semaphore::new(workers)),
            workers,
        }
    }

    /// 최대 동시 실행 수.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// 현재 사용 가능한 작업자 수.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// 작업자에서 비밀번호 검증.
    pub async fn verify(&self, password: String, hash: String) -> Result<(), PasswordError> {
        self.run(move || verify_password(&password, &hash)).await
    }

    /// 작업자에서 비밀번호 해싱.
    pub async fn hash(&self, password: String) -> Result<String, PasswordError> {
        self.run(move || hash_password(&password)).await
    }

    async fn run<T, F>(&self, job: F) -> Result<T, PasswordError>
    where
        F: FnOnce() -> Result<T, PasswordError> + Send + 'static,
        T: Send + 'static,
    {
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| PasswordError::WorkerUnavailable)?;

        tokio::task::spawn_blocking(move || {
            // 요청이 취소되어도 작업이 끝날 때까지 슬롯 유지
            let _permit = permit;
            job()
        })
        .await
        .map_err(|_| PasswordError::WorkerUnavailable)?
    }
}
