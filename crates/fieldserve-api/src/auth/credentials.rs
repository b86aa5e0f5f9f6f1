//! 자격 증명 검증.
//!
//! 이메일/비밀번호를 사용자 저장소의 레코드와 비교합니다.
//! 알 수 없는 이메일과 잘못된 비밀번호는 같은 에러로 보고하며,
//! 알 수 없는 이메일도 더미 해시로 동일한 해시 비용을 치릅니다.

use std::sync::Arc;

use fieldserve_core::Identity;
use tracing::{error, warn};

use super::password::{HashingPool, PasswordError, DUMMY_PASSWORD_HASH};
use super::AuthError;
use crate::store::{normalize_email, UserStore};

/// 자격 증명 검증기.
#[derive(Clone)]
pub struct CredentialVerifier {
    store: Arc<dyn UserStore>,
    hashing: HashingPool,
}

impl CredentialVerifier {
    pub fn new(store: Arc<dyn UserStore>, hashing: HashingPool) -> Self {
        Self { store, hashing }
    }

    /// 이메일/비밀번호 검증.
    ///
    /// 읽기 전용이며, 성공 시 검증된 [`Identity`]를 반환합니다.
    pub async fn verify(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let email = normalize_email(email);
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let record = self.store.find_by_email(&email).await.map_err(|e| {
            error!(error = %e, "User store lookup failed");
            AuthError::UpstreamUnavailable
        })?;

        let Some(record) = record else {
            // 계정 존재 여부가 응답 시간으로 드러나지 않도록 더미 해시 검증
            let _ = self
                .hashing
                .verify(password.to_string(), DUMMY_PASSWORD_HASH.to_string())
                .await;
            warn!(outcome = "invalid_credentials", "Login rejected");
            return Err(AuthError::InvalidCredentials);
        };

        match self
            .hashing
            .verify(password.to_string(), record.password_hash.clone())
            .await
        {
            Ok(()) => {}
            Err(PasswordError::VerificationFailed) => {
                warn!(outcome = "invalid_credentials", "Login rejected");
                return Err(AuthError::InvalidCredentials);
            }
            Err(PasswordError::InvalidHashFormat) => {
                // 파싱 실패는 즉시 끝나므로 정상 검증과 같은 비용을 치름
                let _ = self
                    .hashing
                    .verify(password.to_string(), DUMMY_PASSWORD_HASH.to_string())
                    .await;
                error!(user_id = record.id, "Stored password hash is malformed");
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => {
                error!(error = %e, "Password verification worker failed");
                return Err(AuthError::UpstreamUnavailable);
            }
        }

        let user_id = record.id;
        record.into_identity().map_err(|e| {
            error!(user_id, error = %e, "Stored role is not a known role");
            AuthError::InvalidCredentials
        })
    }
}
