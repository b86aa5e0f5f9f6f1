//! JWT 토큰 처리.
//!
//! HS256 서명 Access Token 발급 및 검증. 페이로드는 평문으로 읽을 수 있으므로
//! 비밀 정보를 담지 않습니다. 서버 측 세션이나 폐기 목록이 없으므로 유출된 토큰은
//! 만료 시각까지 유효합니다.

use chrono::{DateTime, Utc};
use fieldserve_core::{CompanyId, Identity, Role, TenantScope, UserId};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::AuthError;

/// 기본 토큰 유효 시간 (1시간).
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 3600;

/// JWT Access Token 페이로드.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    /// 사용자 ID
    pub user_id: UserId,
    /// 사용자 역할
    pub role: Role,
    /// 소속 회사 ID
    pub company_id: CompanyId,
    /// Issued At - 토큰 발급 시간 (Unix timestamp)
    pub iat: i64,
    /// Expiration - 토큰 만료 시간 (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// 신원과 발급 시각으로 Claims 생성.
    pub fn for_identity(identity: &Identity, issued_at: DateTime<Utc>, ttl_secs: i64) -> Self {
        let iat = issued_at.timestamp();
        Self {
            user_id: identity.user_id,
            role: identity.role,
            company_id: identity.company_id,
            iat,
            exp: iat.saturating_add(ttl_secs),
        }
    }

    /// `now` 기준 만료 여부. `exp == now`도 만료로 봅니다.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp <= now.timestamp()
    }

    /// 호출자의 테넌트 범위.
    pub fn tenant_scope(&self) -> TenantScope {
        TenantScope::for_caller(self.role, self.company_id)
    }
}

/// JWT 토큰 생성 에러.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("토큰 인코딩 실패: {0}")]
    EncodingError(#[from] jsonwebtoken::errors::Error),
}

/// 발급된 토큰과 그 페이로드.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

/// Access Token 발급기.
///
/// 서명 키는 생성 시 주입되며 프로세스 수명 동안 바뀌지 않습니다.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    ttl_secs: i64,
}

impl TokenIssuer {
    /// 새 발급기 생성.
    ///
    /// # Arguments
    ///
    /// * `secret` - 서명 키
    /// * `ttl_secs` - 토큰 유효 시간 (초)
    pub fn new(secret: &SecretString, ttl_secs: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.expose_secret().as_bytes()),
            ttl_secs: i64::try_from(ttl_secs).unwrap_or(i64::MAX),
        }
    }

    /// 토큰 유효 시간 (초).
    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    /// 신원에 대한 서명 토큰 발급.
    ///
    /// 같은 신원, 같은 시각, 같은 키에 대해 항상 같은 토큰을 만듭니다.
    pub fn issue(&self, identity: &Identity, now: DateTime<Utc>) -> Result<IssuedToken, JwtError> {
        let claims = Claims::for_identity(identity, now, self.ttl_secs);
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;

        Ok(IssuedToken { token, claims })
    }
}

/// Access Token 검증기.
///
/// 토큰을 해석하고 신뢰하는 유일한 지점입니다.
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    /// 새 검증기 생성.
    pub fn new(secret: &SecretString) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // 만료는 주입된 `now`로 직접 비교 (라이브러리 leeway 없음)
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            decoding_key: DecodingKey::from_secret(secret.expose_secret().as_bytes()),
            validation,
        }
    }

    /// Authorization 헤더 값 검증.
    ///
    /// 헤더가 없거나 `Bearer <token>` 형식이 아니면 `MissingToken`,
    /// 서명 불일치나 만료는 모두 `InvalidToken`을 반환합니다.
    pub fn verify(&self, authorization: Option<&str>, now: DateTime<Utc>) -> Result<Claims, AuthError> {
        let token = bearer_token(authorization).ok_or(AuthError::MissingToken)?;
        self.verify_token(token, now)
    }

    /// 이미 추출된 토큰 문자열 검증.
    pub fn verify_token(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature => debug!("Token signature mismatch"),
                kind => debug!(reason = ?kind, "Token rejected"),
            }
            AuthError::InvalidToken
        })?;

        if data.claims.is_expired_at(now) {
            debug!(user_id = %data.claims.user_id, exp = data.claims.exp, "Token expired");
            return Err(AuthError::InvalidToken);
        }

        Ok(data.claims)
    }
}

/// `Bearer <token>` 헤더에서 토큰 추출.
pub fn bearer_token(authorization: Option<&str>) -> Option<&str> {
    let token = authorization?.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    const TEST_SECRET: &str = "test-secret-key-for-jwt-testing-minimum-32-chars";

    fn secret(value: &str) -> SecretString {
        SecretString::from(value.to_string())
    }

    fn identity(role: Role) -> Identity {
        Identity {
            user_id: UserId(11),
            email: "login@example.com".to_string(),
            role,
            company_id: CompanyId(4),
        }
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let issuer = TokenIssuer::new(&secret(TEST_SECRET), DEFAULT_TOKEN_TTL_SECS);
        let verifier = TokenVerifier::new(&secret(TEST_SECRET));
        let now = Utc::now();

        let issued = issuer.issue(&identity(Role::Manager), now).unwrap();
        assert_eq!(issued.claims.exp - issued.claims.iat, 3600);

        let header = format!("Bearer {}", issued.token);
        let claims = verifier.verify(Some(&header), now).unwrap();
        assert_eq!(claims.user_id, UserId(11));
        assert_eq!(claims.role, Role::Manager);
        assert_eq!(claims.company_id, CompanyId(4));
        assert_eq!(claims, issued.claims);
    }

    #[test]
    fn test_issue_is_deterministic() {
        let issuer = TokenIssuer::new(&secret(TEST_SECRET), 60);
        let now = Utc::now();

        let first = issuer.issue(&identity(Role::Admin), now).unwrap();
        let second = issuer.issue(&identity(Role::Admin), now).unwrap();
        assert_eq!(first.token, second.token);
    }

    #[test]
    fn test_verify_is_idempotent() {
        let issuer = TokenIssuer::new(&secret(TEST_SECRET), 60);
        let verifier = TokenVerifier::new(&secret(TEST_SECRET));
        let now = Utc::now();
        let issued = issuer.issue(&identity(Role::Employee), now).unwrap();

        let first = verifier.verify_token(&issued.token, now).unwrap();
        let second = verifier.verify_token(&issued.token, now).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_or_malformed_header() {
        let verifier = TokenVerifier::new(&secret(TEST_SECRET));
        let now = Utc::now();

        for header in [None, Some(""), Some("Bearer"), Some("Bearer   "), Some("Basic abc"), Some("bearer abc")] {
            assert_eq!(verifier.verify(header, now), Err(AuthError::MissingToken));
        }
    }

    #[test]
    fn test_garbage_token_is_invalid() {
        let verifier = TokenVerifier::new(&secret(TEST_SECRET));
        let result = verifier.verify(Some("Bearer invalid-token"), Utc::now());
        assert_eq!(result, Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let issuer = TokenIssuer::new(&secret(TEST_SECRET), 60);
        let verifier = TokenVerifier::new(&secret("wrong-secret-key-for-testing-minimum-32-chars"));
        let now = Utc::now();
        let issued = issuer.issue(&identity(Role::Admin), now).unwrap();

        assert_eq!(verifier.verify_token(&issued.token, now), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_expiry_boundary() {
        let issuer = TokenIssuer::new(&secret(TEST_SECRET), 60);
        let verifier = TokenVerifier::new(&secret(TEST_SECRET));
        let now = Utc::now();
        let issued = issuer.issue(&identity(Role::Admin), now).unwrap();

        assert!(verifier.verify_token(&issued.token, now + Duration::seconds(59)).is_ok());
        // exp == now 은 만료
        assert_eq!(
            verifier.verify_token(&issued.token, now + Duration::seconds(60)),
            Err(AuthError::InvalidToken)
        );
        assert_eq!(
            verifier.verify_token(&issued.token, now + Duration::hours(2)),
            Err(AuthError::InvalidToken)
        );
    }

    #[test]
    fn test_zero_ttl_is_rejected_immediately() {
        let issuer = TokenIssuer::new(&secret(TEST_SECRET), 0);
        let verifier = TokenVerifier::new(&secret(TEST_SECRET));
        let now = Utc::now();
        let issued = issuer.issue(&identity(Role::Admin), now).unwrap();

        assert_eq!(verifier.verify_token(&issued.token, now), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_other_algorithm_rejected() {
        let claims = Claims::for_identity(&identity(Role::Admin), Utc::now(), 60);
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap();

        let verifier = TokenVerifier::new(&secret(TEST_SECRET));
        assert_eq!(verifier.verify_token(&token, Utc::now()), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_claims_json_shape() {
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let claims = Claims::for_identity(&identity(Role::Admin), now, 3600);
        let json = serde_json::to_value(&claims).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "userId": 11,
                "role": "Admin",
                "companyId": 4,
                "iat": 1_700_000_000,
                "exp": 1_700_003_600,
            })
        );
    }

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(bearer_token(Some("Bearer abc.def.ghi")), Some("abc.def.ghi"));
        assert_eq!(bearer_token(Some("Bearer  abc ")), Some("abc"));
        assert_eq!(bearer_token(Some("Token abc")), None);
        assert_eq!(bearer_token(None), None);
    }
}
