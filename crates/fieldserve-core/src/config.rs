//! 설정 관리.
//!
//! 이 모듈은 애플리케이션 설정을 정의하고 관리합니다.
//! 설정 파일(선택) → 환경 변수(`FIELDSERVE__*`) 순서로 덮어씁니다.

use std::path::Path;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::CoreError;

/// JWT 서명 키 최소 길이 (바이트).
pub const MIN_SECRET_LEN: usize = 32;

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 서버 설정
    pub server: ServerConfig,
    /// 데이터베이스 설정
    pub database: DatabaseConfig,
    /// 로깅 설정
    pub logging: LoggingConfig,
    /// 인증 설정
    pub auth: AuthConfig,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
    /// 요청 타임아웃 (초)
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            request_timeout_secs: 30,
        }
    }
}

impl ServerConfig {
    /// 소켓 주소 문자열.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 데이터베이스 설정.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// PostgreSQL 연결 URL. 없으면 메모리 저장소를 사용합니다.
    pub url: Option<String>,
    /// 최대 연결 수
    pub max_connections: u32,
    /// 연결 타임아웃 (초)
    pub connection_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
            connection_timeout_secs: 10,
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// 인증 설정.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// 토큰 서명 키. 기본값은 없으며 시작 시 반드시 설정되어야 합니다.
    pub jwt_secret: Option<SecretString>,
    /// 토큰 유효 시간 (초)
    pub token_ttl_secs: u64,
    /// 비밀번호 해시 검증 동시 실행 수
    pub hashing_workers: usize,
    /// 로그인 엔드포인트 IP당 분당 요청 한도
    pub login_requests_per_minute: u32,
    /// 로그인 rate limit에 X-Forwarded-For / X-Real-IP 사용 (리버스 프록시 뒤에서만)
    pub trust_forwarded_headers: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            token_ttl_secs: 3600,
            hashing_workers: 4,
            login_requests_per_minute: 30,
            trust_forwarded_headers: false,
        }
    }
}

impl AuthConfig {
    /// 서명 키 반환.
    ///
    /// 키가 없거나, 공백이거나, [`MIN_SECRET_LEN`]보다 짧으면 에러를 반환합니다.
    pub fn signing_secret(&self) -> Result<&SecretString, CoreError> {
        let secret = self.jwt_secret.as_ref().ok_or_else(|| {
            CoreError::Config("auth.jwt_secret (JWT_SECRET) 가 설정되지 않았습니다".to_string())
        })?;

        let exposed = secret.expose_secret();
        if exposed.trim().is_empty() {
            return Err(CoreError::Config(
                "auth.jwt_secret 가 비어 있습니다".to_string(),
            ));
        }
        if exposed.len() < MIN_SECRET_LEN {
            return Err(CoreError::Config(format!(
                "auth.jwt_secret 는 최소 {}바이트 이상이어야 합니다",
                MIN_SECRET_LEN
            )));
        }

        Ok(secret)
    }

    /// 해시 작업자 수 (최소 1).
    pub fn hashing_workers(&self) -> usize {
        self.hashing_workers.max(1)
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없어도 에러가 아닙니다. `JWT_SECRET`, `DATABASE_URL`
    /// 환경 변수는 각각 `auth.jwt_secret`, `database.url`을 덮어씁니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CoreError> {
        let builder = config::Config::builder()
            // 파일에서 로드
            .add_source(config::File::from(path.as_ref()).required(false))
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix("FIELDSERVE")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("auth.jwt_secret", std::env::var("JWT_SECRET").ok())?
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?;

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> Result<Self, CoreError> {
        Self::load("config/default.toml")
    }
}
