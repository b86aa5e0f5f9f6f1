//! 인증, 인가 및 테넌트 범위 REST API 서버.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 이메일/비밀번호 로그인과 서명 토큰 발급
//! - 모든 보호 라우트의 토큰 검증 및 역할 기반 접근 제어
//! - 회사(테넌트) 범위로 제한된 고객/서비스 요청 API
//! - 헬스 체크 엔드포인트와 Prometheus 메트릭
//!
//! # 모듈 구성
//!
//! - [`auth`]: 자격 증명 검증, 토큰 발급/검증, 역할 검사, 요청별 신원 컨텍스트
//! - [`store`]: 사용자 및 업무 레코드 저장소 (PostgreSQL, 인메모리)
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`routes`]: REST API 엔드포인트
//! - [`middleware`]: rate limit, 메트릭 미들웨어
//! - [`metrics`]: Prometheus 메트릭 수집
//! - [`error`]: 핸들러 에러 응답

pub mod auth;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod store;

pub use auth::{
    authorize, AuthError, AuthPipeline, Claims, CredentialVerifier, IdentityContext,
    RoleAuthorizer, TokenIssuer, TokenVerifier,
};
pub use error::{ApiError, ApiErrorResponse, ApiResult};
pub use metrics::setup_metrics_recorder;
pub use middleware::metrics_layer;
pub use routes::create_api_router;
pub use state::AppState;
