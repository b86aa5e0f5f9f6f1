//! 인증 및 권한 부여.
//!
//! JWT 기반 인증, 역할 기반 접근 제어(RBAC), 요청별 신원 컨텍스트를 제공합니다.
//!
//! # 구성 요소
//!
//! - [`CredentialVerifier`]: 이메일/비밀번호 검증
//! - [`TokenIssuer`]: 서명 토큰 발급
//! - [`TokenVerifier`]: 토큰 검증 (유일한 신뢰 경계)
//! - [`RoleAuthorizer`]: 허용 역할 목록 검사
//! - [`AuthPipeline`]: 토큰 검증 → 역할 검사 순서의 미들웨어 파이프라인
//! - [`IdentityContext`]: 검증된 Claims의 요청별 부착 지점
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! let pipeline = AuthPipeline::verify(verifier).authorize([Role::Admin]);
//! let router = Router::new()
//!     .route("/admin", get(handler))
//!     .layer(middleware::from_fn_with_state(pipeline, auth_middleware));
//!
//! async fn handler(identity: IdentityContext) -> impl IntoResponse {
//!     format!("Hello, {}!", identity.user_id())
//! }
//! ```

mod context;
mod credentials;
mod error;
mod jwt;
mod middleware;
mod password;

pub use context::IdentityContext;
pub use credentials::CredentialVerifier;
pub use error::{AuthError, MessageResponse};
pub use jwt::{
    bearer_token, Claims, IssuedToken, JwtError, TokenIssuer, TokenVerifier,
    DEFAULT_TOKEN_TTL_SECS,
};
pub use middleware::{
    auth_middleware, authorize, role_middleware, AuthPipeline, RoleAuthorizer,
};
pub use password::{hash_password, verify_password, HashingPool, PasswordError};
