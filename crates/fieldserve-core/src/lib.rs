//! # FieldServe Core
//!
//! 필드 서비스 플랫폼의 신원 및 접근 제어 핵심 타입을 제공합니다.
//!
//! 이 크레이트는 HTTP 계층과 무관한 기본 타입을 제공합니다:
//! - 사용자 역할 ([`Role`], [`RoleSet`])
//! - 검증된 신원 및 사용자 저장소 레코드
//! - 테넌트(회사) 범위 정책 ([`TenantScope`])
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
