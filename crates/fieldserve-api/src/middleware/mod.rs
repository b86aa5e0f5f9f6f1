//! API 서버용 HTTP middleware.
//!
//! 인증/인가 미들웨어는 [`crate::auth`]에 있습니다.

mod metrics;
mod rate_limit;

pub use metrics::metrics_layer;
pub use rate_limit::{rate_limit_middleware, RateLimitConfig, RateLimitResult, RateLimiter};
