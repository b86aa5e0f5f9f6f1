//! Rate limiting middleware.
//!
//! Token Bucket 알고리즘 기반 IP별 rate limiting. 로그인 엔드포인트에 적용해
//! 비밀번호 대입 공격과 해시 작업자 고갈을 완화합니다.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header::RETRY_AFTER, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use metrics::counter;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::auth::MessageResponse;

/// Rate Limiter 설정.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// 분당 최대 요청 수
    pub requests_per_minute: u32,
    /// 버스트 허용량 (버킷 용량)
    pub burst_size: u32,
    /// 유휴 버킷 정리 기준
    pub idle_timeout: Duration,
    /// 백그라운드 정리 주기
    pub cleanup_interval: Duration,
    /// X-Forwarded-For / X-Real-IP 헤더 신뢰 여부 (프록시 뒤에서만 사용)
    pub trust_forwarded_headers: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::per_minute(30)
    }
}

impl RateLimitConfig {
    /// 분당 요청 수로 생성 (버스트 = 분당 요청의 1/6, 최소 1).
    pub fn per_minute(requests_per_minute: u32) -> Self {
        Self {
            requests_per_minute,
            burst_size: (requests_per_minute / 6).max(1),
            idle_timeout: Duration::from_secs(600),
            cleanup_interval: Duration::from_secs(60),
            trust_forwarded_headers: false,
        }
    }

    fn capacity(&self) -> f64 {
        f64::from(self.burst_size.max(1))
    }

    fn refill_per_sec(&self) -> f64 {
        f64::from(self.requests_per_minute) / 60.0
    }
}

/// Token Bucket 구조체.
#[derive(Debug)]
struct TokenBucket {
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    fn full(config: &RateLimitConfig, now: Instant) -> Self {
        Self {
            tokens: config.capacity(),
            last_refill: now,
        }
    }

    fn try_acquire(&mut self, config: &RateLimitConfig, now: Instant) -> Result<(), u64> {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * config.refill_per_sec()).min(config.capacity());
        self.last_refill = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            Ok(())
        } else {
            let rate = config.refill_per_sec();
            let wait = if rate > 0.0 {
                ((1.0 - self.tokens) / rate).ceil() as u64
            } else {
                60
            };
            Err(wait.max(1))
        }
    }
}

/// IP별 버킷과 마지막 정리 시각.
#[derive(Debug)]
struct Buckets {
    by_ip: HashMap<IpAddr, TokenBucket>,
    last_sweep: Instant,
}

impl Buckets {
    fn sweep(&mut self, now: Instant, idle: Duration) {
        self.by_ip
            .retain(|_, bucket| now.saturating_duration_since(bucket.last_refill) < idle);
        self.last_sweep = now;
    }
}

/// Rate Limit 확인 결과.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    /// 요청 허용됨
    Allowed,
    /// Rate limit 초과
    Limited {
        /// 재시도까지 대기 시간 (초)
        retry_after: u64,
    },
}

/// IP별 Rate Limiter.
///
/// 유휴 버킷은 `idle_timeout`마다 요청 경로에서 한 번 정리되고,
/// [`RateLimiter::spawn_cleanup`] 태스크가 주기적으로 정리합니다.
#[derive(Clone)]
pub struct RateLimiter {
    config: Arc<RateLimitConfig>,
    buckets: Arc<Mutex<Buckets>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config: Arc::new(config),
            buckets: Arc::new(Mutex::new(Buckets {
                by_ip: HashMap::new(),
                last_sweep: Instant::now(),
            })),
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// 요청 허용 여부 확인.
    pub async fn check(&self, ip: IpAddr) -> RateLimitResult {
        self.check_at(ip, Instant::now()).await
    }

    /// 주어진 시각 기준으로 요청 허용 여부 확인.
    pub async fn check_at(&self, ip: IpAddr, now: Instant) -> RateLimitResult {
        let mut buckets = self.buckets.lock().await;
        let idle = self.config.idle_timeout;
        if now.saturating_duration_since(buckets.last_sweep) >= idle {
            buckets.sweep(now, idle);
        }

        let bucket = buckets
            .by_ip
            .entry(ip)
            .or_insert_with(|| TokenBucket::full(&self.config, now));

        match bucket.try_acquire(&self.config, now) {
            Ok(()) => RateLimitResult::Allowed,
            Err(retry_after) => RateLimitResult::Limited { retry_after },
        }
    }

    /// 유휴 버킷 정리.
    pub async fn cleanup_at(&self, now: Instant) {
        self.buckets
            .lock()
            .await
            .sweep(now, self.config.idle_timeout);
    }

    /// 현재 추적 중인 IP 수.
    pub async fn tracked_ips(&self) -> usize {
        self.buckets.lock().await.by_ip.len()
    }

    /// 주기적 유휴 버킷 정리 태스크 시작.
    ///
    /// `shutdown`이 취소되면 종료합니다.
    pub fn spawn_cleanup(&self, shutdown: CancellationToken) -> JoinHandle<()> {
        let limiter = self.clone();
        let period = self.config.cleanup_interval.max(Duration::from_secs(1));

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        limiter.cleanup_at(Instant::now()).await;
                    }

                    _ = shutdown.cancelled() => {
                        tracing::debug!("Rate limiter cleanup task stopped");
                        break;
                    }
                }
            }
        })
    }
}

/// Rate Limiting 미들웨어 함수.
///
/// `axum::middleware::from_fn_with_state(limiter, rate_limit_middleware)`로 적용합니다.
pub async fn rate_limit_middleware(
    State(limiter): State<RateLimiter>,
    request: Request,
    next: Next,
) -> Response {
    let ip = client_ip(&request, limiter.config().trust_forwarded_headers);

    match limiter.check(ip).await {
        RateLimitResult::Allowed => {
            counter!("rate_limit_requests_total", "status" => "allowed").increment(1);
            next.run(request).await
        }
        RateLimitResult::Limited { retry_after } => {
            counter!("rate_limit_requests_total", "status" => "limited").increment(1);
            tracing::warn!(client_ip = %ip, retry_after, "Rate limit exceeded");

            let mut response = (
                StatusCode::TOO_MANY_REQUESTS,
                Json(MessageResponse {
                    message: "Too many requests".to_string(),
                }),
            )
                .into_response();
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(retry_after));
            response
        }
    }
}

/// 요청에서 클라이언트 IP 추출.
///
/// 프록시 헤더는 신뢰 설정일 때만 사용하고, 그 외에는 연결 주소를 사용합니다.
fn client_ip(request: &Request, trust_forwarded_headers: bool) -> IpAddr {
    if trust_forwarded_headers {
        let forwarded = request
            .headers()
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .or_else(|| {
                request
                    .headers()
                    .get("x-real-ip")
                    .and_then(|v| v.to_str().ok())
            })
            .and_then(|v| v.trim().parse().ok());

        if let Some(ip) = forwarded {
            return ip;
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}
