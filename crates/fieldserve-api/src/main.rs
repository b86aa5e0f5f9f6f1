//! Field service API 서버 진입점.
//!
//! 설정 로드, 로깅/메트릭 초기화, 저장소 연결 후 HTTP 서버를 시작합니다.
//! 서명 비밀키가 없으면 시작하지 않습니다.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{http::StatusCode, Router};
use fieldserve_api::{create_api_router, setup_metrics_recorder, AppState};
use fieldserve_api::store::PgStore;
use fieldserve_core::{init_logging, AppConfig, DatabaseConfig, LogConfig};
use sqlx::postgres::PgPoolOptions;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    let config = AppConfig::load_default().context("failed to load configuration")?;

    init_logging(LogConfig::from(&config.logging).with_env_overrides())
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;

    info!("Starting field service API server...");

    let state = create_app_state(&config).await?;

    let state = match setup_metrics_recorder() {
        Ok(handle) => {
            info!("Prometheus metrics recorder initialized");
            state.with_metrics(handle)
        }
        Err(e) => {
            warn!(error = %e, "Prometheus recorder unavailable, /metrics disabled");
            state
        }
    };

    info!(
        version = %state.version,
        has_db = state.pg_store.is_some(),
        token_ttl_secs = config.auth.token_ttl_secs,
        hashing_workers = config.auth.hashing_workers(),
        "Application state initialized"
    );

    let shutdown_token = CancellationToken::new();
    let limiter_cleanup = state.login_limiter.spawn_cleanup(shutdown_token.clone());

    let app = create_router(
        Arc::new(state),
        Duration::from_secs(config.server.request_timeout_secs),
    );

    let addr: SocketAddr = config
        .server
        .bind_address()
        .parse()
        .with_context(|| format!("invalid bind address: {}", config.server.bind_address()))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "API server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(shutdown_token.clone()))
    .await?;

    // 백그라운드 태스크에 종료 전파
    shutdown_token.cancel();
    if let Err(e) = limiter_cleanup.await {
        warn!(error = %e, "Rate limiter cleanup task failed");
    }

    info!("Server stopped gracefully");
    Ok(())
}

/// 저장소를 연결하고 AppState 생성.
///
/// 데이터베이스 URL이 없으면 인메모리 저장소를 사용합니다 (개발 전용).
async fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let Some(database_url) = config.database.url.as_deref() else {
        warn!("database.url (DATABASE_URL) not set, using in-memory stores (development only)");
        let (state, _) = AppState::in_memory(&config.auth)?;
        return Ok(state);
    };

    let pool = connect_database(database_url, &config.database).await?;
    info!("Connected to PostgreSQL successfully");

    Ok(AppState::with_postgres(&config.auth, PgStore::new(pool))?)
}

async fn connect_database(url: &str, config: &DatabaseConfig) -> anyhow::Result<sqlx::PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connection_timeout_secs))
        .connect(url)
        .await
        .context("failed to connect to database")?;

    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .context("failed to verify database connection")?;

    Ok(pool)
}

/// 전체 라우터 생성.
fn create_router(state: Arc<AppState>, request_timeout: Duration) -> Router {
    create_api_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(cors_layer())
}

/// CORS 레이어 생성.
///
/// `CORS_ORIGINS` 환경변수(쉼표 구분)가 설정되어 있으면 해당 origin만 허용하고,
/// 설정되지 않으면 개발 모드로 간주하여 모든 origin을 허용합니다.
fn cors_layer() -> CorsLayer {
    let configured: Vec<_> = std::env::var("CORS_ORIGINS")
        .unwrap_or_default()
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();

    let allow_origin = if configured.is_empty() {
        warn!("CORS_ORIGINS not set, allowing any origin (development mode)");
        AllowOrigin::any()
    } else {
        info!("CORS configured with {} allowed origins", configured.len());
        AllowOrigin::list(configured)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
            axum::http::header::ACCEPT,
        ])
        .max_age(Duration::from_secs(3600))
}

/// Graceful shutdown 시그널 대기.
///
/// Ctrl+C 또는 SIGTERM 시그널을 수신하면 종료 토큰을 취소합니다.
async fn shutdown_signal(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
        _ = shutdown_token.cancelled() => {}
    }

    shutdown_token.cancel();
}
