//! Health Check Handlers
//!
//! Provides health check endpoints for Kubernetes-style liveness and readiness probes.
//!
//! # Endpoints
//! - `GET /health` - Basic health check
//! - `GET /health/live` - Liveness probe (is the server running?)
//! - `GET /health/ready` - Readiness probe (can the server accept traffic?)
//!
//! Each binary registers the dependencies its readiness depends on: the two
//! services check PostgreSQL and Redis, the gateway checks its upstreams.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use redis::aio::ConnectionManager;
use serde::Serialize;
use sqlx::PgPool;

use crate::infrastructure::metrics;

/// Server start time for uptime calculation
static SERVER_START: Lazy<Instant> = Lazy::new(Instant::now);
static SERVER_START_TIME: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

/// Initialize the server start time (call during startup)
pub fn init_server_start() {
    Lazy::force(&SERVER_START);
    Lazy::force(&SERVER_START_TIME);
}

/// Basic health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Detailed health check response
#[derive(Debug, Serialize)]
pub struct DetailedHealthResponse {
    pub status: HealthStatus,
    pub version: &'static str,
    pub uptime_seconds: u64,
    pub started_at: String,
    pub checks: BTreeMap<&'static str, ServiceHealth>,
}

/// Health status for individual services
#[derive(Debug, Clone, Serialize)]
pub struct ServiceHealth {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ServiceHealth {
    /// Healthy below `slow_ms`, degraded above.
    fn from_latency(started: Instant, slow_ms: u64) -> Self {
        let latency = started.elapsed().as_millis() as u64;
        Self {
            status: if latency < slow_ms {
                HealthStatus::Healthy
            } else {
                HealthStatus::Degraded
            },
            latency_ms: Some(latency),
            message: None,
        }
    }

    fn unhealthy(message: String) -> Self {
        Self {
            status: HealthStatus::Unhealthy,
            latency_ms: None,
            message: Some(message),
        }
    }
}

/// Overall health status
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Simple liveness response
#[derive(Debug, Serialize)]
pub struct LivenessResponse {
    pub status: &'static str,
}

/// A dependency probed by the readiness endpoint.
#[async_trait]
pub trait DependencyCheck: Send + Sync {
    async fn check(&self) -> ServiceHealth;
}

struct RegisteredCheck {
    name: &'static str,
    critical: bool,
    check: Arc<dyn DependencyCheck>,
}

/// Dependencies probed by `/health/ready`.
#[derive(Clone, Default)]
pub struct HealthState {
    checks: Arc<Vec<RegisteredCheck>>,
}

impl HealthState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a probe. A failing critical probe makes the service unready; a
    /// failing non-critical probe only degrades it.
    pub fn with_check(
        self,
        name: &'static str,
        critical: bool,
        check: impl DependencyCheck + 'static,
    ) -> Self {
        let mut checks = match Arc::try_unwrap(self.checks) {
            Ok(checks) => checks,
            Err(shared) => shared
                .iter()
                .map(|c| RegisteredCheck {
                    name: c.name,
                    critical: c.critical,
                    check: c.check.clone(),
                })
                .collect(),
        };
        checks.push(RegisteredCheck {
            name,
            critical,
            check: Arc::new(check),
        });
        Self {
            checks: Arc::new(checks),
        }
    }
}

/// Basic health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Liveness probe - checks if the server is running
/// Returns 200 if alive, used by Kubernetes to restart dead pods
pub async fn liveness() -> Json<LivenessResponse> {
    Json(LivenessResponse { status: "alive" })
}

/// Readiness probe - checks if the server can accept traffic
/// Returns 200 if ready, 503 if a critical dependency is unavailable
pub async fn readiness(State(health): State<HealthState>) -> impl IntoResponse {
    let uptime = SERVER_START.elapsed().as_secs();
    let started_at = SERVER_START_TIME.to_rfc3339();

    let mut results = Vec::with_capacity(health.checks.len());
    for registered in health.checks.iter() {
        let result = registered.check.check().await;
        results.push((registered.name, registered.critical, result));
    }

    let overall_status = determine_overall_status(
        results
            .iter()
            .map(|(_, critical, result)| (*critical, result.status)),
    );

    let response = DetailedHealthResponse {
        status: overall_status,
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: uptime,
        started_at,
        checks: results
            .into_iter()
            .map(|(name, _, result)| (name, result))
            .collect(),
    };

    let status_code = match overall_status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(response))
}

/// Determine overall health from `(critical, status)` pairs.
fn determine_overall_status(checks: impl Iterator<Item = (bool, HealthStatus)>) -> HealthStatus {
    let mut overall = HealthStatus::Healthy;
    for (critical, status) in checks {
        match status {
            HealthStatus::Unhealthy if critical => return HealthStatus::Unhealthy,
            HealthStatus::Unhealthy | HealthStatus::Degraded => overall = HealthStatus::Degraded,
            HealthStatus::Healthy => {}
        }
    }
    overall
}

/// PostgreSQL connectivity and latency; also refreshes pool gauges.
pub struct PostgresCheck(pub PgPool);

#[async_trait]
impl DependencyCheck for PostgresCheck {
    async fn check(&self) -> ServiceHealth {
        let pool = &self.0;
        let idle = pool.num_idle() as u32;
        metrics::update_db_pool_stats(
            idle,
            pool.size().saturating_sub(idle),
            pool.options().get_max_connections(),
        );

        let start = Instant::now();
        match sqlx::query("SELECT 1").execute(pool).await {
            Ok(_) => ServiceHealth::from_latency(start, 100),
            Err(e) => ServiceHealth::unhealthy(format!("Database connection failed: {}", e)),
        }
    }
}

/// Redis connectivity and latency
pub struct RedisCheck(pub ConnectionManager);

#[async_trait]
impl DependencyCheck for RedisCheck {
    async fn check(&self) -> ServiceHealth {
        let start = Instant::now();
        let mut conn = self.0.clone();
        let pong: Result<String, redis::RedisError> =
            redis::cmd("PING").query_async(&mut conn).await;
        match pong {
            Ok(_) => ServiceHealth::from_latency(start, 50),
            Err(e) => ServiceHealth::unhealthy(format!("Redis connection failed: {}", e)),
        }
    }
}

/// Upstream service liveness, probed over HTTP.
pub struct UpstreamCheck {
    client: reqwest::Client,
    url: String,
}

impl UpstreamCheck {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            url: format!("{}/health/live", base_url.trim_end_matches('/')),
        }
    }
}

#[async_trait]
impl DependencyCheck for UpstreamCheck {
    async fn check(&self) -> ServiceHealth {
        let start = Instant::now();
        let response = self
            .client
            .get(&self.url)
            .timeout(Duration::from_secs(2))
            .send()
            .await;
        match response {
            Ok(r) if r.status().is_success() => ServiceHealth::from_latency(start, 200),
            Ok(r) => ServiceHealth::unhealthy(format!("Upstream returned {}", r.status())),
            Err(e) => ServiceHealth::unhealthy(format!("Upstream unreachable: {}", e)),
        }
    }
}
