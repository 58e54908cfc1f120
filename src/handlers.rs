//! Operational endpoints
//!
//! A minimal HTTP surface for supervision: `/health` reports the loop's
//! status rollup, `/metrics` serves the Prometheus registry. No dashboard
//! lives here.

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::metrics::{metrics_router, MetricsState};
use crate::monitoring::SchedulerHandle;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall system status
    pub status: HealthStatus,
    /// Uptime in seconds
    pub uptime_seconds: i64,
    /// Monitor loop status
    pub scheduler: SchedulerHealth,
    /// Daily rebalance quota usage
    pub rebalance_quota: QuotaHealth,
    /// Current executor failure streak
    pub consecutive_failures: u32,
}

/// Health status enum
#[derive(Debug, Serialize, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// All systems operational
    Healthy,
    /// Some systems degraded but operational
    Degraded,
    /// Critical systems failing
    Unhealthy,
}

/// Monitor loop health info
#[derive(Debug, Serialize)]
pub struct SchedulerHealth {
    pub state: String,
    pub ticks: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_tick_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_selection: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tick_age_secs: Option<i64>,
}

/// Daily quota usage
#[derive(Debug, Serialize)]
pub struct QuotaHealth {
    pub used: u32,
    pub max: u32,
}

/// Shared application state for health checks
pub struct AppState {
    /// Application start time
    pub started_at: chrono::DateTime<Utc>,
    /// Scheduler handle for loop status
    pub scheduler: SchedulerHandle,
    /// Configured tick interval, for staleness judgement
    pub tick_interval_ms: u64,
}

/// Health check handler
///
/// GET /health
pub async fn health_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    let now = Utc::now();
    let uptime = (now - state.started_at).num_seconds();

    let status = state.scheduler.status();
    let tick_age_secs = status.last_tick_at.map(|t| (now - t).num_seconds());

    // A tick older than three intervals means the loop is stuck or starved
    let stale_after = (state.tick_interval_ms as i64 / 1_000).max(1) * 3;
    let overall_status = if status.state.is_terminal() {
        HealthStatus::Unhealthy
    } else if status.consecutive_failures > 0
        || tick_age_secs.map(|age| age > stale_after).unwrap_or(false)
    {
        HealthStatus::Degraded
    } else {
        HealthStatus::Healthy
    };

    let status_code = match overall_status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Degraded => StatusCode::OK, // Still return 200 for degraded
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    let response = HealthResponse {
        status: overall_status,
        uptime_seconds: uptime,
        scheduler: SchedulerHealth {
            state: status.state.to_string(),
            ticks: status.ticks,
            last_tick_at: status.last_tick_at.map(|t| t.to_rfc3339()),
            last_selection: status.last_selection,
            tick_age_secs,
        },
        rebalance_quota: QuotaHealth {
            used: status.quota_used,
            max: status.quota_max,
        },
        consecutive_failures: status.consecutive_failures,
    };

    (status_code, Json(response))
}

/// Assemble the ops router
pub fn ops_router(app: Arc<AppState>, metrics: Arc<MetricsState>) -> Router {
    let health_routes = Router::new()
        .route("/health", get(health_check))
        .with_state(app);

    Router::new()
        .merge(health_routes)
        .merge(metrics_router().with_state(metrics))
        .layer(TraceLayer::new_for_http())
}
