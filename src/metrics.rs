//! Prometheus metrics for the treasury keeper
//!
//! Exposes metrics endpoint for monitoring:
//! - Tick and rebalance counters
//! - Submission failure counters by class
//! - Circuit breaker level gauge
//! - Daily quota usage gauge

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Router};
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use std::sync::Arc;

/// Metrics state
pub struct MetricsState {
    /// Prometheus registry
    registry: Registry,
    /// Completed monitor ticks
    pub ticks_total: IntCounter,
    /// Confirmed rebalances by action kind
    pub rebalances_total: IntCounterVec,
    /// Submission failures by classification
    pub submission_failures_total: IntCounterVec,
    /// Actions deferred by the daily quota
    pub deferred_total: IntCounter,
    /// Current executor failure streak
    pub consecutive_failures: IntGauge,
    /// Last observed circuit breaker level
    pub circuit_breaker_level: IntGauge,
    /// Rebalances spent against today's quota
    pub rebalance_quota_used: IntGauge,
    /// Unix timestamp of the last completed tick
    pub last_tick_timestamp: IntGauge,
}

impl MetricsState {
    /// Create a new metrics state with all metrics registered
    pub fn new() -> Self {
        let registry = Registry::new();

        let ticks_total = IntCounter::with_opts(Opts::new(
            "keeper_ticks_total",
            "Completed monitor loop ticks",
        ))
        .expect("Failed to create ticks_total counter");
        registry
            .register(Box::new(ticks_total.clone()))
            .expect("Failed to register ticks_total");

        let rebalances_total = IntCounterVec::new(
            Opts::new(
                "keeper_rebalances_total",
                "Confirmed rebalance operations by action kind",
            ),
            &["kind"],
        )
        .expect("Failed to create rebalances_total counter");
        registry
            .register(Box::new(rebalances_total.clone()))
            .expect("Failed to register rebalances_total");

        let submission_failures_total = IntCounterVec::new(
            Opts::new(
                "keeper_submission_failures_total",
                "Submission failures by classification",
            ),
            &["class"],
        )
        .expect("Failed to create submission_failures_total counter");
        registry
            .register(Box::new(submission_failures_total.clone()))
            .expect("Failed to register submission_failures_total");

        let deferred_total = IntCounter::with_opts(Opts::new(
            "keeper_deferred_total",
            "Actions deferred by the daily rebalance quota",
        ))
        .expect("Failed to create deferred_total counter");
        registry
            .register(Box::new(deferred_total.clone()))
            .expect("Failed to register deferred_total");

        let consecutive_failures = IntGauge::with_opts(Opts::new(
            "keeper_consecutive_failures",
            "Current executor failure streak",
        ))
        .expect("Failed to create consecutive_failures gauge");
        registry
            .register(Box::new(consecutive_failures.clone()))
            .expect("Failed to register consecutive_failures");

        let circuit_breaker_level = IntGauge::with_opts(Opts::new(
            "keeper_circuit_breaker_level",
            "Last observed circuit breaker level (0-3)",
        ))
        .expect("Failed to create circuit_breaker_level gauge");
        registry
            .register(Box::new(circuit_breaker_level.clone()))
            .expect("Failed to register circuit_breaker_level");

        let rebalance_quota_used = IntGauge::with_opts(Opts::new(
            "keeper_rebalance_quota_used",
            "Rebalances spent against today's quota",
        ))
        .expect("Failed to create rebalance_quota_used gauge");
        registry
            .register(Box::new(rebalance_quota_used.clone()))
            .expect("Failed to register rebalance_quota_used");

        let last_tick_timestamp = IntGauge::with_opts(Opts::new(
            "keeper_last_tick_timestamp",
            "Unix timestamp of the last completed tick",
        ))
        .expect("Failed to create last_tick_timestamp gauge");
        registry
            .register(Box::new(last_tick_timestamp.clone()))
            .expect("Failed to register last_tick_timestamp");

        Self {
            registry,
            ticks_total,
            rebalances_total,
            submission_failures_total,
            deferred_total,
            consecutive_failures,
            circuit_breaker_level,
            rebalance_quota_used,
            last_tick_timestamp,
        }
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl Default for MetricsState {
    fn default() -> Self {
        Self::new()
    }
}

/// Metrics handler - returns Prometheus metrics in text format
///
/// GET /metrics
pub async fn metrics_handler(State(state): State<Arc<MetricsState>>) -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = state.registry().gather();
    let mut buffer = Vec::new();

    encoder
        .encode(&metric_families, &mut buffer)
        .expect("Failed to encode metrics");

    (
        StatusCode::OK,
        [("Content-Type", "text/plain; version=0.0.4")],
        buffer,
    )
}

/// Create metrics router
pub fn metrics_router() -> Router<Arc<MetricsState>> {
    Router::new().route("/metrics", get(metrics_handler))
}
