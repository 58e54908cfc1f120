//! Monitor loop
//!
//! Owns the cadence. Every tick reads the safety level first: at Emergency it
//! synthesizes a full-unwind redeem and hands it straight to the executor,
//! otherwise it snapshots the vault, runs the decision engine, and executes
//! the selection. One tick runs at a time; shutdown is cooperative and
//! tick-granular, observed only at the top of the loop so an in-flight tick
//! (including executor retries) always completes.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;

use crate::chain::VaultStateReader;
use crate::circuit_breaker::CircuitBreakerGate;
use crate::config::SchedulerConfig;
use crate::engine::{DecisionEngine, Executor};
use crate::error::AppResult;
use crate::metrics::MetricsState;
use crate::models::ScoredAction;
use crate::monitoring::heartbeat::HeartbeatWriter;

/// Loop lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Ticking normally
    Running,
    /// Shutdown requested; current tick finishes first
    ShuttingDown,
    /// Loop exited
    Stopped,
}

impl std::fmt::Display for SchedulerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Running => write!(f, "RUNNING"),
            Self::ShuttingDown => write!(f, "SHUTTING_DOWN"),
            Self::Stopped => write!(f, "STOPPED"),
        }
    }
}

impl SchedulerState {
    pub fn can_transition_to(self, next: SchedulerState) -> bool {
        matches!(
            (self, next),
            (Self::Running, Self::ShuttingDown) | (Self::ShuttingDown, Self::Stopped)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Stopped)
    }
}

/// Loop-internal status, shared with the handle
struct StatusInner {
    state: SchedulerState,
    ticks: u64,
    last_tick_at: Option<DateTime<Utc>>,
    last_selection: Option<String>,
    consecutive_failures: u32,
    quota_used: u32,
    quota_max: u32,
}

/// Point-in-time status snapshot for observability
#[derive(Debug, Clone)]
pub struct SchedulerStatus {
    pub state: SchedulerState,
    pub ticks: u64,
    pub last_tick_at: Option<DateTime<Utc>>,
    pub last_selection: Option<String>,
    pub consecutive_failures: u32,
    pub quota_used: u32,
    pub quota_max: u32,
}

/// Cheap cloneable view of the loop for health checks and shutdown requests
#[derive(Clone)]
pub struct SchedulerHandle {
    status: Arc<RwLock<StatusInner>>,
    cancel: CancellationToken,
}

impl SchedulerHandle {
    pub fn status(&self) -> SchedulerStatus {
        let s = self.status.read();
        SchedulerStatus {
            state: s.state,
            ticks: s.ticks,
            last_tick_at: s.last_tick_at,
            last_selection: s.last_selection.clone(),
            consecutive_failures: s.consecutive_failures,
            quota_used: s.quota_used,
            quota_max: s.quota_max,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.status.read().state
    }

    /// Request cooperative shutdown. Idempotent: repeated requests are no-ops.
    pub fn request_shutdown(&self) {
        self.cancel.cancel();
    }
}

/// The monitor loop itself
pub struct Scheduler {
    config: SchedulerConfig,
    gate: CircuitBreakerGate,
    reader: Arc<dyn VaultStateReader>,
    engine: DecisionEngine,
    executor: Executor,
    heartbeat: HeartbeatWriter,
    cancel: CancellationToken,
    status: Arc<RwLock<StatusInner>>,
    metrics: Option<Arc<MetricsState>>,
}

impl Scheduler {
    pub fn new(
        config: SchedulerConfig,
        gate: CircuitBreakerGate,
        reader: Arc<dyn VaultStateReader>,
        engine: DecisionEngine,
        executor: Executor,
        heartbeat: HeartbeatWriter,
        cancel: CancellationToken,
    ) -> Self {
        let status = Arc::new(RwLock::new(StatusInner {
            state: SchedulerState::Running,
            ticks: 0,
            last_tick_at: None,
            last_selection: None,
            consecutive_failures: 0,
            quota_used: 0,
            quota_max: executor.rate_limiter().max_per_day(),
        }));

        Self {
            config,
            gate,
            reader,
            engine,
            executor,
            heartbeat,
            cancel,
            status,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsState>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            status: self.status.clone(),
            cancel: self.cancel.clone(),
        }
    }

    /// Run until a shutdown request is observed at the top of the loop.
    pub async fn run(mut self) {
        tracing::info!(
            interval_ms = self.config.interval_ms,
            heartbeat_path = %self.heartbeat.path().display(),
            "monitor loop started"
        );
        let interval = Duration::from_millis(self.config.interval_ms);

        loop {
            if self.cancel.is_cancelled() {
                self.transition(SchedulerState::ShuttingDown);
                break;
            }

            // A tick can fail (state reads are fallible) but never crashes
            // the loop
            if let Err(e) = self.tick().await {
                tracing::error!(error = %e, "tick failed, skipping to next cycle");
            }
            self.publish_tick_stats();

            // The sleep only shortens on cancellation; the shutdown decision
            // is made at the top of the loop
            tokio::select! {
                _ = self.cancel.cancelled() => {}
                _ = tokio::time::sleep(interval) => {}
            }
        }

        self.transition(SchedulerState::Stopped);
        tracing::info!("monitor loop stopped");
    }

    async fn tick(&mut self) -> AppResult<()> {
        let level = self.gate.read_level().await?;
        if let Some(m) = &self.metrics {
            m.circuit_breaker_level.set(level as i64);
        }

        let selection = if level.is_emergency() {
            tracing::warn!(%level, "circuit breaker critical, bypassing decision engine");
            let state = self.reader.read().await?;
            if state.strategy_balance > 0 {
                let action = ScoredAction::emergency_redeem(state.strategy_balance);
                self.executor.execute(&action, true).await;
                action
            } else {
                tracing::info!("strategy already empty, nothing to unwind");
                ScoredAction::do_nothing()
            }
        } else {
            let state = self.reader.read().await?;
            let selection = self.engine.decide(&state);
            if selection.is_actionable() {
                self.executor.execute(&selection, false).await;
            } else {
                tracing::debug!("holding current allocation");
            }
            selection
        };

        let now = Utc::now();
        {
            let mut status = self.status.write();
            status.last_tick_at = Some(now);
            status.last_selection = Some(selection.kind.to_string());
        }
        if let Some(m) = &self.metrics {
            m.last_tick_timestamp.set(now.timestamp());
        }

        // Non-critical side effect: failure is logged, never escalated
        if let Err(e) = self.heartbeat.write_now().await {
            tracing::warn!(
                error = %e,
                path = %self.heartbeat.path().display(),
                "heartbeat write failed"
            );
        }

        Ok(())
    }

    fn publish_tick_stats(&self) {
        {
            let mut status = self.status.write();
            status.ticks += 1;
            status.consecutive_failures = self.executor.consecutive_failures();
            status.quota_used = self.executor.rate_limiter().current_count();
        }
        if let Some(m) = &self.metrics {
            m.ticks_total.inc();
            m.rebalance_quota_used
                .set(self.executor.rate_limiter().current_count() as i64);
        }
    }

    fn transition(&self, next: SchedulerState) {
        let mut status = self.status.write();
        if status.state.can_transition_to(next) {
            tracing::info!(from = %status.state, to = %next, "scheduler state change");
            status.state = next;
        }
    }
}
