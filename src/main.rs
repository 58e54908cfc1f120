//! Treasury Keeper - autonomous rebalancing loop for a lending vault
//!
//! This is the main entry point for the keeper service. It wires the
//! collaborators into the monitor loop and serves the ops endpoints.

use std::net::SocketAddr;
use std::sync::Arc;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

use treasury_keeper::chain::SimulatedVault;
use treasury_keeper::circuit_breaker::CircuitBreakerGate;
use treasury_keeper::config::AppConfig;
use treasury_keeper::engine::{DailyRateLimiter, DecisionEngine, Executor};
use treasury_keeper::error::AppError;
use treasury_keeper::handlers::{ops_router, AppState};
use treasury_keeper::metrics::MetricsState;
use treasury_keeper::monitoring::{HeartbeatWriter, Scheduler};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    init_tracing();

    tracing::info!("Starting Treasury Keeper v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = load_config()?;
    tracing::info!(
        interval_ms = config.scheduler.interval_ms,
        max_rebalances_per_day = config.limits.max_rebalances_per_day,
        host = %config.server.host,
        port = config.server.port,
        "Configuration loaded"
    );

    // Initialize metrics
    let metrics = Arc::new(MetricsState::new());

    // Shutdown signal, shared by the loop and the ops server
    let cancel = CancellationToken::new();
    spawn_signal_listener(cancel.clone());

    // Collaborators. The simulated vault implements all three contracts.
    // TODO: wire the RPC-backed readers and the custodial signing submitter
    // once the deployment config carries their endpoints.
    let vault = Arc::new(SimulatedVault::with_genesis());

    let gate = CircuitBreakerGate::new(vault.clone());
    let engine = DecisionEngine::new(config.strategy.clone());
    let rate_limiter = DailyRateLimiter::new(config.limits.max_rebalances_per_day);
    let executor = Executor::new(config.executor.clone(), vault.clone(), rate_limiter)
        .with_metrics(metrics.clone());
    let heartbeat = HeartbeatWriter::new(&config.scheduler.heartbeat_path);

    let scheduler = Scheduler::new(
        config.scheduler.clone(),
        gate,
        vault,
        engine,
        executor,
        heartbeat,
        cancel.clone(),
    )
    .with_metrics(metrics.clone());
    let handle = scheduler.handle();
    tracing::info!("Scheduler initialized");

    // Ops server (health + metrics)
    let app_state = Arc::new(AppState {
        started_at: Utc::now(),
        scheduler: handle,
        tick_interval_ms: config.scheduler.interval_ms,
    });
    let app = ops_router(app_state, metrics);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Ops server listening");

    let server_cancel = cancel.clone();
    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { server_cancel.cancelled().await })
            .await
    });

    // Run the monitor loop to completion
    tokio::spawn(scheduler.run()).await?;

    if let Err(e) = server.await? {
        tracing::warn!(error = %e, "Ops server exited with error");
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Forward termination signals into the cancellation token.
///
/// Cancellation is idempotent: the listener stays alive, so a repeated
/// signal re-cancels an already-cancelled token and nothing double-fires.
fn spawn_signal_listener(cancel: CancellationToken) {
    tokio::spawn(async move {
        loop {
            let ctrl_c = async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!(error = %e, "Failed to listen for ctrl-c");
                    std::future::pending::<()>().await;
                }
            };

            #[cfg(unix)]
            let terminate = async {
                match signal(SignalKind::terminate()) {
                    Ok(mut sigterm) => {
                        sigterm.recv().await;
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to register SIGTERM handler");
                        std::future::pending::<()>().await;
                    }
                }
            };

            #[cfg(not(unix))]
            let terminate = std::future::pending::<()>();

            tokio::select! {
                _ = ctrl_c => {}
                _ = terminate => {}
            }

            tracing::info!("Termination signal received, shutting down after current tick");
            cancel.cancel();
        }
    });
}

/// Initialize tracing/logging
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "treasury_keeper=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();
}

/// Load and validate configuration. Fail-fast: an invalid config must never
/// reach the loop.
fn load_config() -> Result<AppConfig, AppError> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = AppConfig::load().map_err(|e| {
        tracing::error!(error = %e, "Failed to load configuration");
        e
    })?;

    config.validate().map_err(|e| {
        tracing::error!(error = %e, "Configuration validation failed");
        e
    })?;

    Ok(config)
}
