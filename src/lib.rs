//! Treasury Keeper Library
//!
//! Autonomous treasury-rebalancing loop for a lending vault.
//! This library exposes core modules for testing.

pub mod chain;
pub mod circuit_breaker;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod monitoring;

// Re-export commonly used types for tests
pub use chain::{
    CircuitBreakerReader, ErrorCategory, FinalStatus, OperationDescriptor, SimulatedVault,
    StateReadError, SubmissionError, SubmissionReceipt, Submitter, VaultOperation,
    VaultStateReader,
};
pub use circuit_breaker::{CircuitBreakerGate, CircuitBreakerLevel};
pub use config::{AppConfig, ExecutorConfig, LimitsConfig, SchedulerConfig, StrategyConfig};
pub use engine::{DailyRateLimiter, DecisionEngine, Executor};
pub use error::{AppError, AppResult};
pub use metrics::MetricsState;
pub use models::{ActionKind, ScoredAction, VaultState};
pub use monitoring::{HeartbeatWriter, Scheduler, SchedulerHandle, SchedulerState, SchedulerStatus};
