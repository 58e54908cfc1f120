//! Error types for the treasury keeper

use thiserror::Error;

use crate::chain::StateReadError;

/// Application-level errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// On-chain state read failure (tick-fatal, recovered at the loop)
    #[error("State read error: {0}")]
    StateRead(#[from] StateReadError),

    /// Heartbeat file I/O error (non-critical, logged only)
    #[error("Heartbeat error: {0}")]
    Heartbeat(#[from] std::io::Error),
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;
