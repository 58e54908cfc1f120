//! Read-side collaborator contracts
//!
//! The keeper never touches RPC directly. Vault figures and the protocol
//! safety level arrive through these traits, implemented by the deployment
//! wiring (batched multicall reader in production, `SimulatedVault` locally).

use async_trait::async_trait;
use thiserror::Error;

use crate::models::VaultState;

/// Failure of a batched on-chain read. Tick-fatal: the scheduler logs it and
/// skips to the next cycle without retrying within the tick.
#[derive(Debug, Clone, Error)]
pub enum StateReadError {
    /// Transport-level failure reaching the node
    #[error("rpc transport failure: {0}")]
    Transport(String),

    /// Some calls in the batch returned, others did not
    #[error("partial batch read, missing {0}")]
    Partial(String),

    /// A returned value could not be decoded
    #[error("malformed on-chain value: {0}")]
    Decode(String),
}

/// Produces a point-in-time snapshot of the vault figures.
#[async_trait]
pub trait VaultStateReader: Send + Sync {
    async fn read(&self) -> Result<VaultState, StateReadError>;
}

/// Produces the raw protocol safety level.
///
/// The value is reported exactly as observed; bounds-checking and the
/// fail-safe out-of-range rule live in the gate, not here.
#[async_trait]
pub trait CircuitBreakerReader: Send + Sync {
    async fn read_level(&self) -> Result<i64, StateReadError>;
}
