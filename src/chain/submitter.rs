//! Write-side collaborator contract
//!
//! Operation encoding, signing, and gas sponsorship are external concerns.
//! The executor hands a descriptor to the submitter and waits for a terminal
//! state; failures come back tagged so the retry policy never has to pattern
//! match on message text.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

/// The protocol operations the keeper can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaultOperation {
    /// Move idle reserve into the yield strategy
    StrategyDeposit { amount: u128 },
    /// Redeem strategy balance back into the idle reserve
    StrategyRedeem { amount: u128 },
}

impl std::fmt::Display for VaultOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StrategyDeposit { amount } => write!(f, "strategy_deposit({amount})"),
            Self::StrategyRedeem { amount } => write!(f, "strategy_redeem({amount})"),
        }
    }
}

/// One submission request, correlated across logs and receipts by `op_id`.
#[derive(Debug, Clone)]
pub struct OperationDescriptor {
    /// Client-side correlation id
    pub op_id: Uuid,
    pub operation: VaultOperation,
    /// Safety-triggered submissions are flagged for the audit trail
    pub emergency: bool,
}

impl OperationDescriptor {
    pub fn new(operation: VaultOperation, emergency: bool) -> Self {
        Self {
            op_id: Uuid::new_v4(),
            operation,
            emergency,
        }
    }
}

/// Terminal confirmation state reported by the submitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalStatus {
    Confirmed,
    Finalized,
}

/// Result of a submission that reached a terminal state.
#[derive(Debug, Clone)]
pub struct SubmissionReceipt {
    pub confirmation_id: String,
    pub tx_hash: String,
    pub status: FinalStatus,
}

/// Retry classification for a submission failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Likely to succeed on retry (network/availability)
    Transient,
    /// Will not succeed without external intervention
    Permanent,
    /// Provider could not classify; retried like transient, logged distinctly
    Unknown,
}

/// Submission failure, tagged at the boundary.
#[derive(Debug, Clone, Error)]
pub enum SubmissionError {
    /// Network partition, connection reset, or upstream 5xx
    #[error("upstream unavailable: {0}")]
    Unavailable(String),

    /// The operation did not reach a terminal state in time
    #[error("submission timed out: {0}")]
    Timeout(String),

    /// Upstream 429-class throttling
    #[error("upstream rate limited: {0}")]
    RateLimited(String),

    /// Authorization or permission denial
    #[error("authorization denied: {0}")]
    Unauthorized(String),

    /// Explicit cancellation of the operation
    #[error("operation cancelled: {0}")]
    Cancelled(String),

    /// Anything the provider could not classify
    #[error("provider error: {0}")]
    Other(String),
}

impl SubmissionError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Unavailable(_) | Self::Timeout(_) | Self::RateLimited(_) => {
                ErrorCategory::Transient
            }
            Self::Unauthorized(_) | Self::Cancelled(_) => ErrorCategory::Permanent,
            Self::Other(_) => ErrorCategory::Unknown,
        }
    }
}

/// Submits an operation and suspends until it reaches a terminal state or a
/// submission-level timeout elapses.
#[async_trait]
pub trait Submitter: Send + Sync {
    async fn submit(&self, op: &OperationDescriptor) -> Result<SubmissionReceipt, SubmissionError>;
}
