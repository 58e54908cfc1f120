//! Circuit-breaker gate for the monitor loop
//!
//! The protocol publishes a discrete safety level. Only the Emergency
//! boundary changes this loop's behavior: at Emergency the scheduler bypasses
//! normal scoring and unwinds the strategy position. Caution and Stress are
//! enforced by the protocol itself (on-chain pausing of specific operations)
//! and leave ordinary scoring in place.

use std::sync::Arc;

use crate::chain::{CircuitBreakerReader, StateReadError};

/// Discrete protocol safety level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CircuitBreakerLevel {
    Normal = 0,
    Caution = 1,
    Stress = 2,
    Emergency = 3,
}

impl std::fmt::Display for CircuitBreakerLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "NORMAL"),
            Self::Caution => write!(f, "CAUTION"),
            Self::Stress => write!(f, "STRESS"),
            Self::Emergency => write!(f, "EMERGENCY"),
        }
    }
}

impl CircuitBreakerLevel {
    /// Map a raw on-chain value to a level.
    ///
    /// Anything outside [0, 3] fails safe to Emergency. An unrecognized
    /// signal must never be read as "safe".
    pub fn from_raw(raw: i64) -> Self {
        match raw {
            0 => Self::Normal,
            1 => Self::Caution,
            2 => Self::Stress,
            3 => Self::Emergency,
            _ => {
                tracing::warn!(raw, "circuit breaker level out of range, failing safe to EMERGENCY");
                Self::Emergency
            }
        }
    }

    pub fn is_emergency(self) -> bool {
        self >= Self::Emergency
    }
}

/// Bounds-checking wrapper around the external level reader.
pub struct CircuitBreakerGate {
    reader: Arc<dyn CircuitBreakerReader>,
}

impl CircuitBreakerGate {
    pub fn new(reader: Arc<dyn CircuitBreakerReader>) -> Self {
        Self { reader }
    }

    /// Read the raw level and apply the fail-safe mapping.
    pub async fn read_level(&self) -> Result<CircuitBreakerLevel, StateReadError> {
        let raw = self.reader.read_level().await?;
        Ok(CircuitBreakerLevel::from_raw(raw))
    }
}
