//! Circuit Breaker Gate Unit Tests
//!
//! Tests the raw-level mapping through the gate:
//! - in-range levels pass through
//! - out-of-range raw values fail safe to EMERGENCY
//! - reader failures propagate as state-read errors

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use treasury_keeper::chain::{CircuitBreakerReader, StateReadError};
use treasury_keeper::circuit_breaker::{CircuitBreakerGate, CircuitBreakerLevel};

struct FixedLevelReader {
    raw: AtomicI64,
    fail: bool,
}

impl FixedLevelReader {
    fn at(raw: i64) -> Arc<Self> {
        Arc::new(Self {
            raw: AtomicI64::new(raw),
            fail: false,
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            raw: AtomicI64::new(0),
            fail: true,
        })
    }
}

#[async_trait]
impl CircuitBreakerReader for FixedLevelReader {
    async fn read_level(&self) -> Result<i64, StateReadError> {
        if self.fail {
            return Err(StateReadError::Transport("node unreachable".to_string()));
        }
        Ok(self.raw.load(Ordering::SeqCst))
    }
}

#[tokio::test]
async fn test_in_range_levels_pass_through() {
    for (raw, expected) in [
        (0, CircuitBreakerLevel::Normal),
        (1, CircuitBreakerLevel::Caution),
        (2, CircuitBreakerLevel::Stress),
        (3, CircuitBreakerLevel::Emergency),
    ] {
        let gate = CircuitBreakerGate::new(FixedLevelReader::at(raw));
        assert_eq!(gate.read_level().await.unwrap(), expected, "raw={raw}");
    }
}

#[tokio::test]
async fn test_out_of_range_reads_as_emergency() {
    for raw in [4i64, 7, 255, -1, i64::MIN, i64::MAX] {
        let gate = CircuitBreakerGate::new(FixedLevelReader::at(raw));
        let level = gate.read_level().await.unwrap();
        assert_eq!(level, CircuitBreakerLevel::Emergency, "raw={raw}");
        assert!(level.is_emergency());
    }
}

#[tokio::test]
async fn test_reader_failure_propagates() {
    let gate = CircuitBreakerGate::new(FixedLevelReader::failing());
    let err = gate.read_level().await.unwrap_err();
    assert!(matches!(err, StateReadError::Transport(_)));
}

#[test]
fn test_only_emergency_changes_loop_behavior() {
    assert!(!CircuitBreakerLevel::Caution.is_emergency());
    assert!(!CircuitBreakerLevel::Stress.is_emergency());
    assert!(CircuitBreakerLevel::Emergency.is_emergency());
}
