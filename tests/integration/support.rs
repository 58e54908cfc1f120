//! Shared mock collaborators for integration tests

use std::collections::VecDeque;
use std::sync::atomic::{AtomicI64, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use tokio::time::Instant;

use treasury_keeper::chain::{
    CircuitBreakerReader, FinalStatus, OperationDescriptor, StateReadError, SubmissionError,
    SubmissionReceipt, Submitter, VaultStateReader,
};
use treasury_keeper::models::VaultState;

/// Build a snapshot with the fields the decision engine cares about.
pub fn snapshot(total_assets: u128, idle_reserve: u128, strategy_balance: u128) -> VaultState {
    VaultState {
        total_assets,
        total_lent: 0,
        idle_reserve,
        strategy_balance,
        total_borrowed: 0,
        utilisation_wad: 0,
        strategy_yield_rate: 0.045,
        observed_at: Utc::now(),
    }
}

/// Vault reader returning a fixed snapshot or a fixed error.
pub struct MockVaultReader {
    state: Mutex<Result<VaultState, StateReadError>>,
    pub reads: AtomicU32,
}

impl MockVaultReader {
    pub fn with_state(state: VaultState) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(Ok(state)),
            reads: AtomicU32::new(0),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(Err(StateReadError::Partial(message.to_string()))),
            reads: AtomicU32::new(0),
        })
    }
}

#[async_trait]
impl VaultStateReader for MockVaultReader {
    async fn read(&self) -> Result<VaultState, StateReadError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.state.lock().clone()
    }
}

/// Breaker reader returning a settable raw level.
pub struct MockBreakerReader {
    raw: AtomicI64,
}

impl MockBreakerReader {
    pub fn at(raw: i64) -> Arc<Self> {
        Arc::new(Self {
            raw: AtomicI64::new(raw),
        })
    }
}

#[async_trait]
impl CircuitBreakerReader for MockBreakerReader {
    async fn read_level(&self) -> Result<i64, StateReadError> {
        Ok(self.raw.load(Ordering::SeqCst))
    }
}

/// Submitter driven by a script of results. Records every call.
pub struct MockSubmitter {
    script: Mutex<VecDeque<Result<SubmissionReceipt, SubmissionError>>>,
    pub submitted: Mutex<Vec<OperationDescriptor>>,
    pub call_instants: Mutex<Vec<Instant>>,
    pub finished: AtomicU32,
    delay: Duration,
}

impl MockSubmitter {
    /// Every call succeeds immediately.
    pub fn always_ok() -> Arc<Self> {
        Self::scripted(Vec::new())
    }

    /// Plays back the script, then succeeds.
    pub fn scripted(results: Vec<Result<SubmissionReceipt, SubmissionError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(results.into()),
            submitted: Mutex::new(Vec::new()),
            call_instants: Mutex::new(Vec::new()),
            finished: AtomicU32::new(0),
            delay: Duration::ZERO,
        })
    }

    /// Every call succeeds after the given delay.
    pub fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(VecDeque::new()),
            submitted: Mutex::new(Vec::new()),
            call_instants: Mutex::new(Vec::new()),
            finished: AtomicU32::new(0),
            delay,
        })
    }

    pub fn calls(&self) -> usize {
        self.call_instants.lock().len()
    }

    pub fn receipt() -> SubmissionReceipt {
        SubmissionReceipt {
            confirmation_id: "conf-1".to_string(),
            tx_hash: "0xabc123".to_string(),
            status: FinalStatus::Finalized,
        }
    }
}

#[async_trait]
impl Submitter for MockSubmitter {
    async fn submit(&self, op: &OperationDescriptor) -> Result<SubmissionReceipt, SubmissionError> {
        self.call_instants.lock().push(Instant::now());
        self.submitted.lock().push(op.clone());

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let result = self
            .script
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(Self::receipt()));
        self.finished.fetch_add(1, Ordering::SeqCst);
        result
    }
}

/// Poll a condition until it holds or the budget runs out.
pub async fn wait_until(budget: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + budget;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    cond()
}
