//! In-memory vault for local runs
//!
//! Stands in for the RPC-backed reader and the custodial submitter so the
//! keeper can run end-to-end on a developer machine. Deposits and redeems are
//! applied to an internal book; the breaker level is settable for drills.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use uuid::Uuid;

use super::reader::{CircuitBreakerReader, StateReadError, VaultStateReader};
use super::submitter::{
    FinalStatus, OperationDescriptor, SubmissionError, SubmissionReceipt, Submitter,
    VaultOperation,
};
use crate::constants::WAD;
use crate::models::VaultState;

struct Book {
    total_lent: u128,
    idle_reserve: u128,
    strategy_balance: u128,
    total_borrowed: u128,
    strategy_yield_rate: f64,
}

/// Simulated vault implementing all three collaborator contracts.
pub struct SimulatedVault {
    book: Mutex<Book>,
    breaker_level: AtomicI64,
}

impl SimulatedVault {
    /// A mid-sized lending vault: most capital lent out, a fat idle buffer,
    /// a modest strategy position.
    pub fn with_genesis() -> Self {
        Self {
            book: Mutex::new(Book {
                total_lent: 850_000_000_000,
                idle_reserve: 100_000_000_000,
                strategy_balance: 50_000_000_000,
                total_borrowed: 850_000_000_000,
                strategy_yield_rate: 0.045,
            }),
            breaker_level: AtomicI64::new(0),
        }
    }

    /// Override the reported safety level, e.g. for an emergency drill.
    pub fn set_breaker_level(&self, raw: i64) {
        self.breaker_level.store(raw, Ordering::SeqCst);
    }
}

#[async_trait]
impl VaultStateReader for SimulatedVault {
    async fn read(&self) -> Result<VaultState, StateReadError> {
        let book = self.book.lock();
        let total_assets = book.idle_reserve + book.total_lent + book.strategy_balance;
        let utilisation_wad = if total_assets == 0 {
            0
        } else {
            book.total_borrowed.saturating_mul(WAD) / total_assets
        };
        Ok(VaultState {
            total_assets,
            total_lent: book.total_lent,
            idle_reserve: book.idle_reserve,
            strategy_balance: book.strategy_balance,
            total_borrowed: book.total_borrowed,
            utilisation_wad,
            strategy_yield_rate: book.strategy_yield_rate,
            observed_at: Utc::now(),
        })
    }
}

#[async_trait]
impl CircuitBreakerReader for SimulatedVault {
    async fn read_level(&self) -> Result<i64, StateReadError> {
        Ok(self.breaker_level.load(Ordering::SeqCst))
    }
}

#[async_trait]
impl Submitter for SimulatedVault {
    async fn submit(&self, op: &OperationDescriptor) -> Result<SubmissionReceipt, SubmissionError> {
        // Mimic one network round-trip
        tokio::time::sleep(Duration::from_millis(50)).await;

        {
            let mut book = self.book.lock();
            match op.operation {
                VaultOperation::StrategyDeposit { amount } => {
                    if amount > book.idle_reserve {
                        return Err(SubmissionError::Cancelled(format!(
                            "deposit {amount} exceeds idle reserve {}",
                            book.idle_reserve
                        )));
                    }
                    book.idle_reserve -= amount;
                    book.strategy_balance += amount;
                }
                VaultOperation::StrategyRedeem { amount } => {
                    if amount > book.strategy_balance {
                        return Err(SubmissionError::Cancelled(format!(
                            "redeem {amount} exceeds strategy balance {}",
                            book.strategy_balance
                        )));
                    }
                    book.strategy_balance -= amount;
                    book.idle_reserve += amount;
                }
            }
        }

        Ok(SubmissionReceipt {
            confirmation_id: op.op_id.to_string(),
            tx_hash: format!("0x{}", Uuid::new_v4().simple()),
            status: FinalStatus::Finalized,
        })
    }
}
