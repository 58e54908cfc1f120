//! Rebalance executor
//!
//! Consumes the selected action, enforces the daily quota, and drives the
//! submission through bounded retries. Nothing here propagates to the
//! scheduler: a tick can never be aborted by a transaction failure, so every
//! outcome terminates inside `execute` and is observable only through logs,
//! metrics, and the failure counter.

use std::sync::Arc;
use std::time::Duration;

use crate::chain::{
    ErrorCategory, OperationDescriptor, SubmissionError, SubmissionReceipt, Submitter,
    VaultOperation,
};
use crate::config::ExecutorConfig;
use crate::engine::rate_limiter::DailyRateLimiter;
use crate::metrics::MetricsState;
use crate::models::{ActionKind, ScoredAction};

/// Rate-limit gate plus retrying transaction submission.
pub struct Executor {
    config: ExecutorConfig,
    submitter: Arc<dyn Submitter>,
    rate_limiter: DailyRateLimiter,
    consecutive_failures: u32,
    metrics: Option<Arc<MetricsState>>,
}

impl Executor {
    pub fn new(
        config: ExecutorConfig,
        submitter: Arc<dyn Submitter>,
        rate_limiter: DailyRateLimiter,
    ) -> Self {
        Self {
            config,
            submitter,
            rate_limiter,
            consecutive_failures: 0,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsState>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Execute a selected action. Emergency actions bypass the daily quota
    /// and never commit against it.
    pub async fn execute(&mut self, action: &ScoredAction, emergency: bool) {
        if !emergency && !self.rate_limiter.try_acquire() {
            tracing::info!(
                kind = %action.kind,
                spent = self.rate_limiter.current_count(),
                max_per_day = self.rate_limiter.max_per_day(),
                "daily rebalance quota exhausted, deferring action"
            );
            if let Some(m) = &self.metrics {
                m.deferred_total.inc();
            }
            return;
        }

        let operation = match action.kind {
            ActionKind::DoNothing => return,
            ActionKind::MoveToStrategy => VaultOperation::StrategyDeposit {
                amount: action.amount,
            },
            ActionKind::RedeemToReserve => VaultOperation::StrategyRedeem {
                amount: action.amount,
            },
        };

        let descriptor = OperationDescriptor::new(operation, emergency);
        tracing::info!(
            op_id = %descriptor.op_id,
            operation = %descriptor.operation,
            emergency,
            utility = action.utility,
            rationale = %action.rationale,
            "submitting rebalance operation"
        );

        match self.submit_with_retry(&descriptor).await {
            Ok(receipt) => self.record_success(&descriptor, action, emergency, &receipt),
            Err(e) => self.record_failure(&descriptor, &e),
        }
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn rate_limiter(&self) -> &DailyRateLimiter {
        &self.rate_limiter
    }

    /// Submit with bounded retry: exponential backoff for transient (and
    /// unknown) failures, immediate abort for permanent ones.
    async fn submit_with_retry(
        &self,
        descriptor: &OperationDescriptor,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        let mut delay = Duration::from_millis(self.config.retry_base_delay_ms);
        let mut attempt = 1u32;

        loop {
            match self.submitter.submit(descriptor).await {
                Ok(receipt) => return Ok(receipt),
                Err(e) => {
                    let category = e.category();
                    self.count_failure_class(category);

                    if category == ErrorCategory::Permanent {
                        tracing::error!(
                            op_id = %descriptor.op_id,
                            attempt,
                            error = %e,
                            "permanent submission failure, not retrying"
                        );
                        return Err(e);
                    }

                    if category == ErrorCategory::Unknown {
                        tracing::warn!(
                            op_id = %descriptor.op_id,
                            error = %e,
                            "unclassified submission error, treating as transient"
                        );
                    }

                    if attempt >= self.config.max_retry_attempts {
                        tracing::error!(
                            op_id = %descriptor.op_id,
                            attempts = attempt,
                            error = %e,
                            "retry budget exhausted"
                        );
                        return Err(e);
                    }

                    tracing::warn!(
                        op_id = %descriptor.op_id,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "transient submission failure, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    delay = delay.saturating_mul(2);
                    attempt += 1;
                }
            }
        }
    }

    fn record_success(
        &mut self,
        descriptor: &OperationDescriptor,
        action: &ScoredAction,
        emergency: bool,
        receipt: &SubmissionReceipt,
    ) {
        if !emergency {
            self.rate_limiter.commit();
        }
        self.consecutive_failures = 0;

        tracing::info!(
            op_id = %descriptor.op_id,
            confirmation_id = %receipt.confirmation_id,
            tx_hash = %receipt.tx_hash,
            status = ?receipt.status,
            "rebalance confirmed"
        );

        if let Some(m) = &self.metrics {
            let kind = action.kind.to_string();
            m.rebalances_total.with_label_values(&[kind.as_str()]).inc();
            m.consecutive_failures.set(0);
            m.rebalance_quota_used
                .set(self.rate_limiter.current_count() as i64);
        }
    }

    fn record_failure(&mut self, descriptor: &OperationDescriptor, error: &SubmissionError) {
        self.consecutive_failures += 1;

        tracing::error!(
            op_id = %descriptor.op_id,
            error = %error,
            consecutive_failures = self.consecutive_failures,
            "rebalance submission failed"
        );

        if let Some(m) = &self.metrics {
            m.consecutive_failures.set(self.consecutive_failures as i64);
        }

        // Advisory only: the loop keeps running
        if self.consecutive_failures > self.config.failure_warning_threshold {
            tracing::warn!(
                consecutive_failures = self.consecutive_failures,
                threshold = self.config.failure_warning_threshold,
                "executor failure streak exceeds warning threshold"
            );
        }
    }

    fn count_failure_class(&self, category: ErrorCategory) {
        if let Some(m) = &self.metrics {
            let class = match category {
                ErrorCategory::Transient => "transient",
                ErrorCategory::Permanent => "permanent",
                ErrorCategory::Unknown => "unknown",
            };
            m.submission_failures_total.with_label_values(&[class]).inc();
        }
    }
}
