//! Daily rebalance quota keyed to the UTC calendar day
//!
//! Reset-on-access: every entry point rolls the window first, so no
//! background timer is needed and the count is correct even if the process
//! sat idle across a day boundary. The window is the UTC calendar day, not a
//! rolling 24h span: rebalances at 23:59 and 00:01 UTC land in different
//! budgets.

use chrono::{DateTime, NaiveDate, Utc};

/// Stateful daily quota gate. Owned by the executor; mutated only by its
/// post-submission callback.
pub struct DailyRateLimiter {
    max_per_day: u32,
    count: u32,
    window_day: NaiveDate,
}

impl DailyRateLimiter {
    pub fn new(max_per_day: u32) -> Self {
        Self::new_at(max_per_day, Utc::now())
    }

    pub fn new_at(max_per_day: u32, now: DateTime<Utc>) -> Self {
        Self {
            max_per_day,
            count: 0,
            window_day: now.date_naive(),
        }
    }

    /// Pure check against the current count and day. Does not consume quota.
    pub fn try_acquire(&mut self) -> bool {
        self.try_acquire_at(Utc::now())
    }

    pub fn try_acquire_at(&mut self, now: DateTime<Utc>) -> bool {
        self.roll_window(now.date_naive());
        self.count < self.max_per_day
    }

    /// Record one executed rebalance against today's budget.
    pub fn commit(&mut self) {
        self.commit_at(Utc::now());
    }

    pub fn commit_at(&mut self, now: DateTime<Utc>) {
        self.roll_window(now.date_naive());
        self.count += 1;
    }

    /// Rebalances spent in the current UTC day.
    pub fn current_count(&self) -> u32 {
        self.current_count_at(Utc::now())
    }

    pub fn current_count_at(&self, now: DateTime<Utc>) -> u32 {
        if now.date_naive() == self.window_day {
            self.count
        } else {
            0
        }
    }

    pub fn max_per_day(&self) -> u32 {
        self.max_per_day
    }

    fn roll_window(&mut self, today: NaiveDate) {
        if today != self.window_day {
            tracing::debug!(
                %today,
                previous = %self.window_day,
                spent = self.count,
                "rebalance quota window rolled over"
            );
            self.count = 0;
            self.window_day = today;
        }
    }
}
