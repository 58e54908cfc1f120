//! Rebalancing engine
//!
//! The decision engine proposes, the executor disposes, and the rate limiter
//! keeps both honest about the daily budget.

pub mod decision;
pub mod executor;
pub mod rate_limiter;

pub use decision::DecisionEngine;
pub use executor::Executor;
pub use rate_limiter::DailyRateLimiter;
