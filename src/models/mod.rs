//! Data model for the rebalancing loop

mod action;
mod vault;

pub use action::{ActionKind, ScoredAction};
pub use vault::VaultState;
