//! Point-in-time snapshot of on-chain vault figures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::WAD;

/// Immutable vault snapshot, produced fresh at the top of every monitor tick
/// and discarded when the tick ends.
///
/// All amounts are non-negative integers in the vault's base-unit
/// representation. `idle_reserve + total_lent` need not equal `total_assets`
/// exactly while the yield strategy holds a separate balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultState {
    /// Total assets under management
    pub total_assets: u128,
    /// Assets currently lent out to borrowers
    pub total_lent: u128,
    /// Immediately-available reserve
    pub idle_reserve: u128,
    /// Balance deployed in the yield strategy
    pub strategy_balance: u128,
    /// Outstanding borrows
    pub total_borrowed: u128,
    /// Utilisation ratio scaled by WAD (1e18 = 100%)
    pub utilisation_wad: u128,
    /// Annualized strategy yield rate, externally configured
    pub strategy_yield_rate: f64,
    /// Wall-clock time of the read
    pub observed_at: DateTime<Utc>,
}

impl VaultState {
    /// Utilisation as a plain fraction. Only meaningful while the vault holds
    /// assets; defined as 0 for an empty vault.
    pub fn utilisation(&self) -> f64 {
        if self.total_assets == 0 {
            0.0
        } else {
            self.utilisation_wad as f64 / WAD as f64
        }
    }
}
