//! Utility scoring over a vault snapshot
//!
//! Pure and total: any well-formed snapshot produces exactly three ranked
//! candidates. Division by the buffer target is guarded by the
//! `idle_reserve >= buffer_target` short-circuit when the target is zero.

use crate::config::StrategyConfig;
use crate::constants::DAYS_PER_YEAR;
use crate::models::{ActionKind, ScoredAction, VaultState};

/// Scores the three rebalance candidates and applies the selection threshold.
pub struct DecisionEngine {
    config: StrategyConfig,
}

impl DecisionEngine {
    pub fn new(config: StrategyConfig) -> Self {
        Self { config }
    }

    /// The minimum idle buffer the vault should retain, as base units.
    pub fn buffer_target(&self, total_assets: u128) -> u128 {
        (total_assets as f64 * self.config.buffer_fraction) as u128
    }

    /// Score all candidates, highest utility first.
    ///
    /// Candidates are declared in fixed order (MoveToStrategy,
    /// RedeemToReserve, DoNothing); the stable sort keeps that order on ties.
    pub fn rank(&self, state: &VaultState) -> Vec<ScoredAction> {
        let mut candidates = vec![
            self.score_move_to_strategy(state),
            self.score_redeem_to_reserve(state),
            ScoredAction::do_nothing(),
        ];
        candidates.sort_by(|a, b| b.utility.total_cmp(&a.utility));
        candidates
    }

    /// Pick the top candidate, overriding marginal wins to DoNothing.
    ///
    /// The threshold suppresses rebalances whose expected benefit does not
    /// clear the cost of a transaction plus operational risk.
    pub fn select(&self, ranked: Vec<ScoredAction>) -> ScoredAction {
        let top = ranked
            .into_iter()
            .next()
            .unwrap_or_else(ScoredAction::do_nothing);
        if top.utility <= self.config.min_utility_threshold {
            tracing::debug!(
                top_kind = %top.kind,
                top_utility = top.utility,
                threshold = self.config.min_utility_threshold,
                "best candidate below utility threshold, holding"
            );
            ScoredAction::do_nothing()
        } else {
            top
        }
    }

    /// Rank and select in one step.
    pub fn decide(&self, state: &VaultState) -> ScoredAction {
        self.select(self.rank(state))
    }

    fn score_move_to_strategy(&self, state: &VaultState) -> ScoredAction {
        let target = self.buffer_target(state.total_assets);
        let excess = state.idle_reserve.saturating_sub(target);
        if excess == 0 {
            return ScoredAction::never(
                ActionKind::MoveToStrategy,
                "idle reserve within buffer target",
            );
        }

        let horizon = self.config.holding_horizon_days / DAYS_PER_YEAR;
        let net_rate = state.strategy_yield_rate * (1.0 - self.config.protocol_fee);
        let yield_gain = net_rate * excess as f64 * horizon;
        let early_redemption_cost =
            self.config.risk_factor * self.config.early_redeem_probability * excess as f64;
        let utility = yield_gain - early_redemption_cost - self.config.fixed_gas_cost;

        ScoredAction {
            kind: ActionKind::MoveToStrategy,
            utility,
            amount: excess,
            rationale: format!("deploy {excess} idle above buffer target {target}"),
        }
    }

    fn score_redeem_to_reserve(&self, state: &VaultState) -> ScoredAction {
        let target = self.buffer_target(state.total_assets);
        if state.idle_reserve >= target || state.strategy_balance == 0 {
            return ScoredAction::never(
                ActionKind::RedeemToReserve,
                "buffer covered or nothing deployed",
            );
        }

        let shortfall = target - state.idle_reserve;
        let amount = shortfall.min(state.strategy_balance);
        // target > 0 here: idle_reserve < target rules out a zero target
        let buffer_ratio = state.idle_reserve as f64 / target as f64;
        let urgency = (1.0 - buffer_ratio).max(0.0) * self.config.urgency_scale;
        let utility = urgency - self.config.fixed_gas_cost;

        ScoredAction {
            kind: ActionKind::RedeemToReserve,
            utility,
            amount,
            rationale: format!("refill {amount} of {shortfall} buffer shortfall"),
        }
    }
}
