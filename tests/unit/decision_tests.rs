//! Decision Engine Unit Tests
//!
//! Tests the full scoring and selection surface:
//! - buffer target computation
//! - sentinel candidates
//! - ranking arity and stable tie-break
//! - threshold override boundary
//! - the two reference scenarios

use chrono::Utc;
use treasury_keeper::config::StrategyConfig;
use treasury_keeper::engine::DecisionEngine;
use treasury_keeper::models::{ActionKind, VaultState};

fn reference_config() -> StrategyConfig {
    StrategyConfig {
        buffer_fraction: 0.05,
        protocol_fee: 0.10,
        holding_horizon_days: 30.0,
        risk_factor: 0.1,
        early_redeem_probability: 0.2,
        fixed_gas_cost: 0.5,
        urgency_scale: 10.0,
        min_utility_threshold: 0.0,
    }
}

fn snapshot(total_assets: u128, idle_reserve: u128, strategy_balance: u128) -> VaultState {
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

#[test]
fn test_buffer_target_fraction_of_assets() {
    let engine = DecisionEngine::new(reference_config());
    assert_eq!(engine.buffer_target(1_000_000), 50_000);
    assert_eq!(engine.buffer_target(0), 0);
}

#[test]
fn test_buffer_target_monotonic_in_total_assets() {
    let engine = DecisionEngine::new(reference_config());
    let totals = [0u128, 1, 10, 999, 1_000, 50_000, 1_000_000, 123_456_789, 10_u128.pow(15)];
    let mut previous = 0u128;
    for total in totals {
        let target = engine.buffer_target(total);
        assert!(
            target >= previous,
            "buffer target regressed at total_assets={total}"
        );
        previous = target;
    }
}

#[test]
fn test_move_sentinel_whenever_idle_at_or_below_target() {
    let engine = DecisionEngine::new(reference_config());
    for idle in [0u128, 1, 25_000, 49_999, 50_000] {
        let ranked = engine.rank(&snapshot(1_000_000, idle, 77_777));
        let mv = ranked
            .iter()
            .find(|a| a.kind == ActionKind::MoveToStrategy)
            .unwrap();
        assert_eq!(mv.utility, -1.0, "idle={idle}");
        assert_eq!(mv.amount, 0, "idle={idle}");
    }
}

#[test]
fn test_redeem_sentinel_conditions() {
    let engine = DecisionEngine::new(reference_config());

    // idle at or above the target
    for idle in [50_000u128, 60_000, 1_000_000] {
        let ranked = engine.rank(&snapshot(1_000_000, idle, 20_000));
        let rd = ranked
            .iter()
            .find(|a| a.kind == ActionKind::RedeemToReserve)
            .unwrap();
        assert_eq!(rd.utility, -1.0, "idle={idle}");
        assert_eq!(rd.amount, 0, "idle={idle}");
    }

    // nothing deployed in the strategy
    let ranked = engine.rank(&snapshot(1_000_000, 10_000, 0));
    let rd = ranked
        .iter()
        .find(|a| a.kind == ActionKind::RedeemToReserve)
        .unwrap();
    assert_eq!(rd.utility, -1.0);
    assert_eq!(rd.amount, 0);
}

#[test]
fn test_rank_returns_exactly_three_with_baseline_zero() {
    let engine = DecisionEngine::new(reference_config());
    for state in [
        snapshot(0, 0, 0),
        snapshot(1_000_000, 100_000, 0),
        snapshot(1_000_000, 0, 20_000),
    ] {
        let ranked = engine.rank(&state);
        assert_eq!(ranked.len(), 3);
        let baseline = ranked
            .iter()
            .find(|a| a.kind == ActionKind::DoNothing)
            .unwrap();
        assert_eq!(baseline.utility, 0.0);
        assert_eq!(baseline.amount, 0);
    }
}

#[test]
fn test_stable_tie_break_follows_declaration_order() {
    // Empty vault: both rebalance candidates tie at the sentinel value
    let engine = DecisionEngine::new(reference_config());
    let ranked = engine.rank(&snapshot(0, 0, 0));
    assert_eq!(ranked[0].kind, ActionKind::DoNothing);
    assert_eq!(ranked[1].kind, ActionKind::MoveToStrategy);
    assert_eq!(ranked[2].kind, ActionKind::RedeemToReserve);
}

#[test]
fn test_threshold_override_iff_top_at_or_below() {
    // Top candidate is RedeemToReserve at exactly 9.5
    let state = snapshot(1_000_000, 0, 20_000);

    let mut config = reference_config();
    config.min_utility_threshold = 9.5;
    let engine = DecisionEngine::new(config);
    let selection = engine.select(engine.rank(&state));
    assert_eq!(
        selection.kind,
        ActionKind::DoNothing,
        "u == threshold must be overridden"
    );

    let mut config = reference_config();
    config.min_utility_threshold = 9.499;
    let engine = DecisionEngine::new(config);
    let selection = engine.select(engine.rank(&state));
    assert_eq!(
        selection.kind,
        ActionKind::RedeemToReserve,
        "u > threshold must pass through unchanged"
    );
    assert_eq!(selection.amount, 20_000);
}

#[test]
fn test_scenario_uneconomic_surplus_holds() {
    // 1,000,000 total with 100,000 idle: 50,000 excess above the buffer, but
    // the expected 30-day yield (~166.5) is dwarfed by the early-redemption
    // cost estimate (1,000), so the move scores ~-833.5 and the keeper holds.
    let engine = DecisionEngine::new(reference_config());
    let state = snapshot(1_000_000, 100_000, 0);

    let ranked = engine.rank(&state);
    let mv = ranked
        .iter()
        .find(|a| a.kind == ActionKind::MoveToStrategy)
        .unwrap();
    assert_eq!(mv.amount, 50_000);

    let net_rate = 0.045 * 0.90;
    let horizon = 30.0 / 365.0;
    let expected = net_rate * 50_000.0 * horizon - 0.1 * 0.2 * 50_000.0 - 0.5;
    assert!((mv.utility - expected).abs() < 1e-9);
    assert!(expected < 0.0);

    assert_eq!(engine.select(ranked).kind, ActionKind::DoNothing);
}

#[test]
fn test_scenario_drained_buffer_redeems_capped_amount() {
    // Empty reserve with only 20,000 deployed: the 50,000 shortfall is capped
    // by the strategy balance, urgency runs at full scale.
    let engine = DecisionEngine::new(reference_config());
    let state = snapshot(1_000_000, 0, 20_000);

    let selection = engine.decide(&state);
    assert_eq!(selection.kind, ActionKind::RedeemToReserve);
    assert_eq!(selection.amount, 20_000);
    assert!((selection.utility - 9.5).abs() < 1e-9);
}
