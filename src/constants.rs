/// Shared numeric constants for the rebalancing loop.
///
/// These values mirror the fixed-point conventions of the on-chain vault.
/// When updating the scale, ensure it matches the vault contract's ray/wad
/// convention.

/// Fixed-point scale used for on-chain ratios (1e18 = 100%).
pub const WAD: u128 = 1_000_000_000_000_000_000;

/// Utility assigned to candidates that must never rank above the DoNothing
/// baseline of 0.
pub const NEVER_PICK_UTILITY: f64 = -1.0;

/// Utility carried by circuit-breaker emergency actions. Always executes.
pub const EMERGENCY_UTILITY: f64 = f64::INFINITY;

/// Days per year for the holding-horizon conversion.
pub const DAYS_PER_YEAR: f64 = 365.0;
