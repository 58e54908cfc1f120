//! Configuration management for the treasury keeper
//!
//! Loads configuration from YAML files and environment variables.
//! Environment variables override YAML values.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Ops server configuration (health + metrics)
    pub server: ServerConfig,
    /// Monitor loop cadence and heartbeat
    pub scheduler: SchedulerConfig,
    /// Decision engine scoring parameters
    pub strategy: StrategyConfig,
    /// Submission retry policy
    pub executor: ExecutorConfig,
    /// Daily rebalance quota
    pub limits: LimitsConfig,
}

/// Ops HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    9102
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Monitor loop configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    /// Interval between ticks in milliseconds
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Path the liveness heartbeat is written to
    #[serde(default = "default_heartbeat_path")]
    pub heartbeat_path: PathBuf,
}

fn default_interval_ms() -> u64 {
    60_000
}

fn default_heartbeat_path() -> PathBuf {
    PathBuf::from("data/keeper.heartbeat")
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            heartbeat_path: default_heartbeat_path(),
        }
    }
}

/// Decision engine scoring parameters
#[derive(Debug, Clone, Deserialize)]
pub struct StrategyConfig {
    /// Fraction of total assets to retain as idle buffer
    #[serde(default = "default_buffer_fraction")]
    pub buffer_fraction: f64,
    /// Fee the strategy takes off gross yield
    #[serde(default = "default_protocol_fee")]
    pub protocol_fee: f64,
    /// Assumed holding horizon in days
    #[serde(default = "default_holding_horizon_days")]
    pub holding_horizon_days: f64,
    /// Risk weight applied to the early-redemption cost estimate
    #[serde(default = "default_risk_factor")]
    pub risk_factor: f64,
    /// Probability of having to unwind the position early
    #[serde(default = "default_early_redeem_probability")]
    pub early_redeem_probability: f64,
    /// Fixed per-operation gas cost estimate
    #[serde(default = "default_fixed_gas_cost")]
    pub fixed_gas_cost: f64,
    /// Scale applied to buffer-shortfall urgency
    #[serde(default = "default_urgency_scale")]
    pub urgency_scale: f64,
    /// Selections at or below this utility are overridden to DoNothing
    #[serde(default = "default_min_utility_threshold")]
    pub min_utility_threshold: f64,
}

fn default_buffer_fraction() -> f64 {
    0.05
}

fn default_protocol_fee() -> f64 {
    0.10
}

fn default_holding_horizon_days() -> f64 {
    30.0
}

fn default_risk_factor() -> f64 {
    0.1
}

fn default_early_redeem_probability() -> f64 {
    0.2
}

fn default_fixed_gas_cost() -> f64 {
    0.5
}

fn default_urgency_scale() -> f64 {
    10.0
}

fn default_min_utility_threshold() -> f64 {
    0.0
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            buffer_fraction: default_buffer_fraction(),
            protocol_fee: default_protocol_fee(),
            holding_horizon_days: default_holding_horizon_days(),
            risk_factor: default_risk_factor(),
            early_redeem_probability: default_early_redeem_probability(),
            fixed_gas_cost: default_fixed_gas_cost(),
            urgency_scale: default_urgency_scale(),
            min_utility_threshold: default_min_utility_threshold(),
        }
    }
}

/// Submission retry policy
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutorConfig {
    /// Maximum submission attempts per operation
    #[serde(default = "default_max_retry_attempts")]
    pub max_retry_attempts: u32,
    /// Base backoff delay in milliseconds, doubled each attempt
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    /// Consecutive failures before an operational warning is emitted
    #[serde(default = "default_failure_warning_threshold")]
    pub failure_warning_threshold: u32,
}

fn default_max_retry_attempts() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    1_000
}

fn default_failure_warning_threshold() -> u32 {
    10
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_retry_attempts: default_max_retry_attempts(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            failure_warning_threshold: default_failure_warning_threshold(),
        }
    }
}

/// Daily rebalance quota
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Maximum discretionary rebalances per UTC calendar day
    #[serde(default = "default_max_rebalances_per_day")]
    pub max_rebalances_per_day: u32,
}

fn default_max_rebalances_per_day() -> u32 {
    4
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_rebalances_per_day: default_max_rebalances_per_day(),
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (KEEPER_*)
    /// 2. config/config.yaml (if exists)
    /// 3. config.yaml (if exists)
    /// 4. Default values
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 9102)?
            .set_default("scheduler.interval_ms", 60_000)?
            .set_default("scheduler.heartbeat_path", "data/keeper.heartbeat")?
            .set_default("strategy.buffer_fraction", 0.05)?
            .set_default("strategy.protocol_fee", 0.10)?
            .set_default("strategy.holding_horizon_days", 30.0)?
            .set_default("strategy.risk_factor", 0.1)?
            .set_default("strategy.early_redeem_probability", 0.2)?
            .set_default("strategy.fixed_gas_cost", 0.5)?
            .set_default("strategy.urgency_scale", 10.0)?
            .set_default("strategy.min_utility_threshold", 0.0)?
            .set_default("executor.max_retry_attempts", 3)?
            .set_default("executor.retry_base_delay_ms", 1_000)?
            .set_default("executor.failure_warning_threshold", 10)?
            .set_default("limits.max_rebalances_per_day", 4)?
            // Load from config files (lower priority)
            .add_source(File::with_name("config").required(false))
            .add_source(File::with_name("config/config").required(false))
            // Override with environment variables (highest priority - loaded last)
            // KEEPER_SCHEDULER__INTERVAL_MS=30000 -> scheduler.interval_ms = 30000
            .add_source(
                Environment::with_prefix("KEEPER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scheduler.interval_ms == 0 {
            return Err(ConfigError::Message(
                "Scheduler interval must be positive".to_string(),
            ));
        }

        if !(0.0..1.0).contains(&self.strategy.buffer_fraction) {
            return Err(ConfigError::Message(
                "Buffer fraction must be in [0, 1)".to_string(),
            ));
        }

        if !(0.0..1.0).contains(&self.strategy.protocol_fee) {
            return Err(ConfigError::Message(
                "Protocol fee must be in [0, 1)".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.strategy.early_redeem_probability) {
            return Err(ConfigError::Message(
                "Early-redeem probability must be in [0, 1]".to_string(),
            ));
        }

        if self.executor.max_retry_attempts == 0 {
            return Err(ConfigError::Message(
                "Executor must be allowed at least one submission attempt".to_string(),
            ));
        }

        if self.limits.max_rebalances_per_day == 0 {
            return Err(ConfigError::Message(
                "Daily rebalance quota must be at least 1".to_string(),
            ));
        }

        if self.scheduler.heartbeat_path.as_os_str().is_empty() {
            return Err(ConfigError::Message(
                "Heartbeat path must be set".to_string(),
            ));
        }

        Ok(())
    }
}
