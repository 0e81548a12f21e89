//! Configuration types for the payroll engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address the server binds to.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}

fn default_bind_address() -> String {
    "127.0.0.1:8080".to_string()
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level filter (e.g. "info"); `RUST_LOG` overrides it.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// engine.yaml file structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineFile {
    /// Server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Thresholds for classifying hours into pay tiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierThresholds {
    /// Event hours beyond this are overtime.
    pub daily_overtime_after: Decimal,
    /// Event hours beyond this are doubletime.
    pub daily_doubletime_after: Decimal,
    /// Weekly hours beyond this are overtime.
    pub weekly_overtime_after: Decimal,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            daily_overtime_after: Decimal::from(8),
            daily_doubletime_after: Decimal::from(12),
            weekly_overtime_after: Decimal::from(40),
        }
    }
}

/// tiers.yaml file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct TiersFile {
    /// Tier thresholds.
    pub tiers: TierThresholds,
}

/// What a batch aggregation does when one worker's events cannot be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationFailurePolicy {
    /// Fail the whole batch.
    #[default]
    Abort,
    /// Log the failure and count that worker's hours as zero.
    ZeroFill,
}

/// Batch aggregation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationConfig {
    /// Maximum concurrent event store reads per batch.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    /// Behaviour when a single worker's read fails.
    #[serde(default)]
    pub on_worker_failure: AggregationFailurePolicy,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            on_worker_failure: AggregationFailurePolicy::default(),
        }
    }
}

fn default_max_concurrency() -> usize {
    8
}

/// Commission eligibility settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CommissionConfig {
    /// Divisions whose work never earns commission.
    #[serde(default)]
    pub excluded_divisions: Vec<String>,
}

/// aggregation.yaml file structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AggregationFile {
    /// Batch aggregation settings.
    #[serde(default)]
    pub aggregation: AggregationConfig,
    /// Commission eligibility settings.
    #[serde(default)]
    pub commission: CommissionConfig,
}

/// The complete engine configuration loaded from YAML files.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    server: ServerConfig,
    logging: LoggingConfig,
    tiers: TierThresholds,
    aggregation: AggregationConfig,
    commission: CommissionConfig,
}

impl EngineConfig {
    /// Creates an EngineConfig from its component parts.
    pub fn new(
        engine: EngineFile,
        tiers: TierThresholds,
        aggregation: AggregationFile,
    ) -> Self {
        Self {
            server: engine.server,
            logging: engine.logging,
            tiers,
            aggregation: aggregation.aggregation,
            commission: aggregation.commission,
        }
    }

    /// Returns the server settings.
    pub fn server(&self) -> &ServerConfig {
        &self.server
    }

    /// Returns the logging settings.
    pub fn logging(&self) -> &LoggingConfig {
        &self.logging
    }

    /// Returns the tier thresholds.
    pub fn tiers(&self) -> &TierThresholds {
        &self.tiers
    }

    /// Returns the batch aggregation settings.
    pub fn aggregation(&self) -> &AggregationConfig {
        &self.aggregation
    }

    /// Returns the commission settings.
    pub fn commission(&self) -> &CommissionConfig {
        &self.commission
    }

    /// Replaces the aggregation settings.
    pub fn with_aggregation(mut self, aggregation: AggregationConfig) -> Self {
        self.aggregation = aggregation;
        self
    }

    /// Replaces the commission settings.
    pub fn with_commission(mut self, commission: CommissionConfig) -> Self {
        self.commission = commission;
        self
    }
}
