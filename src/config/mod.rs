//! Configuration loading and management for the payroll engine.
//!
//! This module loads server, logging, hour tier, aggregation and commission
//! settings from YAML files.
//!
//! # Example
//!
//! ```no_run
//! use payroll_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/default").unwrap();
//! println!("Weekly overtime after {} hours", config.tiers().weekly_overtime_after);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    AggregationConfig, AggregationFailurePolicy, AggregationFile, CommissionConfig, EngineConfig,
    EngineFile, LoggingConfig, ServerConfig, TierThresholds, TiersFile,
};
