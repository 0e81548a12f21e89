//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading engine
//! configuration from YAML files.

use std::fs;
use std::path::Path;

use rust_decimal::Decimal;

use crate::calculation::DivisionCommissionPolicy;
use crate::error::{EngineError, EngineResult};

use super::types::{AggregationFile, EngineConfig, EngineFile, TierThresholds, TiersFile};

/// Loads and provides access to engine configuration.
///
/// # Directory Structure
///
/// ```text
/// config/default/
/// ├── engine.yaml       # Server bind address and logging
/// ├── tiers.yaml        # Hour tier thresholds
/// └── aggregation.yaml  # Batch concurrency, failure policy, commission exclusions
/// ```
///
/// # Example
///
/// ```no_run
/// use payroll_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/default").unwrap();
/// println!("Binding to {}", loader.config().server().bind_address);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - Any required file is missing
    /// - Any file contains invalid YAML
    /// - A value is unusable (thresholds out of order, zero concurrency)
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let engine_path = path.join("engine.yaml");
        let engine = Self::load_yaml::<EngineFile>(&engine_path)?;

        let tiers_path = path.join("tiers.yaml");
        let tiers = Self::load_yaml::<TiersFile>(&tiers_path)?.tiers;
        Self::validate_tiers(&tiers, &tiers_path)?;

        let aggregation_path = path.join("aggregation.yaml");
        let aggregation = Self::load_yaml::<AggregationFile>(&aggregation_path)?;
        if aggregation.aggregation.max_concurrency == 0 {
            return Err(EngineError::ConfigParseError {
                path: aggregation_path.display().to_string(),
                message: "aggregation.max_concurrency must be at least 1".to_string(),
            });
        }

        Ok(Self {
            config: EngineConfig::new(engine, tiers, aggregation),
        })
    }

    /// Wraps an already-built configuration.
    pub fn from_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    fn validate_tiers(tiers: &TierThresholds, path: &Path) -> EngineResult<()> {
        let invalid = |message: &str| EngineError::ConfigParseError {
            path: path.display().to_string(),
            message: message.to_string(),
        };

        if tiers.daily_overtime_after < Decimal::ZERO || tiers.weekly_overtime_after < Decimal::ZERO {
            return Err(invalid("tier thresholds must not be negative"));
        }
        if tiers.daily_doubletime_after < tiers.daily_overtime_after {
            return Err(invalid(
                "daily_doubletime_after must not be below daily_overtime_after",
            ));
        }
        Ok(())
    }

    /// Returns the underlying engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the tier thresholds.
    pub fn tiers(&self) -> &TierThresholds {
        self.config.tiers()
    }

    /// Builds the commission policy described by the configuration.
    pub fn commission_policy(&self) -> DivisionCommissionPolicy {
        DivisionCommissionPolicy::new(&self.config.commission().excluded_divisions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::CommissionPolicy;
    use crate::config::AggregationFailurePolicy;
    use crate::models::{HourBreakdown, PaymentInput};
    use std::path::PathBuf;
    use std::str::FromStr;

    fn config_path() -> &'static str {
        "./config/default"
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn scratch_dir(name: &str, tiers: &str, aggregation: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "payroll-engine-{}-{}",
            name,
            uuid::Uuid::new_v4()
        ));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("engine.yaml"), "server:\n  bind_address: \"0.0.0.0:9000\"\n").unwrap();
        fs::write(dir.join("tiers.yaml"), tiers).unwrap();
        fs::write(dir.join("aggregation.yaml"), aggregation).unwrap();
        dir
    }

    const VALID_TIERS: &str = "tiers:\n  daily_overtime_after: \"8\"\n  daily_doubletime_after: \"12\"\n  weekly_overtime_after: \"40\"\n";

    #[test]
    fn test_load_valid_configuration() {
        let result = ConfigLoader::load(config_path());
        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());

        let loader = result.unwrap();
        assert_eq!(loader.tiers().daily_overtime_after, dec("8"));
        assert_eq!(loader.tiers().daily_doubletime_after, dec("12"));
        assert_eq!(loader.tiers().weekly_overtime_after, dec("40"));
        assert_eq!(
            loader.config().aggregation().on_worker_failure,
            AggregationFailurePolicy::Abort
        );
        assert_eq!(loader.config().logging().level, "info");
    }

    #[test]
    fn test_commission_policy_from_config() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        let policy = loader.commission_policy();

        let payment = PaymentInput {
            hours: HourBreakdown::default(),
            base_rate: dec("20"),
            commission: dec("10"),
            tips: Decimal::ZERO,
            adjustment: Decimal::ZERO,
            division: Some("Security".to_string()),
        };
        assert!(!policy.is_eligible(&payment));
    }

    #[test]
    fn test_load_missing_directory_returns_error() {
        let result = ConfigLoader::load("/nonexistent/path");

        match result {
            Err(EngineError::ConfigNotFound { path }) => {
                assert!(path.contains("engine.yaml"));
            }
            other => panic!("Expected ConfigNotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_defaults_fill_missing_sections() {
        let dir = scratch_dir("defaults", VALID_TIERS, "{}\n");

        let loader = ConfigLoader::load(&dir).unwrap();
        assert_eq!(loader.config().server().bind_address, "0.0.0.0:9000");
        assert_eq!(loader.config().aggregation().max_concurrency, 8);
        assert!(loader.config().commission().excluded_divisions.is_empty());

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_zero_fill_policy_parses() {
        let dir = scratch_dir(
            "zero-fill",
            VALID_TIERS,
            "aggregation:\n  max_concurrency: 2\n  on_worker_failure: zero_fill\n",
        );

        let loader = ConfigLoader::load(&dir).unwrap();
        assert_eq!(
            loader.config().aggregation().on_worker_failure,
            AggregationFailurePolicy::ZeroFill
        );
        assert_eq!(loader.config().aggregation().max_concurrency, 2);

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let dir = scratch_dir("zero", VALID_TIERS, "aggregation:\n  max_concurrency: 0\n");

        let result = ConfigLoader::load(&dir);
        match result {
            Err(EngineError::ConfigParseError { path, message }) => {
                assert!(path.contains("aggregation.yaml"));
                assert!(message.contains("max_concurrency"));
            }
            other => panic!("Expected ConfigParseError, got {:?}", other),
        }

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_doubletime_below_overtime_rejected() {
        let tiers = "tiers:\n  daily_overtime_after: \"10\"\n  daily_doubletime_after: \"8\"\n  weekly_overtime_after: \"40\"\n";
        let dir = scratch_dir("tiers", tiers, "{}\n");

        let result = ConfigLoader::load(&dir);
        assert!(matches!(result, Err(EngineError::ConfigParseError { .. })));

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_invalid_yaml_rejected() {
        let dir = scratch_dir("yaml", "tiers: [not, a, map\n", "{}\n");

        let result = ConfigLoader::load(&dir);
        match result {
            Err(EngineError::ConfigParseError { path, .. }) => assert!(path.contains("tiers.yaml")),
            other => panic!("Expected ConfigParseError, got {:?}", other),
        }

        fs::remove_dir_all(dir).ok();
    }
}
