//! Error types for the payroll engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every error condition the engine surfaces to its callers.

use thiserror::Error;

use crate::store::StoreError;

/// The main error type for the payroll engine.
///
/// `Validation` and `Conflict` are expected outcomes that are surfaced
/// directly to the caller and never retried. `Upstream` wraps failures of
/// the event store, adjustment ledger or event payment source.
///
/// # Example
///
/// ```
/// use payroll_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/engine.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/engine.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed or held unusable values.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Request input was malformed or missing a required field.
    #[error("Invalid field '{field}': {message}")]
    Validation {
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// A clock action contradicted the worker's current session state.
    #[error("Conflict for worker '{worker_id}': {message}")]
    Conflict {
        /// The worker whose clock action was rejected.
        worker_id: String,
        /// A description of the conflict.
        message: String,
    },

    /// The caller identity was missing or unusable.
    #[error("Authentication required: {message}")]
    Auth {
        /// A description of the identity problem.
        message: String,
    },

    /// A backing store or collaborator was unavailable.
    #[error("Upstream '{collaborator}' unavailable: {message}")]
    Upstream {
        /// The collaborator that failed (e.g. "event_store").
        collaborator: String,
        /// A description of the failure.
        message: String,
    },
}

impl EngineError {
    /// Builds a validation error for `field`.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Builds a conflict error for `worker_id`.
    pub fn conflict(worker_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Conflict {
            worker_id: worker_id.into(),
            message: message.into(),
        }
    }

    /// Wraps a store failure raised by `collaborator`.
    pub fn upstream(collaborator: &str, error: StoreError) -> Self {
        Self::Upstream {
            collaborator: collaborator.to_string(),
            message: error.to_string(),
        }
    }

    /// Returns true for errors the caller caused and should not retry.
    pub fn is_expected(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::Conflict { .. })
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_not_found_displays_path() {
        let error = EngineError::ConfigNotFound {
            path: "/missing/engine.yaml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found: /missing/engine.yaml"
        );
    }

    #[test]
    fn test_config_parse_error_displays_path_and_message() {
        let error = EngineError::ConfigParseError {
            path: "/config/tiers.yaml".to_string(),
            message: "invalid YAML syntax".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to parse configuration file '/config/tiers.yaml': invalid YAML syntax"
        );
    }

    #[test]
    fn test_validation_displays_field_and_message() {
        let error = EngineError::validation("worker_ids", "must not be empty");
        assert_eq!(
            error.to_string(),
            "Invalid field 'worker_ids': must not be empty"
        );
    }

    #[test]
    fn test_conflict_displays_worker() {
        let error = EngineError::conflict("w-1", "session already open");
        assert_eq!(
            error.to_string(),
            "Conflict for worker 'w-1': session already open"
        );
    }

    #[test]
    fn test_upstream_wraps_store_error() {
        let error = EngineError::upstream(
            "event_store",
            StoreError::Unavailable {
                message: "connection refused".to_string(),
            },
        );
        assert_eq!(
            error.to_string(),
            "Upstream 'event_store' unavailable: store unavailable: connection refused"
        );
    }

    #[test]
    fn test_expected_errors() {
        assert!(EngineError::validation("a", "b").is_expected());
        assert!(EngineError::conflict("a", "b").is_expected());
        assert!(
            !EngineError::Auth {
                message: "missing".to_string()
            }
            .is_expected()
        );
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<EngineError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_conflict() -> EngineResult<()> {
            Err(EngineError::conflict("w-1", "no open session"))
        }

        fn propagates_error() -> EngineResult<()> {
            returns_conflict()?;
            Ok(())
        }

        assert!(propagates_error().is_err());
    }
}
