//! Error types for dualttl.
//!
//! The lookup path never fails on its own: a predicate's return value is the
//! result. These errors only arise while loading configuration or setting up
//! the background janitor.

use thiserror::Error;

/// Result type alias using `DualTtlError`.
pub type Result<T> = std::result::Result<T, DualTtlError>;

/// Main error type for all dualttl operations.
#[derive(Debug, Error)]
pub enum DualTtlError {
    // ═══════════════════════════════════════════════════════════════════════════
    // CONFIGURATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Configuration value out of range.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Environment variable present but unparsable.
    #[error("Invalid environment variable '{name}': {reason}")]
    InvalidEnvVar {
        /// Name of the offending variable.
        name: String,
        /// Parser message for the rejected value.
        reason: String,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    // ═══════════════════════════════════════════════════════════════════════════
    // RUNTIME ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// The OS refused to start the janitor thread.
    #[error("Failed to spawn janitor thread: {0}")]
    JanitorSpawn(#[from] std::io::Error),
}

impl DualTtlError {
    /// Returns true if this error comes from bad configuration input.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            DualTtlError::ConfigError(_)
                | DualTtlError::InvalidEnvVar { .. }
                | DualTtlError::JsonError(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DualTtlError::InvalidEnvVar {
            name: "DUALTTL_TRUE_TTL_MS".into(),
            reason: "invalid digit found in string".into(),
        };
        assert!(err.to_string().contains("DUALTTL_TRUE_TTL_MS"));
        assert!(err.to_string().contains("invalid digit"));
    }

    #[test]
    fn test_error_classification() {
        assert!(DualTtlError::ConfigError("test".into()).is_config_error());

        let io = std::io::Error::new(std::io::ErrorKind::Other, "no threads left");
        assert!(!DualTtlError::from(io).is_config_error());
    }

    #[test]
    fn test_json_error_conversion() {
        let json_result: std::result::Result<serde_json::Value, _> = serde_json::from_str("invalid");
        let result: Result<serde_json::Value> = json_result.map_err(DualTtlError::from);
        assert!(matches!(result, Err(DualTtlError::JsonError(_))));
    }
}
