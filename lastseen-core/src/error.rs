//! Error types for lastseen operations
//!
//! Cache reads and ingest are infallible by contract. Errors only arise from
//! configuration and from the activity-log source the refresh helpers call.

use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to parse configuration: {reason}")]
    Parse { reason: String },
}

/// Activity-log source errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("Request to {source_name} failed: {reason}")]
    RequestFailed { source_name: String, reason: String },

    #[error("Invalid response from {source_name}: {reason}")]
    InvalidResponse { source_name: String, reason: String },

    #[error("Source {source_name} unavailable")]
    Unavailable { source_name: String },
}

/// Master error type for all lastseen errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LastseenError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Source error: {0}")]
    Source(#[from] SourceError),
}

/// Result type alias for lastseen operations.
pub type LastseenResult<T> = Result<T, LastseenError>;

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display_invalid_value() {
        let err = ConfigError::InvalidValue {
            field: "ttl".to_string(),
            value: "0s".to_string(),
            reason: "must be positive".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("ttl"));
        assert!(msg.contains("0s"));
        assert!(msg.contains("must be positive"));
    }

    #[test]
    fn test_config_error_display_parse() {
        let err = ConfigError::Parse {
            reason: "expected `=`".to_string(),
        };
        assert_eq!(
            format!("{}", err),
            "Failed to parse configuration: expected `=`"
        );
    }

    #[test]
    fn test_source_error_display_request_failed() {
        let err = SourceError::RequestFailed {
            source_name: "activity_log".to_string(),
            reason: "connection reset".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("activity_log"));
        assert!(msg.contains("connection reset"));
    }

    #[test]
    fn test_lastseen_error_from_variants() {
        let config = LastseenError::from(ConfigError::MissingRequired {
            field: "tracked_kind".to_string(),
        });
        assert!(matches!(config, LastseenError::Config(_)));
        assert!(format!("{}", config).starts_with("Config error:"));

        let source = LastseenError::from(SourceError::Unavailable {
            source_name: "activity_log".to_string(),
        });
        assert!(matches!(source, LastseenError::Source(_)));
        assert!(format!("{}", source).contains("unavailable"));
    }
}
