//! Error types for typegraph-ir
//!
//! Composition itself never fails: unresolved references are carried in-band.
//! Errors only come from configuration, the JSON boundary and worker pool setup.

use thiserror::Error;

use crate::config::ConfigError;

/// Main error type for typegraph-ir operations
#[derive(Debug, Error)]
pub enum TypegraphError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// JSON (de)serialization error at the parser/renderer boundary
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Dedicated worker pool could not be built
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Result type alias for typegraph operations
pub type Result<T> = std::result::Result<T, TypegraphError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_conversion() {
        let err: TypegraphError = ConfigError::MissingVersion.into();
        assert!(err.to_string().starts_with("Configuration error:"));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: TypegraphError = json_err.into();
        assert!(matches!(err, TypegraphError::Json(_)));
    }
}
