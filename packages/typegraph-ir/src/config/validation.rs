//! Configuration validation

use super::error::ConfigResult;

/// Trait for validatable configuration objects
///
/// # Example
/// ```rust,ignore
/// use typegraph_ir::config::Validatable;
///
/// fn build<C: Validatable>(config: C) -> Result<Composer, ConfigError> {
///     config.validate()?;
///     // ...
/// }
/// ```
pub trait Validatable {
    /// Returns `Ok(())` if valid, `Err(ConfigError)` with details if invalid.
    fn validate(&self) -> ConfigResult<()>;

    /// Configuration name for error messages
    fn config_name(&self) -> &'static str {
        "Config"
    }
}

impl<T: Validatable> Validatable for Option<T> {
    fn validate(&self) -> ConfigResult<()> {
        match self {
            Some(config) => config.validate(),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ComposeConfig, ParallelConfig};

    #[test]
    fn test_default_config_is_valid() {
        assert!(ComposeConfig::default().validate().is_ok());
    }

    #[test]
    fn test_optional_config_validation() {
        let missing: Option<ParallelConfig> = None;
        assert!(missing.validate().is_ok());

        let invalid = Some(ParallelConfig {
            num_workers: 1000,
            ..Default::default()
        });
        assert!(invalid.validate().is_err());
    }
}
