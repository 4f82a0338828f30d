//! Composition settings

use serde::{Deserialize, Serialize};

use super::error::{ConfigError, ConfigResult};
use super::validation::Validatable;

/// Upper bound for a dedicated worker pool
pub const MAX_WORKERS: usize = 256;

/// Parallel member resolution settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParallelConfig {
    /// Enable Rayon parallel iterator (false = serial resolution)
    pub enable_rayon: bool,

    /// Number of workers (0=auto, 1..=256)
    pub num_workers: usize,
}

impl ParallelConfig {
    pub fn serial() -> Self {
        Self {
            enable_rayon: false,
            num_workers: 0,
        }
    }

    pub fn with_workers(num_workers: usize) -> Self {
        Self {
            enable_rayon: true,
            num_workers,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.num_workers > MAX_WORKERS {
            return Err(ConfigError::range_with_hint(
                "num_workers",
                self.num_workers,
                0,
                MAX_WORKERS,
                "Number of workers must be reasonable (0=auto)",
            ));
        }
        Ok(())
    }
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            enable_rayon: true,
            num_workers: 0,
        }
    }
}

impl Validatable for ParallelConfig {
    fn validate(&self) -> ConfigResult<()> {
        ParallelConfig::validate(self)
    }

    fn config_name(&self) -> &'static str {
        "ParallelConfig"
    }
}

/// How base types named in an inheritance clause are located
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConformanceLookup {
    /// First match among `module.name` and the imported modules wins
    #[default]
    BestEffort,
    /// More than one distinct match is reported and the base is skipped
    Strict,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ComposeConfig {
    pub parallel: ParallelConfig,

    pub conformance_lookup: ConformanceLookup,

    /// Memoize name lookups while the type map is frozen
    pub cache_name_lookups: bool,
}

impl ComposeConfig {
    pub fn serial() -> Self {
        Self {
            parallel: ParallelConfig::serial(),
            ..Self::default()
        }
    }

    pub fn parallel(mut self, parallel: ParallelConfig) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn conformance_lookup(mut self, lookup: ConformanceLookup) -> Self {
        self.conformance_lookup = lookup;
        self
    }

    pub fn cache_name_lookups(mut self, enabled: bool) -> Self {
        self.cache_name_lookups = enabled;
        self
    }
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self {
            parallel: ParallelConfig::default(),
            conformance_lookup: ConformanceLookup::BestEffort,
            cache_name_lookups: true,
        }
    }
}

impl Validatable for ComposeConfig {
    fn validate(&self) -> ConfigResult<()> {
        self.parallel.validate()
    }

    fn config_name(&self) -> &'static str {
        "ComposeConfig"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parallel_defaults() {
        let config = ParallelConfig::default();
        assert!(config.enable_rayon);
        assert_eq!(config.num_workers, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parallel_worker_limit() {
        assert!(ParallelConfig::with_workers(MAX_WORKERS).validate().is_ok());
        let err = ParallelConfig::with_workers(MAX_WORKERS + 1)
            .validate()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Range { ref field, .. } if field == "num_workers"));
    }

    #[test]
    fn test_builder() {
        let config = ComposeConfig::serial()
            .conformance_lookup(ConformanceLookup::Strict)
            .cache_name_lookups(false);
        assert!(!config.parallel.enable_rayon);
        assert_eq!(config.conformance_lookup, ConformanceLookup::Strict);
        assert!(!config.cache_name_lookups);
        assert_eq!(config.config_name(), "ComposeConfig");
    }
}
