//! Composition configuration
//!
//! Settings can be built in code or loaded from a versioned YAML file:
//!
//! ```yaml
//! version: 1
//! compose:
//!   parallel:
//!     enable_rayon: true
//!     num_workers: 0
//!   conformance_lookup: best_effort
//!   cache_name_lookups: true
//! ```

pub mod compose_config;
pub mod error;
pub mod io;
pub mod validation;

// Re-exports
pub use compose_config::{ComposeConfig, ConformanceLookup, ParallelConfig, MAX_WORKERS};
pub use error::{ConfigError, ConfigResult};
pub use io::ConfigExportV1;
pub use validation::Validatable;
