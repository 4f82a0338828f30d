//! Shared module - Declaration model
//!
//! Types shared by every feature. No resolution logic lives here.

pub mod models;

// Re-exports for convenience
pub use models::*;
