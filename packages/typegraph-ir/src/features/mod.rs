//! Feature modules
//!
//! Each feature is a vertical slice over the shared models.

// Type-graph composition: typealiases, extensions, member binding, conformance
pub mod composition;
