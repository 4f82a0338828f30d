/*
 * Typegraph IR - Type-Graph Composition Engine
 *
 * Feature-First Architecture:
 * - shared/      : Declaration model (TypeName, DeclaredType, members, typealiases)
 * - features/    : Vertical slices (composition: typealiases → extensions → members → conformance)
 * - config/      : Composition settings (YAML v1)
 *
 * Performance:
 * - Rayon work-stealing for member resolution
 * - DashMap-memoized name lookups over a frozen index
 */

// Crate-level lint configuration
#![allow(clippy::too_many_arguments)] // Resolver helpers thread scope and method context
#![allow(clippy::type_complexity)] // Cache keys are tuples of scope data
#![allow(clippy::new_without_default)] // Default impl not always needed
#![allow(clippy::needless_range_loop)] // Slot loops mutate through the index
#![allow(clippy::module_inception)] // Module naming intentional

// ═══════════════════════════════════════════════════════════════════════════
// Module Exports - Feature-First Architecture
// ═══════════════════════════════════════════════════════════════════════════

/// Shared declaration model
pub mod shared;

/// Feature modules
pub mod features;

/// Configuration system
pub mod config;

/// Error types
pub mod errors;

// ═══════════════════════════════════════════════════════════════════════════
// Re-exports for Public API
// ═══════════════════════════════════════════════════════════════════════════

pub use config::{ComposeConfig, ConformanceLookup, ParallelConfig};
pub use errors::{Result, TypegraphError};
pub use features::composition::{
    compose, CollectingSink, ComposeStats, ComposedResult, Composer, Diagnostic,
    DiagnosticsSink, TracingSink, TypeGraph,
};
pub use shared::models::{CompilationUnit, DeclaredType, TypeKind, TypeName, Typealias};
