//! Type-Graph Composition
//!
//! Turns per-file declarations into one closed type graph:
//!
//! - typealias chains flattened and bound to declared types
//! - extensions merged into the types they extend (or kept as placeholders)
//! - every member type reference bound to a declared type FQN
//! - inheritance and conformance closed transitively
//!
//! Member resolution fans out with Rayon; the name index it reads is frozen
//! beforehand and lookups may be memoized in a DashMap.

mod composer;
mod diagnostics;
mod extension_merger;
mod member_resolver;
mod name_resolver;
mod relationships;
mod type_index;
mod type_reference_resolver;
mod typealias_composer;
mod types;

pub use composer::{compose, Composer};
pub use diagnostics::{CollectingSink, Diagnostic, DiagnosticsSink, TracingSink};
pub use extension_merger::{ExtensionMerger, MergeOutcome};
pub use member_resolver::MemberResolver;
pub use name_resolver::{GlobalName, Inference, NameResolver, Scope};
pub use relationships::RelationshipResolver;
pub use type_index::{TypeEntry, TypeIndex};
pub use type_reference_resolver::{Resolution, TypeResolver};
pub use typealias_composer::TypealiasTable;
pub use types::{ComposeStats, ComposedResult, TypeGraph};
