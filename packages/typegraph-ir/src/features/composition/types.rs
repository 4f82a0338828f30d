//! Composer output
//!
//! The composed `TypeGraph` is the arena every FQN-valued relationship field
//! is resolved against.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::diagnostics::Diagnostic;
use crate::errors::Result;
use crate::shared::models::{DeclaredType, HasInheritance, Method, Typealias};

/// Composed types keyed by fully-qualified name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeGraph {
    types: BTreeMap<String, DeclaredType>,
}

impl TypeGraph {
    pub fn from_types(types: impl IntoIterator<Item = DeclaredType>) -> Self {
        Self {
            types: types
                .into_iter()
                .map(|declared| (declared.fqn(), declared))
                .collect(),
        }
    }

    pub fn get(&self, fqn: &str) -> Option<&DeclaredType> {
        self.types.get(fqn)
    }

    pub fn contains(&self, fqn: &str) -> bool {
        self.types.contains_key(fqn)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Types in FQN order
    pub fn iter(&self) -> impl Iterator<Item = &DeclaredType> {
        self.types.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    /// Every type whose unqualified name is `local_name`
    pub fn by_local_name<'g>(&'g self, local_name: &'g str) -> impl Iterator<Item = &'g DeclaredType> {
        self.iter()
            .filter(move |declared| declared.local_name == local_name)
    }

    pub fn supertype(&self, fqn: &str) -> Option<&DeclaredType> {
        self.get(self.get(fqn)?.supertype.as_deref()?)
    }

    pub fn parent(&self, fqn: &str) -> Option<&DeclaredType> {
        self.get(self.get(fqn)?.parent.as_deref()?)
    }

    pub fn contained_types<'g>(&'g self, fqn: &str) -> impl Iterator<Item = &'g DeclaredType> {
        self.get(fqn)
            .into_iter()
            .flat_map(|declared| declared.contained_types.iter())
            .filter_map(|child| self.get(child))
    }

    /// `fqn` is built on `base` (class, protocol or composition), directly or
    /// transitively
    pub fn is_based_on(&self, fqn: &str, base: &str) -> bool {
        self.get(fqn)
            .is_some_and(|declared| declared.based_types().contains(base))
    }

    pub fn implements(&self, fqn: &str, protocol: &str) -> bool {
        self.get(fqn)
            .is_some_and(|declared| declared.implements().contains(protocol))
    }

    pub fn inherits_from(&self, fqn: &str, class: &str) -> bool {
        self.get(fqn)
            .is_some_and(|declared| declared.inherits().contains(class))
    }

    pub fn into_vec(self) -> Vec<DeclaredType> {
        self.types.into_values().collect()
    }
}

/// Phase counters and timing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposeStats {
    /// Type declarations received, extensions included
    pub parsed_types: usize,
    pub composed_types: usize,
    pub merged_extensions: usize,
    pub unknown_extensions: usize,
    pub functions: usize,
    pub resolved_typealiases: usize,
    pub unresolved_typealiases: usize,
    pub diagnostics: usize,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComposedResult {
    pub types: TypeGraph,
    /// Free functions, sorted by name
    pub functions: Vec<Method>,
    /// Typealiases whose target never bound a declared type, sorted by name
    pub unresolved_typealiases: Vec<Typealias>,
    /// Sorted and de-duplicated
    pub diagnostics: Vec<Diagnostic>,
    pub stats: ComposeStats,
}

impl ComposedResult {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Types, functions and unresolved typealiases, without timing
    pub fn to_json_without_stats(&self) -> Result<String> {
        Ok(serde_json::to_string(&(
            &self.types,
            &self.functions,
            &self.unresolved_typealiases,
        ))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph() -> TypeGraph {
        let mut animal = DeclaredType::class("Animal").with_module("Zoo");
        animal.contained_types = vec!["Zoo.Animal.Kind".to_string()];
        let mut kind = DeclaredType::enumeration("Kind", Vec::new())
            .with_parent("Animal")
            .with_module("Zoo");
        kind.parent = Some("Zoo.Animal".to_string());
        let mut dog = DeclaredType::class("Dog").with_module("Zoo");
        dog.supertype = Some("Zoo.Animal".to_string());
        dog.inherits.insert("Zoo.Animal".to_string());
        dog.based_types.insert("Zoo.Animal".to_string());
        TypeGraph::from_types(vec![dog, kind, animal])
    }

    #[test]
    fn test_iteration_is_sorted_by_fqn() {
        let graph = graph();
        let names: Vec<&str> = graph.names().collect();
        assert_eq!(names, vec!["Zoo.Animal", "Zoo.Animal.Kind", "Zoo.Dog"]);
    }

    #[test]
    fn test_navigation() {
        let graph = graph();
        assert_eq!(graph.supertype("Zoo.Dog").unwrap().fqn(), "Zoo.Animal");
        assert_eq!(graph.parent("Zoo.Animal.Kind").unwrap().fqn(), "Zoo.Animal");
        assert_eq!(graph.contained_types("Zoo.Animal").count(), 1);
        assert!(graph.inherits_from("Zoo.Dog", "Zoo.Animal"));
        assert!(graph.is_based_on("Zoo.Dog", "Zoo.Animal"));
        assert!(!graph.implements("Zoo.Dog", "Zoo.Animal"));
        assert_eq!(graph.by_local_name("Kind").count(), 1);
    }

    #[test]
    fn test_json_shape() {
        let result = ComposedResult {
            types: graph(),
            ..Default::default()
        };
        let json: serde_json::Value = serde_json::from_str(&result.to_json().unwrap()).unwrap();
        assert!(json["types"]["Zoo.Dog"].is_object());
        assert_eq!(json["stats"]["composed_types"], 0);
    }
}
