//! Merged type map and per-module index
//!
//! Entries are lightweight copies of the facts name resolution needs, so the
//! index can be frozen and shared across worker threads while the declared
//! types themselves are mutated.

use rustc_hash::FxHashMap;
use std::collections::BTreeMap;

use crate::shared::models::{DeclaredType, KindTag};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeEntry {
    pub fqn: String,
    /// Module-less dotted name
    pub name: String,
    pub local_name: String,
    pub parent_name: Option<String>,
    pub module: Option<String>,
    pub kind: KindTag,
    /// Slot of the owning record in the composer's arena
    pub slot: usize,
}

impl TypeEntry {
    pub fn from_declared(declared: &DeclaredType, slot: usize) -> Self {
        Self {
            fqn: declared.fqn(),
            name: declared.name(),
            local_name: declared.local_name.clone(),
            parent_name: declared.parent_name.clone(),
            module: declared.module.clone(),
            kind: declared.tag(),
            slot,
        }
    }

    /// Unmerged extension (unknown-extension placeholder)
    pub fn is_extension(&self) -> bool {
        self.kind == KindTag::Extension
    }
}

#[derive(Debug, Clone, Default)]
pub struct TypeIndex {
    by_fqn: FxHashMap<String, TypeEntry>,
    /// module -> (module-less name -> fqn)
    modules: BTreeMap<String, BTreeMap<String, String>>,
}

impl TypeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index every non-extension type; later declarations replace earlier ones
    pub fn build(slots: &[Option<DeclaredType>]) -> Self {
        let mut index = Self::new();
        for (slot, declared) in slots.iter().enumerate() {
            if let Some(declared) = declared {
                if !declared.is_extension() {
                    index.insert(TypeEntry::from_declared(declared, slot));
                }
            }
        }
        index
    }

    pub fn insert(&mut self, entry: TypeEntry) {
        if let Some(module) = &entry.module {
            if !entry.is_extension() {
                self.modules
                    .entry(module.clone())
                    .or_default()
                    .insert(entry.name.clone(), entry.fqn.clone());
            }
        }
        self.by_fqn.insert(entry.fqn.clone(), entry);
    }

    pub fn remove(&mut self, fqn: &str) -> Option<TypeEntry> {
        let entry = self.by_fqn.remove(fqn)?;
        if let Some(module) = &entry.module {
            if let Some(types) = self.modules.get_mut(module) {
                if types.get(&entry.name).map(String::as_str) == Some(fqn) {
                    types.remove(&entry.name);
                }
            }
        }
        Some(entry)
    }

    pub fn get(&self, fqn: &str) -> Option<&TypeEntry> {
        self.by_fqn.get(fqn)
    }

    pub fn contains(&self, fqn: &str) -> bool {
        self.by_fqn.contains_key(fqn)
    }

    pub fn len(&self) -> usize {
        self.by_fqn.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_fqn.is_empty()
    }

    /// Declared (non-extension) entry for `fqn`
    pub fn declared(&self, fqn: &str) -> Option<&TypeEntry> {
        self.get(fqn).filter(|entry| !entry.is_extension())
    }

    /// Entry named `name` inside `module`
    pub fn in_module(&self, module: &str, name: &str) -> Option<&TypeEntry> {
        let fqn = self.modules.get(module)?.get(name)?;
        self.get(fqn)
    }

    pub fn has_module(&self, module: &str) -> bool {
        self.modules.contains_key(module)
    }

    /// Module names in sorted order
    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    /// `Module.Type.Path` split at the first dot
    pub fn from_composed_name(&self, name: &str) -> Option<&TypeEntry> {
        let (module, rest) = name.split_once('.')?;
        self.in_module(module, rest)
    }

    pub fn entries(&self) -> impl Iterator<Item = &TypeEntry> {
        self.by_fqn.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slots(types: Vec<DeclaredType>) -> Vec<Option<DeclaredType>> {
        types.into_iter().map(Some).collect()
    }

    #[test]
    fn test_build_skips_extensions() {
        let index = TypeIndex::build(&slots(vec![
            DeclaredType::structure("Foo").with_module("App"),
            DeclaredType::extension("Foo").with_module("App"),
        ]));
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("App.Foo").unwrap().slot, 0);
        assert_eq!(index.in_module("App", "Foo").unwrap().fqn, "App.Foo");
    }

    #[test]
    fn test_later_declaration_wins() {
        let index = TypeIndex::build(&slots(vec![
            DeclaredType::structure("Foo"),
            DeclaredType::class("Foo"),
        ]));
        let entry = index.get("Foo").unwrap();
        assert_eq!(entry.slot, 1);
        assert_eq!(entry.kind, KindTag::Class);
    }

    #[test]
    fn test_composed_name_and_nested_keys() {
        let index = TypeIndex::build(&slots(vec![DeclaredType::structure("Inner")
            .with_parent("Outer")
            .with_module("Kit")]));
        assert_eq!(
            index.from_composed_name("Kit.Outer.Inner").unwrap().fqn,
            "Kit.Outer.Inner"
        );
        assert!(index.from_composed_name("Inner").is_none());
        assert!(index.has_module("Kit"));
    }

    #[test]
    fn test_placeholders_stay_out_of_module_index() {
        let mut index = TypeIndex::new();
        let ghost = DeclaredType::extension("Ghost").with_module("App");
        index.insert(TypeEntry::from_declared(&ghost, 0));

        assert!(index.contains("App.Ghost"));
        assert!(index.declared("App.Ghost").is_none());
        assert!(index.in_module("App", "Ghost").is_none());
    }

    #[test]
    fn test_remove_updates_module_index() {
        let mut index = TypeIndex::build(&slots(vec![DeclaredType::structure("Foo").with_module("App")]));
        assert!(index.remove("App.Foo").is_some());
        assert!(index.in_module("App", "Foo").is_none());
        assert!(index.is_empty());
    }
}
