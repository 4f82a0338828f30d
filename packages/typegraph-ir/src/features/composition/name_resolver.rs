//! Name Resolver
//!
//! Maps a bare or dotted type name, seen from a scope, to the fully-qualified
//! name of a declared type. Lookup order, first success wins:
//!
//! 1. exact key in the type map (unmerged extensions excluded)
//! 2. resolved typealias
//! 3. `Self`, then each enclosing type `<ancestor>.<name>` (steps 1-2 only)
//! 4. `<module>.<name>` for the scope's own module (steps 1-2 only)
//! 5. module inference: own module and imports first, then every other module;
//!    more than one distinct match is ambiguous and stops resolution
//! 6. `Module.Type` composed-name lookup

use dashmap::DashMap;
use std::collections::BTreeSet;

use super::diagnostics::{Diagnostic, DiagnosticsSink};
use super::type_index::TypeIndex;
use super::typealias_composer::TypealiasTable;
use crate::shared::models::{qualify, DeclaredType};

/// Lexical position a name is looked up from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Scope {
    /// FQN of the innermost enclosing type
    pub lexical: Option<String>,
    pub module: Option<String>,
    pub imports: Vec<String>,
}

impl Scope {
    /// Members of `declared` (the type itself is the innermost scope)
    pub fn inside(declared: &DeclaredType) -> Self {
        Self {
            lexical: Some(declared.fqn()),
            module: declared.module.clone(),
            imports: declared.imports.clone(),
        }
    }

    /// Where `declared` itself is written (its lexical parent, if any)
    pub fn around(declared: &DeclaredType) -> Self {
        Self {
            lexical: declared.parent_fqn(),
            module: declared.module.clone(),
            imports: declared.imports.clone(),
        }
    }

    pub fn module(module: Option<String>, imports: Vec<String>) -> Self {
        Self {
            lexical: None,
            module,
            imports,
        }
    }

    /// Enclosing type FQNs, innermost first, never crossing into the module prefix
    pub fn ancestors(&self) -> impl Iterator<Item = &str> {
        let lexical = self.lexical.as_deref();
        let floor = match (lexical, self.module.as_deref()) {
            (Some(path), Some(module))
                if path.len() > module.len()
                    && path.starts_with(module)
                    && path.as_bytes()[module.len()] == b'.' =>
            {
                module.len()
            }
            _ => 0,
        };
        std::iter::successors(lexical, move |&current| {
            current
                .rfind('.')
                .filter(|&dot| dot > floor)
                .map(|dot| &current[..dot])
        })
    }
}

/// Outcome of a successful lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalName {
    /// FQN of the declared type, or an alias' raw target when it never bound
    pub name: String,
    /// Final typealias record the name went through
    pub typealias: Option<usize>,
}

impl GlobalName {
    fn declared(fqn: impl Into<String>) -> Self {
        Self {
            name: fqn.into(),
            typealias: None,
        }
    }
}

/// Module inference outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inference {
    Found(String),
    Ambiguous,
    NotFound,
}

pub struct NameResolver<'a> {
    index: &'a TypeIndex,
    aliases: &'a TypealiasTable,
    sink: &'a dyn DiagnosticsSink,
    cache: Option<DashMap<(String, Option<Scope>), Option<GlobalName>>>,
}

impl<'a> NameResolver<'a> {
    pub fn new(
        index: &'a TypeIndex,
        aliases: &'a TypealiasTable,
        sink: &'a dyn DiagnosticsSink,
    ) -> Self {
        Self {
            index,
            aliases,
            sink,
            cache: None,
        }
    }

    /// Memoize lookups. Only valid while the index and aliases are frozen.
    pub fn with_cache(mut self) -> Self {
        self.cache = Some(DashMap::new());
        self
    }

    pub fn index(&self) -> &'a TypeIndex {
        self.index
    }

    pub fn aliases(&self) -> &'a TypealiasTable {
        self.aliases
    }

    pub fn sink(&self) -> &'a dyn DiagnosticsSink {
        self.sink
    }

    pub fn resolve_global_name(&self, name: &str, scope: Option<&Scope>) -> Option<GlobalName> {
        let Some(cache) = &self.cache else {
            return self.resolve_uncached(name, scope);
        };

        let key = (name.to_string(), scope.cloned());
        if let Some(hit) = cache.get(&key) {
            return hit.clone();
        }
        let resolved = self.resolve_uncached(name, scope);
        cache.insert(key, resolved.clone());
        resolved
    }

    fn resolve_uncached(&self, name: &str, scope: Option<&Scope>) -> Option<GlobalName> {
        if let Some(found) = self.direct(name) {
            return Some(found);
        }

        if let Some(scope) = scope {
            if name == "Self" {
                if let Some(lexical) = &scope.lexical {
                    return Some(GlobalName::declared(lexical.clone()));
                }
            }

            for ancestor in scope.ancestors() {
                if let Some(found) = self.direct(&format!("{ancestor}.{name}")) {
                    return Some(found);
                }
            }

            if let Some(module) = &scope.module {
                if let Some(found) = self.direct(&qualify(Some(module), name)) {
                    return Some(found);
                }
            }
        }

        match self.infer_from_modules(name, scope) {
            Inference::Found(fqn) => return Some(GlobalName::declared(fqn)),
            Inference::Ambiguous => return None,
            Inference::NotFound => {}
        }

        self.index
            .from_composed_name(name)
            .map(|entry| GlobalName::declared(entry.fqn.clone()))
    }

    /// Steps 1 and 2: declared type, then resolved typealias
    fn direct(&self, name: &str) -> Option<GlobalName> {
        if let Some(entry) = self.index.declared(name) {
            return Some(GlobalName::declared(entry.fqn.clone()));
        }

        let idx = self.aliases.resolved_index(name)?;
        let alias = self.aliases.get(idx);
        let target = alias
            .bound_type
            .clone()
            .unwrap_or_else(|| alias.type_name.unwrapped_type_name.clone());
        Some(GlobalName {
            name: target,
            typealias: Some(idx),
        })
    }

    /// Look for a type literally named `identifier` across modules.
    ///
    /// The scope's own module and its imports are searched first; a unique hit
    /// there wins, several are ambiguous. Otherwise every remaining module is
    /// searched under the same rule.
    pub fn infer_from_modules(&self, identifier: &str, scope: Option<&Scope>) -> Inference {
        let mut explicit: Vec<&str> = Vec::new();
        if let Some(scope) = scope {
            if let Some(module) = scope.module.as_deref() {
                explicit.push(module);
            }
            for import in &scope.imports {
                if !explicit.contains(&import.as_str()) {
                    explicit.push(import);
                }
            }
        }
        let remaining: Vec<&str> = self
            .index
            .module_names()
            .filter(|module| !explicit.contains(module))
            .collect();

        for modules in [explicit, remaining] {
            let candidates: BTreeSet<&str> = modules
                .iter()
                .filter_map(|module| self.index.in_module(module, identifier))
                .map(|entry| entry.fqn.as_str())
                .collect();

            if candidates.len() > 1 {
                self.sink.report(Diagnostic::AmbiguousReference {
                    name: identifier.to_string(),
                    candidates: candidates.into_iter().map(str::to_string).collect(),
                });
                return Inference::Ambiguous;
            }
            if let Some(fqn) = candidates.into_iter().next() {
                return Inference::Found(fqn.to_string());
            }
        }
        Inference::NotFound
    }
}
