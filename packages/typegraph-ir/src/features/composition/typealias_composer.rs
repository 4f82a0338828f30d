//! Typealias Composer
//!
//! Collects every typealias (top-level and nested in type bodies) into two maps
//! keyed by the alias' scope-qualified name:
//!
//! - `unresolved`: one hop, alias name to its own record
//! - `resolved`: alias chains (`A = B`, `B = C`) flattened so that every name on
//!   the chain points at the final record
//!
//! Chain following keeps a visited set. A cycle stops flattening for the names
//! involved; each keeps pointing at itself and a `CyclicTypealias` diagnostic is
//! reported.

use rustc_hash::{FxHashMap, FxHashSet};

use super::diagnostics::{Diagnostic, DiagnosticsSink};
use crate::shared::models::{qualify, DeclaredType, TypeName, Typealias};

#[derive(Debug, Clone, Default)]
pub struct TypealiasTable {
    aliases: Vec<Typealias>,
    unresolved: FxHashMap<String, usize>,
    resolved: FxHashMap<String, usize>,
}

impl TypealiasTable {
    /// Build both maps. Nested aliases are folded in after top-level ones;
    /// on a name collision the later record wins.
    pub fn compose(
        top_level: Vec<Typealias>,
        types: &[DeclaredType],
        sink: &dyn DiagnosticsSink,
    ) -> Self {
        let mut table = Self::default();
        for alias in top_level {
            table.insert(alias);
        }
        for declared in types {
            for alias in &declared.typealiases {
                table.insert(alias.clone());
            }
        }
        table.flatten(sink);

        tracing::debug!(
            aliases = table.aliases.len(),
            "typealias table composed"
        );
        table
    }

    fn insert(&mut self, alias: Typealias) {
        let name = alias.name();
        match self.unresolved.get(&name) {
            Some(&existing) => self.aliases[existing] = alias,
            None => {
                self.unresolved.insert(name, self.aliases.len());
                self.aliases.push(alias);
            }
        }
    }

    /// One hop: the alias record the target of `idx` names, if any
    fn next_hop(&self, idx: usize) -> Option<usize> {
        let alias = &self.aliases[idx];
        let target = alias.type_name.name.as_str();

        if let Some(&next) = self.unresolved.get(target) {
            return Some(next);
        }
        if let Some(parent) = alias.parent_fqn() {
            if let Some(&next) = self.unresolved.get(&format!("{parent}.{target}")) {
                return Some(next);
            }
        }
        alias
            .module
            .as_deref()
            .and_then(|module| self.unresolved.get(&qualify(Some(module), target)))
            .copied()
    }

    fn flatten(&mut self, sink: &dyn DiagnosticsSink) {
        let mut resolved: FxHashMap<String, usize> = FxHashMap::default();
        let mut reported: FxHashSet<Vec<String>> = FxHashSet::default();

        for start in 0..self.aliases.len() {
            let mut chain = vec![start];
            let mut visited: FxHashSet<usize> = FxHashSet::default();
            visited.insert(start);
            let mut current = start;
            let mut cycle_start = None;

            while let Some(next) = self.next_hop(current) {
                if !visited.insert(next) {
                    cycle_start = chain.iter().position(|&idx| idx == next);
                    break;
                }
                chain.push(next);
                current = next;
            }

            match cycle_start {
                Some(position) => {
                    let cycle = self.cycle_names(&chain[position..]);
                    if reported.insert(cycle.clone()) {
                        sink.report(Diagnostic::CyclicTypealias { chain: cycle });
                    }
                    for &idx in &chain {
                        resolved.insert(self.aliases[idx].name(), idx);
                    }
                }
                None => {
                    for &idx in &chain {
                        resolved.insert(self.aliases[idx].name(), current);
                    }
                }
            }
        }

        self.resolved = resolved;
    }

    /// Cycle members rotated to start at the smallest name, closed with it
    pub(crate) fn cycle_names(&self, cycle: &[usize]) -> Vec<String> {
        let mut names: Vec<String> = cycle.iter().map(|&idx| self.aliases[idx].name()).collect();
        if let Some(smallest) = names
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.cmp(b.1))
            .map(|(position, _)| position)
        {
            names.rotate_left(smallest);
        }
        if let Some(first) = names.first().cloned() {
            names.push(first);
        }
        names
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    pub fn get(&self, idx: usize) -> &Typealias {
        &self.aliases[idx]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Typealias> {
        self.aliases.iter()
    }

    /// One-hop lookup
    pub fn unresolved(&self, name: &str) -> Option<&Typealias> {
        self.unresolved.get(name).map(|&idx| &self.aliases[idx])
    }

    /// Index of the final alias record on `name`'s chain
    pub fn resolved_index(&self, name: &str) -> Option<usize> {
        self.resolved.get(name).copied()
    }

    /// Final alias record on `name`'s chain
    pub fn resolved(&self, name: &str) -> Option<&Typealias> {
        self.resolved_index(name).map(|idx| &self.aliases[idx])
    }

    /// Longest dotted prefix of `identifier` naming an alias, with its record
    pub fn longest_alias_prefix<'a>(&self, identifier: &'a str) -> Option<(&'a str, &Typealias)> {
        let mut end = identifier.len();
        while let Some(dot) = identifier[..end].rfind('.') {
            let prefix = &identifier[..dot];
            if let Some(alias) = self.resolved(prefix) {
                return Some((prefix, alias));
            }
            end = dot;
        }
        None
    }

    /// Record the resolved target of alias `idx`
    pub(crate) fn bind(&mut self, idx: usize, type_name: TypeName, bound_type: Option<String>) {
        let alias = &mut self.aliases[idx];
        alias.type_name = type_name;
        alias.bound_type = bound_type;
    }

    /// Indices whose chain ends at themselves, then the rest
    pub(crate) fn binding_order(&self) -> Vec<usize> {
        let (finals, others): (Vec<usize>, Vec<usize>) = (0..self.aliases.len())
            .partition(|&idx| self.resolved_index(&self.aliases[idx].name()) == Some(idx));
        finals.into_iter().chain(others).collect()
    }

    /// Aliases that never led to a declared type, sorted by name
    pub fn unbound(&self) -> Vec<Typealias> {
        let mut unbound: Vec<Typealias> = self
            .aliases
            .iter()
            .filter(|alias| alias.bound_type.is_none())
            .cloned()
            .collect();
        unbound.sort_by_key(Typealias::name);
        unbound
    }
}
