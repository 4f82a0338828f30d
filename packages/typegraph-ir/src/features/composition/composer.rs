//! Composer
//!
//! Turns parsed compilation units into a closed `TypeGraph`. Phases run in a
//! fixed order and each consumes the frozen output of the previous ones:
//!
//! 1. stamp unit scope and member ownership onto every record
//! 2. compose and bind typealiases
//! 3. retarget, normalize and merge extensions
//! 4. link parents and contained types
//! 5. resolve member types (parallel)
//! 6. close inheritance and conformance

use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};
use std::time::Instant;

use super::diagnostics::{Diagnostic, DiagnosticsSink, Reporter};
use super::extension_merger::ExtensionMerger;
use super::member_resolver::MemberResolver;
use super::name_resolver::{NameResolver, Scope};
use super::relationships::RelationshipResolver;
use super::type_index::TypeIndex;
use super::type_reference_resolver::TypeResolver;
use super::typealias_composer::TypealiasTable;
use super::types::{ComposeStats, ComposedResult, TypeGraph};
use crate::config::{ComposeConfig, Validatable};
use crate::errors::Result;
use crate::shared::models::{CompilationUnit, DeclaredType, Method, TypeName};

pub struct Composer {
    config: ComposeConfig,
    pool: Option<rayon::ThreadPool>,
}

impl Default for Composer {
    fn default() -> Self {
        Self {
            config: ComposeConfig::default(),
            pool: None,
        }
    }
}

impl Composer {
    /// Validate `config` and build the dedicated worker pool it asks for
    pub fn new(config: ComposeConfig) -> Result<Self> {
        config.validate()?;

        let pool = if config.parallel.enable_rayon && config.parallel.num_workers > 0 {
            Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(config.parallel.num_workers)
                    .thread_name(|i| format!("typegraph-compose-{}", i))
                    .build()?,
            )
        } else {
            None
        };

        Ok(Self { config, pool })
    }

    pub fn config(&self) -> &ComposeConfig {
        &self.config
    }

    pub fn compose(&self, units: Vec<CompilationUnit>) -> ComposedResult {
        self.compose_with_sink(units, None)
    }

    /// Compose, forwarding every diagnostic to `sink` as it is raised
    pub fn compose_with_sink(
        &self,
        units: Vec<CompilationUnit>,
        sink: Option<&dyn DiagnosticsSink>,
    ) -> ComposedResult {
        let start = Instant::now();
        let reporter = Reporter::new(sink);

        // Phase 1: flatten units, stamp scope and ownership
        let mut parsed: Vec<DeclaredType> = Vec::new();
        let mut functions: Vec<Method> = Vec::new();
        let mut top_level_aliases = Vec::new();
        for mut unit in units {
            unit.stamp();
            parsed.extend(unit.types);
            functions.extend(unit.functions);
            top_level_aliases.extend(unit.typealiases);
        }
        for declared in &mut parsed {
            stamp_declaring_type(declared);
        }
        let parsed_types = parsed.len();

        // Phase 2: typealiases
        let mut aliases = TypealiasTable::compose(top_level_aliases, &parsed, &reporter);
        let mut slots: Vec<Option<DeclaredType>> = parsed.into_iter().map(Some).collect();
        let mut index = TypeIndex::build(&slots);
        bind_typealiases(&mut aliases, &index, &reporter);
        sync_nested_typealiases(&mut slots, &aliases);

        // Phase 3: extensions
        let merge = ExtensionMerger::new(&aliases, &reporter).merge(&mut slots, &mut index);
        let mut types = merge.survivors;
        for declared in &mut types {
            let owner = declared.fqn();
            declared.stamp_owner(&owner);
        }

        // Phase 4: containment
        link_containment(&mut types);

        // Phase 5: member types
        {
            let mut names = NameResolver::new(&index, &aliases, &reporter);
            if self.config.cache_name_lookups {
                names = names.with_cache();
            }
            let members = MemberResolver::new(TypeResolver::new(names));
            self.resolve_members(&members, &mut types, &mut functions);
        }

        // Phase 6: relationships
        RelationshipResolver::new(self.config.conformance_lookup, &reporter).resolve(&mut types);

        functions.sort_by(|a, b| {
            (&a.name, &a.module, &a.file_path).cmp(&(&b.name, &b.module, &b.file_path))
        });
        functions.dedup();

        let unresolved_typealiases = aliases.unbound();
        let diagnostics = reporter.into_sorted();
        let composed = TypeGraph::from_types(types);

        let stats = ComposeStats {
            parsed_types,
            composed_types: composed.len(),
            merged_extensions: merge.merged_extensions,
            unknown_extensions: merge.unknown_extensions,
            functions: functions.len(),
            resolved_typealiases: aliases.len() - unresolved_typealiases.len(),
            unresolved_typealiases: unresolved_typealiases.len(),
            diagnostics: diagnostics.len(),
            duration_ms: start.elapsed().as_millis() as u64,
        };

        tracing::info!(
            parsed = stats.parsed_types,
            composed = stats.composed_types,
            merged_extensions = stats.merged_extensions,
            unknown_extensions = stats.unknown_extensions,
            diagnostics = stats.diagnostics,
            duration_ms = stats.duration_ms,
            "type graph composed"
        );

        ComposedResult {
            types: composed,
            functions,
            unresolved_typealiases,
            diagnostics,
            stats,
        }
    }

    fn resolve_members(
        &self,
        members: &MemberResolver<'_>,
        types: &mut [DeclaredType],
        functions: &mut [Method],
    ) {
        if !self.config.parallel.enable_rayon {
            types.iter_mut().for_each(|declared| members.resolve_type(declared));
            functions
                .iter_mut()
                .for_each(|function| members.resolve_function(function));
            return;
        }

        match &self.pool {
            Some(pool) => pool.install(|| resolve_in_parallel(members, types, functions)),
            None => resolve_in_parallel(members, types, functions),
        }
    }
}

fn resolve_in_parallel(members: &MemberResolver<'_>, types: &mut [DeclaredType], functions: &mut [Method]) {
    types
        .par_iter_mut()
        .for_each(|declared| members.resolve_type(declared));
    functions
        .par_iter_mut()
        .for_each(|function| members.resolve_function(function));
}

/// Compose with the default configuration
pub fn compose(units: Vec<CompilationUnit>) -> ComposedResult {
    Composer::default().compose(units)
}

/// Members remember the declaration they were written in; the surviving owner
/// is stamped after merging
fn stamp_declaring_type(declared: &mut DeclaredType) {
    let name = declared.name();
    let fqn = declared.fqn();
    let declaring = || Some(TypeName::new(name.clone()));

    for variable in &mut declared.variables {
        if variable.defined_in_type_name.is_none() {
            variable.defined_in_type_name = declaring();
        }
    }
    for method in &mut declared.methods {
        if method.defined_in_type_name.is_none() {
            method.defined_in_type_name = declaring();
        }
    }
    for subscript in &mut declared.subscripts {
        if subscript.defined_in_type_name.is_none() {
            subscript.defined_in_type_name = declaring();
        }
    }
    declared.stamp_owner(&fqn);
}

/// Resolve every alias target. Chain finals go first so that aliases of
/// aliases see their target already bound. An alias reached again through
/// its own payload (`Node = [Node]`) is reported once per cycle.
fn bind_typealiases(aliases: &mut TypealiasTable, index: &TypeIndex, sink: &dyn DiagnosticsSink) {
    let mut reported: FxHashSet<Vec<String>> = FxHashSet::default();

    for idx in aliases.binding_order() {
        let (resolution, cycles) = {
            let types = TypeResolver::new(NameResolver::new(index, aliases, sink));
            let alias = aliases.get(idx);
            let scope = Scope {
                lexical: alias.parent_fqn(),
                module: alias.module.clone(),
                imports: alias.imports.clone(),
            };
            types.resolve_typealias(idx, Some(&scope))
        };
        for cycle in cycles {
            let chain = aliases.cycle_names(&cycle);
            if reported.insert(chain.clone()) {
                sink.report(Diagnostic::CyclicTypealias { chain });
            }
        }
        aliases.bind(idx, resolution.type_name, resolution.bound);
    }
    tracing::debug!(aliases = aliases.len(), "typealiases bound");
}

/// Copy bound alias records back into the types that declare them
fn sync_nested_typealiases(slots: &mut [Option<DeclaredType>], aliases: &TypealiasTable) {
    for declared in slots.iter_mut().flatten() {
        for typealias in &mut declared.typealiases {
            if let Some(bound) = aliases.unresolved(&typealias.name()) {
                *typealias = bound.clone();
            }
        }
    }
}

/// Parent FQN for nested types whose parent survived, and sorted children
fn link_containment(types: &mut [DeclaredType]) {
    let by_fqn: FxHashMap<String, usize> = types
        .iter()
        .enumerate()
        .map(|(idx, declared)| (declared.fqn(), idx))
        .collect();

    let mut children: Vec<(usize, String)> = Vec::new();
    for declared in types.iter_mut() {
        declared.contained_types.clear();
        declared.parent = declared
            .parent_fqn()
            .filter(|parent| by_fqn.contains_key(parent));
        if let Some(parent) = &declared.parent {
            children.push((by_fqn[parent], declared.fqn()));
        }
    }
    for (parent, child) in children {
        types[parent].contained_types.push(child);
    }
    for declared in types.iter_mut() {
        declared.contained_types.sort();
    }
}
