//! Extension merging and de-duplication
//!
//! Runs strictly sequentially over the composer's arena of declaration slots:
//!
//! 1. extensions written as `extension Outer.Inner` are re-rooted onto the
//!    declared nested type, and extensions of a typealias are renamed to the
//!    alias target (nested types declared inside them are re-keyed)
//! 2. inherited-type names are normalized to FQNs where resolvable
//! 3. every record is folded into the surviving record for its FQN; an
//!    extension with no discoverable base survives as an unknown-extension
//!    placeholder so none of its members is lost

use super::diagnostics::{Diagnostic, DiagnosticsSink};
use super::name_resolver::{Inference, NameResolver, Scope};
use super::type_index::{TypeEntry, TypeIndex};
use super::typealias_composer::TypealiasTable;
use crate::shared::models::{qualify, DeclaredType};

/// Surviving declarations plus merge counters
#[derive(Debug, Default)]
pub struct MergeOutcome {
    /// One record per FQN, sorted by FQN
    pub survivors: Vec<DeclaredType>,
    pub merged_extensions: usize,
    pub unknown_extensions: usize,
}

pub struct ExtensionMerger<'a> {
    aliases: &'a TypealiasTable,
    sink: &'a dyn DiagnosticsSink,
}

impl<'a> ExtensionMerger<'a> {
    pub fn new(aliases: &'a TypealiasTable, sink: &'a dyn DiagnosticsSink) -> Self {
        Self { aliases, sink }
    }

    fn names<'i>(&self, index: &'i TypeIndex) -> NameResolver<'i>
    where
        'a: 'i,
    {
        NameResolver::new(index, self.aliases, self.sink)
    }

    pub fn merge(&self, slots: &mut [Option<DeclaredType>], index: &mut TypeIndex) -> MergeOutcome {
        self.retarget_extensions(slots, index);
        self.normalize_inherited_types(slots, index);
        let mut outcome = self.fold(slots, index);

        let mut survivors: Vec<DeclaredType> = index
            .entries()
            .filter_map(|entry| slots.get_mut(entry.slot).and_then(Option::take))
            .collect();
        survivors.sort_by_cached_key(DeclaredType::fqn);
        outcome.survivors = survivors;

        tracing::debug!(
            survivors = outcome.survivors.len(),
            merged = outcome.merged_extensions,
            unknown = outcome.unknown_extensions,
            "extensions merged"
        );
        outcome
    }

    fn retarget_extensions(&self, slots: &mut [Option<DeclaredType>], index: &mut TypeIndex) {
        for slot in 0..slots.len() {
            let Some(extension) = slots[slot].as_mut().filter(|declared| declared.is_extension())
            else {
                continue;
            };

            if extension.parent_name.is_none() && extension.local_name.contains('.') {
                reroot_nested_extension(extension, index);
            }

            let old_module = extension.module.clone();
            let old_name = extension.name();
            let old_fqn = extension.fqn();

            let resolved = self
                .names(index)
                .resolve_global_name(&old_fqn, Some(&Scope::around(extension)));
            let Some(resolved) = resolved else {
                continue;
            };

            match index.get(&resolved.name) {
                Some(entry) => extension.retarget(entry.module.clone(), &entry.name),
                None => {
                    let local = match old_module.as_deref() {
                        Some(module) => resolved
                            .name
                            .strip_prefix(module)
                            .and_then(|rest| rest.strip_prefix('.'))
                            .unwrap_or(&resolved.name)
                            .to_string(),
                        None => resolved.name.clone(),
                    };
                    extension.retarget(old_module.clone(), &local);
                }
            }

            if extension.fqn() != old_fqn {
                let new_module = extension.module.clone();
                let new_name = extension.name();
                tracing::debug!(from = %old_fqn, to = %extension.fqn(), "extension retargeted");
                rewrite_children(slots, index, old_module.as_deref(), &old_name, new_module, &new_name);
            }
        }
    }

    fn normalize_inherited_types(&self, slots: &mut [Option<DeclaredType>], index: &TypeIndex) {
        let names = self.names(index);
        for declared in slots.iter_mut().flatten() {
            if declared.inherited_types.is_empty() {
                continue;
            }
            let scope = Scope::around(declared);
            let normalized: Vec<String> = declared
                .inherited_types
                .iter()
                .map(|inherited| {
                    let (base, arguments) = split_generic_arguments(inherited);
                    match names.resolve_global_name(base, Some(&scope)) {
                        Some(resolved) => format!("{}{arguments}", resolved.name),
                        None => inherited.clone(),
                    }
                })
                .collect();
            declared.set_inherited_types(normalized);
        }
    }

    fn fold(&self, slots: &mut [Option<DeclaredType>], index: &mut TypeIndex) -> MergeOutcome {
        let mut outcome = MergeOutcome::default();

        for slot in 0..slots.len() {
            let Some(declared) = slots[slot].as_ref() else {
                continue;
            };

            match self.find_target(declared, index) {
                Some(target) if target == slot => {}
                Some(target) => {
                    let Some(source) = slots[slot].take() else {
                        continue;
                    };
                    if source.is_extension() {
                        outcome.merged_extensions += 1;
                    }
                    if let Some(base) = slots[target].as_mut() {
                        base.extend(source);
                    }
                }
                None => {
                    let Some(placeholder) = slots[slot].as_mut() else {
                        continue;
                    };
                    placeholder.is_unknown_extension = true;
                    self.sink.report(Diagnostic::UnknownExtension {
                        name: placeholder.name(),
                        inherited_types: placeholder.inherited_types.clone(),
                    });
                    index.insert(TypeEntry::from_declared(placeholder, slot));
                    outcome.unknown_extensions += 1;
                }
            }
        }
        outcome
    }

    /// Slot of the record `declared` folds into
    fn find_target(&self, declared: &DeclaredType, index: &TypeIndex) -> Option<usize> {
        if let Some(entry) = index.get(&declared.fqn()) {
            return Some(entry.slot);
        }
        if let Some(entry) = index.from_composed_name(&declared.name()) {
            return Some(entry.slot);
        }
        match self
            .names(index)
            .infer_from_modules(&declared.local_name, Some(&Scope::around(declared)))
        {
            Inference::Found(fqn) => index.get(&fqn).map(|entry| entry.slot),
            Inference::Ambiguous | Inference::NotFound => None,
        }
    }
}

/// `extension Outer.Inner` written at top level: adopt the declared nested
/// type's module and parent path
fn reroot_nested_extension(extension: &mut DeclaredType, index: &TypeIndex) {
    let dotted = extension.local_name.clone();
    let mut found: Option<&TypeEntry> = None;

    if let Some(module) = &extension.module {
        found = index.in_module(module, &dotted);
    }
    if found.is_none() {
        found = extension
            .imports
            .iter()
            .find_map(|import| index.in_module(import, &dotted));
    }
    if found.is_none() {
        found = index.from_composed_name(&dotted);
    }

    if let Some(entry) = found {
        extension.module = entry.module.clone();
        extension.parent_name = entry.parent_name.clone();
        extension.local_name = entry.local_name.clone();
    }
}

/// Move every record nested under `old_name` (in `old_module`) below `new_name`
fn rewrite_children(
    slots: &mut [Option<DeclaredType>],
    index: &mut TypeIndex,
    old_module: Option<&str>,
    old_name: &str,
    new_module: Option<String>,
    new_name: &str,
) {
    let nested_prefix = format!("{old_name}.");
    for (slot, child) in slots.iter_mut().enumerate() {
        let Some(child) = child.as_mut() else {
            continue;
        };
        if child.module.as_deref() != old_module {
            continue;
        }
        let Some(parent) = child.parent_name.as_deref() else {
            continue;
        };
        let rewritten = if parent == old_name {
            new_name.to_string()
        } else if let Some(rest) = parent.strip_prefix(&nested_prefix) {
            format!("{new_name}.{rest}")
        } else {
            continue;
        };

        let old_fqn = child.fqn();
        child.parent_name = Some(rewritten);
        child.module = new_module.clone();

        if !child.is_extension() && index.get(&old_fqn).is_some_and(|entry| entry.slot == slot) {
            index.remove(&old_fqn);
            index.insert(TypeEntry::from_declared(child, slot));
        }
        let child_name = child.name();
        for typealias in &mut child.typealiases {
            typealias.parent_name = Some(child_name.clone());
            typealias.module = new_module.clone();
        }
        tracing::trace!(from = %old_fqn, to = %qualify(new_module.as_deref(), &child_name), "nested type re-keyed");
    }
}

/// `Base<T, U>` -> (`Base`, `<T, U>`)
pub(crate) fn split_generic_arguments(name: &str) -> (&str, &str) {
    match name.find('<') {
        Some(open) if name.ends_with('>') => (name[..open].trim_end(), &name[open..]),
        _ => (name, ""),
    }
}
