//! Inheritance and conformance closure
//!
//! Runs sequentially after member resolution. Every surviving type is visited
//! once; a base is fully processed before its relationships are copied into the
//! types built on it, so `based_types`, `inherits` and `implements` end up
//! transitively closed.

use rustc_hash::FxHashMap;
use std::collections::BTreeSet;

use super::diagnostics::{Diagnostic, DiagnosticsSink};
use super::extension_merger::split_generic_arguments;
use crate::config::ConformanceLookup;
use crate::shared::models::{qualify, DeclaredType, KindTag, TypeKind};

pub struct RelationshipResolver<'a> {
    lookup: ConformanceLookup,
    sink: &'a dyn DiagnosticsSink,
}

/// Relationship sets copied from a processed base
struct Inherited {
    fqn: String,
    tag: KindTag,
    based: Vec<String>,
    based_types: BTreeSet<String>,
    inherits: BTreeSet<String>,
    implements: BTreeSet<String>,
}

impl<'a> RelationshipResolver<'a> {
    pub fn new(lookup: ConformanceLookup, sink: &'a dyn DiagnosticsSink) -> Self {
        Self { lookup, sink }
    }

    /// `types` must hold one record per FQN
    pub fn resolve(&self, types: &mut [DeclaredType]) {
        let by_fqn: FxHashMap<String, usize> = types
            .iter()
            .enumerate()
            .map(|(idx, declared)| (declared.fqn(), idx))
            .collect();

        for idx in 0..types.len() {
            let supertype = supertype_of(&types[idx], types, &by_fqn);
            types[idx].supertype = supertype;
        }

        let mut processed = vec![false; types.len()];
        for idx in 0..types.len() {
            if !processed[idx] {
                processed[idx] = true;
                self.update(idx, types, &by_fqn, &mut processed);
            }
        }
    }

    fn update(
        &self,
        idx: usize,
        types: &mut [DeclaredType],
        by_fqn: &FxHashMap<String, usize>,
        processed: &mut [bool],
    ) {
        let names: Vec<String> = types[idx]
            .based
            .keys()
            .flat_map(|name| name.split('&'))
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();

        for name in names {
            let Some(base) = self.find_base(&types[idx], &name, types, by_fqn) else {
                continue;
            };
            if base == idx {
                continue;
            }
            if !processed[base] {
                processed[base] = true;
                self.update(base, types, by_fqn, processed);
            }

            let inherited = snapshot(&types[base]);
            let own_fqn = types[idx].fqn();

            match types[base].as_composition() {
                Some(composition) => {
                    let members = composition.composed_types.clone();
                    let protocols: Vec<usize> = members
                        .iter()
                        .filter_map(|fqn| by_fqn.get(fqn).copied())
                        .filter(|&member| types[member].tag() == KindTag::Protocol)
                        .collect();
                    for &protocol in &protocols {
                        link_base(types, idx, protocol);
                    }
                    if protocols.len() == members.len() {
                        types[idx].implements.insert(inherited.fqn.clone());
                    }
                }
                None => link_base(types, idx, base),
            }

            let target = &mut types[idx];
            for key in inherited.based {
                target.based.entry(key.clone()).or_insert(key);
            }
            target.based_types.extend(inherited.based_types);
            target.inherits.extend(inherited.inherits);
            target.implements.extend(inherited.implements);
            target.based_types.insert(inherited.fqn);

            target.based_types.remove(&own_fqn);
            target.inherits.remove(&own_fqn);
            target.implements.remove(&own_fqn);
            tracing::trace!(type_name = %own_fqn, base = ?inherited.tag, "base linked");
        }
    }

    /// Declared type for a based name: exact FQN, then the type's own module,
    /// then its imports
    fn find_base(
        &self,
        declared: &DeclaredType,
        name: &str,
        types: &[DeclaredType],
        by_fqn: &FxHashMap<String, usize>,
    ) -> Option<usize> {
        let (name, _) = split_generic_arguments(name);
        if let Some(&found) = by_fqn.get(name) {
            return Some(found);
        }

        let mut candidates = declared
            .module
            .iter()
            .chain(declared.imports.iter())
            .filter_map(|module| by_fqn.get(&qualify(Some(module), name)).copied());

        match self.lookup {
            ConformanceLookup::BestEffort => candidates.next(),
            ConformanceLookup::Strict => {
                let mut unique: Vec<usize> = candidates.collect();
                unique.sort_unstable();
                unique.dedup();
                if unique.len() > 1 {
                    let mut fqns: Vec<String> = unique.iter().map(|&found| types[found].fqn()).collect();
                    fqns.sort();
                    self.sink.report(Diagnostic::AmbiguousConformance {
                        type_name: declared.fqn(),
                        base: name.to_string(),
                        candidates: fqns,
                    });
                    return None;
                }
                unique.first().copied()
            }
        }
    }
}

fn snapshot(base: &DeclaredType) -> Inherited {
    Inherited {
        fqn: base.fqn(),
        tag: base.tag(),
        based: base.based.keys().cloned().collect(),
        based_types: base.based_types.clone(),
        inherits: base.inherits.clone(),
        implements: base.implements.clone(),
    }
}

/// Record `base` as a superclass or conformance of `idx`. A protocol refining
/// another protocol adopts the associated types it does not declare itself.
fn link_base(types: &mut [DeclaredType], idx: usize, base: usize) {
    let base_fqn = types[base].fqn();
    match types[base].tag() {
        KindTag::Class => {
            types[idx].inherits.insert(base_fqn);
        }
        KindTag::Protocol => {
            let associated = types[base]
                .as_protocol()
                .map(|details| details.associated_types.clone())
                .unwrap_or_default();
            let target = &mut types[idx];
            target.implements.insert(base_fqn);
            if let TypeKind::Protocol(details) = &mut target.kind {
                for (name, associated_type) in associated {
                    details.associated_types.entry(name).or_insert(associated_type);
                }
            }
        }
        _ => {}
    }
}

/// Superclass: the first inherited name, when both ends are classes
fn supertype_of(
    declared: &DeclaredType,
    types: &[DeclaredType],
    by_fqn: &FxHashMap<String, usize>,
) -> Option<String> {
    if declared.tag() != KindTag::Class {
        return None;
    }
    let first = declared.inherited_types.first()?;
    let (name, _) = split_generic_arguments(first);
    let &found = by_fqn.get(name)?;
    (types[found].tag() == KindTag::Class).then(|| types[found].fqn())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::composition::diagnostics::CollectingSink;
    use crate::shared::models::{AssociatedType, TypeName};

    fn resolve(types: &mut [DeclaredType], lookup: ConformanceLookup) -> Vec<Diagnostic> {
        let sink = CollectingSink::new();
        RelationshipResolver::new(lookup, &sink).resolve(types);
        sink.into_sorted()
    }

    fn find<'t>(types: &'t [DeclaredType], fqn: &str) -> &'t DeclaredType {
        types.iter().find(|declared| declared.fqn() == fqn).unwrap()
    }

    #[test]
    fn test_transitive_closure() {
        let mut types = vec![
            DeclaredType::class("C").with_inherited_type("B"),
            DeclaredType::class("B").with_inherited_type("A"),
            DeclaredType::class("A").with_inherited_type("P"),
            DeclaredType::protocol("P"),
        ];
        resolve(&mut types, ConformanceLookup::BestEffort);

        let c = find(&types, "C");
        assert_eq!(c.supertype.as_deref(), Some("B"));
        assert_eq!(
            c.inherits.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["A", "B"]
        );
        assert!(c.implements.contains("P"));
        assert_eq!(c.based_types.len(), 3);
        assert!(c.based.contains_key("A"));
    }

    #[test]
    fn test_base_found_through_module_and_imports() {
        let mut types = vec![
            DeclaredType::protocol("Drawable").with_module("Kit"),
            DeclaredType::structure("Circle")
                .with_module("App")
                .with_import("Kit")
                .with_inherited_type("Drawable"),
        ];
        resolve(&mut types, ConformanceLookup::BestEffort);
        assert!(find(&types, "App.Circle").implements.contains("Kit.Drawable"));
    }

    #[test]
    fn test_generic_arguments_are_stripped() {
        let mut types = vec![
            DeclaredType::class("Base").with_module("App"),
            DeclaredType::class("Sub")
                .with_module("App")
                .with_inherited_type("App.Base<Int>"),
        ];
        resolve(&mut types, ConformanceLookup::BestEffort);
        let sub = find(&types, "App.Sub");
        assert_eq!(sub.supertype.as_deref(), Some("App.Base"));
        assert!(sub.inherits.contains("App.Base"));
    }

    #[test]
    fn test_composition_conformance() {
        let mut composition = DeclaredType::composition(
            "Both",
            vec![TypeName::new("A"), TypeName::new("B")],
        );
        if let TypeKind::ProtocolComposition(details) = &mut composition.kind {
            details.composed_types = vec!["A".to_string(), "B".to_string()];
        }
        let mut types = vec![
            DeclaredType::protocol("A"),
            DeclaredType::protocol("B"),
            composition,
            DeclaredType::structure("S").with_inherited_type("Both"),
        ];
        resolve(&mut types, ConformanceLookup::BestEffort);

        let s = find(&types, "S");
        let implements: Vec<&str> = s.implements.iter().map(String::as_str).collect();
        assert_eq!(implements, vec!["A", "B", "Both"]);
        assert!(s.based_types.contains("Both"));
    }

    #[test]
    fn test_protocol_adopts_associated_types() {
        let mut types = vec![
            DeclaredType::protocol("Container")
                .with_associated_type(AssociatedType::new("Element", None)),
            DeclaredType::protocol("Stack").with_inherited_type("Container"),
        ];
        resolve(&mut types, ConformanceLookup::BestEffort);
        let stack = find(&types, "Stack").as_protocol().unwrap();
        assert!(stack.associated_types.contains_key("Element"));
    }

    #[test]
    fn test_cycles_never_make_a_type_its_own_ancestor() {
        let mut types = vec![
            DeclaredType::protocol("A").with_inherited_type("B"),
            DeclaredType::protocol("B").with_inherited_type("A"),
        ];
        resolve(&mut types, ConformanceLookup::BestEffort);
        assert!(!find(&types, "A").based_types.contains("A"));
        assert!(!find(&types, "B").implements.contains("B"));
    }

    #[test]
    fn test_strict_lookup_reports_ambiguity() {
        let declare = || {
            vec![
                DeclaredType::protocol("Codable").with_module("Core"),
                DeclaredType::protocol("Codable").with_module("Kit"),
                DeclaredType::structure("Model")
                    .with_module("Core")
                    .with_import("Kit")
                    .with_inherited_type("Codable"),
            ]
        };

        let mut lenient = declare();
        assert!(resolve(&mut lenient, ConformanceLookup::BestEffort).is_empty());
        assert!(find(&lenient, "Core.Model").implements.contains("Core.Codable"));

        let mut strict = declare();
        let diagnostics = resolve(&mut strict, ConformanceLookup::Strict);
        assert!(matches!(diagnostics[0], Diagnostic::AmbiguousConformance { .. }));
        assert!(find(&strict, "Core.Model").implements.is_empty());
    }
}
