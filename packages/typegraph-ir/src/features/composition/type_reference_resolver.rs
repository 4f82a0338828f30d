//! Type-Reference Resolver
//!
//! Resolves a structural `TypeName` (array, dictionary, tuple, closure, generic
//! or plain) seen from a scope. Every nested element is resolved recursively
//! through the name resolver. The input is never mutated: the result is a new
//! `TypeName` carrying `actual_type_name` plus the FQN of the declared type the
//! reference binds to, if any.
//!
//! Tuples and closures never bind a single declared type. Arrays and
//! dictionaries keep their native payload; `TypeName::generic()` derives the
//! equivalent `Array<Element>` / `Dictionary<Key, Value>` view from it.

use super::name_resolver::{NameResolver, Scope};
use crate::shared::models::{
    ArrayType, ClosureParameter, ClosureType, DictionaryType, GenericType, GenericTypeParameter,
    Method, TupleElement, TupleType, TypeName, TypePayload,
};

/// Resolved reference plus its binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub type_name: TypeName,
    /// FQN of the declared type, `None` outside the closed world
    pub bound: Option<String>,
}

impl Resolution {
    /// Resolved form with its own `actual_type_name` cleared, for embedding
    /// into a rebuilt parent payload
    fn flattened(&self) -> TypeName {
        flatten(&self.type_name)
    }
}

fn flatten(type_name: &TypeName) -> TypeName {
    let mut flat = type_name.resolved().clone();
    flat.actual_type_name = None;
    flat
}

/// Typealias records whose payload is being substituted on the current path
#[derive(Debug, Default)]
struct Expansion {
    active: Vec<usize>,
    cycles: Vec<Vec<usize>>,
}

impl Expansion {
    /// Whether `idx` is already being expanded; records the cycle when it is
    fn reenters(&mut self, idx: usize) -> bool {
        match self.active.iter().position(|&active| active == idx) {
            Some(position) => {
                self.cycles.push(self.active[position..].to_vec());
                true
            }
            None => false,
        }
    }
}

pub struct TypeResolver<'a> {
    names: NameResolver<'a>,
}

impl<'a> TypeResolver<'a> {
    pub fn new(names: NameResolver<'a>) -> Self {
        Self { names }
    }

    pub fn names(&self) -> &NameResolver<'a> {
        &self.names
    }

    /// Resolve `type_name` from `scope`.
    ///
    /// `method` names the declaring method, whose own generic parameters are
    /// never looked up globally.
    pub fn resolve(
        &self,
        type_name: &TypeName,
        scope: Option<&Scope>,
        method: Option<&Method>,
    ) -> Resolution {
        self.resolve_in(type_name, scope, method, &mut Expansion::default())
    }

    /// Resolve the target of typealias `idx`, returning the structural cycles
    /// (alias indices) met on the way. A typealias reached again through its
    /// own payload keeps its written name.
    pub(crate) fn resolve_typealias(
        &self,
        idx: usize,
        scope: Option<&Scope>,
    ) -> (Resolution, Vec<Vec<usize>>) {
        let mut expansion = Expansion {
            active: vec![idx],
            cycles: Vec::new(),
        };
        let target = &self.names.aliases().get(idx).type_name;
        let resolution = self.resolve_in(target, scope, None, &mut expansion);
        (resolution, expansion.cycles)
    }

    fn resolve_in(
        &self,
        type_name: &TypeName,
        scope: Option<&Scope>,
        method: Option<&Method>,
        expansion: &mut Expansion,
    ) -> Resolution {
        if let Some(actual) = &type_name.actual_type_name {
            return Resolution {
                type_name: type_name.clone(),
                bound: self.bind(actual),
            };
        }

        let (retrieved, expanded) = match self.retrieve(type_name, scope, expansion) {
            Some((retrieved, expanded)) => (Some(retrieved), expanded),
            None => (None, None),
        };
        let lookup = retrieved.as_ref().unwrap_or(type_name);
        let aliased = expanded.is_some();
        let mut resolved = type_name.clone();

        if let Some(idx) = expanded {
            expansion.active.push(idx);
        }
        let never_binds = match &lookup.payload {
            Some(TypePayload::Tuple(tuple)) => {
                self.resolve_tuple(&mut resolved, tuple, aliased, scope, method, expansion);
                true
            }
            Some(TypePayload::Closure(closure)) => {
                self.resolve_closure(&mut resolved, closure, aliased, scope, method, expansion);
                true
            }
            Some(TypePayload::Array(array)) => {
                self.resolve_array(&mut resolved, array, aliased, scope, method, expansion);
                false
            }
            Some(TypePayload::Dictionary(dictionary)) => {
                self.resolve_dictionary(&mut resolved, dictionary, aliased, scope, method, expansion);
                false
            }
            Some(TypePayload::Generic(generic)) => {
                self.resolve_generic(&mut resolved, generic, aliased, scope, method, expansion);
                false
            }
            None => false,
        };
        if expanded.is_some() {
            expansion.active.pop();
        }

        if never_binds {
            return Resolution {
                type_name: resolved,
                bound: None,
            };
        }

        if resolved.actual_type_name.is_none() {
            if let Some(aliased) = retrieved {
                if aliased.unwrapped_type_name != type_name.lookup_identifier() {
                    resolved.actual_type_name = Some(Box::new(aliased));
                }
            }
        }

        let bound = self.bind(resolved.resolved());
        Resolution {
            type_name: resolved,
            bound,
        }
    }

    /// Name-resolved form of the reference, carrying the alias' payload when
    /// the name went through a typealias, plus that alias' index.
    ///
    /// A payload-carrying typealias already under expansion is not entered
    /// again: the reference stays as written.
    fn retrieve(
        &self,
        type_name: &TypeName,
        scope: Option<&Scope>,
        expansion: &mut Expansion,
    ) -> Option<(TypeName, Option<usize>)> {
        let identifier = type_name.lookup_identifier();
        let global = self.names.resolve_global_name(identifier, scope)?;
        let alias = global
            .typealias
            .map(|idx| (idx, self.names.aliases().get(idx)));

        if let Some((idx, alias)) = alias {
            if alias.type_name.payload.is_some() && expansion.reenters(idx) {
                return None;
            }
        }
        let alias_idx = alias.map(|(idx, _)| idx);
        let alias = alias.map(|(_, alias)| alias);

        let payload = match alias.and_then(|alias| alias.type_name.payload.clone()) {
            Some(payload) => Some(payload),
            None => type_name
                .payload
                .as_ref()
                .map(|payload| payload.renamed(&global.name)),
        };
        let is_optional =
            type_name.is_optional || alias.is_some_and(|alias| alias.type_name.is_optional);
        let is_implicitly_unwrapped_optional = type_name.is_implicitly_unwrapped_optional
            || alias.is_some_and(|alias| alias.type_name.is_implicitly_unwrapped_optional);

        let mut retrieved = TypeName::with_optionality(
            global.name,
            is_optional,
            is_implicitly_unwrapped_optional,
        );
        retrieved.payload = payload;
        Some((retrieved, alias_idx))
    }

    /// FQN of the declared type named by `final_name`
    fn bind(&self, final_name: &TypeName) -> Option<String> {
        let index = self.names.index();
        let identifier = final_name.lookup_identifier();
        if let Some(entry) = index.get(identifier) {
            return Some(entry.fqn.clone());
        }

        // `Module.Alias.Inner`: substitute the longest alias prefix
        let (prefix, alias) = self.names.aliases().longest_alias_prefix(identifier)?;
        let target = alias
            .bound_type
            .as_deref()
            .unwrap_or(alias.type_name.unwrapped_type_name.as_str());
        let substituted = format!("{target}{}", &identifier[prefix.len()..]);
        index.get(&substituted).map(|entry| entry.fqn.clone())
    }

    fn wrap(original: &TypeName, name: String, payload: TypePayload) -> Box<TypeName> {
        Box::new(
            TypeName::with_optionality(
                name,
                original.is_optional,
                original.is_implicitly_unwrapped_optional,
            )
            .with_payload(payload),
        )
    }

    fn resolve_tuple(
        &self,
        resolved: &mut TypeName,
        tuple: &TupleType,
        aliased: bool,
        scope: Option<&Scope>,
        method: Option<&Method>,
        expansion: &mut Expansion,
    ) {
        let mut needs_update = aliased;
        let mut bound_elements = Vec::with_capacity(tuple.elements.len());
        let mut flat_elements = Vec::with_capacity(tuple.elements.len());

        for element in &tuple.elements {
            let resolution = self.resolve_in(&element.type_name, scope, method, expansion);
            needs_update |= resolution.type_name.actual_type_name.is_some();
            flat_elements.push(TupleElement {
                name: element.name.clone(),
                type_name: resolution.flattened(),
                bound_type: resolution.bound.clone(),
            });
            bound_elements.push(TupleElement {
                name: element.name.clone(),
                type_name: resolution.type_name,
                bound_type: resolution.bound,
            });
        }

        if needs_update {
            let flat = TupleType::new(flat_elements);
            resolved.actual_type_name = Some(Self::wrap(
                resolved,
                flat.name.clone(),
                TypePayload::Tuple(flat.clone()),
            ));
            resolved.payload = Some(TypePayload::Tuple(flat));
        } else {
            resolved.payload = Some(TypePayload::Tuple(TupleType {
                name: tuple.name.clone(),
                elements: bound_elements,
            }));
        }
    }

    fn resolve_closure(
        &self,
        resolved: &mut TypeName,
        closure: &ClosureType,
        aliased: bool,
        scope: Option<&Scope>,
        method: Option<&Method>,
        expansion: &mut Expansion,
    ) {
        let return_resolution = self.resolve_in(&closure.return_type_name, scope, method, expansion);
        let mut needs_update = aliased || return_resolution.type_name.actual_type_name.is_some();

        let mut bound_parameters = Vec::with_capacity(closure.parameters.len());
        let mut flat_parameters = Vec::with_capacity(closure.parameters.len());
        for parameter in &closure.parameters {
            let resolution = self.resolve_in(&parameter.type_name, scope, method, expansion);
            needs_update |= resolution.type_name.actual_type_name.is_some();
            flat_parameters.push(ClosureParameter {
                type_name: resolution.flattened(),
                bound_type: resolution.bound.clone(),
                ..parameter.clone()
            });
            bound_parameters.push(ClosureParameter {
                type_name: resolution.type_name,
                bound_type: resolution.bound,
                ..parameter.clone()
            });
        }

        let bound = ClosureType {
            parameters: bound_parameters,
            return_type_name: Box::new(return_resolution.type_name.clone()),
            return_type: return_resolution.bound.clone(),
            ..closure.clone()
        };

        if needs_update {
            let mut flat = ClosureType {
                name: String::new(),
                parameters: flat_parameters,
                return_type_name: Box::new(return_resolution.flattened()),
                return_type: return_resolution.bound,
                is_async: closure.is_async,
                throws: closure.throws,
            };
            flat.name = flat.as_source();
            resolved.actual_type_name = Some(Self::wrap(
                resolved,
                flat.name.clone(),
                TypePayload::Closure(flat),
            ));
        }
        resolved.payload = Some(TypePayload::Closure(bound));
    }

    fn resolve_array(
        &self,
        resolved: &mut TypeName,
        array: &ArrayType,
        aliased: bool,
        scope: Option<&Scope>,
        method: Option<&Method>,
        expansion: &mut Expansion,
    ) {
        let element = self.resolve_in(&array.element_type_name, scope, method, expansion);

        if element.type_name.actual_type_name.is_some() || aliased || element.bound.is_some() {
            let mut rebuilt = ArrayType {
                name: String::new(),
                element_type_name: Box::new(element.flattened()),
                element_type: element.bound,
            };
            rebuilt.name = rebuilt.as_source();
            resolved.actual_type_name = Some(Self::wrap(
                resolved,
                rebuilt.name.clone(),
                TypePayload::Array(rebuilt.clone()),
            ));
            resolved.payload = Some(TypePayload::Array(rebuilt));
        } else {
            resolved.payload = Some(TypePayload::Array(ArrayType {
                name: array.name.clone(),
                element_type_name: Box::new(element.type_name),
                element_type: element.bound,
            }));
        }
    }

    fn resolve_dictionary(
        &self,
        resolved: &mut TypeName,
        dictionary: &DictionaryType,
        aliased: bool,
        scope: Option<&Scope>,
        method: Option<&Method>,
        expansion: &mut Expansion,
    ) {
        let key = self.resolve_in(&dictionary.key_type_name, scope, method, expansion);
        let value = self.resolve_in(&dictionary.value_type_name, scope, method, expansion);

        if key.type_name.actual_type_name.is_some()
            || value.type_name.actual_type_name.is_some()
            || aliased
        {
            let mut rebuilt = DictionaryType {
                name: String::new(),
                key_type_name: Box::new(key.flattened()),
                key_type: key.bound,
                value_type_name: Box::new(value.flattened()),
                value_type: value.bound,
            };
            rebuilt.name = rebuilt.as_source();
            resolved.actual_type_name = Some(Self::wrap(
                resolved,
                rebuilt.name.clone(),
                TypePayload::Dictionary(rebuilt.clone()),
            ));
            resolved.payload = Some(TypePayload::Dictionary(rebuilt));
        } else {
            resolved.payload = Some(TypePayload::Dictionary(DictionaryType {
                name: dictionary.name.clone(),
                key_type_name: Box::new(key.type_name),
                key_type: key.bound,
                value_type_name: Box::new(value.type_name),
                value_type: value.bound,
            }));
        }
    }

    fn resolve_generic(
        &self,
        resolved: &mut TypeName,
        generic: &GenericType,
        aliased: bool,
        scope: Option<&Scope>,
        method: Option<&Method>,
        expansion: &mut Expansion,
    ) {
        // base requalified by name lookup, e.g. `Box` -> `Kit.Box`
        let requalified = resolved.generic_base_name() != Some(generic.name.as_str());
        let mut needs_update = aliased || requalified;
        let parameters: Vec<GenericTypeParameter> = generic
            .type_parameters
            .iter()
            .map(|parameter| {
                if method.is_some_and(|method| method.is_generic_parameter(&parameter.type_name.name))
                {
                    return parameter.clone();
                }
                let resolution = self.resolve_in(&parameter.type_name, scope, method, expansion);
                needs_update |= resolution.type_name.actual_type_name.is_some();
                GenericTypeParameter {
                    type_name: resolution.type_name,
                    bound_type: resolution.bound,
                }
            })
            .collect();

        if needs_update {
            let flat = GenericType {
                name: generic.name.clone(),
                type_parameters: parameters
                    .iter()
                    .map(|parameter| GenericTypeParameter {
                        type_name: flatten(&parameter.type_name),
                        bound_type: parameter.bound_type.clone(),
                    })
                    .collect(),
            };
            resolved.actual_type_name = Some(Self::wrap(
                resolved,
                flat.as_source(),
                TypePayload::Generic(flat.clone()),
            ));
            resolved.payload = Some(TypePayload::Generic(flat));
        } else {
            resolved.payload = Some(TypePayload::Generic(GenericType {
                name: generic.name.clone(),
                type_parameters: parameters,
            }));
        }
    }
}
