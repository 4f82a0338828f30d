//! Member Resolver
//!
//! Resolves every type reference a surviving declaration carries: variables,
//! method parameters and return types, subscripts, enum associated values and
//! raw types, composition members and protocol associated types.
//!
//! Each declaration is resolved independently against the frozen index and
//! typealias table, so the composer fans this phase out over rayon.

use super::name_resolver::Scope;
use super::type_reference_resolver::{Resolution, TypeResolver};
use crate::shared::models::{
    AssociatedType, CompositionDetails, DeclaredType, EnumDetails, Method, MethodParameter,
    Subscript, TypeKind, TypeName, Variable,
};

pub struct MemberResolver<'a> {
    types: TypeResolver<'a>,
}

impl<'a> MemberResolver<'a> {
    pub fn new(types: TypeResolver<'a>) -> Self {
        Self { types }
    }

    pub fn resolve_type(&self, declared: &mut DeclaredType) {
        let scope = Scope::inside(declared);

        for variable in &mut declared.variables {
            self.resolve_variable(variable, &scope);
        }
        for method in &mut declared.methods {
            self.resolve_method(method, Some(&scope));
        }
        for subscript in &mut declared.subscripts {
            self.resolve_subscript(subscript, &scope);
        }

        match &mut declared.kind {
            TypeKind::Enum(details) => {
                self.resolve_enum(details, &scope);
                self.infer_raw_type(details, &declared.variables, &declared.inherited_types);
            }
            TypeKind::Protocol(details) => {
                for associated_type in details.associated_types.values_mut() {
                    self.resolve_associated_type(associated_type, &scope);
                }
            }
            TypeKind::ProtocolComposition(details) => self.resolve_composition(details, &scope),
            TypeKind::Class | TypeKind::Struct | TypeKind::Actor | TypeKind::Extension => {}
        }
    }

    /// Free functions resolve from their module only
    pub fn resolve_function(&self, function: &mut Method) {
        let scope = Scope::module(function.module.clone(), function.imports.clone());
        self.resolve_method(function, Some(&scope));
    }

    fn resolve(&self, type_name: &TypeName, scope: &Scope) -> Resolution {
        self.types.resolve(type_name, Some(scope), None)
    }

    fn resolve_variable(&self, variable: &mut Variable, scope: &Scope) {
        let Resolution { type_name, bound } = self.resolve(&variable.type_name, scope);
        variable.type_name = type_name;
        variable.bound_type = bound;

        if let Some(defined) = &variable.defined_in_type_name {
            variable.defined_in_type_name = Some(self.resolve(defined, scope).type_name);
        }
    }

    fn resolve_method(&self, method: &mut Method, scope: Option<&Scope>) {
        let parameters: Vec<Resolution> = method
            .parameters
            .iter()
            .map(|parameter| self.types.resolve(&parameter.type_name, scope, Some(method)))
            .collect();
        let defined = method
            .defined_in_type_name
            .as_ref()
            .map(|defined| self.types.resolve(defined, scope, Some(method)));
        let returned = if method.is_initializer() || method.return_type_name.is_void() {
            None
        } else {
            Some(
                self.types
                    .resolve(&method.return_type_name, scope, Some(method)),
            )
        };

        apply_parameters(&mut method.parameters, parameters);

        if method.is_initializer() {
            if let Some(defined) = &defined {
                let mut owner = defined.type_name.resolved().clone();
                owner.actual_type_name = None;
                method.return_type_name = if method.is_failable_initializer() {
                    owner.into_optional()
                } else {
                    owner
                };
                method.return_type = defined.bound.clone();
            }
        } else if let Some(Resolution { type_name, bound }) = returned {
            method.return_type_name = type_name;
            method.return_type = bound;
        }

        if let Some(defined) = defined {
            method.defined_in_type_name = Some(defined.type_name);
        }
    }

    fn resolve_subscript(&self, subscript: &mut Subscript, scope: &Scope) {
        let parameters: Vec<Resolution> = subscript
            .parameters
            .iter()
            .map(|parameter| self.resolve(&parameter.type_name, scope))
            .collect();
        apply_parameters(&mut subscript.parameters, parameters);

        let Resolution { type_name, bound } = self.resolve(&subscript.return_type_name, scope);
        subscript.return_type_name = type_name;
        subscript.return_type = bound;

        if let Some(defined) = &subscript.defined_in_type_name {
            subscript.defined_in_type_name = Some(self.resolve(defined, scope).type_name);
        }
    }

    fn resolve_enum(&self, details: &mut EnumDetails, scope: &Scope) {
        for value in details
            .cases
            .iter_mut()
            .flat_map(|case| case.associated_values.iter_mut())
        {
            let Resolution { type_name, bound } = self.resolve(&value.type_name, scope);
            value.type_name = type_name;
            value.bound_type = bound;
        }
    }

    /// A non-static `rawValue` variable decides the raw type. Otherwise the
    /// first inherited type does, but only for enums with cases and without
    /// associated values, and never when it names a protocol.
    fn infer_raw_type(&self, details: &mut EnumDetails, variables: &[Variable], inherited: &[String]) {
        if let Some(raw_value) = variables
            .iter()
            .find(|variable| variable.name == "rawValue" && !variable.is_static)
        {
            let mut raw_type_name = raw_value.actual_type_name().clone();
            raw_type_name.actual_type_name = None;
            details.raw_type_name = Some(raw_type_name);
            details.raw_type = raw_value.bound_type.clone();
            return;
        }

        let Some(first) = inherited.first() else {
            return;
        };
        if details.cases.is_empty() || details.has_associated_values() {
            details.raw_type_name = None;
            details.raw_type = None;
            return;
        }

        match self.types.names().index().get(first) {
            Some(entry) if entry.kind.is_protocol_like() => {
                details.raw_type_name = None;
                details.raw_type = None;
            }
            Some(entry) => {
                details.raw_type_name = Some(TypeName::new(first.clone()));
                details.raw_type = Some(entry.fqn.clone());
            }
            None => {
                details.raw_type_name = Some(TypeName::new(first.clone()));
                details.raw_type = None;
            }
        }
    }

    fn resolve_associated_type(&self, associated_type: &mut AssociatedType, scope: &Scope) {
        let Some(type_name) = &associated_type.type_name else {
            return;
        };
        let Resolution { type_name, bound } = self.resolve(type_name, scope);
        associated_type.type_name = Some(type_name);
        if bound.is_some() {
            associated_type.bound_type = bound;
        }
    }

    fn resolve_composition(&self, details: &mut CompositionDetails, scope: &Scope) {
        let resolutions: Vec<Resolution> = details
            .composed_type_names
            .iter()
            .map(|member| self.resolve(member, scope))
            .collect();

        details.composed_types = resolutions
            .iter()
            .filter_map(|resolution| resolution.bound.clone())
            .collect();
        details.composed_type_names = resolutions
            .into_iter()
            .map(|resolution| resolution.type_name)
            .collect();
    }
}

fn apply_parameters(parameters: &mut [MethodParameter], resolutions: Vec<Resolution>) {
    for (parameter, Resolution { type_name, bound }) in parameters.iter_mut().zip(resolutions) {
        parameter.type_name = type_name;
        parameter.bound_type = bound;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::composition::diagnostics::CollectingSink;
    use crate::features::composition::name_resolver::NameResolver;
    use crate::features::composition::type_index::TypeIndex;
    use crate::features::composition::typealias_composer::TypealiasTable;
    use crate::shared::models::{AssociatedValue, EnumCase};

    fn with_resolver<R>(types: &[DeclaredType], body: impl FnOnce(&MemberResolver<'_>) -> R) -> R {
        let sink = CollectingSink::new();
        let aliases = TypealiasTable::compose(Vec::new(), types, &sink);
        let slots: Vec<Option<DeclaredType>> = types.iter().cloned().map(Some).collect();
        let index = TypeIndex::build(&slots);
        let resolver = MemberResolver::new(TypeResolver::new(NameResolver::new(&index, &aliases, &sink)));
        body(&resolver)
    }

    fn owned(mut declared: DeclaredType) -> DeclaredType {
        let name = declared.name();
        for method in &mut declared.methods {
            method.defined_in_type_name = Some(TypeName::new(name.clone()));
        }
        declared
    }

    #[test]
    fn test_variables_and_parameters_bind() {
        let user = DeclaredType::structure("User").with_module("App");
        let service = DeclaredType::class("Service")
            .with_module("App")
            .with_variable(Variable::new("current", TypeName::optional("User")))
            .with_method(
                Method::new("find(id:)", TypeName::new("User"))
                    .with_parameter(MethodParameter::new("id", TypeName::new("Int"))),
            );

        let mut resolved = service.clone();
        with_resolver(&[user, service], |resolver| resolver.resolve_type(&mut resolved));

        let current = &resolved.variables[0];
        assert_eq!(current.bound_type.as_deref(), Some("App.User"));
        assert_eq!(current.actual_type_name().name, "App.User?");

        let find = &resolved.methods[0];
        assert_eq!(find.return_type.as_deref(), Some("App.User"));
        assert_eq!(find.parameters[0].bound_type, None);
    }

    #[test]
    fn test_initializer_return_type_is_synthesized() {
        let point = owned(
            DeclaredType::structure("Point")
                .with_module("Geo")
                .with_method(Method::initializer("init(x:)"))
                .with_method(Method::failable_initializer("init?(string:)")),
        );

        let mut resolved = point.clone();
        with_resolver(&[point], |resolver| resolver.resolve_type(&mut resolved));

        let init = &resolved.methods[0];
        assert_eq!(init.return_type_name.name, "Geo.Point");
        assert_eq!(init.return_type.as_deref(), Some("Geo.Point"));

        let failable = &resolved.methods[1];
        assert_eq!(failable.return_type_name.name, "Geo.Point?");
        assert!(failable.return_type_name.is_optional);
        assert_eq!(failable.return_type.as_deref(), Some("Geo.Point"));
    }

    #[test]
    fn test_void_return_is_left_alone() {
        let logger = DeclaredType::class("Logger")
            .with_method(Method::new("flush()", TypeName::new("Void")));
        let mut resolved = logger.clone();
        with_resolver(&[logger], |resolver| resolver.resolve_type(&mut resolved));
        assert_eq!(resolved.methods[0].return_type, None);
        assert_eq!(resolved.methods[0].return_type_name.actual_type_name, None);
    }

    #[test]
    fn test_enum_raw_type_from_inheritance() {
        let color = DeclaredType::enumeration("Color", vec![EnumCase::new("red"), EnumCase::new("blue")])
            .with_inherited_type("String");
        let mut resolved = color.clone();
        with_resolver(&[color], |resolver| resolver.resolve_type(&mut resolved));

        let details = resolved.as_enum().unwrap();
        assert_eq!(details.raw_type_name.as_ref().unwrap().name, "String");
        assert_eq!(details.raw_type, None);
    }

    #[test]
    fn test_enum_raw_type_skips_protocols_and_associated_values() {
        let hashable = DeclaredType::protocol("Hashable");
        let kind = DeclaredType::enumeration("Kind", vec![EnumCase::new("a")]).with_inherited_type("Hashable");
        let payload = DeclaredType::enumeration(
            "Payload",
            vec![EnumCase::new("data").with_associated_value(AssociatedValue::new(TypeName::new("Int")))],
        )
        .with_inherited_type("String");

        let mut kind_resolved = kind.clone();
        let mut payload_resolved = payload.clone();
        with_resolver(&[hashable, kind, payload], |resolver| {
            resolver.resolve_type(&mut kind_resolved);
            resolver.resolve_type(&mut payload_resolved);
        });

        assert_eq!(kind_resolved.as_enum().unwrap().raw_type_name, None);
        assert_eq!(payload_resolved.as_enum().unwrap().raw_type_name, None);
    }

    #[test]
    fn test_raw_value_variable_wins() {
        let code = DeclaredType::structure("Code");
        let status = DeclaredType::enumeration("Status", vec![EnumCase::new("ok")])
            .with_inherited_type("Int")
            .with_variable(Variable::new("rawValue", TypeName::new("Code")).computed());
        let mut resolved = status.clone();
        with_resolver(&[code, status], |resolver| resolver.resolve_type(&mut resolved));

        let details = resolved.as_enum().unwrap();
        assert_eq!(details.raw_type_name.as_ref().unwrap().name, "Code");
        assert_eq!(details.raw_type.as_deref(), Some("Code"));
    }

    #[test]
    fn test_composition_members_resolve() {
        let a = DeclaredType::protocol("A").with_module("Kit");
        let b = DeclaredType::protocol("B").with_module("Kit");
        let both = DeclaredType::composition("Both", vec![TypeName::new("A"), TypeName::new("B")])
            .with_module("Kit");
        let mut resolved = both.clone();
        with_resolver(&[a, b, both], |resolver| resolver.resolve_type(&mut resolved));

        assert_eq!(
            resolved.as_composition().unwrap().composed_types,
            vec!["Kit.A", "Kit.B"]
        );
    }

    #[test]
    fn test_free_function_resolves_in_module() {
        let user = DeclaredType::structure("User").with_module("App");
        let mut function = Method::new("load()", TypeName::new("User"));
        function.module = Some("App".to_string());

        with_resolver(&[user], |resolver| resolver.resolve_function(&mut function));
        assert_eq!(function.return_type.as_deref(), Some("App.User"));
    }
}
