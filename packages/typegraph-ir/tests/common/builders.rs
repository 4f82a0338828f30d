//! Test data builders
//!
//! Short-hand constructors for the declaration records a parser would emit.

use typegraph_ir::shared::models::{
    AssociatedValue, CompilationUnit, DeclaredType, EnumCase, Method, MethodParameter, TypeName,
    Typealias, Variable,
};

/// Stored property `name: type_name`
pub fn var(name: &str, type_name: &str) -> Variable {
    Variable::new(name, TypeName::new(type_name))
}

/// Read-only computed property
pub fn computed(name: &str, type_name: &str) -> Variable {
    Variable::new(name, TypeName::new(type_name)).computed()
}

pub fn optional_var(name: &str, type_name: &str) -> Variable {
    Variable::new(name, TypeName::optional(type_name))
}

/// `func name(param: param_type) -> returns`
pub fn method(name: &str, param: Option<(&str, &str)>, returns: &str) -> Method {
    let method = Method::new(name, TypeName::new(returns));
    match param {
        Some((label, type_name)) => {
            method.with_parameter(MethodParameter::new(label, TypeName::new(type_name)))
        }
        None => method,
    }
}

pub fn alias(name: &str, target: &str) -> Typealias {
    Typealias::new(name, TypeName::new(target))
}

pub fn cases(names: &[&str]) -> Vec<EnumCase> {
    names.iter().map(|name| EnumCase::new(*name)).collect()
}

pub fn case_with_value(name: &str, type_name: &str) -> EnumCase {
    EnumCase::new(name).with_associated_value(AssociatedValue::new(TypeName::new(type_name)))
}

/// Builder for a multi-unit composition input
#[derive(Debug, Default)]
pub struct UnitsBuilder {
    units: Vec<CompilationUnit>,
}

impl UnitsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a unit in `module` holding `types`
    pub fn module(mut self, module: &str, types: Vec<DeclaredType>) -> Self {
        let unit = types
            .into_iter()
            .fold(CompilationUnit::in_module(module), CompilationUnit::with_type);
        self.units.push(unit);
        self
    }

    /// Add a unit in `module` that imports `imports`
    pub fn module_importing(
        mut self,
        module: &str,
        imports: &[&str],
        types: Vec<DeclaredType>,
    ) -> Self {
        let unit = imports
            .iter()
            .fold(CompilationUnit::in_module(module), |unit, import| {
                unit.with_import(*import)
            });
        let unit = types.into_iter().fold(unit, CompilationUnit::with_type);
        self.units.push(unit);
        self
    }

    pub fn unit(mut self, unit: CompilationUnit) -> Self {
        self.units.push(unit);
        self
    }

    pub fn build(self) -> Vec<CompilationUnit> {
        self.units
    }
}
