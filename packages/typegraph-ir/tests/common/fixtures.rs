//! Test fixtures
//!
//! Small but realistic multi-module inputs.

use super::builders::*;
use typegraph_ir::shared::models::{CompilationUnit, DeclaredType, TypeName, Variable};

/// `Core` declares models and protocols, `App` builds on them through an import
pub fn app_with_core() -> Vec<CompilationUnit> {
    UnitsBuilder::new()
        .module(
            "Core",
            vec![
                DeclaredType::protocol("Identifiable"),
                DeclaredType::class("Entity").with_inherited_type("Identifiable"),
                DeclaredType::structure("Timestamp"),
            ],
        )
        .module_importing(
            "App",
            &["Core"],
            vec![
                DeclaredType::class("User")
                    .with_inherited_type("Entity")
                    .with_variable(var("created", "Timestamp"))
                    .with_variable(Variable::new("friends", array_of("User")))
                    .with_typealias(alias("ID", "String")),
                DeclaredType::extension("User").with_variable(computed("displayName", "String")),
                DeclaredType::enumeration("Role", cases(&["admin", "member"]))
                    .with_inherited_type("String"),
            ],
        )
        .build()
}

/// A deep hierarchy spread over several modules, for stress and determinism
pub fn layered_modules(modules: usize, types_per_module: usize) -> Vec<CompilationUnit> {
    let mut builder = UnitsBuilder::new().module("Base", vec![DeclaredType::protocol("Root")]);
    for m in 0..modules {
        let module = format!("M{m}");
        let previous = if m == 0 { "Base".to_string() } else { format!("M{}", m - 1) };
        let mut types = Vec::new();
        for t in 0..types_per_module {
            let parent = if t == 0 {
                "Root".to_string()
            } else {
                format!("T{}", t - 1)
            };
            types.push(
                DeclaredType::class(format!("T{t}"))
                    .with_inherited_type(parent)
                    .with_variable(var("next", &format!("T{}", (t + 1) % types_per_module)))
                    .with_variable(Variable::new("items", array_of(&format!("T{t}")))),
            );
            types.push(
                DeclaredType::extension(format!("T{t}"))
                    .with_variable(computed("label", "String")),
            );
        }
        builder = builder.module_importing(&module, &[previous.as_str(), "Base"], types);
    }
    builder.build()
}

/// Array element reference written the way a parser emits it
pub fn array_of(element: &str) -> TypeName {
    TypeName::array_of(TypeName::new(element))
}
