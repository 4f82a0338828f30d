//! Custom assertions for test verification
//!
//! Domain-specific assertions over composed type graphs.

use typegraph_ir::shared::models::DeclaredType;
use typegraph_ir::{ComposedResult, Diagnostic};

/// Fetch a composed type or fail with the list of known names
pub fn expect_type<'r>(result: &'r ComposedResult, fqn: &str) -> &'r DeclaredType {
    result.types.get(fqn).unwrap_or_else(|| {
        panic!(
            "Expected type {fqn}, got: {:?}",
            result.types.names().collect::<Vec<_>>()
        )
    })
}

/// Assert that composition reported nothing
pub fn assert_no_diagnostics(result: &ComposedResult) {
    assert!(
        result.diagnostics.is_empty(),
        "Expected no diagnostics, got: {:?}",
        result.diagnostics
    );
}

/// Assert that the composed graph holds exactly `expected` types
pub fn assert_type_count(result: &ComposedResult, expected: usize) {
    assert_eq!(
        result.types.len(),
        expected,
        "Expected {expected} types, got {}. Types: {:?}",
        result.types.len(),
        result.types.names().collect::<Vec<_>>()
    );
}

/// Assert that variable `name` of `fqn` binds `bound`
pub fn assert_variable_bound(result: &ComposedResult, fqn: &str, name: &str, bound: Option<&str>) {
    let declared = expect_type(result, fqn);
    let variable = declared
        .variables
        .iter()
        .find(|variable| variable.name == name)
        .unwrap_or_else(|| panic!("{fqn} has no variable {name}"));
    assert_eq!(
        variable.bound_type.as_deref(),
        bound,
        "{fqn}.{name} bound to {:?}",
        variable.bound_type
    );
}

/// Count diagnostics of one kind
pub fn count_diagnostics(result: &ComposedResult, predicate: impl Fn(&Diagnostic) -> bool) -> usize {
    result
        .diagnostics
        .iter()
        .filter(|diagnostic| predicate(diagnostic))
        .count()
}
