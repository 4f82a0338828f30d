//! Configuration loading and its effect on composition

mod common;

use common::*;
use std::io::Write;
use tempfile::NamedTempFile;
use typegraph_ir::config::ConfigError;
use typegraph_ir::shared::models::DeclaredType;
use typegraph_ir::{ComposeConfig, Composer, ConformanceLookup, Diagnostic, TypegraphError};

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

/// `Model` in `Core` importing `Kit`; both modules declare `Codable`
fn ambiguous_conformance() -> Vec<typegraph_ir::CompilationUnit> {
    UnitsBuilder::new()
        .module("Kit", vec![DeclaredType::protocol("Codable")])
        .module_importing(
            "Core",
            &["Kit"],
            vec![
                DeclaredType::protocol("Codable"),
                DeclaredType::structure("Model").with_inherited_type("Kit.Codable & Codable"),
            ],
        )
        .build()
}

#[test]
fn test_strict_lookup_from_yaml() {
    let file = write_config(
        r#"
version: 1
compose:
  parallel:
    enable_rayon: false
  conformance_lookup: strict
"#,
    );

    let config = ComposeConfig::from_yaml(file.path()).unwrap();
    assert_eq!(config.conformance_lookup, ConformanceLookup::Strict);
    assert!(!config.parallel.enable_rayon);
    assert!(config.cache_name_lookups);

    let composer = Composer::new(config).unwrap();
    let result = composer.compose(ambiguous_conformance());

    let model = expect_type(&result, "Core.Model");
    assert!(model.implements.contains("Kit.Codable"));
    assert!(!model.implements.contains("Core.Codable"));
    assert_eq!(
        count_diagnostics(&result, |d| matches!(d, Diagnostic::AmbiguousConformance { .. })),
        1
    );
}

#[test]
fn test_best_effort_lookup_takes_own_module() {
    let result = Composer::new(ComposeConfig::default())
        .unwrap()
        .compose(ambiguous_conformance());

    let model = expect_type(&result, "Core.Model");
    assert!(model.implements.contains("Kit.Codable"));
    assert!(model.implements.contains("Core.Codable"));
    assert_no_diagnostics(&result);
}

#[test]
fn test_yaml_round_trip_through_file() {
    let config = ComposeConfig::serial().conformance_lookup(ConformanceLookup::Strict);
    let file = write_config(&config.to_yaml().unwrap());

    assert_eq!(ComposeConfig::from_yaml(file.path()).unwrap(), config);
}

#[test]
fn test_invalid_yaml_is_rejected() {
    let missing = write_config("compose:\n  cache_name_lookups: false\n");
    assert!(matches!(
        ComposeConfig::from_yaml(missing.path()),
        Err(ConfigError::MissingVersion)
    ));

    let unsupported = write_config("version: 7\n");
    let err = ComposeConfig::from_yaml(unsupported.path()).unwrap_err();
    assert!(err.to_string().contains("Supported versions: 1"));

    assert!(matches!(
        ComposeConfig::from_yaml("/nonexistent/typegraph.yaml"),
        Err(ConfigError::Io(_))
    ));
}

#[test]
fn test_composer_rejects_out_of_range_workers() {
    let file = write_config("version: 1\ncompose:\n  parallel:\n    num_workers: 64\n");
    let mut config = ComposeConfig::from_yaml(file.path()).unwrap();
    config.parallel.num_workers = 4096;

    match Composer::new(config) {
        Err(TypegraphError::Config(ConfigError::Range { field, .. })) => {
            assert_eq!(field, "num_workers")
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("out-of-range worker count accepted"),
    }
}
