//! Per-file parser output consumed by the composer

use serde::{Deserialize, Serialize};

use super::declared_type::DeclaredType;
use super::members::Method;
use super::typealias::Typealias;
use crate::errors::Result;

/// Declarations found in one source file (or one synthetic aggregate)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilationUnit {
    #[serde(default)]
    pub types: Vec<DeclaredType>,

    /// Free functions
    #[serde(default)]
    pub functions: Vec<Method>,

    #[serde(default)]
    pub typealiases: Vec<Typealias>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
}

impl CompilationUnit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_module(module: impl Into<String>) -> Self {
        Self {
            module: Some(module.into()),
            ..Self::default()
        }
    }

    pub fn with_file_path(mut self, path: impl Into<String>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    pub fn with_import(mut self, module: impl Into<String>) -> Self {
        self.imports.push(module.into());
        self
    }

    pub fn with_type(mut self, declared: DeclaredType) -> Self {
        self.types.push(declared);
        self
    }

    pub fn with_function(mut self, function: Method) -> Self {
        self.functions.push(function);
        self
    }

    pub fn with_typealias(mut self, typealias: Typealias) -> Self {
        self.typealiases.push(typealias);
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Copy the unit's module, imports and path onto records that lack their own
    pub fn stamp(&mut self) {
        let module = self.module.clone();
        let imports = self.imports.clone();
        let file_path = self.file_path.clone();

        for declared in &mut self.types {
            if declared.module.is_none() {
                declared.module = module.clone();
            }
            if declared.imports.is_empty() {
                declared.imports = imports.clone();
            }
            if declared.file_path.is_none() {
                declared.file_path = file_path.clone();
            }
            let declared_name = declared.name();
            for typealias in &mut declared.typealiases {
                if typealias.module.is_none() {
                    typealias.module = declared.module.clone();
                }
                if typealias.parent_name.is_none() {
                    typealias.parent_name = Some(declared_name.clone());
                }
                if typealias.imports.is_empty() {
                    typealias.imports = declared.imports.clone();
                }
            }
        }
        for typealias in &mut self.typealiases {
            if typealias.module.is_none() {
                typealias.module = module.clone();
            }
            if typealias.imports.is_empty() {
                typealias.imports = imports.clone();
            }
            if typealias.file_path.is_none() {
                typealias.file_path = file_path.clone();
            }
        }
        for function in &mut self.functions {
            if function.module.is_none() {
                function.module = module.clone();
            }
            if function.imports.is_empty() {
                function.imports = imports.clone();
            }
            if function.file_path.is_none() {
                function.file_path = file_path.clone();
            }
        }
    }
}
