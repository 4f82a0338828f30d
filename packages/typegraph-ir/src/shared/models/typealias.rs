//! Typealias declarations

use serde::{Deserialize, Serialize};

use super::type_name::TypeName;

/// `typealias Alias = Target`, at top level or nested inside a type body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Typealias {
    /// Local alias name (`ID`)
    pub alias_name: String,

    /// Target reference as written
    pub type_name: TypeName,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,

    /// Module-less dotted name of the owning type (`Outer.Inner`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_name: Option<String>,

    /// Modules imported where the alias is declared
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<String>,

    /// FQN of the declared type the alias finally points at
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bound_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
}

impl Typealias {
    pub fn new(alias_name: impl Into<String>, type_name: TypeName) -> Self {
        Self {
            alias_name: alias_name.into(),
            type_name,
            module: None,
            parent_name: None,
            imports: Vec::new(),
            bound_type: None,
            file_path: None,
        }
    }

    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    pub fn with_parent(mut self, parent_name: impl Into<String>) -> Self {
        self.parent_name = Some(parent_name.into());
        self
    }

    /// Scope-qualified dotted path: `[module.][parent.]alias`
    pub fn name(&self) -> String {
        let mut name = String::new();
        if let Some(module) = &self.module {
            name.push_str(module);
            name.push('.');
        }
        if let Some(parent) = &self.parent_name {
            name.push_str(parent);
            name.push('.');
        }
        name.push_str(&self.alias_name);
        name
    }

    /// FQN of the owning type, if nested
    pub fn parent_fqn(&self) -> Option<String> {
        let parent = self.parent_name.as_ref()?;
        Some(match &self.module {
            Some(module) => format!("{module}.{parent}"),
            None => parent.clone(),
        })
    }
}
