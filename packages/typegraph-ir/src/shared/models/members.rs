//! Member declarations: variables, methods, subscripts, enum cases
//!
//! Every member keeps the written `TypeName` next to the FQN of the declared type
//! it binds to (`None` when the reference points outside the closed world).

use serde::{Deserialize, Serialize};

use super::type_name::TypeName;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub type_name: TypeName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bound_type: Option<String>,
    #[serde(default)]
    pub is_computed: bool,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_mutable: bool,
    /// Name of the declaration the member was written in (type or extension)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defined_in_type_name: Option<TypeName>,
    /// FQN of the surviving type that owns the member
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defined_in_type: Option<String>,
}

impl Variable {
    pub fn new(name: impl Into<String>, type_name: TypeName) -> Self {
        Self {
            name: name.into(),
            type_name,
            is_mutable: true,
            ..Default::default()
        }
    }

    pub fn computed(mut self) -> Self {
        self.is_computed = true;
        self.is_mutable = false;
        self
    }

    pub fn static_member(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Type name after resolution
    pub fn actual_type_name(&self) -> &TypeName {
        self.type_name.resolved()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MethodParameter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub argument_label: Option<String>,
    pub name: String,
    pub type_name: TypeName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bound_type: Option<String>,
    #[serde(default)]
    pub is_inout: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

impl MethodParameter {
    pub fn new(name: impl Into<String>, type_name: TypeName) -> Self {
        let name = name.into();
        Self {
            argument_label: Some(name.clone()),
            name,
            type_name,
            ..Default::default()
        }
    }

    pub fn unlabeled(name: impl Into<String>, type_name: TypeName) -> Self {
        Self {
            argument_label: None,
            ..Self::new(name, type_name)
        }
    }
}

/// Generic parameter declared by a method (`func map<T>(...)`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericParameter {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inherited_type_name: Option<TypeName>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodKind {
    #[default]
    Regular,
    Initializer,
    FailableInitializer,
    Deinitializer,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Method {
    /// Full name as written (`update(with:)`)
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<MethodParameter>,
    pub return_type_name: TypeName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
    #[serde(default)]
    pub kind: MethodKind,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_async: bool,
    #[serde(default)]
    pub throws: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generic_parameters: Vec<GenericParameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defined_in_type_name: Option<TypeName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defined_in_type: Option<String>,
    /// Module of a free function
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    /// Imports of the file declaring a free function
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
}

impl Method {
    pub fn new(name: impl Into<String>, return_type_name: TypeName) -> Self {
        Self {
            name: name.into(),
            return_type_name,
            ..Default::default()
        }
    }

    pub fn initializer(name: impl Into<String>) -> Self {
        Self {
            kind: MethodKind::Initializer,
            ..Self::new(name, TypeName::new("Self"))
        }
    }

    pub fn failable_initializer(name: impl Into<String>) -> Self {
        Self {
            kind: MethodKind::FailableInitializer,
            ..Self::new(name, TypeName::optional("Self"))
        }
    }

    pub fn with_parameter(mut self, parameter: MethodParameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_generic_parameter(mut self, name: impl Into<String>) -> Self {
        self.generic_parameters.push(GenericParameter {
            name: name.into(),
            inherited_type_name: None,
        });
        self
    }

    pub fn is_initializer(&self) -> bool {
        matches!(
            self.kind,
            MethodKind::Initializer | MethodKind::FailableInitializer
        )
    }

    pub fn is_failable_initializer(&self) -> bool {
        self.kind == MethodKind::FailableInitializer
    }

    pub fn is_generic_parameter(&self, name: &str) -> bool {
        self.generic_parameters
            .iter()
            .any(|parameter| parameter.name == name)
    }

    pub fn actual_return_type_name(&self) -> &TypeName {
        self.return_type_name.resolved()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Subscript {
    #[serde(default)]
    pub parameters: Vec<MethodParameter>,
    pub return_type_name: TypeName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
    #[serde(default)]
    pub is_mutable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defined_in_type_name: Option<TypeName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defined_in_type: Option<String>,
}

impl Subscript {
    pub fn new(parameters: Vec<MethodParameter>, return_type_name: TypeName) -> Self {
        Self {
            parameters,
            return_type_name,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociatedValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_name: Option<String>,
    pub type_name: TypeName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bound_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

impl AssociatedValue {
    pub fn new(type_name: TypeName) -> Self {
        Self {
            local_name: None,
            external_name: None,
            type_name,
            bound_type: None,
            default_value: None,
        }
    }

    pub fn named(name: impl Into<String>, type_name: TypeName) -> Self {
        let name = name.into();
        Self {
            local_name: Some(name.clone()),
            external_name: Some(name),
            ..Self::new(type_name)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumCase {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub associated_values: Vec<AssociatedValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_value: Option<String>,
}

impl EnumCase {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            associated_values: Vec::new(),
            raw_value: None,
        }
    }

    pub fn with_associated_value(mut self, value: AssociatedValue) -> Self {
        self.associated_values.push(value);
        self
    }

    pub fn has_associated_values(&self) -> bool {
        !self.associated_values.is_empty()
    }
}

/// `associatedtype Element: Hashable`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociatedType {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<TypeName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bound_type: Option<String>,
}

impl AssociatedType {
    pub fn new(name: impl Into<String>, type_name: Option<TypeName>) -> Self {
        Self {
            name: name.into(),
            type_name,
            bound_type: None,
        }
    }
}
