//! Declared types (class, struct, enum, protocol, composition, actor, extension)
//!
//! Relationship fields (`supertype`, `inherits`, `implements`, `based_types`,
//! `parent`, `contained_types`) hold fully-qualified names. The composed
//! `TypeGraph` acts as the arena those names are resolved against, so the
//! model never holds owning references between types.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::members::{AssociatedType, EnumCase, Method, Subscript, Variable};
use super::type_name::TypeName;
use super::typealias::Typealias;

/// Payload-free kind tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KindTag {
    Class,
    Struct,
    Enum,
    Protocol,
    ProtocolComposition,
    Actor,
    Extension,
}

impl KindTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            KindTag::Class => "class",
            KindTag::Struct => "struct",
            KindTag::Enum => "enum",
            KindTag::Protocol => "protocol",
            KindTag::ProtocolComposition => "protocolComposition",
            KindTag::Actor => "actor",
            KindTag::Extension => "extension",
        }
    }

    /// Protocols and compositions can never serve as an enum raw type
    pub fn is_protocol_like(&self) -> bool {
        matches!(self, KindTag::Protocol | KindTag::ProtocolComposition)
    }
}

/// Kind of a declaration together with its kind-specific data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Class,
    Struct,
    Actor,
    Enum(EnumDetails),
    Protocol(ProtocolDetails),
    ProtocolComposition(CompositionDetails),
    /// `extension Foo`; the base kind is unknown until merging
    Extension,
}

impl TypeKind {
    pub fn tag(&self) -> KindTag {
        match self {
            TypeKind::Class => KindTag::Class,
            TypeKind::Struct => KindTag::Struct,
            TypeKind::Actor => KindTag::Actor,
            TypeKind::Enum(_) => KindTag::Enum,
            TypeKind::Protocol(_) => KindTag::Protocol,
            TypeKind::ProtocolComposition(_) => KindTag::ProtocolComposition,
            TypeKind::Extension => KindTag::Extension,
        }
    }
}

impl Default for TypeKind {
    fn default() -> Self {
        TypeKind::Extension
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EnumDetails {
    pub cases: Vec<EnumCase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_type_name: Option<TypeName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProtocolDetails {
    pub associated_types: BTreeMap<String, AssociatedType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CompositionDetails {
    pub composed_type_names: Vec<TypeName>,
    /// FQNs of the resolved members, in written order
    #[serde(default)]
    pub composed_types: Vec<String>,
}

// ═══════════════════════════════════════════════════════════════════════════
// Capabilities
// ═══════════════════════════════════════════════════════════════════════════

pub trait HasMembers {
    fn variables(&self) -> &[Variable];
    fn methods(&self) -> &[Method];
    fn subscripts(&self) -> &[Subscript];

    fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables().iter().find(|variable| variable.name == name)
    }

    fn method(&self, name: &str) -> Option<&Method> {
        self.methods().iter().find(|method| method.name == name)
    }
}

pub trait HasInheritance {
    fn inherited_types(&self) -> &[String];
    fn inherits(&self) -> &BTreeSet<String>;
    fn implements(&self) -> &BTreeSet<String>;
    fn based_types(&self) -> &BTreeSet<String>;

    /// True when `fqn` is reachable through inheritance or conformance
    fn is_based_on(&self, fqn: &str) -> bool {
        self.based_types().contains(fqn)
    }
}

pub trait HasAssociatedTypes {
    fn associated_types(&self) -> &BTreeMap<String, AssociatedType>;

    fn associated_type(&self, name: &str) -> Option<&AssociatedType> {
        self.associated_types().get(name)
    }
}

pub trait HasRawType {
    fn raw_type_name(&self) -> Option<&TypeName>;
    fn raw_type(&self) -> Option<&str>;

    fn has_raw_type(&self) -> bool {
        self.raw_type_name().is_some()
    }
}

impl HasAssociatedTypes for ProtocolDetails {
    fn associated_types(&self) -> &BTreeMap<String, AssociatedType> {
        &self.associated_types
    }
}

impl HasRawType for EnumDetails {
    fn raw_type_name(&self) -> Option<&TypeName> {
        self.raw_type_name.as_ref()
    }

    fn raw_type(&self) -> Option<&str> {
        self.raw_type.as_deref()
    }
}

impl EnumDetails {
    pub fn has_associated_values(&self) -> bool {
        self.cases.iter().any(EnumCase::has_associated_values)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// DeclaredType
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeclaredType {
    /// Name as declared (`Inner`; `Outer.Inner` for a dotted extension)
    pub local_name: String,

    /// Module-less dotted name of the lexical parent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,

    /// Modules imported by the declaring file
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,

    pub kind: TypeKind,

    #[serde(default)]
    pub is_generic: bool,

    /// Extension whose base type is not part of the input
    #[serde(default)]
    pub is_unknown_extension: bool,

    /// Inheritance clause as written (FQNs once composed)
    #[serde(default)]
    pub inherited_types: Vec<String>,

    /// Raw based-name set, seeded from the inheritance clause
    #[serde(default)]
    pub based: BTreeMap<String, String>,

    #[serde(default)]
    pub variables: Vec<Variable>,

    #[serde(default)]
    pub methods: Vec<Method>,

    #[serde(default)]
    pub subscripts: Vec<Subscript>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub typealiases: Vec<Typealias>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,

    #[serde(default)]
    pub contained_types: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supertype: Option<String>,

    #[serde(default)]
    pub inherits: BTreeSet<String>,

    #[serde(default)]
    pub implements: BTreeSet<String>,

    #[serde(default)]
    pub based_types: BTreeSet<String>,
}

impl DeclaredType {
    pub fn new(kind: TypeKind, local_name: impl Into<String>) -> Self {
        Self {
            local_name: local_name.into(),
            kind,
            ..Default::default()
        }
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self::new(TypeKind::Class, name)
    }

    pub fn structure(name: impl Into<String>) -> Self {
        Self::new(TypeKind::Struct, name)
    }

    pub fn actor(name: impl Into<String>) -> Self {
        Self::new(TypeKind::Actor, name)
    }

    pub fn enumeration(name: impl Into<String>, cases: Vec<EnumCase>) -> Self {
        Self::new(
            TypeKind::Enum(EnumDetails {
                cases,
                ..Default::default()
            }),
            name,
        )
    }

    pub fn protocol(name: impl Into<String>) -> Self {
        Self::new(TypeKind::Protocol(ProtocolDetails::default()), name)
    }

    pub fn composition(name: impl Into<String>, composed_type_names: Vec<TypeName>) -> Self {
        let inherited: Vec<String> = composed_type_names
            .iter()
            .map(|type_name| type_name.unwrapped_type_name.clone())
            .collect();
        let mut composition = Self::new(
            TypeKind::ProtocolComposition(CompositionDetails {
                composed_type_names,
                composed_types: Vec::new(),
            }),
            name,
        );
        composition.set_inherited_types(inherited);
        composition
    }

    pub fn extension(name: impl Into<String>) -> Self {
        Self::new(TypeKind::Extension, name)
    }

    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    pub fn with_parent(mut self, parent_name: impl Into<String>) -> Self {
        self.parent_name = Some(parent_name.into());
        self
    }

    pub fn with_import(mut self, module: impl Into<String>) -> Self {
        self.imports.push(module.into());
        self
    }

    pub fn with_inherited_type(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.based.insert(name.clone(), name.clone());
        self.inherited_types.push(name);
        self
    }

    pub fn with_variable(mut self, variable: Variable) -> Self {
        self.variables.push(variable);
        self
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }

    pub fn with_subscript(mut self, subscript: Subscript) -> Self {
        self.subscripts.push(subscript);
        self
    }

    pub fn with_typealias(mut self, typealias: Typealias) -> Self {
        self.typealiases.push(typealias);
        self
    }

    /// Adds an associated type; ignored unless the type is a protocol
    pub fn with_associated_type(mut self, associated_type: AssociatedType) -> Self {
        if let TypeKind::Protocol(details) = &mut self.kind {
            details
                .associated_types
                .insert(associated_type.name.clone(), associated_type);
        }
        self
    }

    pub fn generic(mut self) -> Self {
        self.is_generic = true;
        self
    }

    /// Module-less dotted name (`Outer.Inner`)
    pub fn name(&self) -> String {
        match &self.parent_name {
            Some(parent) => format!("{parent}.{}", self.local_name),
            None => self.local_name.clone(),
        }
    }

    /// Fully-qualified name (`Module.Outer.Inner`)
    pub fn fqn(&self) -> String {
        qualify(self.module.as_deref(), &self.name())
    }

    pub fn parent_fqn(&self) -> Option<String> {
        self.parent_name
            .as_deref()
            .map(|parent| qualify(self.module.as_deref(), parent))
    }

    pub fn tag(&self) -> KindTag {
        self.kind.tag()
    }

    pub fn is_extension(&self) -> bool {
        matches!(self.kind, TypeKind::Extension)
    }

    pub fn as_enum(&self) -> Option<&EnumDetails> {
        match &self.kind {
            TypeKind::Enum(details) => Some(details),
            _ => None,
        }
    }

    pub fn as_protocol(&self) -> Option<&ProtocolDetails> {
        match &self.kind {
            TypeKind::Protocol(details) => Some(details),
            _ => None,
        }
    }

    pub fn as_composition(&self) -> Option<&CompositionDetails> {
        match &self.kind {
            TypeKind::ProtocolComposition(details) => Some(details),
            _ => None,
        }
    }

    /// Replace the inheritance clause, reseeding `based`
    pub fn set_inherited_types(&mut self, inherited_types: Vec<String>) {
        self.based = inherited_types
            .iter()
            .map(|name| (name.clone(), name.clone()))
            .collect();
        self.inherited_types = inherited_types;
    }

    /// Move this declaration to `module` / dotted `name`
    pub fn retarget(&mut self, module: Option<String>, name: &str) {
        match name.rsplit_once('.') {
            Some((parent, local)) => {
                self.parent_name = Some(parent.to_string());
                self.local_name = local.to_string();
            }
            None => {
                self.parent_name = None;
                self.local_name = name.to_string();
            }
        }
        self.module = module;
    }

    /// Merge an extension (or duplicate declaration) into this type.
    ///
    /// The merge is additive: members, nested typealiases and inheritance
    /// entries accumulate without de-duplication.
    pub fn extend(&mut self, other: DeclaredType) {
        let owner = self.fqn();
        let mut inherited = std::mem::take(&mut self.inherited_types);
        inherited.extend(other.inherited_types);
        let mut based = std::mem::take(&mut self.based);
        based.extend(other.based);
        self.inherited_types = inherited;
        self.based = based;

        self.inherits.extend(other.inherits);
        self.implements.extend(other.implements);
        self.variables.extend(other.variables);
        self.methods.extend(other.methods);
        self.subscripts.extend(other.subscripts);
        self.typealiases.extend(other.typealiases);
        self.stamp_owner(&owner);
    }

    /// Record `owner` as the defining type of every member
    pub fn stamp_owner(&mut self, owner: &str) {
        for variable in &mut self.variables {
            variable.defined_in_type = Some(owner.to_string());
        }
        for method in &mut self.methods {
            method.defined_in_type = Some(owner.to_string());
        }
        for subscript in &mut self.subscripts {
            subscript.defined_in_type = Some(owner.to_string());
        }
    }
}

impl HasMembers for DeclaredType {
    fn variables(&self) -> &[Variable] {
        &self.variables
    }

    fn methods(&self) -> &[Method] {
        &self.methods
    }

    fn subscripts(&self) -> &[Subscript] {
        &self.subscripts
    }
}

impl HasInheritance for DeclaredType {
    fn inherited_types(&self) -> &[String] {
        &self.inherited_types
    }

    fn inherits(&self) -> &BTreeSet<String> {
        &self.inherits
    }

    fn implements(&self) -> &BTreeSet<String> {
        &self.implements
    }

    fn based_types(&self) -> &BTreeSet<String> {
        &self.based_types
    }
}

/// `module.name`, or `name` when there is no module
pub fn qualify(module: Option<&str>, name: &str) -> String {
    match module {
        Some(module) => format!("{module}.{name}"),
        None => name.to_string(),
    }
}
