//! Type references as written at a declaration site
//!
//! A `TypeName` is the structural description of a reference: the written name,
//! optionality, and an optional payload describing its shape (array, dictionary,
//! tuple, closure or generic). Resolution never mutates a `TypeName` that may be
//! shared; it produces a new value with `actual_type_name` filled in.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Reference to a type as written in source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeName {
    /// Written name, optionality suffix included (`Int?`, `Foo!`)
    pub name: String,

    /// Name without the optionality suffix
    pub unwrapped_type_name: String,

    #[serde(default)]
    pub is_optional: bool,

    #[serde(default)]
    pub is_implicitly_unwrapped_optional: bool,

    /// Attributes such as `@escaping` or `@Sendable`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<String>,

    /// Modifiers such as `inout` or `some`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modifiers: Vec<String>,

    #[serde(default)]
    pub is_protocol_composition: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<TypePayload>,

    /// Flattened form after following typealiases and resolving nested payloads
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_type_name: Option<Box<TypeName>>,
}

impl TypeName {
    /// Plain, non-optional reference
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_optionality(name, false, false)
    }

    /// `name?`
    pub fn optional(name: impl Into<String>) -> Self {
        Self::with_optionality(name, true, false)
    }

    /// Build a reference and normalize its optionality suffix.
    ///
    /// `?` (or `!`) is appended unless the name already contains an `Optional<...>`
    /// or carries a generic `where` clause.
    pub fn with_optionality(
        name: impl Into<String>,
        is_optional: bool,
        is_implicitly_unwrapped_optional: bool,
    ) -> Self {
        let unwrapped: String = name.into();
        let suffix = if unwrapped.contains("Optional<") || unwrapped.contains(" where ") {
            ""
        } else if is_implicitly_unwrapped_optional {
            "!"
        } else if is_optional {
            "?"
        } else {
            ""
        };

        Self {
            name: format!("{unwrapped}{suffix}"),
            unwrapped_type_name: unwrapped,
            is_optional: is_optional || is_implicitly_unwrapped_optional,
            is_implicitly_unwrapped_optional,
            attributes: Vec::new(),
            modifiers: Vec::new(),
            is_protocol_composition: false,
            payload: None,
            actual_type_name: None,
        }
    }

    /// `[element]`
    pub fn array_of(element: TypeName) -> Self {
        let array = ArrayType::new(element);
        Self::new(array.name.clone()).with_payload(TypePayload::Array(array))
    }

    /// `[key: value]`
    pub fn dictionary_of(key: TypeName, value: TypeName) -> Self {
        let dictionary = DictionaryType::new(key, value);
        Self::new(dictionary.name.clone()).with_payload(TypePayload::Dictionary(dictionary))
    }

    /// `(a: A, B, ...)`
    pub fn tuple_of(elements: Vec<TupleElement>) -> Self {
        let tuple = TupleType::new(elements);
        Self::new(tuple.name.clone()).with_payload(TypePayload::Tuple(tuple))
    }

    /// `(A, B) -> R`
    pub fn closure_of(closure: ClosureType) -> Self {
        Self::new(closure.name.clone()).with_payload(TypePayload::Closure(closure))
    }

    /// `Base<P1, P2>`
    pub fn generic_of(base: impl Into<String>, parameters: Vec<TypeName>) -> Self {
        let generic = GenericType::new(base, parameters);
        Self::new(generic.as_source()).with_payload(TypePayload::Generic(generic))
    }

    pub fn with_payload(mut self, payload: TypePayload) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attributes.push(attribute.into());
        self
    }

    pub fn with_modifier(mut self, modifier: impl Into<String>) -> Self {
        self.modifiers.push(modifier.into());
        self
    }

    /// Same reference, wrapped as optional (`T` becomes `T?`)
    pub fn into_optional(self) -> Self {
        let mut wrapped = Self::with_optionality(self.unwrapped_type_name, true, false);
        wrapped.attributes = self.attributes;
        wrapped.modifiers = self.modifiers;
        wrapped.is_protocol_composition = self.is_protocol_composition;
        wrapped.payload = self.payload;
        wrapped.actual_type_name = self.actual_type_name;
        wrapped
    }

    pub fn is_void(&self) -> bool {
        self.name == "Void" || self.name == "()" || self.unwrapped_type_name == "Void"
    }

    pub fn as_array(&self) -> Option<&ArrayType> {
        match &self.payload {
            Some(TypePayload::Array(array)) => Some(array),
            _ => None,
        }
    }

    pub fn as_dictionary(&self) -> Option<&DictionaryType> {
        match &self.payload {
            Some(TypePayload::Dictionary(dictionary)) => Some(dictionary),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&TupleType> {
        match &self.payload {
            Some(TypePayload::Tuple(tuple)) => Some(tuple),
            _ => None,
        }
    }

    pub fn as_closure(&self) -> Option<&ClosureType> {
        match &self.payload {
            Some(TypePayload::Closure(closure)) => Some(closure),
            _ => None,
        }
    }

    /// Generic view of this reference.
    ///
    /// Arrays and dictionaries answer with their `Array<Element>` and
    /// `Dictionary<Key, Value>` equivalents so collection lookups work against
    /// either representation.
    pub fn generic(&self) -> Option<Cow<'_, GenericType>> {
        match &self.payload {
            Some(TypePayload::Generic(generic)) => Some(Cow::Borrowed(generic)),
            Some(TypePayload::Array(array)) => Some(Cow::Owned(array.as_generic())),
            Some(TypePayload::Dictionary(dictionary)) => Some(Cow::Owned(dictionary.as_generic())),
            _ => None,
        }
    }

    /// Base name of the generic view, if any
    pub fn generic_base_name(&self) -> Option<&str> {
        match &self.payload {
            Some(TypePayload::Generic(generic)) => Some(generic.name.as_str()),
            Some(TypePayload::Array(_)) => Some("Array"),
            Some(TypePayload::Dictionary(_)) => Some("Dictionary"),
            _ => None,
        }
    }

    /// Identifier used for type-map lookups: generic base name or unwrapped name
    pub fn lookup_identifier(&self) -> &str {
        self.generic_base_name()
            .unwrap_or(self.unwrapped_type_name.as_str())
    }

    /// `actual_type_name` when resolved, `self` otherwise
    pub fn resolved(&self) -> &TypeName {
        self.actual_type_name.as_deref().unwrap_or(self)
    }

    /// Source form: attributes, modifiers, then the name
    pub fn as_source(&self) -> String {
        if self.is_void() {
            return "Void".to_string();
        }
        self.attributes
            .iter()
            .chain(self.modifiers.iter())
            .map(String::as_str)
            .chain(std::iter::once(self.name.as_str()))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for TypeName {
    fn default() -> Self {
        TypeName::new("Void")
    }
}

impl std::fmt::Display for TypeName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Structural payloads
// ═══════════════════════════════════════════════════════════════════════════

/// Shape of a structural reference. Exactly one kind per `TypeName`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypePayload {
    Array(ArrayType),
    Dictionary(DictionaryType),
    Tuple(TupleType),
    Closure(ClosureType),
    Generic(GenericType),
}

impl TypePayload {
    /// Copy of this payload carrying `name` (tuples and closures keep theirs)
    pub(crate) fn renamed(&self, name: &str) -> Self {
        match self {
            TypePayload::Array(array) => TypePayload::Array(ArrayType {
                name: name.to_string(),
                ..array.clone()
            }),
            TypePayload::Dictionary(dictionary) => TypePayload::Dictionary(DictionaryType {
                name: name.to_string(),
                ..dictionary.clone()
            }),
            TypePayload::Generic(generic) => TypePayload::Generic(GenericType {
                name: name.to_string(),
                ..generic.clone()
            }),
            TypePayload::Tuple(_) | TypePayload::Closure(_) => self.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrayType {
    pub name: String,
    pub element_type_name: Box<TypeName>,
    /// FQN of the element's declared type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_type: Option<String>,
}

impl ArrayType {
    pub fn new(element: TypeName) -> Self {
        let name = format!("[{}]", element.as_source());
        Self {
            name,
            element_type_name: Box::new(element),
            element_type: None,
        }
    }

    pub fn as_source(&self) -> String {
        format!("[{}]", self.element_type_name.as_source())
    }

    pub fn as_generic(&self) -> GenericType {
        GenericType {
            name: "Array".to_string(),
            type_parameters: vec![GenericTypeParameter {
                type_name: (*self.element_type_name).clone(),
                bound_type: self.element_type.clone(),
            }],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryType {
    pub name: String,
    pub key_type_name: Box<TypeName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_type: Option<String>,
    pub value_type_name: Box<TypeName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
}

impl DictionaryType {
    pub fn new(key: TypeName, value: TypeName) -> Self {
        let name = format!("[{}: {}]", key.as_source(), value.as_source());
        Self {
            name,
            key_type_name: Box::new(key),
            key_type: None,
            value_type_name: Box::new(value),
            value_type: None,
        }
    }

    pub fn as_source(&self) -> String {
        format!(
            "[{}: {}]",
            self.key_type_name.as_source(),
            self.value_type_name.as_source()
        )
    }

    pub fn as_generic(&self) -> GenericType {
        GenericType {
            name: "Dictionary".to_string(),
            type_parameters: vec![
                GenericTypeParameter {
                    type_name: (*self.key_type_name).clone(),
                    bound_type: self.key_type.clone(),
                },
                GenericTypeParameter {
                    type_name: (*self.value_type_name).clone(),
                    bound_type: self.value_type.clone(),
                },
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TupleElement {
    /// Label, if the element is named
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub type_name: TypeName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bound_type: Option<String>,
}

impl TupleElement {
    pub fn new(type_name: TypeName) -> Self {
        Self {
            name: None,
            type_name,
            bound_type: None,
        }
    }

    pub fn named(name: impl Into<String>, type_name: TypeName) -> Self {
        Self {
            name: Some(name.into()),
            type_name,
            bound_type: None,
        }
    }

    pub fn as_source(&self) -> String {
        match &self.name {
            Some(label) => format!("{label}: {}", self.type_name.as_source()),
            None => self.type_name.as_source(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TupleType {
    pub name: String,
    pub elements: Vec<TupleElement>,
}

impl TupleType {
    pub fn new(elements: Vec<TupleElement>) -> Self {
        let name = Self::source_of(&elements);
        Self { name, elements }
    }

    /// Canonical `(a: A, B)` form of a tuple element list
    pub fn source_of(elements: &[TupleElement]) -> String {
        let parts: Vec<String> = elements.iter().map(TupleElement::as_source).collect();
        format!("({})", parts.join(", "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosureParameter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub argument_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub type_name: TypeName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bound_type: Option<String>,
    #[serde(default)]
    pub is_inout: bool,
}

impl ClosureParameter {
    pub fn new(type_name: TypeName) -> Self {
        Self {
            argument_label: None,
            name: None,
            type_name,
            bound_type: None,
            is_inout: false,
        }
    }

    pub fn as_source(&self) -> String {
        let type_source = self.type_name.as_source();
        let typed = if self.is_inout {
            format!("inout {type_source}")
        } else {
            type_source
        };
        match (&self.argument_label, &self.name) {
            (Some(label), _) => format!("{label}: {typed}"),
            (None, Some(name)) => format!("{name}: {typed}"),
            (None, None) => typed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosureType {
    pub name: String,
    pub parameters: Vec<ClosureParameter>,
    pub return_type_name: Box<TypeName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
    #[serde(default)]
    pub is_async: bool,
    #[serde(default)]
    pub throws: bool,
}

impl ClosureType {
    pub fn new(parameters: Vec<ClosureParameter>, return_type_name: TypeName) -> Self {
        let mut closure = Self {
            name: String::new(),
            parameters,
            return_type_name: Box::new(return_type_name),
            return_type: None,
            is_async: false,
            throws: false,
        };
        closure.name = closure.as_source();
        closure
    }

    pub fn asynchronous(mut self) -> Self {
        self.is_async = true;
        self.name = self.as_source();
        self
    }

    pub fn throwing(mut self) -> Self {
        self.throws = true;
        self.name = self.as_source();
        self
    }

    pub fn as_source(&self) -> String {
        let parameters: Vec<String> = self
            .parameters
            .iter()
            .map(ClosureParameter::as_source)
            .collect();
        let mut effects = String::new();
        if self.is_async {
            effects.push_str(" async");
        }
        if self.throws {
            effects.push_str(" throws");
        }
        format!(
            "({}){} -> {}",
            parameters.join(", "),
            effects,
            self.return_type_name.as_source()
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericTypeParameter {
    pub type_name: TypeName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bound_type: Option<String>,
}

impl GenericTypeParameter {
    pub fn new(type_name: TypeName) -> Self {
        Self {
            type_name,
            bound_type: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericType {
    /// Base name without parameters (`Result`, `Module.Box`)
    pub name: String,
    pub type_parameters: Vec<GenericTypeParameter>,
}

impl GenericType {
    pub fn new(name: impl Into<String>, parameters: Vec<TypeName>) -> Self {
        Self {
            name: name.into(),
            type_parameters: parameters
                .into_iter()
                .map(GenericTypeParameter::new)
                .collect(),
        }
    }

    pub fn as_source(&self) -> String {
        let parameters: Vec<String> = self
            .type_parameters
            .iter()
            .map(|parameter| parameter.type_name.as_source())
            .collect();
        format!("{}<{}>", self.name, parameters.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_suffix_normalization() {
        assert_eq!(TypeName::optional("Int").name, "Int?");
        assert_eq!(TypeName::with_optionality("Foo", false, true).name, "Foo!");
        assert_eq!(TypeName::optional("Optional<Int>").name, "Optional<Int>");
        assert_eq!(TypeName::optional("[Optional<Int>]").name, "[Optional<Int>]");
        assert_eq!(TypeName::optional("Int").unwrapped_type_name, "Int");
        assert!(TypeName::with_optionality("Foo", false, true).is_optional);
        assert_eq!(TypeName::with_optionality("Foo", true, true).name, "Foo!");
    }

    #[test]
    fn test_into_optional_keeps_payload() {
        let wrapped = TypeName::array_of(TypeName::new("Int")).into_optional();
        assert_eq!(wrapped.name, "[Int]?");
        assert!(wrapped.is_optional);
        assert!(wrapped.as_array().is_some());
    }

    #[test]
    fn test_collection_sources() {
        assert_eq!(TypeName::array_of(TypeName::new("Int")).name, "[Int]");
        assert_eq!(
            TypeName::dictionary_of(TypeName::new("String"), TypeName::optional("Int")).name,
            "[String: Int?]"
        );
        assert_eq!(
            TypeName::generic_of("Result", vec![TypeName::new("Int"), TypeName::new("Error")])
                .name,
            "Result<Int, Error>"
        );
    }

    #[test]
    fn test_tuple_and_closure_sources() {
        let tuple = TypeName::tuple_of(vec![
            TupleElement::named("a", TypeName::new("Int")),
            TupleElement::new(TypeName::new("String")),
        ]);
        assert_eq!(tuple.name, "(a: Int, String)");

        let mut inout = ClosureParameter::new(TypeName::new("Int"));
        inout.is_inout = true;
        let closure = ClosureType::new(vec![inout], TypeName::new("Void")).throwing();
        assert_eq!(closure.name, "(inout Int) throws -> Void");
    }

    #[test]
    fn test_generic_view_of_collections() {
        let array = TypeName::array_of(TypeName::new("Int"));
        let view = array.generic().unwrap();
        assert_eq!(view.name, "Array");
        assert_eq!(view.type_parameters.len(), 1);
        assert_eq!(array.lookup_identifier(), "Array");

        let dictionary = TypeName::dictionary_of(TypeName::new("String"), TypeName::new("Int"));
        assert_eq!(dictionary.generic().unwrap().type_parameters.len(), 2);
        assert_eq!(dictionary.generic_base_name(), Some("Dictionary"));

        assert!(TypeName::new("Int").generic().is_none());
        assert_eq!(TypeName::optional("Int").lookup_identifier(), "Int");
    }

    #[test]
    fn test_void_detection() {
        assert!(TypeName::new("Void").is_void());
        assert!(TypeName::new("()").is_void());
        assert!(!TypeName::new("Int").is_void());
    }

    #[test]
    fn test_as_source_with_attributes() {
        let escaping = TypeName::new("Handler").with_attribute("@escaping");
        assert_eq!(escaping.as_source(), "@escaping Handler");
    }
}
