//! Shared models
//!
//! Declaration records produced by the front-end parser and consumed by the
//! composition engine.

mod compilation_unit;
mod declared_type;
mod members;
mod type_name;
mod typealias;

pub use compilation_unit::CompilationUnit;
pub use declared_type::{
    qualify, CompositionDetails, DeclaredType, EnumDetails, HasAssociatedTypes, HasInheritance,
    HasMembers, HasRawType, KindTag, ProtocolDetails, TypeKind,
};
pub use members::{
    AssociatedType, AssociatedValue, EnumCase, GenericParameter, Method, MethodKind,
    MethodParameter, Subscript, Variable,
};
pub use type_name::{
    ArrayType, ClosureParameter, ClosureType, DictionaryType, GenericType, GenericTypeParameter,
    TupleElement, TupleType, TypeName, TypePayload,
};
pub use typealias::Typealias;
