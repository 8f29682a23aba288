//! Type declarations, instantiations, and their classification.

use lasso::Spur;
use serde::{Deserialize, Serialize};

use crate::types::collections::SmallVec2;
use crate::types::{SymbolId, TypeId};

use super::Location;

/// Platform-provided types with dedicated handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpecialType {
    Object,
    Void,
    Boolean,
    Char,
    SByte,
    Byte,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Single,
    Double,
    Decimal,
    String,
    DateTime,
    IntPtr,
    UIntPtr,
    /// The unbound `Nullable<T>` definition and its instantiations.
    Nullable,
}

impl SpecialType {
    /// Primitive-like special types the deserializer always knows how to build.
    /// `object` is excluded: it can hold anything.
    pub fn is_primitive(self) -> bool {
        !matches!(self, Self::Object | Self::Void | Self::Nullable)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeKind {
    Special(SpecialType),
    Enum,
    Interface,
    Class,
    Struct,
    Delegate,
    Array,
    TypeParameter,
}

/// Whether a type is declared in the unit under analysis or comes from
/// referenced metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Origin {
    Source,
    Metadata,
}

/// Declaration that introduces a type parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeParameterOwner {
    Type(TypeId),
    Method(SymbolId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeParameterInfo {
    pub owner: TypeParameterOwner,
    pub ordinal: u32,
}

/// An annotation applied to a type or symbol: the annotation's own type
/// plus an optional payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Annotation {
    pub ty: TypeId,
    pub payload: Option<String>,
}

impl Annotation {
    pub fn new(ty: TypeId) -> Self {
        Self { ty, payload: None }
    }

    pub fn with_payload(ty: TypeId, payload: impl Into<String>) -> Self {
        Self {
            ty,
            payload: Some(payload.into()),
        }
    }
}

/// Arena entry for one type.
///
/// Generic definitions list their own type parameters in `type_arguments`;
/// instantiations list the bound arguments and point at the definition.
#[derive(Debug, Clone)]
pub struct TypeData {
    pub name: Spur,
    pub kind: TypeKind,
    pub origin: Origin,
    pub type_arguments: SmallVec2<TypeId>,
    pub definition: Option<TypeId>,
    /// Array element, or the element an enumerable yields.
    pub element: Option<TypeId>,
    pub base_type: Option<TypeId>,
    pub interfaces: Vec<TypeId>,
    pub annotations: Vec<Annotation>,
    pub members: Vec<SymbolId>,
    pub constructors: Vec<SymbolId>,
    pub primary_parameters: Vec<SymbolId>,
    pub is_record: bool,
    pub type_parameter: Option<TypeParameterInfo>,
    pub location: Option<Location>,
}

impl TypeData {
    pub(crate) fn new(name: Spur, kind: TypeKind, origin: Origin) -> Self {
        Self {
            name,
            kind,
            origin,
            type_arguments: SmallVec2::new(),
            definition: None,
            element: None,
            base_type: None,
            interfaces: Vec::new(),
            annotations: Vec::new(),
            members: Vec::new(),
            constructors: Vec::new(),
            primary_parameters: Vec::new(),
            is_record: false,
            type_parameter: None,
            location: None,
        }
    }

    pub fn is_generic_instantiation(&self) -> bool {
        self.definition.is_some()
    }

    pub fn is_type_parameter(&self) -> bool {
        self.kind == TypeKind::TypeParameter
    }
}
