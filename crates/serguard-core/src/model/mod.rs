//! Host type model: an immutable snapshot of the unit's type metadata.
//!
//! Hosts lower their own semantic model into a `TypeModel` through
//! `ModelBuilder` once per analysis unit. Everything downstream reads it
//! through shared references; the model is `Send + Sync` and never mutated
//! after `ModelBuilder::build`.

pub mod builder;
pub mod location;
pub mod symbols;
pub mod types;

pub use builder::ModelBuilder;
pub use location::Location;
pub use symbols::{
    AssignmentSource, ConstructorAssignment, MethodData, SymbolData, SymbolKind,
};
pub use types::{
    Annotation, Origin, SpecialType, TypeData, TypeKind, TypeParameterInfo, TypeParameterOwner,
};

use lasso::{RodeoReader, Spur};

use crate::types::{FxHashMap, SymbolId, TypeId};

/// Immutable arena of types and symbols with interned names.
#[derive(Debug)]
pub struct TypeModel {
    interner: RodeoReader,
    types: Vec<TypeData>,
    symbols: Vec<SymbolData>,
    by_name: FxHashMap<Spur, TypeId>,
}

impl TypeModel {
    pub fn ty(&self, id: TypeId) -> &TypeData {
        &self.types[id.index()]
    }

    pub fn symbol(&self, id: SymbolId) -> &SymbolData {
        &self.symbols[id.index()]
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    pub fn type_name(&self, id: TypeId) -> &str {
        self.interner.resolve(&self.ty(id).name)
    }

    pub fn symbol_name(&self, id: SymbolId) -> &str {
        self.interner.resolve(&self.symbol(id).name)
    }

    /// Resolve a fully qualified metadata name (e.g.
    /// `System.Collections.Generic.Dictionary`2`) to a declared type.
    /// Instantiations, arrays, and type parameters are never found by name.
    pub fn resolve_type_by_name(&self, name: &str) -> Option<TypeId> {
        let spur = self.interner.get(name)?;
        self.by_name.get(&spur).copied()
    }

    pub fn is_type_parameter(&self, id: TypeId) -> bool {
        self.ty(id).is_type_parameter()
    }

    /// The unbound generic definition of an instantiation, or the type itself.
    pub fn original_definition(&self, id: TypeId) -> TypeId {
        self.ty(id).definition.unwrap_or(id)
    }

    pub fn type_arguments(&self, id: TypeId) -> &[TypeId] {
        &self.ty(id).type_arguments
    }

    /// Annotations of a type. Instantiations report their definition's.
    pub fn type_annotations(&self, id: TypeId) -> &[Annotation] {
        &self.ty(self.original_definition(id)).annotations
    }

    pub fn symbol_annotations(&self, id: SymbolId) -> &[Annotation] {
        &self.symbol(id).annotations
    }

    /// `T` for `Nullable<T>`, `None` for anything else.
    pub fn nullable_underlying(&self, id: TypeId) -> Option<TypeId> {
        let data = self.ty(id);
        match (data.kind, data.definition) {
            (TypeKind::Special(SpecialType::Nullable), Some(_)) => {
                data.type_arguments.first().copied()
            }
            _ => None,
        }
    }

    /// Members declared directly on the type (its definition's for
    /// instantiations).
    pub fn declared_members(&self, id: TypeId) -> &[SymbolId] {
        &self.ty(self.original_definition(id)).members
    }

    pub fn constructors(&self, id: TypeId) -> &[SymbolId] {
        &self.ty(self.original_definition(id)).constructors
    }

    pub fn primary_parameters(&self, id: TypeId) -> &[SymbolId] {
        &self.ty(self.original_definition(id)).primary_parameters
    }

    pub fn method(&self, id: SymbolId) -> Option<&MethodData> {
        self.symbol(id).method.as_ref()
    }

    /// Direct base type and interfaces of a type's definition.
    pub fn supertypes(&self, id: TypeId) -> impl Iterator<Item = TypeId> + '_ {
        let data = self.ty(self.original_definition(id));
        data.base_type.into_iter().chain(data.interfaces.iter().copied())
    }

    pub fn type_location(&self, id: TypeId) -> Option<&Location> {
        self.ty(id).location.as_ref()
    }

    pub fn symbol_location(&self, id: SymbolId) -> Option<&Location> {
        self.symbol(id).location.as_ref()
    }

    /// Type declarations under analysis: source definitions that are not
    /// instantiations, arrays, or type parameters.
    pub fn source_types(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.types.iter().enumerate().filter_map(|(i, data)| {
            let declared = data.origin == Origin::Source
                && data.definition.is_none()
                && !matches!(data.kind, TypeKind::Array | TypeKind::TypeParameter);
            declared.then(|| TypeId::new(i))
        })
    }

    /// Methods (constructors included) declared on source types.
    pub fn source_methods(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.symbols.iter().enumerate().filter_map(|(i, data)| {
            let in_source = data.kind == SymbolKind::Method
                && data
                    .containing_type
                    .is_some_and(|t| self.ty(t).origin == Origin::Source);
            in_source.then(|| SymbolId::new(i))
        })
    }
}
