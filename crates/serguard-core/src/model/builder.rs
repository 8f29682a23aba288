//! Incremental construction of a `TypeModel`.
//!
//! Instantiations and arrays are interned: asking for `List<Foo>` twice
//! yields the same `TypeId`, so type equality stays identity equality.
//! Element types and annotations of a definition should be declared before
//! it is instantiated; instantiations snapshot the definition's element.

use lasso::{Rodeo, Spur};

use crate::errors::ModelError;
use crate::types::collections::SmallVec2;
use crate::types::{FxHashMap, SymbolId, TypeId};

use super::{
    Annotation, AssignmentSource, ConstructorAssignment, Location, MethodData, Origin,
    SpecialType, SymbolData, SymbolKind, TypeData, TypeKind, TypeModel, TypeParameterInfo,
    TypeParameterOwner,
};

#[derive(Debug, Default)]
pub struct ModelBuilder {
    interner: Rodeo,
    types: Vec<TypeData>,
    symbols: Vec<SymbolData>,
    by_name: FxHashMap<Spur, TypeId>,
    instantiations: FxHashMap<(TypeId, SmallVec2<TypeId>), TypeId>,
    arrays: FxHashMap<TypeId, TypeId>,
}

impl ModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a named, non-generic type.
    pub fn declare_type(
        &mut self,
        name: &str,
        kind: TypeKind,
        origin: Origin,
    ) -> Result<TypeId, ModelError> {
        let spur = self.interner.get_or_intern(name);
        if self.by_name.contains_key(&spur) {
            return Err(ModelError::DuplicateType {
                name: name.to_string(),
            });
        }
        let id = self.push_type(TypeData::new(spur, kind, origin));
        self.by_name.insert(spur, id);
        Ok(id)
    }

    /// Declare a platform special type (always external).
    pub fn declare_special(&mut self, name: &str, special: SpecialType) -> Result<TypeId, ModelError> {
        self.declare_type(name, TypeKind::Special(special), Origin::Metadata)
    }

    /// Declare an unbound generic definition with the given type parameter
    /// names. The parameters become the definition's type arguments.
    pub fn declare_generic_type(
        &mut self,
        name: &str,
        kind: TypeKind,
        origin: Origin,
        parameters: &[&str],
    ) -> Result<TypeId, ModelError> {
        let id = self.declare_type(name, kind, origin)?;
        for (ordinal, param) in parameters.iter().enumerate() {
            let tp = self.new_type_parameter(param, TypeParameterOwner::Type(id), ordinal, origin);
            self.types[id.index()].type_arguments.push(tp);
        }
        Ok(id)
    }

    /// The type parameters of a generic definition, in declaration order.
    pub fn type_parameters(&self, definition: TypeId) -> Vec<TypeId> {
        self.types[definition.index()].type_arguments.to_vec()
    }

    /// Bind a generic definition to concrete arguments.
    pub fn instantiate(
        &mut self,
        definition: TypeId,
        arguments: &[TypeId],
    ) -> Result<TypeId, ModelError> {
        let def = &self.types[definition.index()];
        if def.definition.is_some() || def.type_arguments.is_empty() || def.is_type_parameter() {
            return Err(ModelError::NotGeneric {
                name: self.interner.resolve(&def.name).to_string(),
            });
        }
        if def.type_arguments.len() != arguments.len() {
            return Err(ModelError::ArityMismatch {
                name: self.interner.resolve(&def.name).to_string(),
                expected: def.type_arguments.len(),
                actual: arguments.len(),
            });
        }
        Ok(self.instantiate_unchecked(definition, arguments.iter().copied().collect()))
    }

    /// `element[]`.
    pub fn array_of(&mut self, element: TypeId) -> TypeId {
        if let Some(&existing) = self.arrays.get(&element) {
            return existing;
        }
        let name = format!("{}[]", self.display_name(element));
        let spur = self.interner.get_or_intern(name);
        let mut data = TypeData::new(spur, TypeKind::Array, Origin::Metadata);
        data.element = Some(element);
        let id = self.push_type(data);
        self.arrays.insert(element, id);
        id
    }

    /// Record that values of `ty` enumerate `element`s.
    pub fn set_element_type(&mut self, ty: TypeId, element: TypeId) {
        self.types[ty.index()].element = Some(element);
    }

    pub fn set_base_type(&mut self, ty: TypeId, base: TypeId) {
        self.types[ty.index()].base_type = Some(base);
    }

    pub fn add_interface(&mut self, ty: TypeId, interface: TypeId) {
        self.types[ty.index()].interfaces.push(interface);
    }

    /// Annotate a type declaration or a type parameter.
    pub fn annotate_type(&mut self, ty: TypeId, annotation: Annotation) {
        self.types[ty.index()].annotations.push(annotation);
    }

    pub fn mark_record(&mut self, ty: TypeId) {
        self.types[ty.index()].is_record = true;
    }

    pub fn set_type_location(&mut self, ty: TypeId, location: Location) {
        self.types[ty.index()].location = Some(location);
    }

    pub fn add_field(&mut self, owner: TypeId, name: &str, ty: TypeId) -> SymbolId {
        let id = self.new_member(owner, name, SymbolKind::Field, Some(ty));
        self.types[owner.index()].members.push(id);
        id
    }

    pub fn add_property(&mut self, owner: TypeId, name: &str, ty: TypeId, read_only: bool) -> SymbolId {
        let id = self.new_member(owner, name, SymbolKind::Property, Some(ty));
        self.symbols[id.index()].is_read_only = read_only;
        self.types[owner.index()].members.push(id);
        id
    }

    /// Positional parameter of a record-like declaration.
    pub fn add_primary_parameter(&mut self, owner: TypeId, name: &str, ty: TypeId) -> SymbolId {
        let id = self.new_member(owner, name, SymbolKind::Parameter, Some(ty));
        let ordinal = self.types[owner.index()].primary_parameters.len();
        self.symbols[id.index()].ordinal = ordinal as u32;
        self.types[owner.index()].primary_parameters.push(id);
        id
    }

    pub fn add_method(&mut self, owner: TypeId, name: &str) -> SymbolId {
        let id = self.new_member(owner, name, SymbolKind::Method, None);
        self.symbols[id.index()].method = Some(MethodData::default());
        id
    }

    pub fn add_constructor(&mut self, owner: TypeId) -> SymbolId {
        let id = self.new_member(owner, ".ctor", SymbolKind::Method, None);
        self.symbols[id.index()].method = Some(MethodData {
            is_constructor: true,
            ..MethodData::default()
        });
        self.types[owner.index()].constructors.push(id);
        id
    }

    pub fn add_parameter(&mut self, method: SymbolId, name: &str, ty: TypeId) -> Result<SymbolId, ModelError> {
        let owner = self.symbols[method.index()].containing_type;
        let ordinal = self.method_data_mut(method)?.parameters.len();
        let spur = self.interner.get_or_intern(name);
        let mut data = SymbolData::new(spur, SymbolKind::Parameter, Some(ty));
        data.containing_type = owner;
        data.containing_method = Some(method);
        data.ordinal = ordinal as u32;
        let id = self.push_symbol(data);
        self.method_data_mut(method)?.parameters.push(id);
        Ok(id)
    }

    pub fn add_method_type_parameter(&mut self, method: SymbolId, name: &str) -> Result<TypeId, ModelError> {
        let ordinal = self.method_data_mut(method)?.type_parameters.len();
        let origin = self.symbols[method.index()]
            .containing_type
            .map_or(Origin::Source, |t| self.types[t.index()].origin);
        let tp = self.new_type_parameter(name, TypeParameterOwner::Method(method), ordinal, origin);
        self.method_data_mut(method)?.type_parameters.push(tp);
        Ok(tp)
    }

    pub fn add_local(&mut self, method: SymbolId, name: &str, ty: TypeId) -> Result<SymbolId, ModelError> {
        self.method_data_mut(method)?;
        let spur = self.interner.get_or_intern(name);
        let mut data = SymbolData::new(spur, SymbolKind::Local, Some(ty));
        data.containing_type = self.symbols[method.index()].containing_type;
        data.containing_method = Some(method);
        Ok(self.push_symbol(data))
    }

    pub fn annotate_symbol(&mut self, symbol: SymbolId, annotation: Annotation) {
        self.symbols[symbol.index()].annotations.push(annotation);
    }

    pub fn set_symbol_location(&mut self, symbol: SymbolId, location: Location) {
        self.symbols[symbol.index()].location = Some(location);
    }

    pub fn set_static(&mut self, symbol: SymbolId, is_static: bool) {
        self.symbols[symbol.index()].is_static = is_static;
    }

    pub fn set_overridden(&mut self, method: SymbolId, base: SymbolId) -> Result<(), ModelError> {
        self.method_data_mut(base)?;
        self.method_data_mut(method)?.overridden = Some(base);
        Ok(())
    }

    pub fn add_implemented(&mut self, method: SymbolId, contract: SymbolId) -> Result<(), ModelError> {
        self.method_data_mut(contract)?;
        self.method_data_mut(method)?.implemented.push(contract);
        Ok(())
    }

    /// Record `member = source` inside a constructor body.
    pub fn add_constructor_assignment(
        &mut self,
        constructor: SymbolId,
        member: SymbolId,
        source: AssignmentSource,
    ) -> Result<(), ModelError> {
        if !self.method_data_mut(constructor)?.is_constructor {
            return Err(ModelError::WrongSymbolKind {
                name: self.interner.resolve(&self.symbols[constructor.index()].name).to_string(),
                expected: "constructor",
            });
        }
        self.method_data_mut(constructor)?
            .assignments
            .push(ConstructorAssignment { member, source });
        Ok(())
    }

    /// Freeze the builder into an immutable, shareable model.
    pub fn build(self) -> TypeModel {
        tracing::debug!(
            types = self.types.len(),
            symbols = self.symbols.len(),
            "type model built"
        );
        TypeModel {
            interner: self.interner.into_reader(),
            types: self.types,
            symbols: self.symbols,
            by_name: self.by_name,
        }
    }

    fn push_type(&mut self, data: TypeData) -> TypeId {
        let id = TypeId::new(self.types.len());
        self.types.push(data);
        id
    }

    fn push_symbol(&mut self, data: SymbolData) -> SymbolId {
        let id = SymbolId::new(self.symbols.len());
        self.symbols.push(data);
        id
    }

    fn new_type_parameter(
        &mut self,
        name: &str,
        owner: TypeParameterOwner,
        ordinal: usize,
        origin: Origin,
    ) -> TypeId {
        let spur = self.interner.get_or_intern(name);
        let mut data = TypeData::new(spur, TypeKind::TypeParameter, origin);
        data.type_parameter = Some(TypeParameterInfo {
            owner,
            ordinal: ordinal as u32,
        });
        self.push_type(data)
    }

    fn new_member(&mut self, owner: TypeId, name: &str, kind: SymbolKind, ty: Option<TypeId>) -> SymbolId {
        let spur = self.interner.get_or_intern(name);
        let mut data = SymbolData::new(spur, kind, ty);
        data.containing_type = Some(owner);
        self.push_symbol(data)
    }

    fn method_data_mut(&mut self, method: SymbolId) -> Result<&mut MethodData, ModelError> {
        let data = &mut self.symbols[method.index()];
        match data.method.as_mut() {
            Some(m) => Ok(m),
            None => Err(ModelError::WrongSymbolKind {
                name: self.interner.resolve(&data.name).to_string(),
                expected: "method",
            }),
        }
    }

    fn instantiate_unchecked(&mut self, definition: TypeId, arguments: SmallVec2<TypeId>) -> TypeId {
        let key = (definition, arguments.clone());
        if let Some(&existing) = self.instantiations.get(&key) {
            return existing;
        }

        let def = &self.types[definition.index()];
        let (kind, origin) = (def.kind, def.origin);
        let parameters = def.type_arguments.clone();
        let element = def.element;

        let base = display_base(self.interner.resolve(&def.name)).to_string();
        let args: Vec<String> = arguments.iter().map(|a| self.display_name(*a)).collect();
        let spur = self.interner.get_or_intern(format!("{}<{}>", base, args.join(", ")));

        let mut data = TypeData::new(spur, kind, origin);
        data.definition = Some(definition);
        data.type_arguments = arguments.clone();
        let id = self.push_type(data);
        self.instantiations.insert(key, id);

        if let Some(element) = element {
            let bound = self.substitute(element, &parameters, &arguments);
            self.types[id.index()].element = Some(bound);
        }
        id
    }

    /// Replace `parameters` with `arguments` inside `ty`.
    fn substitute(&mut self, ty: TypeId, parameters: &[TypeId], arguments: &[TypeId]) -> TypeId {
        if let Some(pos) = parameters.iter().position(|p| *p == ty) {
            return arguments[pos];
        }
        let data = &self.types[ty.index()];
        let (kind, element, definition) = (data.kind, data.element, data.definition);
        let nested = data.type_arguments.clone();

        if kind == TypeKind::Array {
            return match element {
                Some(element) => {
                    let bound = self.substitute(element, parameters, arguments);
                    self.array_of(bound)
                }
                None => ty,
            };
        }
        match definition {
            Some(definition) => {
                let bound: SmallVec2<TypeId> = nested
                    .iter()
                    .map(|a| self.substitute(*a, parameters, arguments))
                    .collect();
                self.instantiate_unchecked(definition, bound)
            }
            None => ty,
        }
    }

    fn display_name(&self, ty: TypeId) -> String {
        self.interner.resolve(&self.types[ty.index()].name).to_string()
    }
}

/// `Dictionary`2` → `Dictionary`.
fn display_base(name: &str) -> &str {
    match name.rfind('`') {
        Some(pos) => &name[..pos],
        None => name,
    }
}
