//! Validation sites: one requirement checked at one location.

use serguard_core::model::Location;
use serguard_core::{SymbolId, TypeId, TypeModel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SiteKind {
    Invocation,
    ObjectCreation,
    MemberAssignment,
}

/// How the value flowing into the marked position was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgumentOrigin {
    /// An explicit or inferred generic argument.
    TypeArgument,
    /// A reference to a parameter, field, property, or local.
    Declaration(SymbolId),
    /// A freshly constructed value; its type's declaration defines it.
    Value,
    /// `typeof(X)`: `X` itself is the type under test.
    TypeOf,
    /// Nothing could be resolved about the argument.
    Opaque,
}

/// Generic parameters in scope at a site: those of the enclosing method
/// and those of its containing type. A requirement that lands on one of
/// these is the enclosing declaration's to state, not the call's to fix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteContext {
    pub method_type_parameters: Vec<TypeId>,
    pub containing_type_parameters: Vec<TypeId>,
}

impl SiteContext {
    pub fn new(method_type_parameters: Vec<TypeId>, containing_type_parameters: Vec<TypeId>) -> Self {
        Self {
            method_type_parameters,
            containing_type_parameters,
        }
    }

    /// Context of code inside `method`.
    pub fn for_method(model: &TypeModel, method: SymbolId) -> Self {
        let method_type_parameters = model
            .method(method)
            .map(|m| m.type_parameters.clone())
            .unwrap_or_default();
        let containing_type_parameters = model
            .symbol(method)
            .containing_type
            .map(|t| {
                model
                    .type_arguments(t)
                    .iter()
                    .copied()
                    .filter(|a| model.is_type_parameter(*a))
                    .collect()
            })
            .unwrap_or_default();
        Self {
            method_type_parameters,
            containing_type_parameters,
        }
    }

    pub fn contains(&self, ty: TypeId) -> bool {
        self.method_type_parameters.contains(&ty) || self.containing_type_parameters.contains(&ty)
    }
}

/// A unit of work for the propagation engine.
#[derive(Debug, Clone, Copy)]
pub struct ValidationSite<'a> {
    pub location: &'a Location,
    pub kind: SiteKind,
    /// Type that must be deserializable. `None` when the argument's type
    /// could not be resolved at all.
    pub required: Option<TypeId>,
    pub origin: ArgumentOrigin,
    /// Static type of the argument expression, when known.
    pub argument_type: Option<TypeId>,
    pub context: &'a SiteContext,
}
