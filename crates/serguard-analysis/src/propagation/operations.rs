//! Host operations and their mapping to validation sites.
//!
//! Three operation shapes carry deserializability requirements:
//! invocations (marked parameters and type parameters), object creation
//! (marked type parameters of the constructed type, marked constructor
//! parameters), and member writes (member typed as a marked type parameter
//! of its containing type).

use serguard_core::model::{Location, TypeParameterOwner};
use serguard_core::{SymbolId, TypeId, TypeModel};

use crate::policy::DeserializabilityPolicy;

use super::site::{ArgumentOrigin, SiteContext, SiteKind, ValidationSite};

/// An argument expression, reduced to what the engine needs to know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Expression {
    /// Reference to a parameter, field, property, or local.
    Reference(SymbolId),
    /// `typeof(X)`.
    TypeOf(TypeId),
    /// Object creation, literal, or anonymous object of the given type.
    Construction(TypeId),
    /// Anything the host could not resolve to a declaration; the static
    /// type is attached when known.
    Opaque(Option<TypeId>),
}

impl Expression {
    /// `(required, origin, argument_type)` for this expression.
    fn resolve(&self, model: &TypeModel) -> (Option<TypeId>, ArgumentOrigin, Option<TypeId>) {
        match *self {
            Self::Reference(symbol) => match model.symbol(symbol).ty {
                Some(ty) => (Some(ty), ArgumentOrigin::Declaration(symbol), Some(ty)),
                None => (None, ArgumentOrigin::Opaque, None),
            },
            Self::TypeOf(ty) => (Some(ty), ArgumentOrigin::TypeOf, Some(ty)),
            Self::Construction(ty) => (Some(ty), ArgumentOrigin::Value, Some(ty)),
            Self::Opaque(ty) => (ty, ArgumentOrigin::Opaque, ty),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub location: Location,
    pub method: SymbolId,
    /// Instantiated type of the receiver, for calls through a generic type.
    pub receiver_type: Option<TypeId>,
    /// Explicit or inferred method type arguments.
    pub type_arguments: Vec<TypeId>,
    pub arguments: Vec<Expression>,
    pub context: SiteContext,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectCreation {
    pub location: Location,
    pub constructed: TypeId,
    pub constructor: Option<SymbolId>,
    pub arguments: Vec<Expression>,
    pub context: SiteContext,
}

/// A property or field write: `receiver.member = value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberAssignment {
    pub location: Location,
    pub member: SymbolId,
    pub value: Expression,
    pub context: SiteContext,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Invocation(Invocation),
    ObjectCreation(ObjectCreation),
    MemberAssignment(MemberAssignment),
}

impl Operation {
    pub fn location(&self) -> &Location {
        match self {
            Self::Invocation(op) => &op.location,
            Self::ObjectCreation(op) => &op.location,
            Self::MemberAssignment(op) => &op.location,
        }
    }

    /// All validation sites this operation gives rise to.
    pub fn sites<'a>(&'a self, model: &TypeModel, policy: &DeserializabilityPolicy) -> Vec<ValidationSite<'a>> {
        match self {
            Self::Invocation(op) => invocation_sites(model, policy, op),
            Self::ObjectCreation(op) => creation_sites(model, policy, op),
            Self::MemberAssignment(op) => assignment_sites(model, policy, op),
        }
    }
}

impl From<Invocation> for Operation {
    fn from(op: Invocation) -> Self {
        Self::Invocation(op)
    }
}

impl From<ObjectCreation> for Operation {
    fn from(op: ObjectCreation) -> Self {
        Self::ObjectCreation(op)
    }
}

impl From<MemberAssignment> for Operation {
    fn from(op: MemberAssignment) -> Self {
        Self::MemberAssignment(op)
    }
}

pub fn invocation_sites<'a>(
    model: &TypeModel,
    policy: &DeserializabilityPolicy,
    op: &'a Invocation,
) -> Vec<ValidationSite<'a>> {
    let mut sites = Vec::new();
    let Some(method) = model.method(op.method) else {
        return sites;
    };

    for (ordinal, param) in method.type_parameters.iter().enumerate() {
        if !policy.requires_deserializable(model.type_annotations(*param)) {
            continue;
        }
        match op.type_arguments.get(ordinal) {
            Some(&argument) => sites.push(type_argument_site(op, SiteKind::Invocation, argument)),
            None => tracing::debug!(
                method = model.symbol_name(op.method),
                ordinal,
                "marked type parameter without a type argument"
            ),
        }
    }

    if let Some(receiver) = op.receiver_type {
        for argument in marked_type_arguments(model, policy, receiver) {
            sites.push(type_argument_site(op, SiteKind::Invocation, argument));
        }
    }

    parameter_sites(
        model,
        policy,
        &method.parameters,
        &op.arguments,
        &op.location,
        &op.context,
        SiteKind::Invocation,
        &mut sites,
    );
    sites
}

pub fn creation_sites<'a>(
    model: &TypeModel,
    policy: &DeserializabilityPolicy,
    op: &'a ObjectCreation,
) -> Vec<ValidationSite<'a>> {
    let mut sites: Vec<ValidationSite<'a>> = marked_type_arguments(model, policy, op.constructed)
        .into_iter()
        .map(|argument| ValidationSite {
            location: &op.location,
            kind: SiteKind::ObjectCreation,
            required: Some(argument),
            origin: ArgumentOrigin::TypeArgument,
            argument_type: Some(argument),
            context: &op.context,
        })
        .collect();

    if let Some(method) = op.constructor.and_then(|c| model.method(c)) {
        parameter_sites(
            model,
            policy,
            &method.parameters,
            &op.arguments,
            &op.location,
            &op.context,
            SiteKind::ObjectCreation,
            &mut sites,
        );
    }
    sites
}

pub fn assignment_sites<'a>(
    model: &TypeModel,
    policy: &DeserializabilityPolicy,
    op: &'a MemberAssignment,
) -> Vec<ValidationSite<'a>> {
    let member = model.symbol(op.member);
    let Some(member_type) = member.ty else {
        return Vec::new();
    };
    let owned_by_container = model
        .ty(member_type)
        .type_parameter
        .is_some_and(|info| Some(info.owner) == member.containing_type.map(TypeParameterOwner::Type));
    if !owned_by_container || !policy.requires_deserializable(model.type_annotations(member_type)) {
        return Vec::new();
    }

    vec![expression_site(
        model,
        &op.value,
        &op.location,
        &op.context,
        SiteKind::MemberAssignment,
    )]
}

/// Arguments of `ty` bound to marked type parameters of its definition.
fn marked_type_arguments(model: &TypeModel, policy: &DeserializabilityPolicy, ty: TypeId) -> Vec<TypeId> {
    let definition = model.original_definition(ty);
    if definition == ty {
        return Vec::new();
    }
    model
        .type_arguments(definition)
        .iter()
        .zip(model.type_arguments(ty))
        .filter(|(param, _)| policy.requires_deserializable(model.type_annotations(**param)))
        .map(|(_, argument)| *argument)
        .collect()
}

fn type_argument_site(op: &Invocation, kind: SiteKind, argument: TypeId) -> ValidationSite<'_> {
    ValidationSite {
        location: &op.location,
        kind,
        required: Some(argument),
        origin: ArgumentOrigin::TypeArgument,
        argument_type: Some(argument),
        context: &op.context,
    }
}

#[allow(clippy::too_many_arguments)]
fn parameter_sites<'a>(
    model: &TypeModel,
    policy: &DeserializabilityPolicy,
    parameters: &[SymbolId],
    arguments: &'a [Expression],
    location: &'a Location,
    context: &'a SiteContext,
    kind: SiteKind,
    sites: &mut Vec<ValidationSite<'a>>,
) {
    for (param, argument) in parameters.iter().zip(arguments) {
        if policy.requires_deserializable(model.symbol_annotations(*param)) {
            sites.push(expression_site(model, argument, location, context, kind));
        }
    }
}

fn expression_site<'a>(
    model: &TypeModel,
    expression: &Expression,
    location: &'a Location,
    context: &'a SiteContext,
    kind: SiteKind,
) -> ValidationSite<'a> {
    let (required, origin, argument_type) = expression.resolve(model);
    ValidationSite {
        location,
        kind,
        required,
        origin,
        argument_type,
        context,
    }
}
