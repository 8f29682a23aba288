//! Methods, parameters, fields, properties, and locals.

use lasso::Spur;
use serde::{Deserialize, Serialize};

use crate::types::{SymbolId, TypeId};

use super::{Annotation, Location};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolKind {
    Method,
    Parameter,
    Field,
    Property,
    Local,
}

impl SymbolKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Method => "method",
            Self::Parameter => "parameter",
            Self::Field => "field",
            Self::Property => "property",
            Self::Local => "local",
        }
    }

    /// Declarations whose author can add an annotation in place of
    /// changing the code that uses them.
    pub fn is_bare_declaration(&self) -> bool {
        matches!(self, Self::Parameter | Self::Field | Self::Local)
    }
}

/// Where a constructor takes the value it stores into a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignmentSource {
    /// Straight from one of the constructor's parameters.
    Parameter(SymbolId),
    /// Anything else: a computed value, a call, a literal.
    Other,
}

/// One `member = source` statement in a constructor body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConstructorAssignment {
    pub member: SymbolId,
    pub source: AssignmentSource,
}

#[derive(Debug, Clone, Default)]
pub struct MethodData {
    pub parameters: Vec<SymbolId>,
    pub type_parameters: Vec<TypeId>,
    pub is_constructor: bool,
    pub overridden: Option<SymbolId>,
    pub implemented: Vec<SymbolId>,
    pub assignments: Vec<ConstructorAssignment>,
}

impl MethodData {
    /// Contract methods this method overrides or implements.
    pub fn contracts(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.overridden.into_iter().chain(self.implemented.iter().copied())
    }
}

#[derive(Debug, Clone)]
pub struct SymbolData {
    pub name: Spur,
    pub kind: SymbolKind,
    pub ty: Option<TypeId>,
    pub annotations: Vec<Annotation>,
    pub containing_type: Option<TypeId>,
    pub containing_method: Option<SymbolId>,
    /// Position among the containing method's parameters.
    pub ordinal: u32,
    pub is_static: bool,
    pub is_read_only: bool,
    pub location: Option<Location>,
    pub method: Option<MethodData>,
}

impl SymbolData {
    pub(crate) fn new(name: Spur, kind: SymbolKind, ty: Option<TypeId>) -> Self {
        Self {
            name,
            kind,
            ty,
            annotations: Vec::new(),
            containing_type: None,
            containing_method: None,
            ordinal: 0,
            is_static: false,
            is_read_only: false,
            location: None,
            method: None,
        }
    }
}
