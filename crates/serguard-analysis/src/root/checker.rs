//! Member recursion for root-serializable types.

use std::collections::VecDeque;

use serguard_core::model::{Origin, SymbolKind};
use serguard_core::types::FxHashSet;
use serguard_core::{SymbolId, TypeId};

use crate::findings::{Finding, Rule};
use crate::predicates::Predicates;

use super::constructor_exemption::is_constructor_exempt;

/// Walks the members of structurally certified source types.
#[derive(Clone, Copy)]
pub struct RootChecker<'a> {
    predicates: Predicates<'a>,
}

impl<'a> RootChecker<'a> {
    pub fn new(predicates: Predicates<'a>) -> Self {
        Self { predicates }
    }

    pub fn check(&self, ty: TypeId) -> Vec<Finding> {
        let model = self.predicates.model();
        let policy = self.predicates.policy();
        let data = model.ty(ty);
        if data.origin != Origin::Source || data.definition.is_some() {
            return Vec::new();
        }

        if !policy.is_root_serializable(&data.annotations) {
            if self.inherits_certification(ty) {
                return vec![Finding::new(
                    Rule::InheritedCertification,
                    data.location.clone(),
                    model.type_name(ty),
                )];
            }
            return Vec::new();
        }

        let own_marked: Vec<TypeId> = model
            .type_arguments(ty)
            .iter()
            .copied()
            .filter(|p| self.predicates.is_marked_type_parameter(*p))
            .collect();

        let mut findings = Vec::new();
        for member in self.serialized_members(ty) {
            let Some(member_type) = model.symbol(member).ty else {
                continue;
            };
            if own_marked.contains(&member_type) {
                continue;
            }
            let Some(offending) = self.predicates.first_unsafe(member_type) else {
                continue;
            };
            if is_constructor_exempt(&self.predicates, ty, member) {
                tracing::trace!(
                    member = model.symbol_name(member),
                    "read-only member exempted by its constructors"
                );
                continue;
            }
            findings.push(
                Finding::new(Rule::UnsafeRootMember, model.symbol(member).location.clone(), model.type_name(ty))
                    .with_member(model.symbol_name(member))
                    .with_offending_type(model.type_name(offending)),
            );
        }
        findings
    }

    /// Non-static, non-ignored properties plus primary parameters that no
    /// property of the same name shadows.
    fn serialized_members(&self, ty: TypeId) -> Vec<SymbolId> {
        let model = self.predicates.model();
        let policy = self.predicates.policy();

        let properties: Vec<SymbolId> = model
            .declared_members(ty)
            .iter()
            .copied()
            .filter(|m| {
                let data = model.symbol(*m);
                data.kind == SymbolKind::Property && !data.is_static && !policy.is_ignored(&data.annotations)
            })
            .collect();

        let primary: Vec<SymbolId> = model
            .primary_parameters(ty)
            .iter()
            .copied()
            .filter(|p| {
                let name = model.symbol_name(*p);
                !properties.iter().any(|prop| model.symbol_name(*prop) == name)
                    && !policy.is_ignored(model.symbol_annotations(*p))
            })
            .collect();

        let mut members = properties;
        members.extend(primary);
        members
    }

    /// Whether a base type or interface, transitively, is structurally
    /// certified.
    fn inherits_certification(&self, ty: TypeId) -> bool {
        let model = self.predicates.model();
        let policy = self.predicates.policy();
        let mut queue: VecDeque<TypeId> = model.supertypes(ty).collect();
        let mut visited = FxHashSet::default();
        visited.insert(ty);

        while let Some(current) = queue.pop_front() {
            if !visited.insert(current) {
                continue;
            }
            if policy.is_root_serializable(model.type_annotations(current)) {
                return true;
            }
            queue.extend(model.supertypes(current));
        }
        false
    }
}

/// Check one type declaration with a fresh checker.
pub fn check_root_type(predicates: Predicates<'_>, ty: TypeId) -> Vec<Finding> {
    RootChecker::new(predicates).check(ty)
}
