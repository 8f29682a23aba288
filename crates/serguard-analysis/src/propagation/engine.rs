//! Breadth-first propagation of one deserializability requirement.

use std::collections::VecDeque;

use serguard_core::types::FxHashSet;
use serguard_core::TypeId;

use crate::findings::{Finding, Rule};
use crate::predicates::Predicates;

use super::operations::Operation;
use super::site::{ArgumentOrigin, ValidationSite};

/// Decides, per validation site, whether the requirement holds and where an
/// unmet requirement has to be reported.
#[derive(Clone, Copy)]
pub struct PropagationEngine<'a> {
    predicates: Predicates<'a>,
}

impl<'a> PropagationEngine<'a> {
    pub fn new(predicates: Predicates<'a>) -> Self {
        Self { predicates }
    }

    pub fn predicates(&self) -> &Predicates<'a> {
        &self.predicates
    }

    /// Check every site of a host operation.
    pub fn check_operation(&self, operation: &Operation) -> Vec<Finding> {
        let sites = operation.sites(self.predicates.model(), self.predicates.policy());
        sites.iter().flat_map(|site| self.check_site(site)).collect()
    }

    /// Check one site. Produces at most one finding for unsafe concrete
    /// types, plus one per unannotated generic parameter of the caller.
    pub fn check_site(&self, site: &ValidationSite<'_>) -> Vec<Finding> {
        let model = self.predicates.model();
        let policy = self.predicates.policy();

        // A marked declaration forwards the requirement to its own callers.
        if let ArgumentOrigin::Declaration(symbol) = site.origin {
            if policy.requires_deserializable(model.symbol_annotations(symbol)) {
                return Vec::new();
            }
        }
        if site
            .argument_type
            .is_some_and(|ty| self.predicates.is_deserializable_at_all_levels(ty))
        {
            return Vec::new();
        }

        let Some(required) = site.required else {
            tracing::trace!(location = %site.location, "opaque argument without a type");
            return vec![Finding::new(
                Rule::UnsafeArgument,
                Some(site.location.clone()),
                "<unresolved>",
            )];
        };
        // An ambient type parameter is the enclosing declaration's to
        // annotate, whatever expression carries it.
        if site.origin == ArgumentOrigin::Opaque && !model.is_type_parameter(required) {
            return vec![Finding::new(
                Rule::UnsafeArgument,
                Some(site.location.clone()),
                model.type_name(required),
            )];
        }

        let mut findings = Vec::new();
        let mut queue = VecDeque::from([required]);
        let mut visited = FxHashSet::default();
        let mut unsafe_argument = false;
        let mut flagged_parameter = false;

        while let Some(current) = queue.pop_front() {
            if !visited.insert(current) {
                continue;
            }

            if model.is_type_parameter(current) {
                if !site.context.contains(current) {
                    tracing::debug!(
                        type_parameter = model.type_name(current),
                        "type parameter outside the caller's scope"
                    );
                    continue;
                }
                if self.predicates.is_marked_type_parameter(current) {
                    continue;
                }
                findings.push(Finding::new(
                    Rule::UnannotatedTypeParameter,
                    model.type_location(current).cloned(),
                    model.type_name(current),
                ));
                if !flagged_parameter {
                    if let Some(finding) = self.unannotated_parameter(site, current) {
                        findings.push(finding);
                        flagged_parameter = true;
                    }
                }
                continue;
            }

            let (exempt, actual) = self.predicates.is_exempt(current);
            if !exempt {
                if actual != current {
                    queue.push_back(actual);
                } else if !self.predicates.is_deserializable(current) && !unsafe_argument {
                    unsafe_argument = true;
                    findings.push(self.unsafe_concrete(site, current));
                }
            }
            queue.extend(model.type_arguments(current).iter().copied());
        }

        findings
    }

    /// The finding for the first unsafe concrete type of a site.
    fn unsafe_concrete(&self, site: &ValidationSite<'_>, ty: TypeId) -> Finding {
        let model = self.predicates.model();
        if let ArgumentOrigin::Declaration(symbol) = site.origin {
            let data = model.symbol(symbol);
            if data.kind.is_bare_declaration() {
                return Finding::new(
                    Rule::UnannotatedDeclaration,
                    data.location.clone(),
                    model.symbol_name(symbol),
                )
                .with_offending_type(model.type_name(ty));
            }
        }
        Finding::new(Rule::UnsafeArgument, Some(site.location.clone()), model.type_name(ty))
    }

    /// The argument's own parameter declaration, when it also lacks the marker.
    fn unannotated_parameter(&self, site: &ValidationSite<'_>, ty: TypeId) -> Option<Finding> {
        let ArgumentOrigin::Declaration(symbol) = site.origin else {
            return None;
        };
        let model = self.predicates.model();
        let data = model.symbol(symbol);
        if data.kind != serguard_core::model::SymbolKind::Parameter {
            return None;
        }
        Some(
            Finding::new(
                Rule::UnannotatedDeclaration,
                data.location.clone(),
                model.symbol_name(symbol),
            )
            .with_offending_type(model.type_name(ty)),
        )
    }
}

/// Check a single site with a fresh engine.
pub fn check_call_site(predicates: Predicates<'_>, site: &ValidationSite<'_>) -> Vec<Finding> {
    PropagationEngine::new(predicates).check_site(site)
}
