//! Contract consistency of marked method declarations.
//!
//! A caller bound to a contract only sees the contract's annotations, so an
//! override or implementation may not demand deserializability where its
//! contract does not.

use serguard_core::model::{Location, Origin};
use serguard_core::{SymbolId, TypeId, TypeModel};

use crate::findings::{Finding, Rule};
use crate::policy::DeserializabilityPolicy;

/// Check one method against every contract it overrides or implements.
pub fn check_method_declaration(
    model: &TypeModel,
    policy: &DeserializabilityPolicy,
    method: SymbolId,
) -> Vec<Finding> {
    let Some(data) = model.method(method) else {
        return Vec::new();
    };
    let mut findings = Vec::new();

    for contract in data.contracts() {
        let Some(contract_data) = model.method(contract) else {
            continue;
        };
        let contract_in_source = declared_in_source(model, contract);

        for (param, counterpart) in data.parameters.iter().zip(&contract_data.parameters) {
            if !policy.requires_deserializable(model.symbol_annotations(*param))
                || policy.requires_deserializable(model.symbol_annotations(*counterpart))
            {
                continue;
            }
            let location = if contract_in_source {
                model.symbol_location(*counterpart)
            } else {
                model.symbol_location(*param)
            };
            findings.push(contract_finding(
                location,
                model.symbol_name(*counterpart),
                model.symbol_name(contract),
            ));
        }

        for (param, counterpart) in data.type_parameters.iter().zip(&contract_data.type_parameters) {
            if !marked_type(model, policy, *param) || marked_type(model, policy, *counterpart) {
                continue;
            }
            let location = if contract_in_source {
                model.type_location(*counterpart)
            } else {
                model.type_location(*param)
            };
            findings.push(contract_finding(
                location,
                model.type_name(*counterpart),
                model.symbol_name(contract),
            ));
        }
    }

    if !findings.is_empty() {
        tracing::debug!(
            method = model.symbol_name(method),
            findings = findings.len(),
            "contract annotations missing"
        );
    }
    findings
}

fn marked_type(model: &TypeModel, policy: &DeserializabilityPolicy, ty: TypeId) -> bool {
    policy.requires_deserializable(model.type_annotations(ty))
}

fn declared_in_source(model: &TypeModel, symbol: SymbolId) -> bool {
    model
        .symbol(symbol)
        .containing_type
        .is_some_and(|t| model.ty(t).origin == Origin::Source)
}

fn contract_finding(location: Option<&Location>, subject: &str, contract: &str) -> Finding {
    Finding::new(Rule::ContractMissingAnnotation, location.cloned(), subject).with_member(contract)
}
