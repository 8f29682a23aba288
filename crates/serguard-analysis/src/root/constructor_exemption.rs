//! Read-only members whose constructors prove them safe.
//!
//! A read-only member cannot be written by the deserializer after
//! construction, so when every constructor assigns it, and only from parameters
//! that are themselves marked or deserializable at all levels, the member's
//! declared type does not matter.

use serguard_core::model::AssignmentSource;
use serguard_core::{SymbolId, TypeId};

use crate::predicates::Predicates;

pub fn is_constructor_exempt(predicates: &Predicates<'_>, owner: TypeId, member: SymbolId) -> bool {
    let model = predicates.model();
    let policy = predicates.policy();
    if !model.symbol(member).is_read_only {
        return false;
    }
    let constructors = model.constructors(owner);
    if constructors.is_empty() {
        return false;
    }

    constructors.iter().all(|ctor| {
        let Some(data) = model.method(*ctor) else {
            return false;
        };
        let mut assignments = data.assignments.iter().filter(|a| a.member == member).peekable();
        assignments.peek().is_some()
            && assignments.all(|a| match a.source {
                AssignmentSource::Parameter(param) => {
                    policy.requires_deserializable(model.symbol_annotations(param))
                        || model
                            .symbol(param)
                            .ty
                            .is_some_and(|ty| predicates.is_deserializable_at_all_levels(ty))
                }
                AssignmentSource::Other => false,
            })
    })
}
