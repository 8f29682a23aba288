//! Type predicate library: pure questions about one type.
//!
//! - `is_deserializable`: carries a certifying annotation (no recursion).
//! - `is_exempt`: safe without certification, after unwrapping containers.
//! - `is_deserializable_at_all_levels`: the type and every nested type
//!   argument are deserializable or exempt.

use std::collections::VecDeque;

use moka::sync::Cache;
use serguard_core::model::{Origin, TypeKind};
use serguard_core::types::FxHashSet;
use serguard_core::{TypeId, TypeModel};

use crate::allow_list::AllowList;
use crate::policy::DeserializabilityPolicy;

/// Per-unit memo of all-levels verdicts.
pub type VerdictCache = Cache<TypeId, bool>;

/// Predicates bound to one unit's model, policy, and allow list.
#[derive(Clone, Copy)]
pub struct Predicates<'a> {
    model: &'a TypeModel,
    policy: &'a DeserializabilityPolicy,
    allow_list: &'a AllowList,
    cache: Option<&'a VerdictCache>,
}

impl<'a> Predicates<'a> {
    pub fn new(model: &'a TypeModel, policy: &'a DeserializabilityPolicy, allow_list: &'a AllowList) -> Self {
        Self {
            model,
            policy,
            allow_list,
            cache: None,
        }
    }

    pub fn with_cache(mut self, cache: &'a VerdictCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn model(&self) -> &'a TypeModel {
        self.model
    }

    pub fn policy(&self) -> &'a DeserializabilityPolicy {
        self.policy
    }

    /// Whether the type (or its generic definition) carries a certifying
    /// annotation.
    pub fn is_deserializable(&self, ty: TypeId) -> bool {
        self.policy.certification(self.model.type_annotations(ty)).is_some()
    }

    /// Whether a type parameter carries the marker at its declaration.
    pub fn is_marked_type_parameter(&self, ty: TypeId) -> bool {
        self.model.is_type_parameter(ty)
            && self.policy.requires_deserializable(self.model.type_annotations(ty))
    }

    /// Array element, or the element of an enumerable declared outside the
    /// unit. Types under analysis are never treated as transparent
    /// containers.
    pub fn element_type_of(&self, ty: TypeId) -> Option<TypeId> {
        let data = self.model.ty(ty);
        match data.kind {
            TypeKind::Array => data.element,
            TypeKind::Special(_) => None,
            _ if data.origin == Origin::Metadata => data.element,
            _ => None,
        }
    }

    /// Unwrap `ty` through nullable, array, and enumerable layers and report
    /// whether it is safe without certification. Unwrapping stops at the
    /// first allow-listed layer. The unwrapped type is returned either way.
    pub fn is_exempt(&self, ty: TypeId) -> (bool, TypeId) {
        let actual = self.unwrap_containers(ty);
        let exempt = match self.model.ty(actual).kind {
            TypeKind::Special(special) => special.is_primitive(),
            TypeKind::Enum => true,
            _ => false,
        } || self.allow_list.contains(self.model, actual);
        (exempt, actual)
    }

    pub fn is_deserializable_at_all_levels(&self, ty: TypeId) -> bool {
        if let Some(cache) = self.cache {
            if let Some(verdict) = cache.get(&ty) {
                return verdict;
            }
            let verdict = self.first_unsafe(ty).is_none();
            cache.insert(ty, verdict);
            return verdict;
        }
        self.first_unsafe(ty).is_none()
    }

    /// First type reachable from `ty` that is neither exempt nor certified,
    /// in breadth-first order. Type parameters pass only when marked.
    pub fn first_unsafe(&self, ty: TypeId) -> Option<TypeId> {
        let mut queue = VecDeque::from([ty]);
        let mut visited = FxHashSet::default();

        while let Some(current) = queue.pop_front() {
            if !visited.insert(current) {
                continue;
            }
            if self.model.is_type_parameter(current) {
                if !self.is_marked_type_parameter(current) {
                    return Some(current);
                }
                continue;
            }

            let (exempt, actual) = self.is_exempt(current);
            if !exempt {
                if actual != current {
                    // The container itself is transparent; its element
                    // answers for it.
                    queue.push_back(actual);
                } else if !self.is_deserializable(current) {
                    return Some(current);
                }
            }
            queue.extend(self.model.type_arguments(current).iter().copied());
        }
        None
    }

    fn unwrap_containers(&self, ty: TypeId) -> TypeId {
        let mut actual = ty;
        let mut seen = FxHashSet::default();
        while seen.insert(actual) {
            if self.allow_list.contains(self.model, actual) {
                break;
            }
            let next = self
                .model
                .nullable_underlying(actual)
                .or_else(|| self.element_type_of(actual));
            match next {
                Some(inner) => actual = inner,
                None => break,
            }
        }
        actual
    }
}

pub fn is_deserializable(model: &TypeModel, policy: &DeserializabilityPolicy, ty: TypeId) -> bool {
    policy.certification(model.type_annotations(ty)).is_some()
}

/// One-shot all-levels check without a verdict cache.
pub fn is_deserializable_at_all_levels(
    model: &TypeModel,
    policy: &DeserializabilityPolicy,
    ty: TypeId,
    allow_list: &AllowList,
) -> bool {
    Predicates::new(model, policy, allow_list).is_deserializable_at_all_levels(ty)
}
