//! Deserializability policy: the resolved annotation handles of one unit.

use serde::{Deserialize, Serialize};
use serguard_core::config::AnnotationConfig;
use serguard_core::model::Annotation;
use serguard_core::types::collections::SmallVec2;
use serguard_core::{TypeId, TypeModel};

/// Which certification mechanism a certifying annotation stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CertificationVariant {
    /// Reflection-based: the deserializer walks the type's members.
    /// Types carrying it are root-serializable.
    Structural,
    /// The type ships its own serializer.
    CustomSerializer,
}

/// Typed classification of an annotation type under a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnnotationKind {
    RequiresDeserializable,
    RequiresPinned,
    Certifies(CertificationVariant),
    Ignore,
}

/// Resolved annotation handles for one analysis unit. Read-only once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeserializabilityPolicy {
    marker: TypeId,
    pinned: Option<TypeId>,
    certifying: SmallVec2<(TypeId, CertificationVariant)>,
    ignore: Option<TypeId>,
}

/// Resolve the policy for a unit, or `None` when the unit cannot be analyzed.
///
/// Without the marker annotation nothing in the unit can state a
/// requirement; without the structural certifying annotation nothing can
/// satisfy one. Either way the unit is skipped, not failed.
pub fn build_policy(model: &TypeModel, names: &AnnotationConfig) -> Option<DeserializabilityPolicy> {
    let Some(marker) = model.resolve_type_by_name(names.effective_requires_deserializable()) else {
        tracing::info!(
            marker = names.effective_requires_deserializable(),
            "marker annotation not referenced; deserializability checks disabled for unit"
        );
        return None;
    };
    let Some(structural) = model.resolve_type_by_name(names.effective_certifies_structural()) else {
        tracing::info!(
            annotation = names.effective_certifies_structural(),
            "structural certifying annotation not resolvable; deserializability checks disabled for unit"
        );
        return None;
    };

    let mut certifying = SmallVec2::new();
    certifying.push((structural, CertificationVariant::Structural));
    if let Some(custom) = model.resolve_type_by_name(names.effective_certifies_custom()) {
        certifying.push((custom, CertificationVariant::CustomSerializer));
    }

    let policy = DeserializabilityPolicy {
        marker,
        pinned: model.resolve_type_by_name(names.effective_requires_pinned()),
        certifying,
        ignore: model.resolve_type_by_name(names.effective_ignore()),
    };
    tracing::debug!(
        certifying = policy.certifying.len(),
        pinned = policy.pinned.is_some(),
        ignore = policy.ignore.is_some(),
        "deserializability policy resolved"
    );
    Some(policy)
}

impl DeserializabilityPolicy {
    pub fn marker(&self) -> TypeId {
        self.marker
    }

    /// Certifying annotations in resolution order, structural first.
    pub fn certifying(&self) -> impl Iterator<Item = (TypeId, CertificationVariant)> + '_ {
        self.certifying.iter().copied()
    }

    pub fn classify(&self, annotation_type: TypeId) -> Option<AnnotationKind> {
        if annotation_type == self.marker {
            return Some(AnnotationKind::RequiresDeserializable);
        }
        if Some(annotation_type) == self.pinned {
            return Some(AnnotationKind::RequiresPinned);
        }
        if Some(annotation_type) == self.ignore {
            return Some(AnnotationKind::Ignore);
        }
        self.certifying
            .iter()
            .find(|(ty, _)| *ty == annotation_type)
            .map(|(_, variant)| AnnotationKind::Certifies(*variant))
    }

    /// Whether the annotations state a deserializability requirement.
    /// The pinned marker is stricter and implies the plain one.
    pub fn requires_deserializable(&self, annotations: &[Annotation]) -> bool {
        annotations.iter().any(|a| {
            matches!(
                self.classify(a.ty),
                Some(AnnotationKind::RequiresDeserializable | AnnotationKind::RequiresPinned)
            )
        })
    }

    pub fn requires_pinned(&self, annotations: &[Annotation]) -> bool {
        annotations
            .iter()
            .any(|a| self.classify(a.ty) == Some(AnnotationKind::RequiresPinned))
    }

    /// First certification found among the annotations, if any.
    pub fn certification(&self, annotations: &[Annotation]) -> Option<CertificationVariant> {
        annotations.iter().find_map(|a| match self.classify(a.ty) {
            Some(AnnotationKind::Certifies(variant)) => Some(variant),
            _ => None,
        })
    }

    pub fn is_root_serializable(&self, annotations: &[Annotation]) -> bool {
        annotations.iter().any(|a| {
            self.classify(a.ty) == Some(AnnotationKind::Certifies(CertificationVariant::Structural))
        })
    }

    pub fn is_ignored(&self, annotations: &[Annotation]) -> bool {
        annotations
            .iter()
            .any(|a| self.classify(a.ty) == Some(AnnotationKind::Ignore))
    }
}
