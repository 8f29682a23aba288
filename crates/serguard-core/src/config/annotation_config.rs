//! Annotation name configuration.

use serde::{Deserialize, Serialize};

pub const DEFAULT_REQUIRES_DESERIALIZABLE: &str =
    "Serguard.Annotations.RequiresDeserializableAttribute";
pub const DEFAULT_REQUIRES_PINNED: &str = "Serguard.Annotations.RequiresPinnedAttribute";
pub const DEFAULT_CERTIFIES_STRUCTURAL: &str = "Serguard.Annotations.DeserializableAttribute";
pub const DEFAULT_CERTIFIES_CUSTOM: &str = "Serguard.Annotations.CustomDeserializerAttribute";
pub const DEFAULT_IGNORE: &str = "Serguard.Annotations.DeserializationIgnoreAttribute";

/// Fully qualified names of the annotation types the policy resolves.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct AnnotationConfig {
    /// Marker placed on parameters and type parameters.
    pub requires_deserializable: Option<String>,
    /// Stricter sibling of the marker.
    pub requires_pinned: Option<String>,
    /// Structural (reflection-based) certifying annotation. Also marks root types.
    pub certifies_structural: Option<String>,
    /// Custom-serializer certifying annotation.
    pub certifies_custom: Option<String>,
    /// Excludes a member from root-member checks.
    pub ignore: Option<String>,
}

impl AnnotationConfig {
    pub fn effective_requires_deserializable(&self) -> &str {
        self.requires_deserializable
            .as_deref()
            .unwrap_or(DEFAULT_REQUIRES_DESERIALIZABLE)
    }

    pub fn effective_requires_pinned(&self) -> &str {
        self.requires_pinned.as_deref().unwrap_or(DEFAULT_REQUIRES_PINNED)
    }

    pub fn effective_certifies_structural(&self) -> &str {
        self.certifies_structural
            .as_deref()
            .unwrap_or(DEFAULT_CERTIFIES_STRUCTURAL)
    }

    pub fn effective_certifies_custom(&self) -> &str {
        self.certifies_custom.as_deref().unwrap_or(DEFAULT_CERTIFIES_CUSTOM)
    }

    pub fn effective_ignore(&self) -> &str {
        self.ignore.as_deref().unwrap_or(DEFAULT_IGNORE)
    }

    /// All configured names paired with their config field, for validation.
    pub(crate) fn named_fields(&self) -> [(&'static str, &Option<String>); 5] {
        [
            ("annotations.requires_deserializable", &self.requires_deserializable),
            ("annotations.requires_pinned", &self.requires_pinned),
            ("annotations.certifies_structural", &self.certifies_structural),
            ("annotations.certifies_custom", &self.certifies_custom),
            ("annotations.ignore", &self.ignore),
        ]
    }
}
