//! Allow list: legacy types exempted from carrying a certifying annotation.
//!
//! The list is an additional text resource of the unit, one fully qualified
//! type name per line. An entry naming an unbound generic definition
//! (`System.Collections.Generic.Dictionary`2`) exempts every instantiation
//! of it; the instantiation's arguments are still checked on their own.

use std::sync::OnceLock;

use serguard_core::config::AllowListConfig;
use serguard_core::types::FxHashSet;
use serguard_core::{TypeId, TypeModel};

use crate::unit::AdditionalText;

/// Resolved allow-list entries of one unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowList {
    entries: FxHashSet<TypeId>,
}

impl AllowList {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Resolve every non-empty line against the model. Lines that do not
    /// name a known type are dropped.
    pub fn parse(model: &TypeModel, text: &str) -> Self {
        Self::from_names(model, text.lines())
    }

    pub fn from_names<'a>(model: &TypeModel, names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut entries = FxHashSet::default();
        let mut dropped = 0usize;
        for line in names {
            let name = line.trim();
            if name.is_empty() {
                continue;
            }
            match model.resolve_type_by_name(name) {
                Some(ty) => {
                    entries.insert(ty);
                }
                None => {
                    dropped += 1;
                    tracing::debug!(entry = name, "allow-list entry does not resolve; dropped");
                }
            }
        }
        tracing::debug!(entries = entries.len(), dropped, "allow list resolved");
        Self { entries }
    }

    /// Whether `ty` or its unbound definition is listed.
    pub fn contains(&self, model: &TypeModel, ty: TypeId) -> bool {
        self.entries.contains(&ty) || self.entries.contains(&model.original_definition(ty))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builds a unit's allow list on first use and hands out the same list
/// afterwards. Concurrent first uses race to a single initialization.
#[derive(Debug)]
pub struct AllowListResolver {
    config: AllowListConfig,
    resolved: OnceLock<AllowList>,
}

impl AllowListResolver {
    pub fn new(config: AllowListConfig) -> Self {
        Self {
            config,
            resolved: OnceLock::new(),
        }
    }

    /// A resolver whose list is already known.
    pub fn preloaded(list: AllowList) -> Self {
        let resolved = OnceLock::new();
        let _ = resolved.set(list);
        Self {
            config: AllowListConfig::default(),
            resolved,
        }
    }

    pub fn get(&self, model: &TypeModel, resources: &[AdditionalText]) -> &AllowList {
        self.resolved.get_or_init(|| self.resolve(model, resources))
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved.get().is_some()
    }

    fn resolve(&self, model: &TypeModel, resources: &[AdditionalText]) -> AllowList {
        let resource_name = self.config.effective_resource_name();
        let resource = resources.iter().find(|r| r.file_name() == resource_name);
        if resource.is_none() {
            tracing::debug!(resource = resource_name, "allow-list resource not present");
        }
        let lines = resource
            .map(|r| r.content.lines())
            .into_iter()
            .flatten()
            .chain(self.config.extra_types.iter().map(String::as_str));
        AllowList::from_names(model, lines)
    }
}
