//! Analysis configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the analysis driver.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Check sites on the rayon pool. Default: true.
    pub parallel: Option<bool>,
    /// Memoize the all-levels verdict per type for one unit. Default: true.
    pub memoize_predicates: Option<bool>,
    /// Capacity of the per-unit verdict cache. Default: 10_000.
    pub cache_capacity: Option<u64>,
}

impl AnalysisConfig {
    pub fn effective_parallel(&self) -> bool {
        self.parallel.unwrap_or(true)
    }

    pub fn effective_memoize_predicates(&self) -> bool {
        self.memoize_predicates.unwrap_or(true)
    }

    pub fn effective_cache_capacity(&self) -> u64 {
        self.cache_capacity.unwrap_or(10_000)
    }
}
