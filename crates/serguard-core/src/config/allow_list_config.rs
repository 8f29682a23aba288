//! Allow-list configuration.

use serde::{Deserialize, Serialize};

pub const DEFAULT_RESOURCE_NAME: &str = "DeserializationAllowList.txt";

/// Where the legacy allow list comes from.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct AllowListConfig {
    /// Name of the additional text resource holding one fully qualified
    /// type name per line. Default: `DeserializationAllowList.txt`.
    pub resource_name: Option<String>,
    /// Extra type names appended to the resource's entries.
    #[serde(default)]
    pub extra_types: Vec<String>,
}

impl AllowListConfig {
    pub fn effective_resource_name(&self) -> &str {
        self.resource_name.as_deref().unwrap_or(DEFAULT_RESOURCE_NAME)
    }
}
