//! Top-level serguard configuration with layered resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{AllowListConfig, AnalysisConfig, AnnotationConfig};
use crate::errors::ConfigError;

/// Project config file name, looked up in the project root.
pub const PROJECT_CONFIG_FILE: &str = "serguard.toml";

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. CLI flags (applied via `apply_cli_overrides`)
/// 2. Environment variables (`SERGUARD_*`)
/// 3. Project config (`serguard.toml` in project root)
/// 4. User config (`~/.serguard/config.toml`)
/// 5. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct SerguardConfig {
    pub annotations: AnnotationConfig,
    pub allow_list: AllowListConfig,
    pub analysis: AnalysisConfig,
}

/// CLI override arguments that can be applied to a config.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub allow_list_resource: Option<String>,
    pub parallel: Option<bool>,
    pub memoize_predicates: Option<bool>,
}

impl SerguardConfig {
    /// Load configuration with layered resolution rooted at `root`.
    pub fn load(root: &Path, cli_overrides: Option<&CliOverrides>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Lowest priority: user config. Only parse failures are fatal here.
        if let Some(user_config_path) = user_config_path() {
            if user_config_path.exists() {
                match Self::merge_toml_file(&mut config, &user_config_path) {
                    Ok(()) => {}
                    Err(e @ ConfigError::ParseError { .. }) => return Err(e),
                    Err(e) => {
                        tracing::warn!(error = %e, "ignoring unreadable user config");
                    }
                }
            }
        }

        let project_config_path = root.join(PROJECT_CONFIG_FILE);
        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, &project_config_path)?;
        }

        Self::apply_env_overrides(&mut config);

        if let Some(cli) = cli_overrides {
            Self::apply_cli_overrides(&mut config, cli);
        }

        Self::validate(&config)?;
        tracing::debug!(root = %root.display(), "configuration resolved");
        Ok(config)
    }

    /// Load configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate the configuration values.
    pub fn validate(config: &SerguardConfig) -> Result<(), ConfigError> {
        for (field, value) in config.annotations.named_fields() {
            if let Some(name) = value {
                if name.trim().is_empty() {
                    return Err(ConfigError::ValidationFailed {
                        field: field.to_string(),
                        message: "must not be empty".to_string(),
                    });
                }
            }
        }
        if let Some(ref name) = config.allow_list.resource_name {
            if name.trim().is_empty() {
                return Err(ConfigError::ValidationFailed {
                    field: "allow_list.resource_name".to_string(),
                    message: "must not be empty".to_string(),
                });
            }
        }
        if config.analysis.cache_capacity == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "analysis.cache_capacity".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    /// Merge a TOML file into the existing config.
    /// Unknown keys are ignored.
    fn merge_toml_file(config: &mut SerguardConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let file_config: SerguardConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`; `other` wins only where it has a value.
    fn merge(base: &mut SerguardConfig, other: &SerguardConfig) {
        let annotations = &other.annotations;
        if annotations.requires_deserializable.is_some() {
            base.annotations.requires_deserializable = annotations.requires_deserializable.clone();
        }
        if annotations.requires_pinned.is_some() {
            base.annotations.requires_pinned = annotations.requires_pinned.clone();
        }
        if annotations.certifies_structural.is_some() {
            base.annotations.certifies_structural = annotations.certifies_structural.clone();
        }
        if annotations.certifies_custom.is_some() {
            base.annotations.certifies_custom = annotations.certifies_custom.clone();
        }
        if annotations.ignore.is_some() {
            base.annotations.ignore = annotations.ignore.clone();
        }

        if other.allow_list.resource_name.is_some() {
            base.allow_list.resource_name = other.allow_list.resource_name.clone();
        }
        if !other.allow_list.extra_types.is_empty() {
            base.allow_list.extra_types = other.allow_list.extra_types.clone();
        }

        if other.analysis.parallel.is_some() {
            base.analysis.parallel = other.analysis.parallel;
        }
        if other.analysis.memoize_predicates.is_some() {
            base.analysis.memoize_predicates = other.analysis.memoize_predicates;
        }
        if other.analysis.cache_capacity.is_some() {
            base.analysis.cache_capacity = other.analysis.cache_capacity;
        }
    }

    /// Apply environment variable overrides.
    /// Pattern: `SERGUARD_ALLOW_LIST_RESOURCE`, `SERGUARD_ANALYSIS_PARALLEL`, etc.
    fn apply_env_overrides(config: &mut SerguardConfig) {
        if let Ok(val) = std::env::var("SERGUARD_ALLOW_LIST_RESOURCE") {
            config.allow_list.resource_name = Some(val);
        }
        if let Ok(val) = std::env::var("SERGUARD_ANALYSIS_PARALLEL") {
            if let Ok(v) = val.parse::<bool>() {
                config.analysis.parallel = Some(v);
            }
        }
        if let Ok(val) = std::env::var("SERGUARD_ANALYSIS_MEMOIZE") {
            if let Ok(v) = val.parse::<bool>() {
                config.analysis.memoize_predicates = Some(v);
            }
        }
        if let Ok(val) = std::env::var("SERGUARD_ANALYSIS_CACHE_CAPACITY") {
            if let Ok(v) = val.parse::<u64>() {
                config.analysis.cache_capacity = Some(v);
            }
        }
    }

    /// Apply CLI overrides (highest priority).
    fn apply_cli_overrides(config: &mut SerguardConfig, cli: &CliOverrides) {
        if let Some(ref v) = cli.allow_list_resource {
            config.allow_list.resource_name = Some(v.clone());
        }
        if let Some(v) = cli.parallel {
            config.analysis.parallel = Some(v);
        }
        if let Some(v) = cli.memoize_predicates {
            config.analysis.memoize_predicates = Some(v);
        }
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}

/// Returns the user config path: `~/.serguard/config.toml`.
fn user_config_path() -> Option<PathBuf> {
    home_dir().map(|h| h.join(".serguard").join("config.toml"))
}

/// Cross-platform home directory resolution.
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}
