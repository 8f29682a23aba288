//! Configuration system for serguard.
//! TOML-based, layered resolution: CLI > env > project > user > defaults.

pub mod allow_list_config;
pub mod analysis_config;
pub mod annotation_config;
pub mod serguard_config;

pub use allow_list_config::AllowListConfig;
pub use analysis_config::AnalysisConfig;
pub use annotation_config::AnnotationConfig;
pub use serguard_config::{CliOverrides, SerguardConfig};
