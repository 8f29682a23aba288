//! serguard-core: type model, configuration, errors, tracing, and shared
//! primitives for the serguard deserialization checker.

pub mod config;
pub mod errors;
pub mod model;
pub mod tracing;
pub mod traits;
pub mod types;

pub use config::SerguardConfig;
pub use model::{ModelBuilder, TypeModel};
pub use types::{SymbolId, TypeId};
