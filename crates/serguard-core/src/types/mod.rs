//! Collections and identifiers shared across serguard crates.

pub mod collections;
pub mod identifiers;

pub use collections::{FxHashMap, FxHashSet};
pub use identifiers::{SymbolId, TypeId};
