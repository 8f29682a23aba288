//! Dense index types for the type model arenas.
//!
//! Each ID wraps a `u32` index into one arena so a `TypeId` cannot be
//! used where a `SymbolId` is expected.

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u32);

        impl $name {
            /// Create a new ID from an arena index.
            pub fn new(index: usize) -> Self {
                Self(index as u32)
            }

            /// Arena index of this ID.
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}#{}", stringify!($name), self.0)
            }
        }
    };
}

define_id!(
    /// Handle to a type in a `TypeModel`.
    TypeId
);

define_id!(
    /// Handle to a method, parameter, field, property, or local.
    SymbolId
);
