//! Root-member recursion.
//!
//! A structurally certified type hands its members to the deserializer, so
//! each member's type must be deserializable at every level.

pub mod checker;
pub mod constructor_exemption;

pub use checker::{check_root_type, RootChecker};
pub use constructor_exemption::is_constructor_exempt;
