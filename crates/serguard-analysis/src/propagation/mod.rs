//! Propagation of deserializability requirements from marked positions to
//! the code that feeds them.
//!
//! - `operations`: maps invocations, object creations, and member writes to
//!   validation sites
//! - `engine`: breadth-first check of one site
//! - `declarations`: overrides and implementations against their contracts

pub mod declarations;
pub mod engine;
pub mod operations;
pub mod site;

pub use declarations::check_method_declaration;
pub use engine::{check_call_site, PropagationEngine};
pub use operations::{Expression, Invocation, MemberAssignment, ObjectCreation, Operation};
pub use site::{ArgumentOrigin, SiteContext, SiteKind, ValidationSite};
