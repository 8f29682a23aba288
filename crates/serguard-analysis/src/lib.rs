//! serguard-analysis: deserializability checks over a host type model.
//!
//! Requirements are stated with a marker annotation on parameters and type
//! parameters; types satisfy them by carrying a certifying annotation, by
//! being exempt, or by appearing on the unit's allow list. The crate
//! propagates requirements to call sites and walks the members of
//! root-serializable types.

pub mod allow_list;
pub mod findings;
pub mod policy;
pub mod predicates;
pub mod propagation;
pub mod root;
pub mod unit;

pub use allow_list::{AllowList, AllowListResolver};
pub use findings::{Finding, FindingKind, Rule};
pub use policy::{build_policy, AnnotationKind, CertificationVariant, DeserializabilityPolicy};
pub use predicates::{is_deserializable, is_deserializable_at_all_levels, Predicates};
pub use propagation::{check_call_site, check_method_declaration, Operation, PropagationEngine};
pub use root::{check_root_type, RootChecker};
pub use unit::{AdditionalText, AnalysisUnit, UnitAnalyzer, UnitReport};
