//! Findings: what the checks report and where.

use serde::{Deserialize, Serialize};
use serguard_core::model::Location;

/// The two remedies a finding can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FindingKind {
    /// A type flowing into a deserializable position is not certified.
    /// Fix: certify the type, or pass something else.
    MissingCertification,
    /// A declaration forwards a requirement it does not state.
    /// Fix: annotate the declaration.
    MissingAnnotation,
}

/// Individual checks, each with a stable identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rule {
    /// Uncertified type passed at a call, construction, or assignment.
    UnsafeArgument,
    /// Argument is a declaration whose type is not deserializable.
    UnannotatedDeclaration,
    /// Caller's own type parameter flows into a marked position.
    UnannotatedTypeParameter,
    /// Implementation states a requirement its contract does not.
    ContractMissingAnnotation,
    /// Root certification inherited but not redeclared.
    InheritedCertification,
    /// Member of a root-serializable type is not deserializable.
    UnsafeRootMember,
}

impl Rule {
    pub fn id(&self) -> &'static str {
        match self {
            Self::UnsafeArgument => "SG1001",
            Self::UnannotatedDeclaration => "SG1002",
            Self::UnannotatedTypeParameter => "SG1003",
            Self::ContractMissingAnnotation => "SG1004",
            Self::InheritedCertification => "SG2001",
            Self::UnsafeRootMember => "SG2002",
        }
    }

    pub fn kind(&self) -> FindingKind {
        match self {
            Self::UnsafeArgument | Self::InheritedCertification | Self::UnsafeRootMember => {
                FindingKind::MissingCertification
            }
            Self::UnannotatedDeclaration
            | Self::UnannotatedTypeParameter
            | Self::ContractMissingAnnotation => FindingKind::MissingAnnotation,
        }
    }
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Finding {
    pub rule: Rule,
    pub kind: FindingKind,
    /// Where the fix goes. `None` only when the target is external metadata
    /// without a source position.
    pub location: Option<Location>,
    /// Name of the reported declaration or type.
    pub subject: String,
    /// The type that failed the check, when different from the subject.
    pub offending_type: Option<String>,
    /// Offending member of a root-serializable type.
    pub member: Option<String>,
}

impl Finding {
    pub fn new(rule: Rule, location: Option<Location>, subject: impl Into<String>) -> Self {
        Self {
            rule,
            kind: rule.kind(),
            location,
            subject: subject.into(),
            offending_type: None,
            member: None,
        }
    }

    pub fn with_offending_type(mut self, ty: impl Into<String>) -> Self {
        self.offending_type = Some(ty.into());
        self
    }

    pub fn with_member(mut self, member: impl Into<String>) -> Self {
        self.member = Some(member.into());
        self
    }

    /// One-line description for logs and plain-text output.
    pub fn message(&self) -> String {
        let offending = self.offending_type.as_deref().unwrap_or(&self.subject);
        match self.rule {
            Rule::UnsafeArgument => {
                format!("'{}' is not certified as deserializable", offending)
            }
            Rule::UnannotatedDeclaration => format!(
                "'{}' holds '{}', which is not deserializable; annotate the declaration",
                self.subject, offending
            ),
            Rule::UnannotatedTypeParameter => format!(
                "type parameter '{}' flows into a deserializable position; annotate it",
                self.subject
            ),
            Rule::ContractMissingAnnotation => format!(
                "'{}' is required deserializable by an implementation but not by its contract",
                self.subject
            ),
            Rule::InheritedCertification => format!(
                "'{}' inherits a structural certification and must declare it itself",
                self.subject
            ),
            Rule::UnsafeRootMember => format!(
                "member '{}' of '{}' has type '{}', which is not deserializable",
                self.member.as_deref().unwrap_or("?"),
                self.subject,
                offending
            ),
        }
    }

    /// Ordering key: position first, then rule and subject. The remaining
    /// fields break ties so equal findings end up adjacent.
    pub(crate) fn sort_key(&self) -> (Option<&Location>, Rule, &str, Option<&str>, Option<&str>) {
        (
            self.location.as_ref(),
            self.rule,
            self.subject.as_str(),
            self.offending_type.as_deref(),
            self.member.as_deref(),
        )
    }
}

impl std::fmt::Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.location {
            Some(loc) => write!(f, "{}: {} {}", loc, self.rule, self.message()),
            None => write!(f, "{} {}", self.rule, self.message()),
        }
    }
}
