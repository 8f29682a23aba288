//! Unit driver: runs every check of one analysis unit and collects a report.

use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;
use serguard_core::config::AnalysisConfig;
use serguard_core::errors::{AnalysisError, ReportError};
use serguard_core::traits::Cancellable;
use serguard_core::{SerguardConfig, SymbolId, TypeId, TypeModel};

use crate::allow_list::AllowListResolver;
use crate::findings::{Finding, FindingKind};
use crate::policy::{build_policy, DeserializabilityPolicy};
use crate::predicates::{Predicates, VerdictCache};
use crate::propagation::{check_method_declaration, Operation, PropagationEngine};
use crate::root::RootChecker;

/// A text resource shipped alongside the unit's sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdditionalText {
    pub path: String,
    pub content: String,
}

impl AdditionalText {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Last path component, for either separator.
    pub fn file_name(&self) -> &str {
        self.path.rsplit(['/', '\\']).next().unwrap_or(&self.path)
    }
}

/// Everything a host hands over for one compilation.
#[derive(Debug)]
pub struct AnalysisUnit {
    pub name: String,
    pub model: TypeModel,
    pub resources: Vec<AdditionalText>,
    pub operations: Vec<Operation>,
}

impl AnalysisUnit {
    pub fn new(name: impl Into<String>, model: TypeModel) -> Self {
        Self {
            name: name.into(),
            model,
            resources: Vec::new(),
            operations: Vec::new(),
        }
    }

    pub fn with_resource(mut self, resource: AdditionalText) -> Self {
        self.resources.push(resource);
        self
    }

    pub fn with_operation(mut self, operation: impl Into<Operation>) -> Self {
        self.operations.push(operation.into());
        self
    }
}

/// Result of analyzing one unit. Findings are sorted by location, then rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UnitReport {
    pub unit: String,
    pub findings: Vec<Finding>,
    pub sites_checked: usize,
    pub methods_checked: usize,
    pub types_checked: usize,
    pub duration_ms: u64,
}

impl UnitReport {
    pub fn count(&self, kind: FindingKind) -> usize {
        self.findings.iter().filter(|f| f.kind == kind).count()
    }

    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[derive(Clone, Copy)]
enum Work<'u> {
    Operation(&'u Operation),
    Method(SymbolId),
    Root(TypeId),
}

/// Per-unit analysis state: the policy, allow list, and verdict cache are
/// resolved once and shared by every check.
pub struct UnitAnalyzer<'u> {
    unit: &'u AnalysisUnit,
    config: AnalysisConfig,
    policy: Option<DeserializabilityPolicy>,
    allow_list: AllowListResolver,
    cache: Option<VerdictCache>,
}

impl<'u> UnitAnalyzer<'u> {
    pub fn new(unit: &'u AnalysisUnit, config: &SerguardConfig) -> Self {
        let policy = build_policy(&unit.model, &config.annotations);
        let cache = config.analysis.effective_memoize_predicates().then(|| {
            VerdictCache::builder()
                .max_capacity(config.analysis.effective_cache_capacity())
                .build()
        });
        Self {
            unit,
            config: config.analysis.clone(),
            policy,
            allow_list: AllowListResolver::new(config.allow_list.clone()),
            cache,
        }
    }

    pub fn policy(&self) -> Option<&DeserializabilityPolicy> {
        self.policy.as_ref()
    }

    /// Predicates for this unit, or `None` when the policy is inert.
    pub fn predicates(&self) -> Option<Predicates<'_>> {
        let policy = self.policy.as_ref()?;
        let allow_list = self.allow_list.get(&self.unit.model, &self.unit.resources);
        let predicates = Predicates::new(&self.unit.model, policy, allow_list);
        Some(match &self.cache {
            Some(cache) => predicates.with_cache(cache),
            None => predicates,
        })
    }

    pub fn check_operation(&self, operation: &Operation) -> Vec<Finding> {
        self.predicates()
            .map(|p| PropagationEngine::new(p).check_operation(operation))
            .unwrap_or_default()
    }

    pub fn check_method_declaration(&self, method: SymbolId) -> Vec<Finding> {
        self.policy
            .as_ref()
            .map(|policy| check_method_declaration(&self.unit.model, policy, method))
            .unwrap_or_default()
    }

    pub fn check_root_type(&self, ty: TypeId) -> Vec<Finding> {
        self.predicates()
            .map(|p| RootChecker::new(p).check(ty))
            .unwrap_or_default()
    }

    /// Run all checks of the unit. Cancellation is observed between checks;
    /// a cancelled run yields no partial report.
    pub fn analyze<C: Cancellable + Sync>(&self, token: &C) -> Result<UnitReport, AnalysisError> {
        let start = Instant::now();
        let mut report = UnitReport {
            unit: self.unit.name.clone(),
            ..UnitReport::default()
        };
        let Some(predicates) = self.predicates() else {
            tracing::info!(unit = %self.unit.name, "policy inert; unit skipped");
            return Ok(report);
        };
        let model = &self.unit.model;

        let mut work: Vec<Work<'_>> = self.unit.operations.iter().map(Work::Operation).collect();
        work.extend(model.source_methods().map(Work::Method));
        work.extend(model.source_types().map(Work::Root));

        report.sites_checked = self
            .unit
            .operations
            .iter()
            .map(|op| op.sites(model, predicates.policy()).len())
            .sum();
        report.methods_checked = work.iter().filter(|w| matches!(w, Work::Method(_))).count();
        report.types_checked = work.iter().filter(|w| matches!(w, Work::Root(_))).count();

        let run = |w: &Work<'_>| -> Option<Vec<Finding>> {
            if token.is_cancelled() {
                return None;
            }
            Some(match *w {
                Work::Operation(op) => PropagationEngine::new(predicates).check_operation(op),
                Work::Method(method) => check_method_declaration(model, predicates.policy(), method),
                Work::Root(ty) => RootChecker::new(predicates).check(ty),
            })
        };
        let results: Option<Vec<Vec<Finding>>> = if self.config.effective_parallel() {
            work.par_iter().map(run).collect()
        } else {
            work.iter().map(run).collect()
        };
        let Some(results) = results else {
            tracing::warn!(unit = %self.unit.name, "analysis cancelled");
            return Err(AnalysisError::Cancelled);
        };

        let mut findings: Vec<Finding> = results.into_iter().flatten().collect();
        findings.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        // Several sites can redirect to the same declaration.
        findings.dedup();
        report.findings = findings;
        report.duration_ms = start.elapsed().as_millis() as u64;

        tracing::info!(
            unit = %report.unit,
            findings = report.findings.len(),
            sites = report.sites_checked,
            types = report.types_checked,
            duration_ms = report.duration_ms,
            "unit analyzed"
        );
        Ok(report)
    }
}
