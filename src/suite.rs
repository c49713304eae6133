//! Check discovery and reporting for a set of candidate estimators.
//!
//! [`CheckSuite`] expands every registered candidate into one case per API
//! check, runs each case on a freshly built candidate, and collects the
//! outcomes in a [`SuiteReport`].
//!
//! # Examples
//!
//! ```
//! use estimator_checks::minimal::EstimatorWithFit;
//! use estimator_checks::suite::CheckSuite;
//!
//! let report = CheckSuite::new()
//!     .with_estimator(|| Box::new(EstimatorWithFit::default()))
//!     .run();
//!
//! assert_eq!(report.len(), 6);
//! assert!(report.all_passed(), "{}", report.summary());
//! ```

use crate::checks::{self, CheckFn};
use crate::config::CheckConfig;
use crate::error::{Result, ViolationKind};
use crate::estimator::{estimator_repr, Estimator};
use serde::Serialize;
use std::fmt;

/// The API checks, in the order they are run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EstimatorCheck {
    /// Cloning yields the same type
    Clone,
    /// Constructor parameter hygiene
    ParameterInit,
    /// Retrieval consistency
    GetParams,
    /// Mutation contract
    SetParams,
    /// Identity-preserving round trip
    RoundTripGetSetParams,
    /// Training entry point
    Fit,
}

impl EstimatorCheck {
    /// Every check, in order.
    pub const ALL: [EstimatorCheck; 6] = [
        EstimatorCheck::Clone,
        EstimatorCheck::ParameterInit,
        EstimatorCheck::GetParams,
        EstimatorCheck::SetParams,
        EstimatorCheck::RoundTripGetSetParams,
        EstimatorCheck::Fit,
    ];

    /// Stable check name.
    pub fn name(self) -> &'static str {
        match self {
            EstimatorCheck::Clone => "check_clone",
            EstimatorCheck::ParameterInit => "check_parameter_init",
            EstimatorCheck::GetParams => "check_get_params",
            EstimatorCheck::SetParams => "check_set_params",
            EstimatorCheck::RoundTripGetSetParams => "check_round_trip_get_set_params",
            EstimatorCheck::Fit => "check_fit",
        }
    }

    /// Look a check up by its name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|check| check.name() == name)
    }

    /// Run the check on `estimator`.
    pub fn run(self, name: &str, estimator: &mut dyn Estimator, config: &CheckConfig) -> Result<()> {
        tracing::debug!(estimator = name, check = self.name(), "running check");
        let outcome = match self {
            EstimatorCheck::SetParams => checks::check_set_params_with(name, estimator, config),
            other => (other.function())(name, estimator),
        };
        match &outcome {
            Ok(()) => tracing::debug!(estimator = name, check = self.name(), "check passed"),
            Err(err) => tracing::warn!(
                estimator = name,
                check = self.name(),
                kind = %err.kind(),
                "check failed"
            ),
        }
        outcome
    }

    fn function(self) -> CheckFn {
        match self {
            EstimatorCheck::Clone => checks::check_clone,
            EstimatorCheck::ParameterInit => checks::check_parameter_init,
            EstimatorCheck::GetParams => checks::check_get_params,
            EstimatorCheck::SetParams => checks::check_set_params,
            EstimatorCheck::RoundTripGetSetParams => checks::check_round_trip_get_set_params,
            EstimatorCheck::Fit => checks::check_fit,
        }
    }
}

impl fmt::Display for EstimatorCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for EstimatorCheck {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// The API checks every candidate goes through, in order.
///
/// Checks a class cannot pass are marked through its `xfail_checks`
/// rather than left out.
pub fn api_checks() -> impl Iterator<Item = EstimatorCheck> {
    EstimatorCheck::ALL.into_iter()
}

/// Outcome of one (candidate, check) case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    /// Check passed
    Passed,
    /// Check failed
    Failed,
    /// Check failed and the class marks it as expected to fail
    ExpectedFailure,
    /// Check passed although the class marks it as expected to fail
    UnexpectedPass,
    /// Check was not run
    Skipped,
}

impl CaseStatus {
    /// Whether the case counts as a pass.
    pub fn is_passed(self) -> bool {
        matches!(self, CaseStatus::Passed | CaseStatus::ExpectedFailure)
    }

    /// Whether the case counts as a failure.
    pub fn is_failed(self) -> bool {
        matches!(self, CaseStatus::Failed | CaseStatus::UnexpectedPass)
    }

    /// Single character marker.
    pub fn icon(self) -> &'static str {
        match self {
            CaseStatus::Passed => "✓",
            CaseStatus::Failed => "✗",
            CaseStatus::ExpectedFailure => "x",
            CaseStatus::UnexpectedPass => "X",
            CaseStatus::Skipped => "s",
        }
    }
}

/// Result of one case.
#[derive(Debug, Clone, Serialize)]
pub struct CaseResult {
    id: String,
    estimator: String,
    check: EstimatorCheck,
    status: CaseStatus,
    kind: Option<ViolationKind>,
    message: Option<String>,
}

impl CaseResult {
    /// `"<estimator repr>-<check name>"`.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name of the candidate.
    pub fn estimator(&self) -> &str {
        &self.estimator
    }

    /// The check that was run.
    pub fn check(&self) -> EstimatorCheck {
        self.check
    }

    /// Outcome.
    pub fn status(&self) -> CaseStatus {
        self.status
    }

    /// Category of the violation, when the check failed.
    pub fn kind(&self) -> Option<ViolationKind> {
        self.kind
    }

    /// Diagnostic, or the expected-failure / skip reason.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

/// One (candidate, check) pair before it runs.
#[derive(Debug, Clone)]
pub struct CheckCase {
    /// `"<estimator repr>-<check name>"`
    pub id: String,
    /// Display name of the candidate
    pub estimator: String,
    /// Check to run
    pub check: EstimatorCheck,
    /// Reason the class expects this check to fail
    pub xfail: Option<&'static str>,
    index: usize,
}

type Supplier = Box<dyn Fn() -> Box<dyn Estimator>>;

/// A set of candidates to certify.
pub struct CheckSuite {
    suppliers: Vec<Supplier>,
    config: CheckConfig,
}

impl Default for CheckSuite {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CheckSuite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckSuite")
            .field("estimators", &self.suppliers.len())
            .field("config", &self.config)
            .finish()
    }
}

impl CheckSuite {
    /// Empty suite with the default configuration.
    pub fn new() -> Self {
        Self {
            suppliers: Vec::new(),
            config: CheckConfig::default(),
        }
    }

    /// Register a candidate. `supplier` is called once per case so every
    /// check gets a fresh object.
    pub fn with_estimator<F>(mut self, supplier: F) -> Self
    where
        F: Fn() -> Box<dyn Estimator> + 'static,
    {
        self.suppliers.push(Box::new(supplier));
        self
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: CheckConfig) -> Self {
        self.config = config;
        self
    }

    /// The configuration in use.
    pub fn config(&self) -> &CheckConfig {
        &self.config
    }

    /// Expand the (candidate, check) cross product.
    pub fn cases(&self) -> Vec<CheckCase> {
        let mut cases = Vec::new();
        for (index, supplier) in self.suppliers.iter().enumerate() {
            let estimator = supplier();
            let class = estimator.class();
            let repr = estimator_repr(estimator.as_ref());
            for check in api_checks() {
                cases.push(CheckCase {
                    id: format!("{repr}-{}", check.name()),
                    estimator: class.name.to_string(),
                    check,
                    xfail: class.xfail_reason(check.name()),
                    index,
                });
            }
        }
        cases
    }

    /// Run every case.
    ///
    /// With `stop_on_failure`, the cases of a candidate following its first
    /// failure are skipped.
    pub fn run(&self) -> SuiteReport {
        let mut report = SuiteReport::default();
        let mut failed_candidate: Option<usize> = None;

        for case in self.cases() {
            let skip_reason = if self.config.is_skipped(case.check.name()) {
                Some("skipped by configuration".to_string())
            } else if self.config.stop_on_failure && failed_candidate == Some(case.index) {
                Some("skipped after an earlier failure".to_string())
            } else {
                None
            };
            if let Some(reason) = skip_reason {
                report.add_result(CaseResult {
                    id: case.id,
                    estimator: case.estimator,
                    check: case.check,
                    status: CaseStatus::Skipped,
                    kind: None,
                    message: Some(reason),
                });
                continue;
            }

            let index = case.index;
            let mut estimator = (self.suppliers[index])();
            let outcome = case.check.run(&case.estimator, estimator.as_mut(), &self.config);
            let result = classify(case, outcome);
            if result.status.is_failed() {
                failed_candidate = Some(index);
            }
            report.add_result(result);
        }

        tracing::info!(
            passed = report.passed_count(),
            failed = report.failed_count(),
            skipped = report.skipped_count(),
            "estimator checks finished"
        );
        report
    }
}

fn classify(case: CheckCase, outcome: Result<()>) -> CaseResult {
    let (status, kind, message) = match (outcome, case.xfail) {
        (Ok(()), None) => (CaseStatus::Passed, None, None),
        (Ok(()), Some(reason)) => (
            CaseStatus::UnexpectedPass,
            None,
            Some(format!("expected to fail: {reason}")),
        ),
        (Err(err), None) => (CaseStatus::Failed, Some(err.kind()), Some(err.to_string())),
        (Err(err), Some(reason)) => (
            CaseStatus::ExpectedFailure,
            Some(err.kind()),
            Some(format!("{reason}: {}", err.message())),
        ),
    };
    CaseResult {
        id: case.id,
        estimator: case.estimator,
        check: case.check,
        status,
        kind,
        message,
    }
}

/// Ordered outcomes of a suite run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SuiteReport {
    results: Vec<CaseResult>,
}

impl SuiteReport {
    /// Append a result.
    pub fn add_result(&mut self, result: CaseResult) {
        self.results.push(result);
    }

    /// All results, in run order.
    pub fn results(&self) -> &[CaseResult] {
        &self.results
    }

    /// Number of cases.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether no case was run.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Result of a case by id.
    pub fn get(&self, id: &str) -> Option<&CaseResult> {
        self.results.iter().find(|r| r.id == id)
    }

    /// No failure and at least one pass.
    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|r| !r.status.is_failed())
            && self.results.iter().any(|r| r.status.is_passed())
    }

    /// The first failing case.
    pub fn first_failure(&self) -> Option<&CaseResult> {
        self.results.iter().find(|r| r.status.is_failed())
    }

    /// Count of passed cases, expected failures included.
    pub fn passed_count(&self) -> usize {
        self.count(CaseStatus::is_passed)
    }

    /// Count of failed cases, unexpected passes included.
    pub fn failed_count(&self) -> usize {
        self.count(CaseStatus::is_failed)
    }

    /// Count of skipped cases.
    pub fn skipped_count(&self) -> usize {
        self.count(|s| s == CaseStatus::Skipped)
    }

    fn count(&self, predicate: impl Fn(CaseStatus) -> bool) -> usize {
        self.results.iter().filter(|r| predicate(r.status)).count()
    }

    /// One-line summary.
    pub fn summary(&self) -> String {
        let total = self.results.len();
        let passed = self.passed_count();
        let failed = self.failed_count();
        let skipped = self.skipped_count();
        if self.all_passed() {
            format!("✓ All {passed} checks passed (skipped: {skipped})")
        } else {
            format!("✗ {failed}/{total} checks failed (passed: {passed}, skipped: {skipped})")
        }
    }

    /// Serialize the report.
    ///
    /// # Errors
    ///
    /// Propagates serialization failures from `serde_json`.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for SuiteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for result in &self.results {
            writeln!(f, "{} {}", result.status.icon(), result.id)?;
        }
        f.write_str(&self.summary())
    }
}
