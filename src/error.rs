//! Error types for estimator API checks.
//!
//! Two families live here:
//!
//! - [`ParamError`]: failures raised *by the candidate* while one of its
//!   operations runs (a missing attribute, an unknown parameter name, a
//!   constructor that rejects its arguments).
//! - [`ContractViolation`]: the verdict of a check. Every violation carries
//!   the estimator name, a self-contained diagnostic and a pointer to the
//!   section of the developer guide that governs the broken rule.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Result type alias for check operations.
pub type Result<T> = std::result::Result<T, ContractViolation>;

/// Error raised by a candidate operation (retrieval, mutation, construction).
///
/// # Examples
///
/// ```
/// use estimator_checks::error::ParamError;
///
/// let err = ParamError::MissingAttribute {
///     class: "Ridge".to_string(),
///     name: "alpha".to_string(),
/// };
/// assert_eq!(err.to_string(), "'Ridge' object has no attribute 'alpha'");
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParamError {
    /// A declared parameter was never stored as an attribute.
    #[error("'{class}' object has no attribute '{name}'")]
    MissingAttribute {
        /// Class of the object
        class: String,
        /// Attribute that was looked up
        name: String,
    },

    /// `set_params` received a name the object does not know.
    #[error("Invalid parameter '{name}' for estimator {class}. Valid parameters are: {valid:?}.")]
    InvalidParameter {
        /// Class of the object
        class: String,
        /// Rejected parameter name
        name: String,
        /// Names accepted by the object
        valid: Vec<String>,
    },

    /// A constructor was called without one of its required arguments.
    #[error("{class}() missing required argument: '{name}'")]
    MissingArgument {
        /// Class being constructed
        class: String,
        /// Argument name
        name: String,
    },

    /// A constructor was called with a keyword it does not declare.
    #[error("{class}() got an unexpected keyword argument '{name}'")]
    UnexpectedArgument {
        /// Class being constructed
        class: String,
        /// Argument name
        name: String,
    },

    /// The class registered no keyword constructor.
    #[error("cannot instantiate {class}: no keyword constructor is registered")]
    NotConstructible {
        /// Class name
        class: String,
    },

    /// A nested estimator was already borrowed while being mutated.
    #[error("nested estimator '{name}' is already borrowed")]
    BorrowConflict {
        /// Parameter path of the nested estimator
        name: String,
    },

    /// Any other value rejected by the candidate.
    #[error("{0}")]
    InvalidValue(String),
}

/// Section of the developer guide that defines a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocSection {
    /// Cloning rules
    Cloning,
    /// Constructor parameter rules
    ParametersInit,
    /// `get_params` / `set_params` rules
    GetSetParams,
    /// `fit` rules
    FitApi,
}

impl DocSection {
    /// Base URL of the developer guide.
    pub const GUIDE_URL: &'static str = "https://scikit-learn.org/dev/developers/develop.html";

    /// Anchor of the section inside the guide.
    pub fn anchor(self) -> &'static str {
        match self {
            DocSection::Cloning => "cloning",
            DocSection::ParametersInit => "parameters_init",
            DocSection::GetSetParams => "get_set_params",
            DocSection::FitApi => "fit_api",
        }
    }

    /// Full link to the section.
    pub fn url(self) -> String {
        format!("{}#{}", Self::GUIDE_URL, self.anchor())
    }
}

/// Category of a contract violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// Retrieval, mutation, training or cloning operation is absent.
    MissingOperation,
    /// Deep-retrieval toggle missing or with a wrong default.
    SignatureViolation,
    /// Stored attributes diverge from the declared parameter names.
    AttributeHygiene,
    /// A parameter default is missing or of a disallowed kind.
    DefaultValueType,
    /// A parameter was copied or altered while being stored.
    MutationOnInit,
    /// An object identity changed where it must be preserved.
    Identity,
    /// Parameter name sets do not match.
    KeySetMismatch,
    /// Cloning produced an object of another concrete type.
    CloneTypeMismatch,
    /// A candidate operation failed while the check was running.
    OperationFailed,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ViolationKind::MissingOperation => "missing operation",
            ViolationKind::SignatureViolation => "signature violation",
            ViolationKind::AttributeHygiene => "attribute hygiene violation",
            ViolationKind::DefaultValueType => "default value type violation",
            ViolationKind::MutationOnInit => "mutation on init",
            ViolationKind::Identity => "identity violation",
            ViolationKind::KeySetMismatch => "key set mismatch",
            ViolationKind::CloneTypeMismatch => "clone type mismatch",
            ViolationKind::OperationFailed => "operation failed",
        };
        f.write_str(label)
    }
}

type BoxedSource = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A broken rule of the estimator API contract.
///
/// The rendered message is meant to be shown as is in a test report.
///
/// # Examples
///
/// ```
/// use estimator_checks::error::{ContractViolation, DocSection, ViolationKind};
///
/// let err = ContractViolation::new(
///     ViolationKind::MissingOperation,
///     "Ridge",
///     DocSection::FitApi,
///     "Estimator Ridge does not implement a `fit` method.",
/// );
/// assert_eq!(err.kind(), ViolationKind::MissingOperation);
/// assert!(err.to_string().contains("develop.html#fit_api"));
/// ```
#[derive(Error, Debug)]
#[error("{message} Refer to the following development guide to implement the expected API: {}", .section.url())]
pub struct ContractViolation {
    kind: ViolationKind,
    estimator: String,
    message: String,
    section: DocSection,
    #[source]
    source: Option<BoxedSource>,
}

impl ContractViolation {
    /// Create a violation without an underlying cause.
    pub fn new(
        kind: ViolationKind,
        estimator: impl Into<String>,
        section: DocSection,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            estimator: estimator.into(),
            message: message.into(),
            section,
            source: None,
        }
    }

    /// Attach the error that triggered the violation.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// A candidate operation returned an error mid-check.
    pub fn operation_failed(
        estimator: &str,
        section: DocSection,
        operation: &str,
        err: ParamError,
    ) -> Self {
        Self::new(
            ViolationKind::OperationFailed,
            estimator,
            section,
            format!("Estimator {estimator} failed while calling `{operation}`: {err}."),
        )
        .with_source(err)
    }

    /// Violation category.
    pub fn kind(&self) -> ViolationKind {
        self.kind
    }

    /// Name of the estimator under test.
    pub fn estimator(&self) -> &str {
        &self.estimator
    }

    /// Diagnostic without the documentation pointer.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Governing section of the developer guide.
    pub fn section(&self) -> DocSection {
        self.section
    }
}
