//! Check configuration.
//!
//! # Examples
//!
//! ```
//! use estimator_checks::config::{CheckConfig, Sentinel};
//!
//! let config = CheckConfig::new()
//!     .with_sentinels(vec![Sentinel::Nan, Sentinel::None])
//!     .with_stop_on_failure(true)
//!     .with_skip_check("check_fit");
//!
//! assert_eq!(config.sentinels.len(), 2);
//! assert!(config.stop_on_failure);
//! assert!(config.is_skipped("check_fit"));
//! ```

use crate::error::ParamError;
use crate::value::Param;
use serde::{Deserialize, Serialize};

/// Distinctive value used to probe isolated mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentinel {
    /// Negative infinity
    NegInfinity,
    /// Positive infinity
    PosInfinity,
    /// The null value
    None,
    /// Not-a-number
    Nan,
}

impl Sentinel {
    /// Sentinels probed unless configured otherwise.
    pub const DEFAULTS: [Sentinel; 3] = [
        Sentinel::NegInfinity,
        Sentinel::PosInfinity,
        Sentinel::None,
    ];

    /// A fresh parameter object holding the sentinel.
    pub fn materialize(self) -> Param {
        match self {
            Sentinel::NegInfinity => Param::float(f64::NEG_INFINITY),
            Sentinel::PosInfinity => Param::float(f64::INFINITY),
            Sentinel::None => Param::none(),
            Sentinel::Nan => Param::float(f64::NAN),
        }
    }
}

/// Configuration shared by the checks and the suite runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckConfig {
    /// Values probed by the isolated mutation check
    pub sentinels: Vec<Sentinel>,
    /// Skip the remaining checks of a candidate after its first failure
    pub stop_on_failure: bool,
    /// Names of checks excluded from a suite run
    pub skip_checks: Vec<String>,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            sentinels: Sentinel::DEFAULTS.to_vec(),
            stop_on_failure: false,
            skip_checks: Vec::new(),
        }
    }
}

impl CheckConfig {
    /// Default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the sentinel set.
    pub fn with_sentinels(mut self, sentinels: Vec<Sentinel>) -> Self {
        self.sentinels = sentinels;
        self
    }

    /// Stop checking a candidate at its first failure.
    pub fn with_stop_on_failure(mut self, stop: bool) -> Self {
        self.stop_on_failure = stop;
        self
    }

    /// Exclude one check by name.
    pub fn with_skip_check(mut self, check: impl Into<String>) -> Self {
        self.skip_checks.push(check.into());
        self
    }

    /// Whether the named check is excluded.
    pub fn is_skipped(&self, check: &str) -> bool {
        self.skip_checks.iter().any(|c| c == check)
    }

    /// Parse a configuration from JSON. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::InvalidValue`] when the document is malformed.
    ///
    /// # Examples
    ///
    /// ```
    /// use estimator_checks::config::{CheckConfig, Sentinel};
    ///
    /// let config = CheckConfig::from_json(r#"{"sentinels": ["nan"]}"#).unwrap();
    /// assert_eq!(config.sentinels, vec![Sentinel::Nan]);
    /// assert!(!config.stop_on_failure);
    /// ```
    pub fn from_json(json: &str) -> Result<Self, ParamError> {
        serde_json::from_str(json)
            .map_err(|e| ParamError::InvalidValue(format!("invalid check configuration: {e}")))
    }
}
