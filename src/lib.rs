//! Estimator API conformance checks for aprender.
//!
//! Every estimator of the library follows the same object contract: it is
//! constructible with introspectable parameters, cloneable, round-trippable
//! through `get_params` / `set_params` without losing object identity, and
//! exposes a `fit` entry point. This crate certifies that contract for any
//! number of estimators at once.
//!
//! # Quick Start
//!
//! ```
//! use estimator_checks::prelude::*;
//!
//! let mut est = EstimatorWithGetSetParams::new(Param::list(vec![Param::int(1)]));
//!
//! check_clone("EstimatorWithGetSetParams", &mut est).unwrap();
//! check_round_trip_get_set_params("EstimatorWithGetSetParams", &mut est).unwrap();
//!
//! let err = check_fit("EstimatorWithGetSetParams", &mut est).unwrap_err();
//! assert_eq!(err.kind(), ViolationKind::MissingOperation);
//! ```
//!
//! # Modules
//!
//! - [`value`]: Parameter values with explicit object identity
//! - [`params`]: Ordered parameter maps and attribute tables
//! - [`estimator`]: Class schemas, the estimator trait and its capabilities
//! - [`reflect`]: Initializer signatures and ancestor walks
//! - [`clone`]: Cloning through the public parameter API
//! - [`composition`]: Estimators holding named sub-estimators
//! - [`snapshot`]: Shallow and deep parameter snapshots
//! - [`round_trip`]: Identity-preserving `get_params` / `set_params` round trip
//! - [`mutation`]: Isolated single-parameter mutation probe
//! - [`checks`]: The six contract checks
//! - [`suite`]: Check discovery, expected failures and reports
//! - [`config`]: Check configuration
//! - [`minimal`]: Minimal reference estimators

pub mod checks;
pub mod clone;
pub mod composition;
pub mod config;
pub mod error;
pub mod estimator;
pub mod minimal;
pub mod mutation;
pub mod params;
pub mod prelude;
pub mod reflect;
pub mod round_trip;
pub mod snapshot;
pub mod suite;
pub mod value;

pub use error::{ContractViolation, ParamError, Result, ViolationKind};
pub use estimator::{Class, Estimator};
pub use suite::{CheckSuite, EstimatorCheck, SuiteReport};
