//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use estimator_checks::prelude::*;
//! ```

pub use crate::checks::{
    check_clone, check_fit, check_get_params, check_parameter_init,
    check_round_trip_get_set_params, check_set_params, check_set_params_with,
};
pub use crate::config::{CheckConfig, Sentinel};
pub use crate::error::{ContractViolation, DocSection, ParamError, ViolationKind};
pub use crate::estimator::{
    base_get_params, base_set_params, Class, CloneHook, Estimator, Fit, GetParams, SetParams,
};
pub use crate::minimal::{
    EstimatorArgsOptionalArgs, EstimatorWithFit, EstimatorWithGetSetParams,
    EstimatorWithSklearnClone,
};
pub use crate::params::{Attributes, ParamMap};
pub use crate::reflect::{ParameterDescriptor, Signature};
pub use crate::suite::{api_checks, CheckSuite, EstimatorCheck, SuiteReport};
pub use crate::value::Param;
