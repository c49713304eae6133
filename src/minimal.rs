//! Minimal reference estimators.
//!
//! Each one implements the smallest piece of the API needed by one part of
//! the contract, without relying on the attribute-backed base behaviours.

use crate::error::ParamError;
use crate::estimator::{
    deepcopy, setattr_params, Class, CloneHook, Estimator, Fit, GetParams, SetParams,
};
use crate::params::{Attributes, ParamMap};
use crate::reflect::{bind_arguments, default_of, ParameterDescriptor, Signature};
use crate::value::Param;

fn param_init() -> Signature {
    Signature::init(vec![ParameterDescriptor::optional("param", Param::none())])
}

fn args_optional_args_init() -> Signature {
    Signature::init(vec![
        ParameterDescriptor::required("arg1"),
        ParameterDescriptor::keyword_only("arg2", Param::none()),
    ])
}

/// Reads each of `names` from the attribute table.
fn read_attributes(
    estimator: &dyn Estimator,
    names: &[&str],
) -> Result<ParamMap, ParamError> {
    names
        .iter()
        .map(|name| {
            estimator
                .attributes()
                .get(name)
                .cloned()
                .map(|value| (*name, value))
                .ok_or_else(|| ParamError::MissingAttribute {
                    class: estimator.class().name.to_string(),
                    name: (*name).to_string(),
                })
        })
        .collect()
}

fn default_param(class: &'static Class) -> Param {
    default_of(class, "param").unwrap_or_else(Param::none)
}

/// Hand-written `get_params` and `set_params` around a single `param`.
#[derive(Debug)]
pub struct EstimatorWithGetSetParams {
    attrs: Attributes,
}

static ESTIMATOR_WITH_GET_SET_PARAMS: Class = Class {
    init: Some(param_init),
    constructor: Some(EstimatorWithGetSetParams::from_params),
    ..Class::new("EstimatorWithGetSetParams")
};

impl EstimatorWithGetSetParams {
    /// Build with `param` stored as received.
    pub fn new(param: Param) -> Self {
        Self {
            attrs: [("param", param)].into_iter().collect(),
        }
    }

    fn from_params(params: ParamMap) -> Result<Box<dyn Estimator>, ParamError> {
        let bound = bind_arguments(&ESTIMATOR_WITH_GET_SET_PARAMS, params)?;
        Ok(Box::new(Self { attrs: bound.into() }))
    }
}

impl Default for EstimatorWithGetSetParams {
    fn default() -> Self {
        Self::new(default_param(&ESTIMATOR_WITH_GET_SET_PARAMS))
    }
}

impl Estimator for EstimatorWithGetSetParams {
    crate::attribute_backed_estimator!(ESTIMATOR_WITH_GET_SET_PARAMS);

    fn get_params_op(&self) -> Option<&dyn GetParams> {
        Some(self)
    }

    fn set_params_op(&mut self) -> Option<&mut dyn SetParams> {
        Some(self)
    }
}

impl GetParams for EstimatorWithGetSetParams {
    fn get_params(&self, _deep: bool) -> Result<ParamMap, ParamError> {
        read_attributes(self, &["param"])
    }
}

impl SetParams for EstimatorWithGetSetParams {
    fn set_params(&mut self, params: ParamMap) -> Result<&mut dyn Estimator, ParamError> {
        setattr_params(self, params)
    }
}

/// Only a cloning hook; no parameter retrieval.
///
/// The hook cannot hand out the object it is called on, since the result is
/// owned by the caller. It returns a deep copy instead: same type, equal
/// parameters, no storage shared with the original.
#[derive(Debug)]
pub struct EstimatorWithSklearnClone {
    attrs: Attributes,
}

static ESTIMATOR_WITH_SKLEARN_CLONE: Class = Class {
    init: Some(param_init),
    xfail_checks: &[
        ("check_parameter_init", "no get_params to read stored parameters from"),
        ("check_get_params", "implements cloning only"),
        ("check_set_params", "implements cloning only"),
        ("check_round_trip_get_set_params", "implements cloning only"),
        ("check_fit", "implements cloning only"),
    ],
    ..Class::new("EstimatorWithSklearnClone")
};

impl EstimatorWithSklearnClone {
    /// Build with `param` stored as received.
    pub fn new(param: Param) -> Self {
        Self {
            attrs: [("param", param)].into_iter().collect(),
        }
    }
}

impl Default for EstimatorWithSklearnClone {
    fn default() -> Self {
        Self::new(default_param(&ESTIMATOR_WITH_SKLEARN_CLONE))
    }
}

impl Estimator for EstimatorWithSklearnClone {
    crate::attribute_backed_estimator!(ESTIMATOR_WITH_SKLEARN_CLONE);

    fn clone_hook(&self) -> Option<&dyn CloneHook> {
        Some(self)
    }
}

impl CloneHook for EstimatorWithSklearnClone {
    fn clone_estimator(&self) -> Param {
        Param::estimator(deepcopy(self))
    }
}

/// Required positional `arg1` and keyword-only `arg2`.
#[derive(Debug)]
pub struct EstimatorArgsOptionalArgs {
    attrs: Attributes,
}

static ESTIMATOR_ARGS_OPTIONAL_ARGS: Class = Class {
    init: Some(args_optional_args_init),
    bases: &[&ESTIMATOR_WITH_GET_SET_PARAMS],
    required_parameters: Some(&["arg1"]),
    constructor: Some(EstimatorArgsOptionalArgs::from_params),
    ..Class::new("EstimatorArgsOptionalArgs")
};

impl EstimatorArgsOptionalArgs {
    /// Build with both arguments stored as received.
    pub fn new(arg1: Param, arg2: Param) -> Self {
        Self {
            attrs: [("arg1", arg1), ("arg2", arg2)].into_iter().collect(),
        }
    }

    fn from_params(params: ParamMap) -> Result<Box<dyn Estimator>, ParamError> {
        let bound = bind_arguments(&ESTIMATOR_ARGS_OPTIONAL_ARGS, params)?;
        Ok(Box::new(Self { attrs: bound.into() }))
    }
}

impl Estimator for EstimatorArgsOptionalArgs {
    crate::attribute_backed_estimator!(ESTIMATOR_ARGS_OPTIONAL_ARGS);

    fn get_params_op(&self) -> Option<&dyn GetParams> {
        Some(self)
    }

    fn set_params_op(&mut self) -> Option<&mut dyn SetParams> {
        Some(self)
    }
}

impl GetParams for EstimatorArgsOptionalArgs {
    fn get_params(&self, _deep: bool) -> Result<ParamMap, ParamError> {
        read_attributes(self, &["arg1", "arg2"])
    }
}

impl SetParams for EstimatorArgsOptionalArgs {
    fn set_params(&mut self, params: ParamMap) -> Result<&mut dyn Estimator, ParamError> {
        setattr_params(self, params)
    }
}

/// [`EstimatorWithGetSetParams`] plus a `fit` that marks the object fitted.
#[derive(Debug)]
pub struct EstimatorWithFit {
    attrs: Attributes,
}

static ESTIMATOR_WITH_FIT: Class = Class {
    init: Some(param_init),
    bases: &[&ESTIMATOR_WITH_GET_SET_PARAMS],
    constructor: Some(EstimatorWithFit::from_params),
    ..Class::new("EstimatorWithFit")
};

impl EstimatorWithFit {
    /// Build with `param` stored as received.
    pub fn new(param: Param) -> Self {
        Self {
            attrs: [("param", param)].into_iter().collect(),
        }
    }

    /// Whether `fit` has been called.
    pub fn is_fitted(&self) -> bool {
        self.attrs.get("_is_fitted_").is_some()
    }

    fn from_params(params: ParamMap) -> Result<Box<dyn Estimator>, ParamError> {
        let bound = bind_arguments(&ESTIMATOR_WITH_FIT, params)?;
        Ok(Box::new(Self { attrs: bound.into() }))
    }
}

impl Default for EstimatorWithFit {
    fn default() -> Self {
        Self::new(default_param(&ESTIMATOR_WITH_FIT))
    }
}

impl Estimator for EstimatorWithFit {
    crate::attribute_backed_estimator!(ESTIMATOR_WITH_FIT);

    fn get_params_op(&self) -> Option<&dyn GetParams> {
        Some(self)
    }

    fn set_params_op(&mut self) -> Option<&mut dyn SetParams> {
        Some(self)
    }

    fn fit_op(&mut self) -> Option<&mut dyn Fit> {
        Some(self)
    }
}

impl GetParams for EstimatorWithFit {
    fn get_params(&self, _deep: bool) -> Result<ParamMap, ParamError> {
        read_attributes(self, &["param"])
    }
}

impl SetParams for EstimatorWithFit {
    fn set_params(&mut self, params: ParamMap) -> Result<&mut dyn Estimator, ParamError> {
        setattr_params(self, params)
    }
}

impl Fit for EstimatorWithFit {
    fn fit(&mut self, _x: &[Vec<f64>], _y: Option<&[f64]>) -> Result<(), ParamError> {
        self.attrs.set("_is_fitted_", Param::bool(true));
        Ok(())
    }
}
