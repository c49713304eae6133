//! Estimators shared by the integration tests.
//!
//! The first group follows the contract through the attribute-backed base
//! behaviours, the second group breaks exactly one rule each.

#![allow(dead_code)]

use estimator_checks::composition::{composite_get_params, composite_set_params};
use estimator_checks::estimator::setattr_params;
use estimator_checks::prelude::*;
use estimator_checks::reflect::bind_arguments;
use estimator_checks::value::{CopyMemo, Value, ValueKind};
use std::any::Any;

/// Keyword arguments from a fixed list of pairs.
pub fn kwargs<const N: usize>(items: [(&str, Param); N]) -> ParamMap {
    items.into_iter().collect()
}

/// Struct holding only attributes, built by binding keywords to the
/// initializer of `$class`.
macro_rules! fixture {
    ($(#[$meta:meta])* $ty:ident, $class:ident) => {
        $(#[$meta])*
        #[derive(Debug)]
        pub struct $ty {
            attrs: Attributes,
        }

        impl $ty {
            pub fn build(kwargs: ParamMap) -> Result<Self, ParamError> {
                Ok(Self {
                    attrs: bind_arguments(&$class, kwargs)?.into(),
                })
            }

            fn construct(kwargs: ParamMap) -> Result<Box<dyn Estimator>, ParamError> {
                Ok(Box::new(Self::build(kwargs)?))
            }
        }
    };
}

/// Base `get_params` / `set_params`, optionally with a `fit` that records
/// the number of features.
macro_rules! base_params {
    ($ty:ident, $class:ident) => {
        impl Estimator for $ty {
            estimator_checks::attribute_backed_estimator!($class);

            fn get_params_op(&self) -> Option<&dyn GetParams> {
                Some(self)
            }

            fn set_params_op(&mut self) -> Option<&mut dyn SetParams> {
                Some(self)
            }
        }

        base_params!(@ops $ty);
    };
    ($ty:ident, $class:ident, fit) => {
        impl Estimator for $ty {
            estimator_checks::attribute_backed_estimator!($class);

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

        impl Fit for $ty {
            fn fit(&mut self, x: &[Vec<f64>], _y: Option<&[f64]>) -> Result<(), ParamError> {
                let n_features = x.first().map_or(0, Vec::len);
                self.attrs
                    .set("n_features_in_", Param::int(n_features as i64));
                Ok(())
            }
        }

        base_params!(@ops $ty);
    };
    (@ops $ty:ident) => {
        impl GetParams for $ty {
            fn get_params(&self, deep: bool) -> Result<ParamMap, ParamError> {
                base_get_params(self, deep)
            }
        }

        impl SetParams for $ty {
            fn set_params(&mut self, params: ParamMap) -> Result<&mut dyn Estimator, ParamError> {
                base_set_params(self, params)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Conforming estimators
// ---------------------------------------------------------------------------

fn dummy_regressor_init() -> Signature {
    Signature::init(vec![
        ParameterDescriptor::optional("strategy", Param::str("mean")),
        ParameterDescriptor::optional("constant", Param::none()),
        ParameterDescriptor::optional("quantile", Param::none()),
    ])
}

pub static DUMMY_REGRESSOR: Class = Class {
    init: Some(dummy_regressor_init),
    constructor: Some(DummyRegressor::construct),
    ..Class::new("DummyRegressor")
};

fixture!(
    /// Predicts a constant.
    DummyRegressor,
    DUMMY_REGRESSOR
);
base_params!(DummyRegressor, DUMMY_REGRESSOR, fit);

fn simple_imputer_init() -> Signature {
    Signature::init(vec![
        ParameterDescriptor::optional("missing_values", Param::float(f64::NAN)),
        ParameterDescriptor::optional("strategy", Param::str("mean")),
        ParameterDescriptor::optional("fill_value", Param::none()),
        ParameterDescriptor::optional("copy", Param::bool(true)),
    ])
}

pub static SIMPLE_IMPUTER: Class = Class {
    init: Some(simple_imputer_init),
    constructor: Some(SimpleImputer::construct),
    ..Class::new("SimpleImputer")
};

fixture!(
    /// Default `missing_values` is NaN.
    SimpleImputer,
    SIMPLE_IMPUTER
);
base_params!(SimpleImputer, SIMPLE_IMPUTER, fit);

fn bagging_regressor_init() -> Signature {
    Signature::init(vec![
        ParameterDescriptor::required("estimator"),
        ParameterDescriptor::optional("n_estimators", Param::int(10)),
        ParameterDescriptor::optional("max_samples", Param::float(1.0)),
        ParameterDescriptor::optional("bootstrap", Param::bool(true)),
    ])
}

pub static BAGGING_REGRESSOR: Class = Class {
    init: Some(bagging_regressor_init),
    required_parameters: Some(&["estimator"]),
    constructor: Some(BaggingRegressor::construct),
    ..Class::new("BaggingRegressor")
};

fixture!(
    /// Meta-estimator wrapping a single nested estimator.
    BaggingRegressor,
    BAGGING_REGRESSOR
);
base_params!(BaggingRegressor, BAGGING_REGRESSOR, fit);

fn nested_scaler_init() -> Signature {
    Signature::init(vec![
        ParameterDescriptor::optional("inner", Param::none()),
        ParameterDescriptor::optional("with_std", Param::bool(true)),
    ])
}

pub static NESTED_SCALER: Class = Class {
    init: Some(nested_scaler_init),
    constructor: Some(NestedScaler::construct),
    xfail_checks: &[(
        "check_parameter_init",
        "built with a non-default inner estimator",
    )],
    ..Class::new("NestedScaler")
};

fixture!(
    /// Optional nested estimator, no required parameters.
    NestedScaler,
    NESTED_SCALER
);
base_params!(NestedScaler, NESTED_SCALER, fit);

pub static STALE_XFAIL_REGRESSOR: Class = Class {
    init: Some(dummy_regressor_init),
    constructor: Some(StaleXfailRegressor::construct),
    xfail_checks: &[("check_fit", "fit was not implemented yet")],
    ..Class::new("StaleXfailRegressor")
};

fixture!(
    /// Conforming, but still marks `check_fit` as expected to fail.
    StaleXfailRegressor,
    STALE_XFAIL_REGRESSOR
);
base_params!(StaleXfailRegressor, STALE_XFAIL_REGRESSOR, fit);

fn voting_regressor_init() -> Signature {
    Signature::init(vec![
        ParameterDescriptor::required("estimators"),
        ParameterDescriptor::optional("weights", Param::none()),
        ParameterDescriptor::optional("n_jobs", Param::none()),
    ])
}

pub static VOTING_REGRESSOR: Class = Class {
    init: Some(voting_regressor_init),
    required_parameters: Some(&["estimators"]),
    constructor: Some(VotingRegressor::construct),
    ..Class::new("VotingRegressor")
};

fixture!(
    /// Composite of named regressors.
    VotingRegressor,
    VOTING_REGRESSOR
);

impl Estimator for VotingRegressor {
    estimator_checks::attribute_backed_estimator!(VOTING_REGRESSOR);

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

impl GetParams for VotingRegressor {
    fn get_params(&self, deep: bool) -> Result<ParamMap, ParamError> {
        composite_get_params(self, "estimators", deep)
    }
}

impl SetParams for VotingRegressor {
    fn set_params(&mut self, params: ParamMap) -> Result<&mut dyn Estimator, ParamError> {
        composite_set_params(self, "estimators", params)
    }
}

impl Fit for VotingRegressor {
    fn fit(&mut self, x: &[Vec<f64>], y: Option<&[f64]>) -> Result<(), ParamError> {
        let components = self
            .attrs
            .get("estimators")
            .and_then(Param::items)
            .unwrap_or_default();
        for pair in components {
            let Some(component) = pair.items().and_then(|p| p.get(1).cloned()) else {
                continue;
            };
            if let Value::Estimator(cell) = component.value() {
                if let Some(fit) = cell.borrow_mut().fit_op() {
                    fit.fit(x, y)?;
                }
            }
        }
        Ok(())
    }
}

pub fn dummy() -> DummyRegressor {
    DummyRegressor::build(ParamMap::new()).expect("defaults bind")
}

pub fn dummy_with(strategy: &str) -> DummyRegressor {
    DummyRegressor::build(kwargs([("strategy", Param::str(strategy))])).expect("bind")
}

pub fn imputer() -> SimpleImputer {
    SimpleImputer::build(ParamMap::new()).expect("defaults bind")
}

pub fn bagging() -> BaggingRegressor {
    BaggingRegressor::build(kwargs([(
        "estimator",
        Param::estimator(Box::new(dummy())),
    )]))
    .expect("bind")
}

pub fn nested_scaler() -> NestedScaler {
    NestedScaler::build(kwargs([("inner", Param::estimator(Box::new(dummy())))])).expect("bind")
}

pub fn voting() -> VotingRegressor {
    VotingRegressor::build(kwargs([(
        "estimators",
        Param::named_estimators(vec![
            ("mean", Box::new(dummy()) as Box<dyn Estimator>),
            ("median", Box::new(dummy_with("median")) as Box<dyn Estimator>),
        ]),
    )]))
    .expect("bind")
}

// ---------------------------------------------------------------------------
// Estimators breaking one rule each
// ---------------------------------------------------------------------------

fn param_init() -> Signature {
    Signature::init(vec![ParameterDescriptor::optional("param", Param::none())])
}

fn required_param_init() -> Signature {
    Signature::init(vec![ParameterDescriptor::required("param")])
}

pub static NO_GET_SET_PARAMS: Class = Class {
    init: Some(param_init),
    ..Class::new("EstimatorNoGetSetParams")
};

/// Stores its parameter but exposes no operation at all.
#[derive(Debug)]
pub struct EstimatorNoGetSetParams {
    attrs: Attributes,
}

impl EstimatorNoGetSetParams {
    pub fn new() -> Self {
        Self {
            attrs: kwargs([("param", Param::none())]).into(),
        }
    }
}

impl Estimator for EstimatorNoGetSetParams {
    estimator_checks::attribute_backed_estimator!(NO_GET_SET_PARAMS);
}

pub static WRONG_SKLEARN_CLONE: Class = Class {
    init: Some(param_init),
    ..Class::new("EstimatorWrongSklearnClone")
};

/// Clone hook returning a string.
#[derive(Debug)]
pub struct EstimatorWrongSklearnClone {
    attrs: Attributes,
}

impl EstimatorWrongSklearnClone {
    pub fn new() -> Self {
        Self {
            attrs: kwargs([("param", Param::none())]).into(),
        }
    }
}

impl Estimator for EstimatorWrongSklearnClone {
    estimator_checks::attribute_backed_estimator!(WRONG_SKLEARN_CLONE);

    fn clone_hook(&self) -> Option<&dyn CloneHook> {
        Some(self)
    }
}

impl CloneHook for EstimatorWrongSklearnClone {
    fn clone_estimator(&self) -> Param {
        Param::str("xxx")
    }
}

fn args_init() -> Signature {
    Signature::init(vec![
        ParameterDescriptor::required("arg1"),
        ParameterDescriptor::keyword_only("arg2", Param::none()),
    ])
}

pub static WITH_PRIVATE_ATTRIBUTES: Class = Class {
    init: Some(args_init),
    required_parameters: Some(&["arg1"]),
    constructor: Some(EstimatorWithPrivateAttributes::construct),
    ..Class::new("EstimatorWithPrivateAttributes")
};

/// Sets a private attribute next to its parameters, which is allowed.
#[derive(Debug)]
pub struct EstimatorWithPrivateAttributes {
    attrs: Attributes,
}

impl EstimatorWithPrivateAttributes {
    pub fn build(kwargs: ParamMap) -> Result<Self, ParamError> {
        let mut attrs: Attributes = bind_arguments(&WITH_PRIVATE_ATTRIBUTES, kwargs)?.into();
        attrs.set("_private_attribute", Param::str("private"));
        Ok(Self { attrs })
    }

    fn construct(kwargs: ParamMap) -> Result<Box<dyn Estimator>, ParamError> {
        Ok(Box::new(Self::build(kwargs)?))
    }
}

base_params!(EstimatorWithPrivateAttributes, WITH_PRIVATE_ATTRIBUTES);

pub static NOT_STORING_PARAMS: Class = Class {
    init: Some(param_init),
    constructor: Some(EstimatorNotStoringParams::construct),
    ..Class::new("EstimatorNotStoringParams")
};

/// Accepts `param` and drops it.
#[derive(Debug)]
pub struct EstimatorNotStoringParams {
    attrs: Attributes,
}

impl EstimatorNotStoringParams {
    pub fn new() -> Self {
        Self {
            attrs: Attributes::new(),
        }
    }

    fn construct(_kwargs: ParamMap) -> Result<Box<dyn Estimator>, ParamError> {
        Ok(Box::new(Self::new()))
    }
}

base_params!(EstimatorNotStoringParams, NOT_STORING_PARAMS);

pub static ADDITIONAL_PARAMS: Class = Class {
    init: Some(param_init),
    constructor: Some(EstimatorAdditionalParams::construct),
    ..Class::new("EstimatorAdditionalParams")
};

/// Sets a public attribute that is not a parameter.
#[derive(Debug)]
pub struct EstimatorAdditionalParams {
    attrs: Attributes,
}

impl EstimatorAdditionalParams {
    pub fn build(kwargs: ParamMap) -> Result<Self, ParamError> {
        let mut attrs: Attributes = bind_arguments(&ADDITIONAL_PARAMS, kwargs)?.into();
        attrs.set("additional_param", Param::int(1));
        Ok(Self { attrs })
    }

    fn construct(kwargs: ParamMap) -> Result<Box<dyn Estimator>, ParamError> {
        Ok(Box::new(Self::build(kwargs)?))
    }
}

base_params!(EstimatorAdditionalParams, ADDITIONAL_PARAMS);

pub static COPYING_IN_INIT: Class = Class {
    init: Some(required_param_init),
    constructor: Some(EstimatorCopyingInInit::construct),
    ..Class::new("EstimatorCopyingInInit")
};

/// Stores a deep copy of `param`.
#[derive(Debug)]
pub struct EstimatorCopyingInInit {
    attrs: Attributes,
}

impl EstimatorCopyingInInit {
    pub fn build(kwargs: ParamMap) -> Result<Self, ParamError> {
        let bound = bind_arguments(&COPYING_IN_INIT, kwargs)?;
        Ok(Self {
            attrs: bound.deep_copy(&mut CopyMemo::default()).into(),
        })
    }

    fn construct(kwargs: ParamMap) -> Result<Box<dyn Estimator>, ParamError> {
        Ok(Box::new(Self::build(kwargs)?))
    }
}

base_params!(EstimatorCopyingInInit, COPYING_IN_INIT);

pub static MODIFY_INIT_ATTRIBUTES: Class = Class {
    init: Some(required_param_init),
    required_parameters: Some(&["param"]),
    constructor: Some(EstimatorModifyInitAttributes::construct),
    ..Class::new("EstimatorModifyInitAttributes")
};

/// Removes the first element of the list it receives, in place.
#[derive(Debug)]
pub struct EstimatorModifyInitAttributes {
    attrs: Attributes,
}

impl EstimatorModifyInitAttributes {
    pub fn build(kwargs: ParamMap) -> Result<Self, ParamError> {
        let bound = bind_arguments(&MODIFY_INIT_ATTRIBUTES, kwargs)?;
        if let Some(Value::List(items)) = bound.get("param").map(Param::value) {
            let mut items = items.borrow_mut();
            if !items.is_empty() {
                items.remove(0);
            }
        }
        Ok(Self {
            attrs: bound.into(),
        })
    }

    fn construct(kwargs: ParamMap) -> Result<Box<dyn Estimator>, ParamError> {
        Ok(Box::new(Self::build(kwargs)?))
    }
}

base_params!(EstimatorModifyInitAttributes, MODIFY_INIT_ATTRIBUTES);

fn mutable_default_init() -> Signature {
    Signature::init(vec![ParameterDescriptor::optional(
        "param",
        Param::list(vec![]),
    )])
}

pub static MUTABLE_DEFAULT: Class = Class {
    init: Some(mutable_default_init),
    constructor: Some(EstimatorMutableDefault::construct),
    ..Class::new("EstimatorMutableDefault")
};

fixture!(
    /// Declares a list as default.
    EstimatorMutableDefault,
    MUTABLE_DEFAULT
);
base_params!(EstimatorMutableDefault, MUTABLE_DEFAULT);

pub static NO_DEEP: Class = Class {
    init: Some(param_init),
    constructor: Some(EstimatorNoDeep::construct),
    ..Class::new("EstimatorNoDeep")
};

fixture!(
    /// `get_params` without a `deep` toggle.
    EstimatorNoDeep,
    NO_DEEP
);

impl Estimator for EstimatorNoDeep {
    estimator_checks::attribute_backed_estimator!(NO_DEEP);

    fn get_params_op(&self) -> Option<&dyn GetParams> {
        Some(self)
    }
}

impl GetParams for EstimatorNoDeep {
    fn get_params(&self, _deep: bool) -> Result<ParamMap, ParamError> {
        base_get_params(self, false)
    }

    fn get_params_signature(&self) -> Signature {
        Signature::new(vec![ParameterDescriptor::receiver()])
    }
}

pub static EXTRA_GET_PARAMS: Class = Class {
    init: Some(param_init),
    constructor: Some(EstimatorExtraGetParams::construct),
    ..Class::new("EstimatorExtraGetParams")
};

fixture!(
    /// Reports a parameter its initializer does not declare.
    EstimatorExtraGetParams,
    EXTRA_GET_PARAMS
);

impl Estimator for EstimatorExtraGetParams {
    estimator_checks::attribute_backed_estimator!(EXTRA_GET_PARAMS);

    fn get_params_op(&self) -> Option<&dyn GetParams> {
        Some(self)
    }
}

impl GetParams for EstimatorExtraGetParams {
    fn get_params(&self, deep: bool) -> Result<ParamMap, ParamError> {
        let mut params = base_get_params(self, deep)?;
        params.insert("extra", Param::int(0));
        Ok(params)
    }
}

pub static IGNORING_DEEP: Class = Class {
    init: Some(nested_scaler_init),
    constructor: Some(EstimatorIgnoringDeep::construct),
    ..Class::new("EstimatorIgnoringDeep")
};

fixture!(
    /// Never inlines nested parameters.
    EstimatorIgnoringDeep,
    IGNORING_DEEP
);

impl Estimator for EstimatorIgnoringDeep {
    estimator_checks::attribute_backed_estimator!(IGNORING_DEEP);

    fn get_params_op(&self) -> Option<&dyn GetParams> {
        Some(self)
    }
}

impl GetParams for EstimatorIgnoringDeep {
    fn get_params(&self, _deep: bool) -> Result<ParamMap, ParamError> {
        base_get_params(self, false)
    }
}

pub static OMITTING_GET_PARAMS: Class = Class {
    init: Some(coercing_init),
    constructor: Some(EstimatorOmittingGetParams::construct),
    ..Class::new("EstimatorOmittingGetParams")
};

fixture!(
    /// Leaves a declared parameter out of `get_params`.
    EstimatorOmittingGetParams,
    OMITTING_GET_PARAMS
);

impl Estimator for EstimatorOmittingGetParams {
    estimator_checks::attribute_backed_estimator!(OMITTING_GET_PARAMS);

    fn get_params_op(&self) -> Option<&dyn GetParams> {
        Some(self)
    }
}

impl GetParams for EstimatorOmittingGetParams {
    fn get_params(&self, deep: bool) -> Result<ParamMap, ParamError> {
        let mut params = base_get_params(self, deep)?;
        params.remove("fit_intercept");
        Ok(params)
    }
}

pub static DEEP_DROPS_KEY: Class = Class {
    init: Some(param_init),
    constructor: Some(EstimatorDeepDropsKey::construct),
    ..Class::new("EstimatorDeepDropsKey")
};

fixture!(
    /// Deep retrieval loses a parameter the shallow one reports.
    EstimatorDeepDropsKey,
    DEEP_DROPS_KEY
);

impl Estimator for EstimatorDeepDropsKey {
    estimator_checks::attribute_backed_estimator!(DEEP_DROPS_KEY);

    fn get_params_op(&self) -> Option<&dyn GetParams> {
        Some(self)
    }
}

impl GetParams for EstimatorDeepDropsKey {
    fn get_params(&self, deep: bool) -> Result<ParamMap, ParamError> {
        let mut params = base_get_params(self, deep)?;
        if deep {
            params.remove("param");
        }
        Ok(params)
    }
}

pub static SET_PARAMS_ADDS_NAME: Class = Class {
    init: Some(param_init),
    constructor: Some(EstimatorSetParamsAddsName::construct),
    ..Class::new("EstimatorSetParamsAddsName")
};

fixture!(
    /// Reports an extra `updated` parameter once `set_params` stored
    /// something.
    EstimatorSetParamsAddsName,
    SET_PARAMS_ADDS_NAME
);

impl Estimator for EstimatorSetParamsAddsName {
    estimator_checks::attribute_backed_estimator!(SET_PARAMS_ADDS_NAME);

    fn get_params_op(&self) -> Option<&dyn GetParams> {
        Some(self)
    }

    fn set_params_op(&mut self) -> Option<&mut dyn SetParams> {
        Some(self)
    }
}

impl GetParams for EstimatorSetParamsAddsName {
    fn get_params(&self, deep: bool) -> Result<ParamMap, ParamError> {
        let mut params = base_get_params(self, deep)?;
        if let Some(updated) = self.attrs.get("_updated") {
            params.insert("updated", updated.clone());
        }
        Ok(params)
    }
}

impl SetParams for EstimatorSetParamsAddsName {
    fn set_params(&mut self, params: ParamMap) -> Result<&mut dyn Estimator, ParamError> {
        if !params.is_empty() {
            self.attrs.set("_updated", Param::bool(true));
        }
        base_set_params(self, params)
    }
}

pub static ONLY_GET_PARAMS: Class = Class {
    init: Some(param_init),
    constructor: Some(EstimatorOnlyGetParams::construct),
    ..Class::new("EstimatorOnlyGetParams")
};

fixture!(
    /// Retrieval without mutation.
    EstimatorOnlyGetParams,
    ONLY_GET_PARAMS
);

impl Estimator for EstimatorOnlyGetParams {
    estimator_checks::attribute_backed_estimator!(ONLY_GET_PARAMS);

    fn get_params_op(&self) -> Option<&dyn GetParams> {
        Some(self)
    }
}

impl GetParams for EstimatorOnlyGetParams {
    fn get_params(&self, deep: bool) -> Result<ParamMap, ParamError> {
        base_get_params(self, deep)
    }
}

pub static SET_PARAMS_NOT_SELF: Class = Class {
    init: Some(param_init),
    ..Class::new("EstimatorSetParamsNotSelf")
};

/// `set_params` hands back another object.
#[derive(Debug)]
pub struct EstimatorSetParamsNotSelf {
    attrs: Attributes,
    decoy: Box<dyn Estimator>,
}

impl EstimatorSetParamsNotSelf {
    pub fn new() -> Self {
        Self {
            attrs: kwargs([("param", Param::none())]).into(),
            decoy: Box::new(EstimatorWithGetSetParams::default()),
        }
    }
}

impl Estimator for EstimatorSetParamsNotSelf {
    fn class(&self) -> &'static Class {
        &SET_PARAMS_NOT_SELF
    }

    fn attributes(&self) -> &Attributes {
        &self.attrs
    }

    fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attrs
    }

    fn deep_copy(&self, memo: &mut CopyMemo) -> Box<dyn Estimator> {
        Box::new(Self {
            attrs: self.attrs.deep_copy(memo),
            decoy: self.decoy.deep_copy(memo),
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn get_params_op(&self) -> Option<&dyn GetParams> {
        Some(self)
    }

    fn set_params_op(&mut self) -> Option<&mut dyn SetParams> {
        Some(self)
    }
}

impl GetParams for EstimatorSetParamsNotSelf {
    fn get_params(&self, deep: bool) -> Result<ParamMap, ParamError> {
        base_get_params(self, deep)
    }
}

impl SetParams for EstimatorSetParamsNotSelf {
    fn set_params(&mut self, params: ParamMap) -> Result<&mut dyn Estimator, ParamError> {
        setattr_params(self, params)?;
        Ok(self.decoy.as_mut())
    }
}

fn coercing_init() -> Signature {
    Signature::init(vec![
        ParameterDescriptor::optional("alpha", Param::float(1.0)),
        ParameterDescriptor::optional("fit_intercept", Param::bool(true)),
    ])
}

pub static SET_PARAMS_COERCES: Class = Class {
    init: Some(coercing_init),
    constructor: Some(EstimatorSetParamsCoerces::construct),
    ..Class::new("EstimatorSetParamsCoerces")
};

fixture!(
    /// Re-wraps every float it is given.
    EstimatorSetParamsCoerces,
    SET_PARAMS_COERCES
);

impl Estimator for EstimatorSetParamsCoerces {
    estimator_checks::attribute_backed_estimator!(SET_PARAMS_COERCES);

    fn get_params_op(&self) -> Option<&dyn GetParams> {
        Some(self)
    }

    fn set_params_op(&mut self) -> Option<&mut dyn SetParams> {
        Some(self)
    }
}

impl GetParams for EstimatorSetParamsCoerces {
    fn get_params(&self, deep: bool) -> Result<ParamMap, ParamError> {
        base_get_params(self, deep)
    }
}

impl SetParams for EstimatorSetParamsCoerces {
    fn set_params(&mut self, params: ParamMap) -> Result<&mut dyn Estimator, ParamError> {
        let coerced = params
            .into_iter()
            .map(|(name, value)| {
                let stored = match value.value() {
                    Value::Float(x) => Param::float(*x),
                    _ => value.clone(),
                };
                (name, stored)
            })
            .collect();
        base_set_params(self, coerced)
    }
}

fn copying_init() -> Signature {
    Signature::init(vec![
        ParameterDescriptor::required("param"),
        ParameterDescriptor::optional("tol", Param::float(1e-4)),
    ])
}

pub static SET_PARAMS_COPIES: Class = Class {
    init: Some(copying_init),
    required_parameters: Some(&["param"]),
    constructor: Some(EstimatorSetParamsCopies::construct),
    ..Class::new("EstimatorSetParamsCopies")
};

fixture!(
    /// Stores deep copies of what `set_params` receives.
    EstimatorSetParamsCopies,
    SET_PARAMS_COPIES
);

impl Estimator for EstimatorSetParamsCopies {
    estimator_checks::attribute_backed_estimator!(SET_PARAMS_COPIES);

    fn get_params_op(&self) -> Option<&dyn GetParams> {
        Some(self)
    }

    fn set_params_op(&mut self) -> Option<&mut dyn SetParams> {
        Some(self)
    }
}

impl GetParams for EstimatorSetParamsCopies {
    fn get_params(&self, deep: bool) -> Result<ParamMap, ParamError> {
        base_get_params(self, deep)
    }
}

impl SetParams for EstimatorSetParamsCopies {
    fn set_params(&mut self, params: ParamMap) -> Result<&mut dyn Estimator, ParamError> {
        let copied = params.deep_copy(&mut CopyMemo::default());
        base_set_params(self, copied)
    }
}

pub static BROKEN_VOTING_REGRESSOR: Class = Class {
    init: Some(voting_regressor_init),
    required_parameters: Some(&["estimators"]),
    constructor: Some(BrokenVotingRegressor::construct),
    ..Class::new("BrokenVotingRegressor")
};

fixture!(
    /// Composite that copies components handed to `set_params`.
    BrokenVotingRegressor,
    BROKEN_VOTING_REGRESSOR
);

impl Estimator for BrokenVotingRegressor {
    estimator_checks::attribute_backed_estimator!(BROKEN_VOTING_REGRESSOR);

    fn get_params_op(&self) -> Option<&dyn GetParams> {
        Some(self)
    }

    fn set_params_op(&mut self) -> Option<&mut dyn SetParams> {
        Some(self)
    }
}

impl GetParams for BrokenVotingRegressor {
    fn get_params(&self, deep: bool) -> Result<ParamMap, ParamError> {
        composite_get_params(self, "estimators", deep)
    }
}

impl SetParams for BrokenVotingRegressor {
    fn set_params(&mut self, params: ParamMap) -> Result<&mut dyn Estimator, ParamError> {
        let params = params
            .into_iter()
            .map(|(name, value)| {
                if value.kind() == ValueKind::Estimator {
                    (name, value.deep_copy_fresh())
                } else {
                    (name, value)
                }
            })
            .collect();
        composite_set_params(self, "estimators", params)
    }
}

pub fn broken_voting() -> BrokenVotingRegressor {
    BrokenVotingRegressor::build(kwargs([(
        "estimators",
        Param::named_estimators(vec![
            ("mean", Box::new(dummy()) as Box<dyn Estimator>),
            ("median", Box::new(dummy_with("median")) as Box<dyn Estimator>),
        ]),
    )]))
    .expect("bind")
}

/// Route `tracing` output of the checks to the test writer. Honours
/// `RUST_LOG`; safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
