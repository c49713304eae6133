//! The six contract checks.
//!
//! Each check takes the display name of the candidate and the candidate
//! itself, and either returns `Ok(())` or the first [`ContractViolation`] it
//! detects. Checks are independent of each other; the ones that mutate work
//! on a duplicate, except the round trip which mutates its argument.

use crate::clone::{clone, CloneError};
use crate::config::CheckConfig;
use crate::error::{ContractViolation, DocSection, Result, ViolationKind};
use crate::estimator::{deepcopy, same_type, Estimator};
use crate::mutation;
use crate::params::ParamMap;
use crate::reflect::{declared_parameters, declared_parameters_of_ancestors};
use crate::round_trip::{self, mutator};
use crate::snapshot;
use crate::value::ValueKind;
use std::collections::BTreeSet;

/// Signature shared by all checks.
pub type CheckFn = fn(&str, &mut dyn Estimator) -> Result<()>;

/// Cloning yields a new instance of the very same type.
pub fn check_clone(name: &str, estimator: &mut dyn Estimator) -> Result<()> {
    let cloned = clone(estimator).map_err(|err| {
        let kind = match err {
            CloneError::MissingGetParams { .. } => ViolationKind::MissingOperation,
            _ => ViolationKind::OperationFailed,
        };
        let message = err.to_string();
        ContractViolation::new(kind, name, DocSection::Cloning, message).with_source(err)
    })?;

    let same_class = cloned
        .as_estimator()
        .is_some_and(|est| same_type(&**est, estimator));
    if !same_class {
        return Err(ContractViolation::new(
            ViolationKind::CloneTypeMismatch,
            name,
            DocSection::Cloning,
            format!(
                "Cloning an estimator should return an estimator instance of the same class. \
                 Got {} instead of {name}.",
                cloned.type_name()
            ),
        ));
    }
    Ok(())
}

/// Constructor parameters are stored untouched, carry allowed defaults, and
/// no public attribute besides them is set.
///
/// The comparison against declared defaults is only made for classes
/// without `required_parameters`; candidates with required arguments are
/// usually built with explicit values.
///
/// Destructive in-place changes of a caller-supplied list (for example
/// removing its first element) keep the list's identity and are not
/// detected.
pub fn check_parameter_init(name: &str, estimator: &mut dyn Estimator) -> Result<()> {
    if let Err(err) = clone(estimator) {
        let (kind, message) = match &err {
            CloneError::ParameterModified { .. } => (
                ViolationKind::MutationOnInit,
                format!("Estimator {name} should not modify the input attribute in any ways."),
            ),
            CloneError::MissingAttribute(_) => (
                ViolationKind::AttributeHygiene,
                format!("Estimator {name} should store all parameters as an attribute during init."),
            ),
            CloneError::MissingGetParams { .. } => (ViolationKind::MissingOperation, err.to_string()),
            _ => (
                ViolationKind::OperationFailed,
                format!("Estimator {name} could not be cloned: {err}."),
            ),
        };
        return Err(
            ContractViolation::new(kind, name, DocSection::ParametersInit, message).with_source(err),
        );
    }

    let class = estimator.class();
    let own = declared_parameters(class);
    let allowed_names = declared_parameters_of_ancestors(class);
    let invalid: BTreeSet<&str> = estimator
        .attributes()
        .public_names()
        .filter(|attr| !allowed_names.contains(*attr))
        .collect();
    if !invalid.is_empty() {
        return Err(ContractViolation::new(
            ViolationKind::AttributeHygiene,
            name,
            DocSection::ParametersInit,
            format!(
                "Estimator {name} should not set any attribute apart from parameters during \
                 init. Found attributes {:?}.",
                invalid.iter().collect::<Vec<_>>()
            ),
        ));
    }

    let required = class.required_parameters();
    let optional = &own[required.map_or(0, <[_]>::len).min(own.len())..];
    let stored = if required.is_none() && !optional.is_empty() {
        Some(stored_parameters(name, estimator)?)
    } else {
        None
    };

    for descriptor in optional {
        let param = descriptor.name();
        let Some(default) = descriptor.default() else {
            return Err(ContractViolation::new(
                ViolationKind::DefaultValueType,
                name,
                DocSection::ParametersInit,
                format!("Parameter {param} for {name} has no default value."),
            ));
        };

        if !default.kind().is_allowed_default() {
            let allowed: BTreeSet<&str> = ValueKind::ALLOWED_DEFAULTS
                .iter()
                .map(|kind| kind.type_name())
                .collect();
            return Err(ContractViolation::new(
                ViolationKind::DefaultValueType,
                name,
                DocSection::ParametersInit,
                format!(
                    "Parameter '{param}' of estimator '{name}' is of type {} which is not \
                     allowed. '{param}' must be a callable or must be of type {allowed:?}.",
                    default.type_name()
                ),
            ));
        }

        let Some(stored) = &stored else {
            continue;
        };
        let unchanged = stored.get(param).is_some_and(|value| {
            if value.is_scalar_nan() {
                value.is(default)
            } else {
                value.value_eq(default)
            }
        });
        if !unchanged {
            tracing::debug!(estimator = name, parameter = param, "stored value differs from default");
            return Err(ContractViolation::new(
                ViolationKind::MutationOnInit,
                name,
                DocSection::ParametersInit,
                format!(
                    "Parameter {param} was mutated on init. All parameters must be stored \
                     unchanged."
                ),
            ));
        }
    }
    Ok(())
}

// Plain retrieval; the shape of its signature belongs to `check_get_params`.
fn stored_parameters(name: &str, estimator: &dyn Estimator) -> Result<ParamMap> {
    let getter = estimator.get_params_op().ok_or_else(|| {
        ContractViolation::new(
            ViolationKind::MissingOperation,
            name,
            DocSection::ParametersInit,
            format!("Estimator {name} should have a `get_params` method."),
        )
    })?;
    getter.get_params(true).map_err(|err| {
        ContractViolation::operation_failed(name, DocSection::ParametersInit, "get_params", err)
    })
}

/// Retrieval exists with a `deep=True` toggle, matches the constructor
/// parameters, and its deep form is consistent with the shallow one.
pub fn check_get_params(name: &str, estimator: &mut dyn Estimator) -> Result<()> {
    snapshot::retrieval(name, estimator)?;

    let init_names: BTreeSet<String> = declared_parameters(estimator.class())
        .iter()
        .map(|p| p.name().to_string())
        .collect();
    let shallow = snapshot::shallow(name, estimator)?;
    let shallow_names = shallow.key_set();
    if init_names != shallow_names {
        let missing: Vec<_> = init_names.difference(&shallow_names).collect();
        let additional: Vec<_> = shallow_names.difference(&init_names).collect();
        let mut message = String::from(
            "The not an exact matching of the parameters between the `__init__` method and \
             the `get_params` method.",
        );
        if !missing.is_empty() {
            message.push_str(&format!(
                " The following parameters are defined in the `__init__` method but are \
                 missing from the `get_params` method: {missing:?}."
            ));
        }
        if !additional.is_empty() {
            message.push_str(&format!(
                " The following parameters are returned by the `get_params` method but are \
                 missing from the `__init__` method: {additional:?}."
            ));
        }
        return Err(ContractViolation::new(
            ViolationKind::KeySetMismatch,
            name,
            DocSection::GetSetParams,
            message,
        ));
    }

    let deep = snapshot::deep(name, estimator)?;
    if !shallow.is_subset_of(&deep) {
        return Err(ContractViolation::new(
            ViolationKind::KeySetMismatch,
            name,
            DocSection::GetSetParams,
            format!(
                "For estimator {name}, the parameters returned by `get_params` with \
                 `deep=False` are not a subset of the ones returned by `get_params` with \
                 `deep=True`."
            ),
        ));
    }

    // Lists of named components are covered by the round trip instead.
    if estimator.class().required_parameters().is_none() {
        let expected = snapshot::expand_deep(name, estimator)?;
        if !deep.same_items(&expected) {
            return Err(ContractViolation::new(
                ViolationKind::KeySetMismatch,
                name,
                DocSection::GetSetParams,
                format!(
                    "For estimator {name}, the parameters returned by `get_params(deep=True)` \
                     are incorrect. We would expect the following parameters:\n{}\n",
                    pformat(&expected)
                ),
            ));
        }
    }
    Ok(())
}

/// [`check_set_params_with`] using the default configuration.
pub fn check_set_params(name: &str, estimator: &mut dyn Estimator) -> Result<()> {
    check_set_params_with(name, estimator, &CheckConfig::default())
}

/// Mutation exists, returns the object it was called on, and changes
/// exactly the parameter it is asked to change.
pub fn check_set_params_with(
    name: &str,
    estimator: &mut dyn Estimator,
    config: &CheckConfig,
) -> Result<()> {
    mutator(name, estimator)?;

    let mut duplicate = deepcopy(estimator);
    let target: *const () = &*duplicate as *const _ as *const ();
    let returned = mutator(name, &mut *duplicate)?
        .set_params(ParamMap::new())
        .map_err(|err| {
            ContractViolation::operation_failed(name, DocSection::GetSetParams, "set_params", err)
        })?;
    let returned: *const () = &*returned as *const _ as *const ();
    if !std::ptr::eq(target, returned) {
        return Err(ContractViolation::new(
            ViolationKind::Identity,
            name,
            DocSection::GetSetParams,
            format!("Estimator {name} does not return `self` from `set_params`."),
        ));
    }

    mutation::probe_all(name, estimator, &config.sentinels)
}

/// Deep parameters survive a `set_params` round trip by identity.
pub fn check_round_trip_get_set_params(name: &str, estimator: &mut dyn Estimator) -> Result<()> {
    round_trip::verify_round_trip(name, estimator)
}

/// A training entry point exists.
pub fn check_fit(name: &str, estimator: &mut dyn Estimator) -> Result<()> {
    if estimator.fit_op().is_none() {
        return Err(ContractViolation::new(
            ViolationKind::MissingOperation,
            name,
            DocSection::FitApi,
            format!("Estimator {name} does not implement a `fit` method."),
        ));
    }
    Ok(())
}

/// One entry per line, sorted by name.
fn pformat(params: &ParamMap) -> String {
    let mut entries: Vec<_> = params.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    let body: Vec<String> = entries
        .iter()
        .map(|(key, value)| format!("'{key}': {value}"))
        .collect();
    format!("{{{}}}", body.join(",\n "))
}
