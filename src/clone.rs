//! Cloning: a fresh, unfitted estimator with the same parameters.
//!
//! Cloning goes through the public API only: the parameters are read with
//! `get_params(deep=False)`, cloned, and fed to the class's keyword
//! constructor. The constructor must store what it receives untouched; any
//! copy or replacement made during construction is reported.

use crate::error::ParamError;
use crate::estimator::{estimator_repr, Estimator};
use crate::params::ParamMap;
use crate::value::{Param, Value};
use thiserror::Error;

/// Why an estimator could not be cloned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CloneError {
    /// The object exposes no parameter retrieval.
    #[error(
        "Cannot clone object '{repr}' (type {class}): it does not seem to be a scikit-learn \
         estimator as it does not implement a 'get_params' method."
    )]
    MissingGetParams {
        /// Representation of the object
        repr: String,
        /// Class name
        class: String,
    },

    /// The constructor did not store a parameter as received.
    #[error(
        "Cannot clone object {repr}, as the constructor either does not set or modifies \
         parameter {name}"
    )]
    ParameterModified {
        /// Representation of the object
        repr: String,
        /// Offending parameter
        name: String,
    },

    /// Retrieval read an attribute that was never stored.
    #[error("{0}")]
    MissingAttribute(ParamError),

    /// The class cannot be constructed from keywords.
    #[error("{0}")]
    NotConstructible(ParamError),

    /// Any other failure raised by the estimator.
    #[error("{0}")]
    Param(ParamError),
}

impl From<ParamError> for CloneError {
    fn from(err: ParamError) -> Self {
        match err {
            ParamError::MissingAttribute { .. } => CloneError::MissingAttribute(err),
            ParamError::NotConstructible { .. } => CloneError::NotConstructible(err),
            other => CloneError::Param(other),
        }
    }
}

/// Clone an estimator.
///
/// A type-specific [`CloneHook`](crate::estimator::CloneHook) wins;
/// otherwise the estimator is rebuilt from its cloned parameters.
///
/// # Examples
///
/// ```
/// use estimator_checks::clone::clone;
/// use estimator_checks::minimal::EstimatorWithGetSetParams;
/// use estimator_checks::value::Param;
///
/// let param = Param::list(vec![Param::int(1)]);
/// let est = EstimatorWithGetSetParams::new(param.clone());
/// let cloned = clone(&est).unwrap();
///
/// let cloned = cloned.as_estimator().unwrap();
/// let new_param = cloned.attributes().get("param").unwrap().clone();
/// assert!(!new_param.is(&param));
/// assert!(new_param.value_eq(&param));
/// ```
pub fn clone(estimator: &dyn Estimator) -> Result<Param, CloneError> {
    if let Some(hook) = estimator.clone_hook() {
        return Ok(hook.clone_estimator());
    }
    clone_parametrized(estimator).map(Param::estimator)
}

/// Clone any parameter value, tolerating non-estimators.
///
/// Nested estimators are cloned, lists and tuples are rebuilt from cloned
/// elements, and everything else is deep-copied.
pub fn clone_param(param: &Param) -> Result<Param, CloneError> {
    match param.value() {
        Value::Estimator(_) => {
            let Some(est) = param.as_estimator() else {
                return Ok(param.deep_copy_fresh());
            };
            if let Some(hook) = est.clone_hook() {
                return Ok(hook.clone_estimator());
            }
            if est.get_params_op().is_none() {
                return Ok(param.deep_copy_fresh());
            }
            clone_parametrized(&**est).map(Param::estimator)
        }
        Value::Tuple(items) => Ok(Param::tuple(clone_items(items)?)),
        Value::List(_) => {
            let items = param.items().unwrap_or_default();
            Ok(Param::list(clone_items(&items)?))
        }
        _ => Ok(param.deep_copy_fresh()),
    }
}

fn clone_items(items: &[Param]) -> Result<Vec<Param>, CloneError> {
    items.iter().map(clone_param).collect()
}

fn clone_parametrized(estimator: &dyn Estimator) -> Result<Box<dyn Estimator>, CloneError> {
    let class = estimator.class();
    let getter = estimator
        .get_params_op()
        .ok_or_else(|| CloneError::MissingGetParams {
            repr: estimator_repr(estimator),
            class: class.name.to_string(),
        })?;

    let mut new_params = ParamMap::new();
    for (name, value) in getter.get_params(false)?.iter() {
        new_params.insert(name, clone_param(value)?);
    }

    let constructor = class.constructor.ok_or_else(|| ParamError::NotConstructible {
        class: class.name.to_string(),
    })?;
    let new_object = constructor(new_params.clone())?;

    let params_set = match new_object.get_params_op() {
        Some(getter) => getter.get_params(false)?,
        None => ParamMap::new(),
    };
    for (name, passed) in new_params.iter() {
        let stored = params_set.get(name);
        if !stored.is_some_and(|stored| stored.is(passed)) {
            return Err(CloneError::ParameterModified {
                repr: estimator_repr(estimator),
                name: name.to_string(),
            });
        }
    }
    Ok(new_object)
}
