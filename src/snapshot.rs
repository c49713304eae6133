//! Parameter snapshots.
//!
//! A *shallow* snapshot is what `get_params(deep=False)` returns; a *deep*
//! snapshot also contains the parameters of every nested estimator under
//! `outer__inner` names. [`expand_deep`] rebuilds the deep snapshot from
//! shallow ones with a last-in-first-out worklist, which is the reference
//! the object's own deep retrieval is compared against.

use crate::error::{ContractViolation, DocSection, Result, ViolationKind};
use crate::estimator::{Estimator, GetParams};
use crate::params::ParamMap;
use crate::value::Param;

/// The retrieval capability of `estimator`, validated against its contract:
/// the operation exists and declares a `deep` toggle defaulting to `True`.
pub fn retrieval<'a>(name: &str, estimator: &'a dyn Estimator) -> Result<&'a dyn GetParams> {
    let getter = estimator.get_params_op().ok_or_else(|| {
        ContractViolation::new(
            ViolationKind::MissingOperation,
            name,
            DocSection::GetSetParams,
            format!("Estimator {name} should have a `get_params` method."),
        )
    })?;

    let signature = getter.get_params_signature();
    let Some(deep) = signature.get("deep") else {
        return Err(ContractViolation::new(
            ViolationKind::SignatureViolation,
            name,
            DocSection::GetSetParams,
            format!(
                "Estimator {name} implements a `get_params` method. However this method does \
                 not have a `deep` optional parameter. This parameter should be set to True by \
                 default."
            ),
        ));
    };
    let true_default = Param::bool(true);
    match deep.default() {
        Some(default) if default.is(&true_default) => Ok(getter),
        other => {
            let shown = other.map_or_else(|| "<no default>".to_string(), ToString::to_string);
            Err(ContractViolation::new(
                ViolationKind::SignatureViolation,
                name,
                DocSection::GetSetParams,
                format!(
                    "Estimator {name} implements a `get_params` method with the `deep` optional \
                     parameter. However this parameter is not set to True by default and it is \
                     instead set to {shown}."
                ),
            ))
        }
    }
}

/// `get_params(deep=False)` of `estimator`.
pub fn shallow(name: &str, estimator: &dyn Estimator) -> Result<ParamMap> {
    retrieve(name, estimator, false)
}

/// `get_params(deep=True)` of `estimator`.
pub fn deep(name: &str, estimator: &dyn Estimator) -> Result<ParamMap> {
    retrieve(name, estimator, true)
}

fn retrieve(name: &str, estimator: &dyn Estimator, deep: bool) -> Result<ParamMap> {
    retrieval(name, estimator)?
        .get_params(deep)
        .map_err(|err| {
            ContractViolation::operation_failed(name, DocSection::GetSetParams, "get_params", err)
        })
}

/// Deep snapshot rebuilt from shallow snapshots.
///
/// A stack is seeded with the root. Each popped component contributes its
/// shallow parameters, under their bare names for the root and as
/// `prefix__key` below it; every parameter-bearing value among them is
/// pushed with its public name as the prefix of the next round.
pub fn expand_deep(name: &str, estimator: &dyn Estimator) -> Result<ParamMap> {
    let mut expected = shallow(name, estimator)?;
    let mut stack = vec![(name.to_string(), Component::Root(estimator))];
    let mut nesting_level = 0usize;

    while let Some((prefix, component)) = stack.pop() {
        let params = component.shallow_params(name)?;
        tracing::trace!(
            estimator = name,
            component = %prefix,
            nesting_level,
            n_params = params.len(),
            "expanding parameters"
        );
        for (key, value) in params {
            let public_name = if nesting_level > 0 {
                format!("{prefix}__{key}")
            } else {
                key
            };
            expected.insert(public_name.clone(), value.clone());
            if value.exposes_params() {
                stack.push((public_name, Component::Nested(value)));
            }
        }
        nesting_level += 1;
    }
    Ok(expected)
}

enum Component<'a> {
    Root(&'a dyn Estimator),
    Nested(Param),
}

impl Component<'_> {
    fn shallow_params(&self, name: &str) -> Result<ParamMap> {
        match self {
            Component::Root(estimator) => shallow(name, *estimator),
            Component::Nested(value) => match value.nested_params(false) {
                Some(params) => params.map_err(|err| {
                    ContractViolation::operation_failed(
                        name,
                        DocSection::GetSetParams,
                        "get_params",
                        err,
                    )
                }),
                None => Ok(ParamMap::new()),
            },
        }
    }
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
