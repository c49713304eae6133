//! Round trip `get_params(deep=True)` → `set_params` → `get_params(deep=True)`.
//!
//! Feeding an estimator its own deep parameters must hand back the very same
//! objects. Composed estimators hold their sub-estimators by reference;
//! a mutator that copies on every cycle would silently break that sharing.
//!
//! The reference snapshot is taken from a full duplicate so that a broken
//! mutator cannot corrupt it. Composite parameters (a list of `(name,
//! component)` pairs named in `required_parameters`) are compared pair by
//! pair, since rebuilding the list and its tuples is legitimate.

use crate::error::{ContractViolation, DocSection, Result, ViolationKind};
use crate::estimator::{deepcopy, Estimator, SetParams};
use crate::params::ParamMap;
use crate::snapshot;
use crate::value::{Param, Value};

/// Outcome of comparing one parameter across the round trip.
#[derive(Debug, Clone)]
pub struct IdentityRecord {
    /// Parameter name
    pub name: String,
    /// Value before the round trip
    pub before: Param,
    /// Value after the round trip
    pub after: Param,
    /// Whether the element-wise composite rule applied
    pub composite: bool,
}

impl IdentityRecord {
    /// Whether the identity rule holds for this parameter.
    pub fn is_preserved(&self) -> bool {
        if self.composite {
            composite_preserved(&self.before, &self.after)
        } else {
            self.before.is(&self.after)
        }
    }
}

/// Mutation capability of `estimator`, or a missing-operation violation.
pub fn mutator<'a>(name: &str, estimator: &'a mut dyn Estimator) -> Result<&'a mut dyn SetParams> {
    estimator.set_params_op().ok_or_else(|| {
        ContractViolation::new(
            ViolationKind::MissingOperation,
            name,
            DocSection::GetSetParams,
            format!("Estimator {name} should have a `set_params` method."),
        )
    })
}

/// Apply `params` through the mutation capability, discarding the returned
/// reference.
pub fn apply(name: &str, estimator: &mut dyn Estimator, params: ParamMap) -> Result<()> {
    mutator(name, estimator)?
        .set_params(params)
        .map(|_| ())
        .map_err(|err| {
            ContractViolation::operation_failed(name, DocSection::GetSetParams, "set_params", err)
        })
}

/// Run the round trip on `estimator`, mutating it in place.
pub fn verify_round_trip(name: &str, estimator: &mut dyn Estimator) -> Result<()> {
    let reference = deepcopy(estimator);
    let before = snapshot::deep(name, reference.as_ref())?;

    apply(name, estimator, before.clone())?;
    let after = snapshot::deep(name, estimator)?;

    let before_names = before.key_set();
    let after_names = after.key_set();
    if before_names != after_names {
        let diff: Vec<_> = before_names.symmetric_difference(&after_names).collect();
        return Err(ContractViolation::new(
            ViolationKind::KeySetMismatch,
            name,
            DocSection::GetSetParams,
            format!(
                "Estimator {name} does not implement properly `get_params` and `set_params`. \
                 The names of the parameters does not correspond after a round-trip \
                 get_params/set_params. The problematic parameter(s) is(are): {diff:?}."
            ),
        ));
    }

    let required = estimator.class().required_parameters().unwrap_or(&[]);
    for (key, after_value) in after.iter() {
        let Some(before_value) = before.get(key) else {
            continue;
        };
        let record = IdentityRecord {
            name: key.to_string(),
            before: before_value.clone(),
            after: after_value.clone(),
            composite: required.contains(&key) && is_composite(before_value),
        };
        if record.is_preserved() {
            continue;
        }
        tracing::debug!(estimator = name, parameter = key, composite = record.composite, "identity lost in round trip");
        let message = if record.composite {
            format!(
                "Estimator {name} does not implement properly `get_params` and `set_params`. \
                 The memory address of inner parameters has changed for the parameter `{key}`."
            )
        } else {
            format!(
                "Estimator {name} does not implement properly `get_params` and `set_params`. \
                 Implementing a round-trip get_params/set_params does not return the exact same \
                 object. The memory address of the parameter `{key}` has changed."
            )
        };
        return Err(ContractViolation::new(
            ViolationKind::Identity,
            name,
            DocSection::GetSetParams,
            message,
        ));
    }
    Ok(())
}

/// Whether `value` is a non-empty list whose first element is a tuple.
pub fn is_composite(value: &Param) -> bool {
    match value.value() {
        Value::List(items) => items
            .try_borrow()
            .ok()
            .and_then(|items| items.first().map(|first| matches!(first.value(), Value::Tuple(_))))
            .unwrap_or(false),
        _ => false,
    }
}

fn composite_preserved(before: &Param, after: &Param) -> bool {
    let (Some(before_pairs), Some(after_pairs)) = (before.items(), after.items()) else {
        return false;
    };
    after_pairs
        .iter()
        .zip(&before_pairs)
        .all(|(after_pair, before_pair)| match (after_pair.items(), before_pair.items()) {
            (Some(a), Some(b)) => a.iter().zip(&b).all(|(x, y)| x.is(y)),
            _ => after_pair.is(before_pair),
        })
}
