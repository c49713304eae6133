//! Isolated mutation probe.
//!
//! One parameter at a time is set to a sentinel value on a duplicate of the
//! estimator. Afterwards the target must hold exactly the sentinel object,
//! and every other parameter must still be the object it was before. This
//! catches mutators that coerce, normalise or copy values.

use crate::config::Sentinel;
use crate::error::{ContractViolation, DocSection, Result, ViolationKind};
use crate::estimator::{deepcopy, Estimator};
use crate::params::ParamMap;
use crate::round_trip::apply;
use crate::snapshot;
use crate::value::Param;

/// Set `param_name` to `sentinel` on a duplicate of `estimator` and verify
/// that nothing else moved.
pub fn verify_isolated_mutation(
    name: &str,
    estimator: &dyn Estimator,
    param_name: &str,
    sentinel: &Param,
) -> Result<()> {
    let mut probe = deepcopy(estimator);
    let original = snapshot::shallow(name, probe.as_ref())?;

    // Re-applying the current parameters must be a no-op.
    apply(name, probe.as_mut(), original.clone())?;
    let mut update = ParamMap::new();
    update.insert(param_name, sentinel.clone());
    apply(name, probe.as_mut(), update)?;

    let current = snapshot::shallow(name, probe.as_ref())?;
    let original_names = original.key_set();
    let current_names = current.key_set();
    if original_names != current_names {
        let diff: Vec<_> = original_names
            .symmetric_difference(&current_names)
            .collect();
        return Err(ContractViolation::new(
            ViolationKind::KeySetMismatch,
            name,
            DocSection::GetSetParams,
            format!(
                "Estimator {name} does not implement properly `get_params` and `set_params`. \
                 After setting parameters, `get_params` does not return the same set of \
                 parameters. The problematic parameter(s) is(are): {diff:?}."
            ),
        ));
    }

    for (current_name, current_value) in current.iter() {
        let expected = if current_name == param_name {
            sentinel
        } else {
            match original.get(current_name) {
                Some(value) => value,
                None => continue,
            }
        };
        if !current_value.is(expected) {
            return Err(ContractViolation::new(
                ViolationKind::Identity,
                name,
                DocSection::GetSetParams,
                format!(
                    "Estimator {name} does not implement properly `get_params` and `set_params`. \
                     The parameter `{current_name}` was not set properly set. The memory address \
                     of the parameter changed (expected {expected}, got {current_value}) after \
                     setting `{param_name}` to {sentinel}."
                ),
            ));
        }
    }
    Ok(())
}

/// Probe every shallow parameter against every sentinel.
///
/// One sentinel object is materialised per sentinel kind and reused across
/// parameters.
pub fn probe_all(name: &str, estimator: &dyn Estimator, sentinels: &[Sentinel]) -> Result<()> {
    let param_names: Vec<String> = snapshot::shallow(name, estimator)?
        .keys()
        .map(ToString::to_string)
        .collect();
    let values: Vec<Param> = sentinels.iter().map(|s| s.materialize()).collect();

    for param_name in &param_names {
        for sentinel in &values {
            tracing::trace!(estimator = name, parameter = %param_name, sentinel = %sentinel, "probing isolated mutation");
            verify_isolated_mutation(name, estimator, param_name, sentinel)?;
        }
    }
    Ok(())
}
