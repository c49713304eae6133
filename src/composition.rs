//! Parameter handling for estimators composed of named sub-estimators.
//!
//! A composite stores its components in one attribute as a list of
//! `(name, estimator)` pairs. Deep retrieval exposes every component under
//! its name along with its own parameters as `name__key`; mutation can
//! replace the whole list, replace single components by name, or reach into
//! a component.

use crate::error::ParamError;
use crate::estimator::{base_get_params, base_set_params, Estimator};
use crate::params::ParamMap;
use crate::value::{Param, Value};

/// `(name handle, name, component)` for each well-formed pair of `items`.
fn named_components(items: &Param) -> Vec<(Param, String, Param)> {
    items
        .items()
        .unwrap_or_default()
        .into_iter()
        .filter_map(|pair| {
            let pair = pair.items()?;
            let [name, component] = pair.as_slice() else {
                return None;
            };
            match name.value() {
                Value::Str(s) => Some((name.clone(), s.clone(), component.clone())),
                _ => None,
            }
        })
        .collect()
}

/// Deep retrieval of a composite whose components live in attribute `attr`.
pub fn composite_get_params(
    estimator: &dyn Estimator,
    attr: &str,
    deep: bool,
) -> Result<ParamMap, ParamError> {
    let mut out = base_get_params(estimator, deep)?;
    if !deep {
        return Ok(out);
    }
    let Some(items) = estimator.attributes().get(attr).cloned() else {
        return Ok(out);
    };
    let components = named_components(&items);
    for (_, name, component) in &components {
        out.insert(name.as_str(), component.clone());
    }
    for (_, name, component) in components {
        if let Some(nested) = component.nested_params(true) {
            for (key, value) in nested? {
                out.insert(format!("{name}__{key}"), value);
            }
        }
    }
    Ok(out)
}

/// Mutation of a composite whose components live in attribute `attr`.
///
/// The list itself is assigned first, then components named directly are
/// swapped in, and everything else goes through the base behaviour.
pub fn composite_set_params<'a>(
    estimator: &'a mut dyn Estimator,
    attr: &str,
    mut params: ParamMap,
) -> Result<&'a mut dyn Estimator, ParamError> {
    if let Some(items) = params.remove(attr) {
        estimator.attributes_mut().set(attr, items);
    }

    if let Some(items) = estimator.attributes().get(attr).cloned() {
        let components = named_components(&items);
        let replaced: Vec<(String, Param)> = components
            .iter()
            .filter_map(|(_, name, _)| params.remove(name).map(|value| (name.clone(), value)))
            .collect();
        for (name, value) in replaced {
            replace_component(estimator, attr, &name, value);
        }
    }

    base_set_params(estimator, params)
}

/// Rebuild the list in `attr` with component `name` swapped for `value`.
/// The name handle of the replaced pair is reused.
fn replace_component(estimator: &mut dyn Estimator, attr: &str, name: &str, value: Param) {
    let Some(items) = estimator.attributes().get(attr).and_then(Param::items) else {
        return;
    };
    let mut new_items = items;
    if let Some(slot) = new_items.iter_mut().find(|pair| {
        pair.items()
            .and_then(|p| p.first().cloned())
            .is_some_and(|n| matches!(n.value(), Value::Str(s) if s == name))
    }) {
        let name_handle = slot
            .items()
            .and_then(|p| p.first().cloned())
            .unwrap_or_else(|| Param::str(name));
        *slot = Param::tuple(vec![name_handle, value]);
    }
    estimator.attributes_mut().set(attr, Param::list(new_items));
}
