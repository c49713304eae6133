//! The candidate object model: class schemas, the [`Estimator`] trait and
//! its optional capabilities.
//!
//! Types opt into each operation of the API contract by returning `Some`
//! from the matching capability query. A missing capability is an explicit
//! fact the checks can report, not a probe that may fail at runtime.
//!
//! # Examples
//!
//! ```
//! use estimator_checks::estimator::{Class, Estimator, GetParams, base_get_params};
//! use estimator_checks::params::{Attributes, ParamMap};
//! use estimator_checks::reflect::{ParameterDescriptor, Signature};
//! use estimator_checks::value::Param;
//! use estimator_checks::attribute_backed_estimator;
//!
//! fn init() -> Signature {
//!     Signature::init(vec![ParameterDescriptor::optional("alpha", Param::float(1.0))])
//! }
//!
//! static SHRINK: Class = Class { init: Some(init), ..Class::new("Shrink") };
//!
//! #[derive(Debug)]
//! struct Shrink {
//!     attrs: Attributes,
//! }
//!
//! impl Estimator for Shrink {
//!     attribute_backed_estimator!(SHRINK);
//!
//!     fn get_params_op(&self) -> Option<&dyn GetParams> {
//!         Some(self)
//!     }
//! }
//!
//! impl GetParams for Shrink {
//!     fn get_params(&self, deep: bool) -> Result<ParamMap, estimator_checks::error::ParamError> {
//!         base_get_params(self, deep)
//!     }
//! }
//!
//! let est = Shrink { attrs: [("alpha", Param::float(0.5))].into_iter().collect() };
//! let params = est.get_params(true).unwrap();
//! assert_eq!(params.to_string(), "{'alpha': 0.5}");
//! ```

use crate::error::ParamError;
use crate::params::{Attributes, ParamMap};
use crate::reflect::{self, Signature};
use crate::value::{CopyMemo, Param};
use std::any::Any;
use std::fmt;

/// Keyword constructor registered by a class.
pub type Constructor = fn(ParamMap) -> Result<Box<dyn Estimator>, ParamError>;

/// Static schema of a candidate type.
///
/// This is the explicit declaration mechanism that stands in for runtime
/// reflection: the initializer signature, the ancestor chain and the
/// class-level markers are registered once per type.
pub struct Class {
    /// Type name
    pub name: &'static str,
    /// Initializer signature, `None` when the initializer is opaque
    pub init: Option<fn() -> Signature>,
    /// Direct base classes, most specific first
    pub bases: &'static [&'static Class],
    /// Names of parameters that have no default, inherited by subclasses
    pub required_parameters: Option<&'static [&'static str]>,
    /// Keyword constructor used when cloning
    pub constructor: Option<Constructor>,
    /// Checks expected to fail for this type, with the reason
    pub xfail_checks: &'static [(&'static str, &'static str)],
}

impl Class {
    /// Schema with only a name. Meant as the base of struct-update syntax.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            init: None,
            bases: &[],
            required_parameters: None,
            constructor: None,
            xfail_checks: &[],
        }
    }

    /// Ancestor chain starting with the class itself, depth-first and
    /// left-to-right, without duplicates.
    pub fn mro(&'static self) -> Vec<&'static Class> {
        let mut order: Vec<&'static Class> = Vec::new();
        let mut stack = vec![self];
        while let Some(class) = stack.pop() {
            if order.iter().any(|seen| std::ptr::eq(*seen, class)) {
                continue;
            }
            order.push(class);
            stack.extend(class.bases.iter().rev().copied());
        }
        order
    }

    /// `required_parameters` marker, looked up along the ancestor chain.
    pub fn required_parameters(&'static self) -> Option<&'static [&'static str]> {
        self.mro()
            .into_iter()
            .find_map(|class| class.required_parameters)
    }

    /// Reason this class is expected to fail `check`, if any.
    pub fn xfail_reason(&'static self, check: &str) -> Option<&'static str> {
        self.mro().into_iter().find_map(|class| {
            class
                .xfail_checks
                .iter()
                .find(|(name, _)| *name == check)
                .map(|(_, reason)| *reason)
        })
    }

    /// Whether `other` is this very class.
    pub fn is(&self, other: &Class) -> bool {
        std::ptr::eq(self, other)
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("name", &self.name)
            .field("introspectable", &self.init.is_some())
            .field(
                "bases",
                &self.bases.iter().map(|b| b.name).collect::<Vec<_>>(),
            )
            .field("required_parameters", &self.required_parameters)
            .finish_non_exhaustive()
    }
}

/// An object under conformance test.
///
/// The mandatory methods describe the object itself; the `*_op` methods are
/// capability queries for the operations of the contract.
pub trait Estimator: Any + fmt::Debug {
    /// Class schema of the concrete type.
    fn class(&self) -> &'static Class;

    /// Attributes currently set on the instance.
    fn attributes(&self) -> &Attributes;

    /// Mutable access to the attributes.
    fn attributes_mut(&mut self) -> &mut Attributes;

    /// Full independent duplicate, sharing `memo` with the caller.
    fn deep_copy(&self, memo: &mut CopyMemo) -> Box<dyn Estimator>;

    /// Upcast for concrete type comparisons.
    fn as_any(&self) -> &dyn Any;

    /// Parameter retrieval capability.
    fn get_params_op(&self) -> Option<&dyn GetParams> {
        None
    }

    /// Parameter mutation capability.
    fn set_params_op(&mut self) -> Option<&mut dyn SetParams> {
        None
    }

    /// Custom cloning capability.
    fn clone_hook(&self) -> Option<&dyn CloneHook> {
        None
    }

    /// Training capability.
    fn fit_op(&mut self) -> Option<&mut dyn Fit> {
        None
    }
}

/// Parameter retrieval.
pub trait GetParams {
    /// Current parameters. With `deep`, parameters of nested estimators are
    /// inlined under `outer__inner` names.
    fn get_params(&self, deep: bool) -> Result<ParamMap, ParamError>;

    /// Declared signature of [`GetParams::get_params`].
    ///
    /// The default declares a `deep` toggle defaulting to `True`.
    fn get_params_signature(&self) -> Signature {
        Signature::get_params()
    }
}

/// Parameter mutation.
pub trait SetParams {
    /// Apply `params` and return the object that was mutated.
    fn set_params(&mut self, params: ParamMap) -> Result<&mut dyn Estimator, ParamError>;
}

/// Type-specific cloning.
pub trait CloneHook {
    /// Produce the clone. Anything may come back; checks verify the type.
    fn clone_estimator(&self) -> Param;
}

/// Training entry point.
pub trait Fit {
    /// Fit on rows of `x` and optional targets `y`.
    fn fit(&mut self, x: &[Vec<f64>], y: Option<&[f64]>) -> Result<(), ParamError>;
}

/// Full independent duplicate of `estimator`.
pub fn deepcopy(estimator: &dyn Estimator) -> Box<dyn Estimator> {
    estimator.deep_copy(&mut CopyMemo::default())
}

/// Whether two estimators have the same concrete type.
pub fn same_type(a: &dyn Estimator, b: &dyn Estimator) -> bool {
    a.as_any().type_id() == b.as_any().type_id()
}

/// Parameter retrieval backed by the instance attributes.
///
/// Each declared initializer parameter is read from the attribute of the
/// same name. In deep mode, values exposing retrieval themselves contribute
/// their own (deep) parameters as `name__key`.
pub fn base_get_params(estimator: &dyn Estimator, deep: bool) -> Result<ParamMap, ParamError> {
    let class = estimator.class();
    let mut out = ParamMap::new();
    for descriptor in reflect::declared_parameters(class) {
        let name = descriptor.name();
        let value = estimator
            .attributes()
            .get(name)
            .cloned()
            .ok_or_else(|| ParamError::MissingAttribute {
                class: class.name.to_string(),
                name: name.to_string(),
            })?;
        if deep {
            if let Some(nested) = value.nested_params(true) {
                for (key, nested_value) in nested? {
                    out.insert(format!("{name}__{key}"), nested_value);
                }
            }
        }
        out.insert(name, value);
    }
    Ok(out)
}

/// Parameter mutation backed by the instance attributes.
///
/// Names are validated against the object's own deep retrieval. Plain
/// names are assigned first; `outer__inner` names are then routed to the
/// nested estimator stored under `outer`. An empty call is a no-op.
pub fn base_set_params(
    estimator: &mut dyn Estimator,
    params: ParamMap,
) -> Result<&mut dyn Estimator, ParamError> {
    if params.is_empty() {
        return Ok(estimator);
    }
    let mut valid = match estimator.get_params_op() {
        Some(getter) => getter.get_params(true)?,
        None => base_get_params(estimator, true)?,
    };

    let mut nested: Vec<(String, ParamMap)> = Vec::new();
    for (key, value) in params {
        let (outer, inner) = match key.split_once("__") {
            Some((outer, inner)) => (outer.to_string(), Some(inner.to_string())),
            None => (key.clone(), None),
        };
        if !valid.contains_key(&outer) {
            return Err(ParamError::InvalidParameter {
                class: estimator.class().name.to_string(),
                name: outer,
                valid: valid.keys().map(ToString::to_string).collect(),
            });
        }
        match inner {
            Some(inner) => match nested.iter_mut().find(|(name, _)| *name == outer) {
                Some((_, sub_params)) => {
                    sub_params.insert(inner, value);
                }
                None => nested.push((outer, [(inner, value)].into_iter().collect())),
            },
            None => {
                estimator.attributes_mut().set(outer.clone(), value.clone());
                valid.insert(outer, value);
            }
        }
    }

    for (outer, sub_params) in nested {
        if let Some(target) = valid.get(&outer) {
            target.set_nested_params(&outer, sub_params)?;
        }
    }
    Ok(estimator)
}

/// Plain attribute assignment for every entry, without validation.
pub fn setattr_params(
    estimator: &mut dyn Estimator,
    params: ParamMap,
) -> Result<&mut dyn Estimator, ParamError> {
    for (key, value) in params {
        estimator.attributes_mut().set(key, value);
    }
    Ok(estimator)
}

/// Short representation: class name and the parameters that differ from
/// their declared defaults.
pub fn estimator_repr(estimator: &dyn Estimator) -> String {
    let class = estimator.class();
    let Some(getter) = estimator.get_params_op() else {
        return format!("{}()", class.name);
    };
    let Ok(params) = getter.get_params(false) else {
        return format!("{}()", class.name);
    };
    let changed: Vec<String> = params
        .iter()
        .filter(|(name, value)| match reflect::default_of(class, name) {
            Some(default) if value.is_scalar_nan() && default.is_scalar_nan() => false,
            Some(default) => !value.same_or_equal(&default),
            None => true,
        })
        .map(|(name, value)| format!("{name}={value}"))
        .collect();
    format!("{}({})", class.name, changed.join(","))
}

/// Implements the mandatory [`Estimator`] methods for a struct whose only
/// state is an `attrs: Attributes` field.
#[macro_export]
macro_rules! attribute_backed_estimator {
    ($class:expr) => {
        fn class(&self) -> &'static $crate::estimator::Class {
            &$class
        }

        fn attributes(&self) -> &$crate::params::Attributes {
            &self.attrs
        }

        fn attributes_mut(&mut self) -> &mut $crate::params::Attributes {
            &mut self.attrs
        }

        fn deep_copy(
            &self,
            memo: &mut $crate::value::CopyMemo,
        ) -> ::std::boxed::Box<dyn $crate::estimator::Estimator> {
            ::std::boxed::Box::new(Self {
                attrs: self.attrs.deep_copy(memo),
            })
        }

        fn as_any(&self) -> &dyn ::std::any::Any {
            self
        }
    };
}

#[cfg(test)]
#[path = "estimator_tests.rs"]
mod tests;
