//! Parameter values with explicit identity.
//!
//! The API contract is phrased in terms of object identity ("the stored value
//! is the very object that was passed in"). Plain Rust values have no
//! identity, so every parameter value lives behind a [`Param`] handle and
//! identity is handle identity.
//!
//! # Examples
//!
//! ```
//! use estimator_checks::value::Param;
//!
//! let a = Param::list(vec![Param::int(1), Param::int(2)]);
//! let b = a.clone();
//! let c = a.deep_copy_fresh();
//!
//! assert!(a.is(&b));           // same handle
//! assert!(!a.is(&c));          // copied list is a new object
//! assert!(a.value_eq(&c));     // ...with equal content
//! ```

use crate::estimator::{estimator_repr, Estimator};
use crate::error::ParamError;
use crate::params::ParamMap;
use std::cell::{Ref, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Fixed-width numeric-library scalar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    /// 32-bit signed integer
    I32(i32),
    /// 64-bit signed integer
    I64(i64),
    /// 8-bit unsigned integer
    U8(u8),
    /// 32-bit float
    F32(f32),
    /// 64-bit float
    F64(f64),
}

impl Scalar {
    /// Numeric value widened to `f64`.
    pub fn as_f64(self) -> f64 {
        match self {
            Scalar::I32(v) => f64::from(v),
            #[allow(clippy::cast_precision_loss)]
            Scalar::I64(v) => v as f64,
            Scalar::U8(v) => f64::from(v),
            Scalar::F32(v) => f64::from(v),
            Scalar::F64(v) => v,
        }
    }

    /// Whether the scalar is a floating point NaN.
    pub fn is_nan(self) -> bool {
        match self {
            Scalar::F32(v) => v.is_nan(),
            Scalar::F64(v) => v.is_nan(),
            _ => false,
        }
    }

    /// Type name as exposed by the numeric library.
    pub fn type_name(self) -> &'static str {
        match self {
            Scalar::I32(_) => "int32",
            Scalar::I64(_) => "int64",
            Scalar::U8(_) => "uint8",
            Scalar::F32(_) => "float32",
            Scalar::F64(_) => "float64",
        }
    }
}

/// A named plain function usable as a parameter value.
#[derive(Clone, Copy)]
pub struct Callable {
    name: &'static str,
    func: fn(f64) -> f64,
}

impl Callable {
    /// Wrap a function under a display name.
    pub fn new(name: &'static str, func: fn(f64) -> f64) -> Self {
        Self { name, func }
    }

    /// Display name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Invoke the function.
    pub fn call(&self, x: f64) -> f64 {
        (self.func)(x)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<function {}>", self.name)
    }
}

/// Kind of a parameter value, used by the default-value rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// `None`
    None,
    /// Boolean
    Bool,
    /// Integer
    Int,
    /// Float
    Float,
    /// String
    Str,
    /// Numeric-library scalar
    Scalar,
    /// Immutable sequence
    Tuple,
    /// Mutable sequence
    List,
    /// Numeric array
    Array,
    /// Type object
    Type,
    /// Function
    Callable,
    /// Nested estimator
    Estimator,
}

impl ValueKind {
    /// Kinds a constructor parameter may default to.
    pub const ALLOWED_DEFAULTS: [ValueKind; 8] = [
        ValueKind::Str,
        ValueKind::Int,
        ValueKind::Float,
        ValueKind::Bool,
        ValueKind::Tuple,
        ValueKind::None,
        ValueKind::Type,
        ValueKind::Scalar,
    ];

    /// Whether a default of this kind is accepted.
    ///
    /// Callables are mutable in principle but accepted; the implementation
    /// is trusted not to change their state.
    pub fn is_allowed_default(self) -> bool {
        self == ValueKind::Callable || Self::ALLOWED_DEFAULTS.contains(&self)
    }

    /// Type name used in diagnostics.
    pub fn type_name(self) -> &'static str {
        match self {
            ValueKind::None => "NoneType",
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::Str => "str",
            ValueKind::Scalar => "number",
            ValueKind::Tuple => "tuple",
            ValueKind::List => "list",
            ValueKind::Array => "ndarray",
            ValueKind::Type => "type",
            ValueKind::Callable => "function",
            ValueKind::Estimator => "estimator",
        }
    }
}

/// The content of a [`Param`].
#[derive(Debug)]
pub enum Value {
    /// Absence of a value
    None,
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Float
    Float(f64),
    /// String
    Str(String),
    /// Numeric-library scalar
    Scalar(Scalar),
    /// Immutable sequence
    Tuple(Vec<Param>),
    /// Mutable sequence
    List(RefCell<Vec<Param>>),
    /// 1-D numeric array
    Array(Vec<f64>),
    /// Type object, by name
    Type(&'static str),
    /// Function
    Callable(Callable),
    /// Nested estimator
    Estimator(RefCell<Box<dyn Estimator>>),
}

impl Value {
    /// Kind of the value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::None => ValueKind::None,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::Str(_) => ValueKind::Str,
            Value::Scalar(_) => ValueKind::Scalar,
            Value::Tuple(_) => ValueKind::Tuple,
            Value::List(_) => ValueKind::List,
            Value::Array(_) => ValueKind::Array,
            Value::Type(_) => ValueKind::Type,
            Value::Callable(_) => ValueKind::Callable,
            Value::Estimator(_) => ValueKind::Estimator,
        }
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            #[allow(clippy::cast_precision_loss)]
            Value::Int(i) => Some(*i as f64),
            Value::Float(x) => Some(*x),
            Value::Scalar(s) => Some(s.as_f64()),
            _ => None,
        }
    }

    fn as_exact_int(&self) -> Option<i64> {
        match self {
            Value::Bool(b) => Some(i64::from(*b)),
            Value::Int(i) => Some(*i),
            Value::Scalar(Scalar::I32(v)) => Some(i64::from(*v)),
            Value::Scalar(Scalar::I64(v)) => Some(*v),
            Value::Scalar(Scalar::U8(v)) => Some(i64::from(*v)),
            _ => None,
        }
    }
}

/// Shared handle to a parameter value.
///
/// Cloning a `Param` clones the handle, not the value: both handles are the
/// same object for [`Param::is`].
#[derive(Clone)]
pub struct Param(Rc<Value>);

impl Param {
    /// Wrap a value in a fresh handle.
    pub fn new(value: Value) -> Self {
        Self(Rc::new(value))
    }

    /// `None`.
    pub fn none() -> Self {
        Self::new(Value::None)
    }

    /// Boolean.
    pub fn bool(value: bool) -> Self {
        Self::new(Value::Bool(value))
    }

    /// Integer.
    pub fn int(value: i64) -> Self {
        Self::new(Value::Int(value))
    }

    /// Float.
    pub fn float(value: f64) -> Self {
        Self::new(Value::Float(value))
    }

    /// String.
    pub fn str(value: impl Into<String>) -> Self {
        Self::new(Value::Str(value.into()))
    }

    /// Numeric-library scalar.
    pub fn scalar(value: Scalar) -> Self {
        Self::new(Value::Scalar(value))
    }

    /// Tuple.
    pub fn tuple(items: Vec<Param>) -> Self {
        Self::new(Value::Tuple(items))
    }

    /// List.
    pub fn list(items: Vec<Param>) -> Self {
        Self::new(Value::List(RefCell::new(items)))
    }

    /// Array.
    pub fn array(values: Vec<f64>) -> Self {
        Self::new(Value::Array(values))
    }

    /// Type object.
    pub fn type_object(name: &'static str) -> Self {
        Self::new(Value::Type(name))
    }

    /// Function.
    pub fn callable(callable: Callable) -> Self {
        Self::new(Value::Callable(callable))
    }

    /// Nested estimator.
    pub fn estimator(estimator: Box<dyn Estimator>) -> Self {
        Self::new(Value::Estimator(RefCell::new(estimator)))
    }

    /// A list of `(name, estimator)` pairs, the shape of composite parameters.
    pub fn named_estimators(items: Vec<(&str, Box<dyn Estimator>)>) -> Self {
        Self::list(
            items
                .into_iter()
                .map(|(name, est)| Param::tuple(vec![Param::str(name), Param::estimator(est)]))
                .collect(),
        )
    }

    /// The wrapped value.
    pub fn value(&self) -> &Value {
        &self.0
    }

    /// Kind of the wrapped value.
    pub fn kind(&self) -> ValueKind {
        self.0.kind()
    }

    /// Address of the handle, stable for the lifetime of the value.
    pub fn addr(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }

    /// Identity comparison.
    ///
    /// `None`, `True` and `False` are singletons: two handles holding them
    /// are always the same object.
    pub fn is(&self, other: &Param) -> bool {
        if Rc::ptr_eq(&self.0, &other.0) {
            return true;
        }
        match (self.value(), other.value()) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            _ => false,
        }
    }

    /// Whether the value is a float NaN (plain or numeric-library scalar).
    pub fn is_scalar_nan(&self) -> bool {
        match self.value() {
            Value::Float(x) => x.is_nan(),
            Value::Scalar(s) => s.is_nan(),
            _ => false,
        }
    }

    /// Value equality.
    ///
    /// Numbers compare across kinds, NaN never equals anything, sequences
    /// compare element-wise with an identity shortcut per element, arrays
    /// compare element-wise, and functions and estimators only equal
    /// themselves.
    pub fn value_eq(&self, other: &Param) -> bool {
        match (self.value(), other.value()) {
            (Value::None, Value::None) => true,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Tuple(a), Value::Tuple(b)) => seq_eq(a, b),
            (Value::List(a), Value::List(b)) => {
                if Rc::ptr_eq(&self.0, &other.0) {
                    return true;
                }
                match (a.try_borrow(), b.try_borrow()) {
                    (Ok(a), Ok(b)) => seq_eq(&a, &b),
                    _ => false,
                }
            }
            (Value::Array(a), Value::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x == y)
            }
            (Value::Type(a), Value::Type(b)) => a == b,
            (Value::Callable(_), Value::Callable(_))
            | (Value::Estimator(_), Value::Estimator(_)) => Rc::ptr_eq(&self.0, &other.0),
            (a, b) => match (a.as_exact_int(), b.as_exact_int()) {
                (Some(x), Some(y)) => x == y,
                _ => match (a.as_number(), b.as_number()) {
                    (Some(x), Some(y)) => x == y,
                    _ => false,
                },
            },
        }
    }

    /// Identity-or-equality, the comparison used when containers compare
    /// their members.
    pub fn same_or_equal(&self, other: &Param) -> bool {
        self.is(other) || self.value_eq(other)
    }

    /// Borrow the nested estimator, if this is one.
    pub fn as_estimator(&self) -> Option<Ref<'_, Box<dyn Estimator>>> {
        match self.value() {
            Value::Estimator(cell) => cell.try_borrow().ok(),
            _ => None,
        }
    }

    /// Elements of a tuple or list.
    pub fn items(&self) -> Option<Vec<Param>> {
        match self.value() {
            Value::Tuple(items) => Some(items.clone()),
            Value::List(items) => items.try_borrow().ok().map(|items| items.clone()),
            _ => None,
        }
    }

    /// Capability query: does the value expose parameter retrieval?
    pub fn exposes_params(&self) -> bool {
        self.as_estimator()
            .is_some_and(|est| est.get_params_op().is_some())
    }

    /// Retrieve the parameters of a nested estimator.
    ///
    /// Returns `None` when the value does not expose retrieval.
    pub fn nested_params(&self, deep: bool) -> Option<std::result::Result<ParamMap, ParamError>> {
        let est = self.as_estimator()?;
        let getter = est.get_params_op()?;
        Some(getter.get_params(deep))
    }

    /// Mutate the parameters of a nested estimator.
    pub fn set_nested_params(
        &self,
        path: &str,
        params: ParamMap,
    ) -> std::result::Result<(), ParamError> {
        let Value::Estimator(cell) = self.value() else {
            return Err(ParamError::InvalidValue(format!(
                "parameter '{path}' holds a {} and cannot receive nested parameters",
                self.kind().type_name()
            )));
        };
        let mut est = cell.try_borrow_mut().map_err(|_| ParamError::BorrowConflict {
            name: path.to_string(),
        })?;
        let class = est.class().name;
        let setter = est.set_params_op().ok_or_else(|| {
            ParamError::InvalidValue(format!(
                "nested estimator '{path}' of type {class} has no `set_params` method"
            ))
        })?;
        setter.set_params(params).map(|_| ())
    }

    /// Type name used in diagnostics; estimators report their class name.
    pub fn type_name(&self) -> String {
        match self.value() {
            Value::Scalar(s) => s.type_name().to_string(),
            Value::Estimator(cell) => cell
                .try_borrow()
                .map_or_else(|_| "estimator".to_string(), |e| e.class().name.to_string()),
            other => other.kind().type_name().to_string(),
        }
    }

    /// Deep copy with a fresh memo.
    pub fn deep_copy_fresh(&self) -> Param {
        self.deep_copy(&mut CopyMemo::default())
    }

    /// Deep copy.
    ///
    /// Atoms keep their handle; tuples are rebuilt only when an element
    /// changed; lists, arrays and estimators always get a new handle.
    /// Aliasing inside one copy operation is preserved through `memo`.
    pub fn deep_copy(&self, memo: &mut CopyMemo) -> Param {
        if let Some(copied) = memo.get(self) {
            return copied;
        }
        let copied = match self.value() {
            Value::None
            | Value::Bool(_)
            | Value::Int(_)
            | Value::Float(_)
            | Value::Str(_)
            | Value::Scalar(_)
            | Value::Type(_)
            | Value::Callable(_) => return self.clone(),
            Value::Tuple(items) => {
                let new_items: Vec<Param> = items.iter().map(|p| p.deep_copy(memo)).collect();
                if new_items.iter().zip(items).all(|(a, b)| a.is(b)) {
                    self.clone()
                } else {
                    Param::tuple(new_items)
                }
            }
            Value::List(items) => match items.try_borrow() {
                Ok(items) => {
                    let snapshot = items.clone();
                    drop(items);
                    Param::list(snapshot.iter().map(|p| p.deep_copy(memo)).collect())
                }
                // Mutably borrowed right now: the copy shares the handle.
                Err(_) => return self.clone(),
            },
            Value::Array(values) => Param::array(values.clone()),
            Value::Estimator(cell) => match cell.try_borrow() {
                Ok(est) => {
                    let copy = est.deep_copy(memo);
                    Param::estimator(copy)
                }
                Err(_) => return self.clone(),
            },
        };
        memo.insert(self, copied.clone());
        copied
    }
}

fn seq_eq(a: &[Param], b: &[Param]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_or_equal(y))
}

impl fmt::Debug for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

/// Renders the value the way the library prints reprs in diagnostics.
impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value() {
            Value::None => f.write_str("None"),
            Value::Bool(true) => f.write_str("True"),
            Value::Bool(false) => f.write_str("False"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write_float(f, *x),
            Value::Str(s) => write!(f, "'{s}'"),
            Value::Scalar(s) => match s {
                Scalar::F32(v) => write_float(f, f64::from(*v)),
                Scalar::F64(v) => write_float(f, *v),
                other => write!(f, "{}", other.as_f64()),
            },
            Value::Tuple(items) => {
                f.write_str("(")?;
                write_items(f, items)?;
                if items.len() == 1 {
                    f.write_str(",")?;
                }
                f.write_str(")")
            }
            Value::List(items) => match items.try_borrow() {
                Ok(items) => {
                    f.write_str("[")?;
                    write_items(f, &items)?;
                    f.write_str("]")
                }
                Err(_) => f.write_str("[...]"),
            },
            Value::Array(values) => {
                f.write_str("array([")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write_float(f, *v)?;
                }
                f.write_str("])")
            }
            Value::Type(name) => write!(f, "<class '{name}'>"),
            Value::Callable(c) => write!(f, "{c:?}"),
            Value::Estimator(cell) => match cell.try_borrow() {
                Ok(est) => f.write_str(&estimator_repr(est.as_ref())),
                Err(_) => f.write_str("<estimator>"),
            },
        }
    }
}

fn write_float(f: &mut fmt::Formatter<'_>, x: f64) -> fmt::Result {
    if x.is_nan() {
        f.write_str("nan")
    } else if x.is_infinite() {
        f.write_str(if x > 0.0 { "inf" } else { "-inf" })
    } else {
        write!(f, "{x:?}")
    }
}

fn write_items(f: &mut fmt::Formatter<'_>, items: &[Param]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

/// Memo of one deep-copy operation, keyed on handle address.
///
/// Originals are retained so that their addresses cannot be reused while the
/// memo is alive.
#[derive(Default)]
pub struct CopyMemo {
    copies: HashMap<usize, (Param, Param)>,
}

impl CopyMemo {
    fn get(&self, original: &Param) -> Option<Param> {
        self.copies
            .get(&original.addr())
            .map(|(_, copy)| copy.clone())
    }

    fn insert(&mut self, original: &Param, copy: Param) {
        self.copies
            .insert(original.addr(), (original.clone(), copy));
    }

    /// Number of memoised objects.
    pub fn len(&self) -> usize {
        self.copies.len()
    }

    /// Whether nothing was memoised yet.
    pub fn is_empty(&self) -> bool {
        self.copies.is_empty()
    }
}

impl fmt::Debug for CopyMemo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CopyMemo")
            .field("len", &self.copies.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "value_tests.rs"]
mod tests;
