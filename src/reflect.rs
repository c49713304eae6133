//! Reflection adapter over registered initializer signatures.
//!
//! Candidate types declare their initializer through [`Class::init`]. The
//! adapter turns that declaration into the ordered list of constructor
//! parameters, ignoring the receiver and variadic catch-alls, and walks the
//! ancestor chain to know which attribute names are legitimately inherited.
//!
//! Signatures are evaluated once per class and thread and then cached, so a
//! default value is one object for the whole lifetime of the thread, like a
//! function default evaluated at definition time.

use crate::error::ParamError;
use crate::estimator::Class;
use crate::params::ParamMap;
use crate::value::Param;
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

/// How an initializer parameter can be passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    /// Implicit reference to the object being built
    Receiver,
    /// Positional or keyword
    PositionalOrKeyword,
    /// Keyword only
    KeywordOnly,
    /// Variadic positional catch-all
    VarPositional,
    /// Variadic keyword catch-all
    VarKeyword,
}

impl ParamKind {
    /// Whether the parameter is a named, non-variadic one.
    pub fn is_declared(self) -> bool {
        matches!(self, ParamKind::PositionalOrKeyword | ParamKind::KeywordOnly)
    }
}

/// One parameter of a signature.
#[derive(Debug, Clone)]
pub struct ParameterDescriptor {
    name: String,
    kind: ParamKind,
    default: Option<Param>,
}

impl ParameterDescriptor {
    /// Positional-or-keyword parameter without a default.
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::PositionalOrKeyword,
            default: None,
        }
    }

    /// Positional-or-keyword parameter with a default.
    pub fn optional(name: impl Into<String>, default: Param) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::PositionalOrKeyword,
            default: Some(default),
        }
    }

    /// Keyword-only parameter with a default.
    pub fn keyword_only(name: impl Into<String>, default: Param) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::KeywordOnly,
            default: Some(default),
        }
    }

    /// The implicit receiver.
    pub fn receiver() -> Self {
        Self {
            name: "self".to_string(),
            kind: ParamKind::Receiver,
            default: None,
        }
    }

    /// `*args`.
    pub fn var_positional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::VarPositional,
            default: None,
        }
    }

    /// `**kwargs`.
    pub fn var_keyword(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::VarKeyword,
            default: None,
        }
    }

    /// Parameter name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Passing kind.
    pub fn kind(&self) -> ParamKind {
        self.kind
    }

    /// Default value, `None` for required parameters.
    pub fn default(&self) -> Option<&Param> {
        self.default.as_ref()
    }

    /// Whether the parameter has no default.
    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

/// Ordered parameters of a callable.
#[derive(Debug, Clone, Default)]
pub struct Signature {
    parameters: Vec<ParameterDescriptor>,
}

impl Signature {
    /// Signature with exactly these parameters.
    pub fn new(parameters: Vec<ParameterDescriptor>) -> Self {
        Self { parameters }
    }

    /// Initializer signature: the receiver followed by `parameters`.
    pub fn init(parameters: Vec<ParameterDescriptor>) -> Self {
        let mut all = Vec::with_capacity(parameters.len() + 1);
        all.push(ParameterDescriptor::receiver());
        all.extend(parameters);
        Self { parameters: all }
    }

    /// The conventional retrieval signature: `(self, deep=True)`.
    pub fn get_params() -> Self {
        Self::new(vec![
            ParameterDescriptor::receiver(),
            ParameterDescriptor::optional("deep", Param::bool(true)),
        ])
    }

    /// All parameters, including receiver and variadics.
    pub fn parameters(&self) -> &[ParameterDescriptor] {
        &self.parameters
    }

    /// Look up a parameter by name.
    pub fn get(&self, name: &str) -> Option<&ParameterDescriptor> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Whether the signature accepts arbitrary keywords.
    pub fn accepts_var_keyword(&self) -> bool {
        self.parameters
            .iter()
            .any(|p| p.kind == ParamKind::VarKeyword)
    }
}

thread_local! {
    static SIGNATURES: RefCell<HashMap<usize, Rc<Signature>>> = RefCell::new(HashMap::new());
}

/// Initializer signature of `class`, or `None` when it is not introspectable.
pub fn try_introspect(class: &'static Class) -> Option<Rc<Signature>> {
    let init = class.init?;
    let key = class as *const Class as usize;
    if let Some(cached) = SIGNATURES.with(|cache| cache.borrow().get(&key).cloned()) {
        return Some(cached);
    }
    // Evaluated outside the cache borrow: a factory may introspect other
    // classes to build nested defaults.
    let signature = Rc::new(init());
    Some(SIGNATURES.with(|cache| {
        Rc::clone(cache.borrow_mut().entry(key).or_insert(signature))
    }))
}

/// Declared constructor parameters of `class`, in order.
///
/// The receiver and variadic catch-alls are excluded; an opaque initializer
/// yields an empty list.
pub fn declared_parameters(class: &'static Class) -> Vec<ParameterDescriptor> {
    try_introspect(class).map_or_else(Vec::new, |sig| {
        sig.parameters()
            .iter()
            .filter(|p| p.kind().is_declared())
            .cloned()
            .collect()
    })
}

/// Union of declared parameter names over the whole ancestor chain.
pub fn declared_parameters_of_ancestors(class: &'static Class) -> BTreeSet<String> {
    class
        .mro()
        .into_iter()
        .flat_map(declared_parameters)
        .map(|p| p.name)
        .collect()
}

/// Declared default of parameter `name`.
pub fn default_of(class: &'static Class, name: &str) -> Option<Param> {
    try_introspect(class)?.get(name)?.default().cloned()
}

/// Bind keyword arguments to the declared parameters of `class`.
///
/// Missing arguments take their declared default (the very default object).
/// Extra keywords are kept only when the initializer accepts `**kwargs`.
pub fn bind_arguments(class: &'static Class, mut kwargs: ParamMap) -> Result<ParamMap, ParamError> {
    let signature = try_introspect(class).unwrap_or_default();
    let mut bound = ParamMap::new();
    for descriptor in signature.parameters().iter().filter(|p| p.kind().is_declared()) {
        let value = match kwargs.remove(descriptor.name()) {
            Some(value) => value,
            None => descriptor
                .default()
                .cloned()
                .ok_or_else(|| ParamError::MissingArgument {
                    class: class.name.to_string(),
                    name: descriptor.name().to_string(),
                })?,
        };
        bound.insert(descriptor.name(), value);
    }
    if let Some(extra) = kwargs.keys().next() {
        if !signature.accepts_var_keyword() {
            return Err(ParamError::UnexpectedArgument {
                class: class.name.to_string(),
                name: extra.to_string(),
            });
        }
    }
    bound.extend_from(&kwargs);
    Ok(bound)
}
