//! Declared type metadata.
//!
//! Constructor and method signatures are registered up front in a [`TypeTable`]
//! instead of being discovered at runtime. The container only ever asks an
//! [`Introspect`] implementation for a descriptor by type identifier, so other
//! sources (generated tables, plugin manifests) can be plugged in.

use alloc::{
    boxed::Box,
    collections::BTreeMap,
    string::String,
    sync::Arc,
    vec::Vec,
};
use core::{
    any::type_name,
    fmt::{self, Debug, Formatter},
};

use crate::{
    any::Instance,
    arguments::Arguments,
    errors::InstantiateErrorKind,
    value::Value,
};

pub trait Introspect {
    #[must_use]
    fn descriptor(&self, type_id: &str) -> Option<&TypeDescriptor>;

    #[inline]
    #[must_use]
    fn contains(&self, type_id: &str) -> bool {
        self.descriptor(type_id).is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamKind {
    /// Class-like type, auto-resolved by type identifier.
    Class(String),
    Scalar,
    Untyped,
}

#[derive(Debug, Clone)]
pub struct Parameter {
    pub key: String,
    pub kind: ParamKind,
    pub default: Option<Value>,
}

impl Parameter {
    #[inline]
    #[must_use]
    pub fn class(key: impl Into<String>, type_id: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            kind: ParamKind::Class(type_id.into()),
            default: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn scalar(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            kind: ParamKind::Scalar,
            default: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn untyped(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            kind: ParamKind::Untyped,
            default: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn class_type(&self) -> Option<&str> {
        match &self.kind {
            ParamKind::Class(type_id) => Some(type_id),
            ParamKind::Scalar | ParamKind::Untyped => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Concrete,
    Abstract,
    Interface,
}

pub(crate) type Constructor = Arc<dyn Fn(&Arguments) -> Result<Instance, InstantiateErrorKind> + Send + Sync>;

type MethodFn = Box<dyn Fn(&Instance, &Arguments) -> Result<Value, InstantiateErrorKind> + Send + Sync>;

pub struct MethodDescriptor {
    parameters: Vec<Parameter>,
    f: MethodFn,
}

impl MethodDescriptor {
    #[inline]
    #[must_use]
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    #[inline]
    pub(crate) fn invoke(&self, receiver: &Instance, arguments: &Arguments) -> Result<Value, InstantiateErrorKind> {
        (self.f)(receiver, arguments)
    }
}

impl Debug for MethodDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

/// Constructor signature, constructor and bound methods of one type identifier.
///
/// # Examples
/// ```rust
/// use wirefold::{Parameter, TypeDescriptor};
///
/// struct Logger;
/// struct Service {
///     logger: std::sync::Arc<Logger>,
///     dsn: String,
/// }
///
/// let logger = TypeDescriptor::new("Logger").constructor(|_| Ok(Logger));
/// let service = TypeDescriptor::new("Service")
///     .param(Parameter::class("logger", "Logger"))
///     .param(Parameter::scalar("dsn").with_default("sqlite::memory:"))
///     .constructor(|args| {
///         Ok(Service {
///             logger: args.object("logger")?,
///             dsn: args.str("dsn")?.to_owned(),
///         })
///     });
///
/// assert!(logger.is_instantiable());
/// assert_eq!(service.parameters().len(), 2);
/// ```
pub struct TypeDescriptor {
    type_id: String,
    kind: TypeKind,
    parameters: Vec<Parameter>,
    constructor: Option<Constructor>,
    methods: BTreeMap<String, MethodDescriptor>,
}

impl TypeDescriptor {
    #[inline]
    #[must_use]
    pub fn new(type_id: impl Into<String>) -> Self {
        Self::with_kind(type_id, TypeKind::Concrete)
    }

    #[inline]
    #[must_use]
    pub fn abstract_type(type_id: impl Into<String>) -> Self {
        Self::with_kind(type_id, TypeKind::Abstract)
    }

    #[inline]
    #[must_use]
    pub fn interface(type_id: impl Into<String>) -> Self {
        Self::with_kind(type_id, TypeKind::Interface)
    }

    fn with_kind(type_id: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            type_id: type_id.into(),
            kind,
            parameters: Vec::new(),
            constructor: None,
            methods: BTreeMap::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn param(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    #[inline]
    #[must_use]
    pub fn params(mut self, parameters: impl IntoIterator<Item = Parameter>) -> Self {
        self.parameters.extend(parameters);
        self
    }

    /// Sets the constructor. Built values are tagged with this descriptor's type identifier.
    #[must_use]
    pub fn constructor<T, F>(mut self, f: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Arguments) -> Result<T, InstantiateErrorKind> + Send + Sync + 'static,
    {
        let class: Arc<str> = Arc::from(self.type_id.as_str());
        self.constructor = Some(Arc::new(move |args: &Arguments| {
            f(args).map(|value| Instance::with_class(class.clone(), Arc::new(value)))
        }));
        self
    }

    /// Adds a bound method invoked on an object built from (or tagged with) this type.
    #[must_use]
    pub fn method<T, F>(mut self, name: impl Into<String>, parameters: impl IntoIterator<Item = Parameter>, f: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&T, &Arguments) -> Result<Value, InstantiateErrorKind> + Send + Sync + 'static,
    {
        let f: MethodFn = Box::new(move |receiver: &Instance, args: &Arguments| {
            let Some(this) = receiver.downcast_ref::<T>() else {
                return Err(InstantiateErrorKind::IncorrectArgument {
                    key: "self".into(),
                    expected: type_name::<T>(),
                });
            };
            f(this, args)
        });
        self.methods.insert(
            name.into(),
            MethodDescriptor {
                parameters: parameters.into_iter().collect(),
                f,
            },
        );
        self
    }

    #[inline]
    #[must_use]
    pub fn type_id(&self) -> &str {
        &self.type_id
    }

    #[inline]
    #[must_use]
    pub const fn kind(&self) -> TypeKind {
        self.kind
    }

    #[inline]
    #[must_use]
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Concrete and has a constructor.
    #[inline]
    #[must_use]
    pub fn is_instantiable(&self) -> bool {
        self.kind == TypeKind::Concrete && self.constructor.is_some()
    }

    #[inline]
    #[must_use]
    pub fn method_descriptor(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.get(name)
    }

    #[inline]
    pub(crate) fn constructor_fn(&self) -> Option<&Constructor> {
        self.constructor.as_ref()
    }
}

impl Debug for TypeDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("type_id", &self.type_id)
            .field("kind", &self.kind)
            .field("parameters", &self.parameters)
            .field("has_constructor", &self.constructor.is_some())
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[derive(Default, Debug)]
pub struct TypeTable {
    descriptors: BTreeMap<String, TypeDescriptor>,
}

impl TypeTable {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            descriptors: BTreeMap::new(),
        }
    }

    /// Adds a descriptor, replacing any previous one with the same type identifier.
    #[inline]
    #[must_use]
    pub fn with(mut self, descriptor: TypeDescriptor) -> Self {
        self.insert(descriptor);
        self
    }

    #[inline]
    pub fn insert(&mut self, descriptor: TypeDescriptor) -> Option<TypeDescriptor> {
        self.descriptors.insert(descriptor.type_id.clone(), descriptor)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl Introspect for TypeTable {
    #[inline]
    fn descriptor(&self, type_id: &str) -> Option<&TypeDescriptor> {
        self.descriptors.get(type_id)
    }
}

impl FromIterator<TypeDescriptor> for TypeTable {
    fn from_iter<I: IntoIterator<Item = TypeDescriptor>>(iter: I) -> Self {
        let mut table = Self::new();
        for descriptor in iter {
            table.insert(descriptor);
        }
        table
    }
}
