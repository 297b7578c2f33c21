use alloc::{boxed::Box, string::String, sync::Arc, vec::Vec};
use core::fmt::{self, Debug, Formatter};

use crate::{arguments::Arguments, descriptor::Parameter, errors::InstantiateErrorKind, value::Value};

type BoxedFn = Box<dyn Fn(&Arguments) -> Result<Value, InstantiateErrorKind> + Send + Sync>;

struct CallableInner {
    name: String,
    parameters: Vec<Parameter>,
    f: BoxedFn,
}

/// A free function together with its declared parameter list.
///
/// The parameter list plays the role of the function signature: class-typed
/// parameters are auto-resolved by [`crate::Container::call`], the rest must
/// come from the caller or from defaults. Clones share identity.
#[derive(Clone)]
pub struct Callable {
    inner: Arc<CallableInner>,
}

impl Callable {
    #[must_use]
    pub fn new<F>(name: impl Into<String>, parameters: impl IntoIterator<Item = Parameter>, f: F) -> Self
    where
        F: Fn(&Arguments) -> Result<Value, InstantiateErrorKind> + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(CallableInner {
                name: name.into(),
                parameters: parameters.into_iter().collect(),
                f: Box::new(f),
            }),
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    #[inline]
    #[must_use]
    pub fn parameters(&self) -> &[Parameter] {
        &self.inner.parameters
    }

    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    #[inline]
    pub(crate) fn invoke(&self, arguments: &Arguments) -> Result<Value, InstantiateErrorKind> {
        (self.inner.f)(arguments)
    }
}

impl Debug for Callable {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable")
            .field("name", &self.inner.name)
            .field("parameters", &self.inner.parameters)
            .finish_non_exhaustive()
    }
}

/// Receiver half of a bound-method target.
#[derive(Debug, Clone)]
pub enum Receiver {
    /// A name resolved through the container before the call.
    Type(String),
    /// An already built object.
    Instance(Value),
}

/// What [`crate::Container::call`] invokes.
#[derive(Debug, Clone)]
pub enum Target {
    Function(Callable),
    Method { receiver: Receiver, method: String },
}

impl Target {
    #[inline]
    #[must_use]
    pub fn method(receiver: Receiver, method: impl Into<String>) -> Self {
        Target::Method {
            receiver,
            method: method.into(),
        }
    }
}

impl From<Callable> for Target {
    fn from(callable: Callable) -> Self {
        Target::Function(callable)
    }
}

impl<R: Into<String>, M: Into<String>> From<(R, M)> for Target {
    fn from((receiver, method): (R, M)) -> Self {
        Target::method(Receiver::Type(receiver.into()), method)
    }
}
