use alloc::{string::String, sync::Arc};
use core::fmt::{self, Debug, Formatter};

use crate::{any::Instance, callable::Callable};

#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Scalar {
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Scalar::Null => "null",
            Scalar::Bool(_) => "bool",
            Scalar::Int(_) => "int",
            Scalar::Float(_) => "float",
            Scalar::Str(_) => "string",
        }
    }
}

/// Anything that can flow through the container: a built object, a callable
/// or a plain scalar. Only the first two may be cached.
#[derive(Clone)]
pub enum Value {
    Object(Instance),
    Callable(Callable),
    Scalar(Scalar),
}

impl Value {
    #[inline]
    #[must_use]
    pub fn object<T: Send + Sync + 'static>(value: T) -> Self {
        Value::Object(Instance::new(value))
    }

    /// Objects and callables may be cached, scalars may not.
    #[inline]
    #[must_use]
    pub const fn is_instance_like(&self) -> bool {
        matches!(self, Value::Object(_) | Value::Callable(_))
    }

    #[inline]
    #[must_use]
    pub const fn as_object(&self) -> Option<&Instance> {
        match self {
            Value::Object(instance) => Some(instance),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn as_callable(&self) -> Option<&Callable> {
        match self {
            Value::Callable(callable) => Some(callable),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Value::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    #[must_use]
    pub fn downcast<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.as_object().and_then(Instance::downcast)
    }

    /// Identity comparison. Scalars never share identity.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::Callable(a), Value::Callable(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Object(instance) => instance.type_name(),
            Value::Callable(_) => "callable",
            Value::Scalar(scalar) => scalar.kind(),
        }
    }
}

impl Debug for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Object(instance) => f.debug_tuple("Object").field(instance).finish(),
            Value::Callable(callable) => f.debug_tuple("Callable").field(callable).finish(),
            Value::Scalar(scalar) => f.debug_tuple("Scalar").field(scalar).finish(),
        }
    }
}

impl From<Instance> for Value {
    fn from(value: Instance) -> Self {
        Value::Object(value)
    }
}

impl From<Callable> for Value {
    fn from(value: Callable) -> Self {
        Value::Callable(value)
    }
}

impl From<Scalar> for Value {
    fn from(value: Scalar) -> Self {
        Value::Scalar(value)
    }
}

macro_rules! impl_from_scalar {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Scalar(Scalar::$variant(value.into()))
                }
            }
        )*
    };
}

impl_from_scalar! {
    bool => Bool,
    i32 => Int,
    i64 => Int,
    u32 => Int,
    f64 => Float,
    String => Str,
    &str => Str,
}

/// Right-hand side of an indexed write: a type to bind or a value to store.
#[derive(Debug, Clone)]
pub enum Concrete {
    Type(String),
    Value(Value),
}

impl From<&str> for Concrete {
    fn from(type_id: &str) -> Self {
        Concrete::Type(type_id.into())
    }
}

impl From<String> for Concrete {
    fn from(type_id: String) -> Self {
        Concrete::Type(type_id)
    }
}

impl From<Value> for Concrete {
    fn from(value: Value) -> Self {
        Concrete::Value(value)
    }
}

impl From<Instance> for Concrete {
    fn from(value: Instance) -> Self {
        Concrete::Value(value.into())
    }
}

impl From<Callable> for Concrete {
    fn from(value: Callable) -> Self {
        Concrete::Value(value.into())
    }
}
