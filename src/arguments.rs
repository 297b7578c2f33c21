use alloc::{
    collections::BTreeMap,
    string::{String, ToString as _},
    sync::Arc,
    vec::Vec,
};
use core::any::type_name;

use crate::{
    callable::Callable,
    descriptor::Parameter,
    errors::InstantiateErrorKind,
    value::{Scalar, Value},
};

/// Caller-supplied argument, either matched by parameter key or by position.
#[derive(Debug, Clone)]
pub enum Arg {
    Named(String, Value),
    Positional(Value),
}

impl Arg {
    #[inline]
    #[must_use]
    pub fn named(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Arg::Named(key.into(), value.into())
    }

    #[inline]
    #[must_use]
    pub fn positional(value: impl Into<Value>) -> Self {
        Arg::Positional(value.into())
    }
}

/// Final, ordered argument list handed to a constructor or callable.
#[derive(Debug, Clone, Default)]
pub struct Arguments {
    entries: Vec<(String, Value)>,
    extra: Vec<Arg>,
}

impl Arguments {
    #[cfg(test)]
    pub(crate) fn push(&mut self, key: impl Into<String>, value: Value) {
        self.entries.push((key.into(), value));
    }

    /// Merges auto-resolved dependencies with overrides in declaration order.
    ///
    /// Named overrides win over resolved values, positional ones fill the first
    /// empty slot, defaults fill what is left. Returns the key of the first
    /// parameter still without a value.
    pub(crate) fn merge(
        parameters: &[Parameter],
        resolved: BTreeMap<String, Value>,
        overrides: impl IntoIterator<Item = Arg>,
    ) -> Result<Self, InstantiateErrorKind> {
        let mut slots: Vec<Option<Value>> = parameters
            .iter()
            .map(|parameter| resolved.get(&parameter.key).cloned())
            .collect();
        let mut extra = Vec::new();

        for arg in overrides {
            match arg {
                Arg::Named(key, value) => match parameters.iter().position(|parameter| parameter.key == key) {
                    Some(index) => slots[index] = Some(value),
                    None => extra.push(Arg::Named(key, value)),
                },
                Arg::Positional(value) => match slots.iter().position(Option::is_none) {
                    Some(index) => slots[index] = Some(value),
                    None => extra.push(Arg::Positional(value)),
                },
            }
        }

        let mut entries = Vec::with_capacity(parameters.len());
        for (parameter, slot) in parameters.iter().zip(slots) {
            let Some(value) = slot.or_else(|| parameter.default.clone()) else {
                return Err(InstantiateErrorKind::MissingArgument {
                    key: parameter.key.clone(),
                });
            };
            entries.push((parameter.key.clone(), value));
        }

        Ok(Self { entries, extra })
    }

    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(entry_key, _)| entry_key == key).map(|(_, value)| value)
    }

    /// Value at a parameter position.
    #[inline]
    #[must_use]
    pub fn at(&self, index: usize) -> Option<&Value> {
        self.entries.get(index).map(|(_, value)| value)
    }

    /// Overrides that matched no declared parameter.
    #[inline]
    #[must_use]
    pub fn extra(&self) -> &[Arg] {
        &self.extra
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn value(&self, key: &str) -> Result<&Value, InstantiateErrorKind> {
        self.get(key)
            .ok_or_else(|| InstantiateErrorKind::MissingArgument { key: key.to_string() })
    }

    pub fn object<T: Send + Sync + 'static>(&self, key: &str) -> Result<Arc<T>, InstantiateErrorKind> {
        self.value(key)?
            .downcast()
            .ok_or_else(|| incorrect(key, type_name::<T>()))
    }

    pub fn callable(&self, key: &str) -> Result<&Callable, InstantiateErrorKind> {
        self.value(key)?.as_callable().ok_or_else(|| incorrect(key, "callable"))
    }

    pub fn scalar(&self, key: &str) -> Result<&Scalar, InstantiateErrorKind> {
        self.value(key)?.as_scalar().ok_or_else(|| incorrect(key, "scalar"))
    }

    pub fn str(&self, key: &str) -> Result<&str, InstantiateErrorKind> {
        match self.scalar(key)? {
            Scalar::Str(value) => Ok(value),
            _ => Err(incorrect(key, "string")),
        }
    }

    pub fn int(&self, key: &str) -> Result<i64, InstantiateErrorKind> {
        match self.scalar(key)? {
            Scalar::Int(value) => Ok(*value),
            _ => Err(incorrect(key, "int")),
        }
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn float(&self, key: &str) -> Result<f64, InstantiateErrorKind> {
        match self.scalar(key)? {
            Scalar::Float(value) => Ok(*value),
            Scalar::Int(value) => Ok(*value as f64),
            _ => Err(incorrect(key, "float")),
        }
    }

    pub fn bool(&self, key: &str) -> Result<bool, InstantiateErrorKind> {
        match self.scalar(key)? {
            Scalar::Bool(value) => Ok(*value),
            _ => Err(incorrect(key, "bool")),
        }
    }
}

#[inline]
fn incorrect(key: &str, expected: &'static str) -> InstantiateErrorKind {
    InstantiateErrorKind::IncorrectArgument {
        key: key.to_string(),
        expected,
    }
}
