use alloc::{
    collections::{BTreeMap, BTreeSet},
    string::String,
    vec::Vec,
};

use crate::{arguments::Arg, config::Config, value::Value};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Binding {
    pub(crate) type_id: String,
    pub(crate) config: Config,
}

/// Raw storage behind a container: bindings, built instances and override arguments,
/// each keyed by name. It never builds anything on its own.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    bindings: BTreeMap<String, Binding>,
    instances: BTreeMap<String, Value>,
    overrides: BTreeMap<String, Vec<Arg>>,
}

impl Registry {
    #[inline]
    #[must_use]
    pub(crate) const fn new() -> Self {
        Self {
            bindings: BTreeMap::new(),
            instances: BTreeMap::new(),
            overrides: BTreeMap::new(),
        }
    }

    /// Replaces the binding and overrides for `name`, dropping the instance built from the old binding.
    pub(crate) fn bind(&mut self, name: String, binding: Binding, overrides: Vec<Arg>) -> Option<Value> {
        if overrides.is_empty() {
            self.overrides.remove(&name);
        } else {
            self.overrides.insert(name.clone(), overrides);
        }
        self.bindings.insert(name.clone(), binding);
        self.instances.remove(&name)
    }

    /// Binds `name` unless a binding already exists.
    /// Returns the binding in effect and whether it was inserted by this call.
    pub(crate) fn bind_if_absent(&mut self, name: &str, binding: Binding) -> (Binding, bool) {
        match self.bindings.get(name) {
            Some(existing) => (existing.clone(), false),
            None => {
                self.bindings.insert(name.into(), binding.clone());
                (binding, true)
            }
        }
    }

    #[inline]
    pub(crate) fn insert_instance(&mut self, name: String, value: Value) -> Option<Value> {
        self.instances.insert(name, value)
    }

    /// Check-then-insert: keeps an instance stored by a concurrent resolution.
    #[inline]
    pub(crate) fn cache_instance(&mut self, name: &str, value: Value) -> Value {
        self.instances.entry(name.into()).or_insert(value).clone()
    }

    #[inline]
    #[must_use]
    pub(crate) fn has(&self, name: &str) -> bool {
        self.bindings.contains_key(name) || self.instances.contains_key(name)
    }

    #[inline]
    #[must_use]
    pub(crate) fn instance(&self, name: &str) -> Option<&Value> {
        self.instances.get(name)
    }

    #[inline]
    pub(crate) fn binding(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    #[inline]
    #[must_use]
    pub(crate) fn overrides(&self, name: &str) -> &[Arg] {
        self.overrides.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    /// All names known through any of the three maps, sorted.
    #[must_use]
    pub(crate) fn names(&self) -> Vec<&str> {
        self.bindings
            .keys()
            .chain(self.instances.keys())
            .chain(self.overrides.keys())
            .map(String::as_str)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub(crate) fn unset(&mut self, name: &str) {
        self.bindings.remove(name);
        self.instances.remove(name);
        self.overrides.remove(name);
    }

    pub(crate) fn clear(&mut self) {
        self.bindings.clear();
        self.instances.clear();
        self.overrides.clear();
    }
}
