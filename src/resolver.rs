use alloc::{
    borrow::ToOwned as _,
    collections::BTreeMap,
    format,
    string::String,
    vec::Vec,
};
use parking_lot::{Mutex, ReentrantMutex};
use tracing::{debug, debug_span, error};

use crate::{
    arguments::{Arg, Arguments},
    callable::{Receiver, Target},
    config::Config,
    dependency::Dependency,
    descriptor::Introspect,
    errors::ResolveErrorKind,
    registry::{Binding, Registry},
    value::Value,
};

/// Builds values for names, recursing through constructor dependencies.
///
/// One resolver lives for one top-level `resolve`/`call`/`make_bulk`. It carries the chain of
/// names currently under construction, so re-entering a name fails with
/// [`ResolveErrorKind::CyclicDependency`] instead of recursing forever.
///
/// Cache hits only take the registry lock. Everything past a miss runs under the
/// build lock, which registry writers take as well, so a value is built once per
/// name and a binding can't change while it is being built. The build lock is
/// reentrant: a constructor may go back to the container on the same thread.
/// Names auto-registered by a failed top-level operation are removed again.
pub(crate) struct Resolver<'a> {
    types: &'a (dyn Introspect + Send + Sync),
    registry: &'a Mutex<Registry>,
    build_lock: &'a ReentrantMutex<()>,
    stack: Vec<String>,
    registered: Vec<String>,
}

impl<'a> Resolver<'a> {
    #[inline]
    #[must_use]
    pub(crate) fn new(
        types: &'a (dyn Introspect + Send + Sync),
        registry: &'a Mutex<Registry>,
        build_lock: &'a ReentrantMutex<()>,
    ) -> Self {
        Self {
            types,
            registry,
            build_lock,
            stack: Vec::new(),
            registered: Vec::new(),
        }
    }

    pub(crate) fn resolve(&mut self, name: &str) -> Result<Value, ResolveErrorKind> {
        if let Some(value) = self.registry.lock().instance(name) {
            debug!(dependency = name, "Found in cache");
            return Ok(value.clone());
        }

        let build_lock = self.build_lock;
        let _build = build_lock.lock();
        let result = self.resolve_name(name);
        self.settle(result)
    }

    pub(crate) fn make_bulk(&mut self, dependencies: impl IntoIterator<Item = Dependency>) -> Result<BTreeMap<String, Value>, ResolveErrorKind> {
        let build_lock = self.build_lock;
        let _build = build_lock.lock();
        let result = self.make_bulk_inner(dependencies);
        self.settle(result)
    }

    pub(crate) fn call(&mut self, target: Target, extra: Vec<Arg>) -> Result<Value, ResolveErrorKind> {
        let build_lock = self.build_lock;
        let _build = build_lock.lock();
        let result = self.call_inner(target, extra);
        self.settle(result)
    }

    /// Unsets the names this resolver auto-registered if the operation failed.
    fn settle<T>(&mut self, result: Result<T, ResolveErrorKind>) -> Result<T, ResolveErrorKind> {
        let registered = core::mem::take(&mut self.registered);
        if result.is_err() && !registered.is_empty() {
            let mut registry = self.registry.lock();
            for name in registered.iter().rev() {
                registry.unset(name);
            }
            debug!(names = ?registered, "Auto-registrations rolled back");
        }
        result
    }

    fn resolve_name(&mut self, name: &str) -> Result<Value, ResolveErrorKind> {
        let span = debug_span!("resolve", dependency = name);
        let _guard = span.enter();

        let (binding, overrides) = {
            let registry = self.registry.lock();
            if let Some(value) = registry.instance(name) {
                debug!("Found in cache");
                return Ok(value.clone());
            }
            (registry.binding(name).cloned(), registry.overrides(name).to_vec())
        };
        debug!("Not found in cache");

        let binding = match binding {
            Some(binding) => binding,
            None => self.auto_register(name)?,
        };

        if self.stack.iter().any(|entry| entry == name) {
            let mut chain = self.stack.clone();
            chain.push(name.to_owned());
            let err = ResolveErrorKind::CyclicDependency {
                chain: chain.into_boxed_slice(),
            };
            error!("{}", err);
            return Err(err);
        }

        self.stack.push(name.to_owned());
        let built = self.build(&binding.type_id, overrides);
        self.stack.pop();
        let value = built?;

        if !binding.config.cache_provides {
            return Ok(value);
        }

        let mut registry = self.registry.lock();
        // a constructor on this thread may have rebound the name
        if registry.binding(name) != Some(&binding) {
            debug!("Binding changed while building, not cached");
            return Ok(value);
        }
        let value = registry.cache_instance(name, value);
        debug!("Cached");
        Ok(value)
    }

    /// Resolves every dependency by its type identifier, keyed by parameter key.
    fn resolve_dependencies(&mut self, dependencies: Vec<Dependency>) -> Result<BTreeMap<String, Value>, ResolveErrorKind> {
        let mut resolved = BTreeMap::new();
        for Dependency { key, type_id } in dependencies {
            let value = self.resolve_name(&type_id)?;
            resolved.insert(key, value);
        }
        Ok(resolved)
    }

    /// Registers each unregistered key against its type, then resolves it under the key.
    fn make_bulk_inner(&mut self, dependencies: impl IntoIterator<Item = Dependency>) -> Result<BTreeMap<String, Value>, ResolveErrorKind> {
        let mut resolved = BTreeMap::new();
        for Dependency { key, type_id } in dependencies {
            if !self.registry.lock().has(&key) {
                self.ensure_type(&type_id)?;
                self.register(
                    &key,
                    Binding {
                        type_id,
                        config: Config::default(),
                    },
                );
                debug!(dependency = key.as_str(), "Auto-registered");
            }
            let value = self.resolve_name(&key)?;
            resolved.insert(key, value);
        }
        Ok(resolved)
    }

    fn call_inner(&mut self, target: Target, extra: Vec<Arg>) -> Result<Value, ResolveErrorKind> {
        match target {
            Target::Function(callable) => {
                let span = debug_span!("call", callable = callable.name());
                let _guard = span.enter();

                let resolved = self.resolve_dependencies(Dependency::of_parameters(callable.parameters()))?;
                let arguments = Arguments::merge(callable.parameters(), resolved, extra)
                    .map_err(|err| log_err(ResolveErrorKind::from_instantiate(callable.name(), err)))?;

                let value = callable
                    .invoke(&arguments)
                    .map_err(|err| log_err(ResolveErrorKind::from_instantiate(callable.name(), err)))?;
                debug!("Called");
                Ok(value)
            }
            Target::Method { receiver, method } => {
                let (label, receiver) = match receiver {
                    Receiver::Type(name) => {
                        let value = self.resolve_name(&name)?;
                        (name, value)
                    }
                    Receiver::Instance(value) => (String::from("<instance>"), value),
                };
                let Value::Object(instance) = receiver else {
                    return Err(log_err(ResolveErrorKind::InvalidInstance { name: label }));
                };

                let span = debug_span!("call", class = instance.class(), method = method.as_str());
                let _guard = span.enter();

                let types = self.types;
                let descriptor = types.descriptor(instance.class()).ok_or_else(|| {
                    log_err(ResolveErrorKind::UnknownType {
                        type_id: instance.class().to_owned(),
                    })
                })?;
                let method_descriptor = descriptor.method_descriptor(&method).ok_or_else(|| {
                    log_err(ResolveErrorKind::UnknownMethod {
                        type_id: instance.class().to_owned(),
                        method: method.clone(),
                    })
                })?;

                let target = format!("{}::{}", instance.class(), method);
                let resolved = self.resolve_dependencies(Dependency::of_parameters(method_descriptor.parameters()))?;
                let arguments = Arguments::merge(method_descriptor.parameters(), resolved, extra)
                    .map_err(|err| log_err(ResolveErrorKind::from_instantiate(&target, err)))?;

                let value = method_descriptor
                    .invoke(&instance, &arguments)
                    .map_err(|err| log_err(ResolveErrorKind::from_instantiate(&target, err)))?;
                debug!("Called");
                Ok(value)
            }
        }
    }

    /// Binds a name with no binding to itself, if it names a known type.
    fn auto_register(&mut self, name: &str) -> Result<Binding, ResolveErrorKind> {
        self.ensure_type(name)?;

        let binding = self.register(
            name,
            Binding {
                type_id: name.to_owned(),
                config: Config::default(),
            },
        );
        debug!("Auto-registered");
        Ok(binding)
    }

    fn register(&mut self, name: &str, binding: Binding) -> Binding {
        let (binding, inserted) = self.registry.lock().bind_if_absent(name, binding);
        if inserted {
            self.registered.push(name.to_owned());
        }
        binding
    }

    fn ensure_type(&self, type_id: &str) -> Result<(), ResolveErrorKind> {
        if self.types.contains(type_id) {
            Ok(())
        } else {
            Err(log_err(ResolveErrorKind::UnknownType {
                type_id: type_id.to_owned(),
            }))
        }
    }

    fn build(&mut self, type_id: &str, overrides: Vec<Arg>) -> Result<Value, ResolveErrorKind> {
        let types = self.types;
        let Some(descriptor) = types.descriptor(type_id) else {
            return Err(log_err(ResolveErrorKind::UnknownType {
                type_id: type_id.to_owned(),
            }));
        };
        let Some(constructor) = descriptor.constructor_fn().filter(|_| descriptor.is_instantiable()) else {
            return Err(log_err(ResolveErrorKind::NotInstantiable {
                type_id: type_id.to_owned(),
            }));
        };

        let resolved = self.resolve_dependencies(Dependency::of_parameters(descriptor.parameters()))?;
        let arguments = Arguments::merge(descriptor.parameters(), resolved, overrides)
            .map_err(|err| log_err(ResolveErrorKind::from_instantiate(type_id, err)))?;

        let instance = constructor(&arguments).map_err(|err| log_err(ResolveErrorKind::from_instantiate(type_id, err)))?;
        debug!(type_id, "Built");
        Ok(Value::Object(instance))
    }
}

#[inline]
fn log_err(err: ResolveErrorKind) -> ResolveErrorKind {
    error!("{}", err);
    err
}
