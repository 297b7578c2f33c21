use alloc::{
    borrow::ToOwned,
    boxed::Box,
    collections::BTreeMap,
    string::{String, ToString as _},
    sync::Arc,
    vec::Vec,
};
use core::any::type_name;
use parking_lot::{Mutex, ReentrantMutex};
use tracing::{debug, error, info_span};

use crate::{
    arguments::Arg,
    callable::Target,
    config::Config,
    dependency::Dependency,
    descriptor::Introspect,
    errors::ResolveErrorKind,
    registry::{Binding, Registry},
    resolver::Resolver,
    value::{Concrete, Value},
};

/// Name-based IoC container.
///
/// Cloning is cheap and every clone shares the same registry, so a single
/// container built at the composition root can be handed to every consumer.
/// A cached binding is built once: threads resolving it concurrently wait for
/// the build in progress and get the same value.
///
/// # Examples
/// ```rust
/// use std::sync::Arc;
/// use wirefold::{Container, Parameter, TypeDescriptor, TypeTable};
///
/// struct Logger;
/// struct Service(Arc<Logger>);
///
/// let container = Container::new(
///     TypeTable::new()
///         .with(TypeDescriptor::new("Logger").constructor(|_| Ok(Logger)))
///         .with(
///             TypeDescriptor::new("Service")
///                 .param(Parameter::class("logger", "Logger"))
///                 .constructor(|args| Ok(Service(args.object("logger")?))),
///         ),
/// );
///
/// container.set("service", Some("Service"), []).unwrap();
///
/// let service = container.get_as::<Service>("service").unwrap().unwrap();
/// let logger = container.get_as::<Logger>("Logger").unwrap().unwrap();
/// assert!(Arc::ptr_eq(&service.0, &logger));
/// ```
#[derive(Clone)]
pub struct Container {
    inner: Arc<ContainerInner>,
}

struct ContainerInner {
    types: Box<dyn Introspect + Send + Sync>,
    registry: Mutex<Registry>,
    build_lock: ReentrantMutex<()>,
}

impl Container {
    #[inline]
    #[must_use]
    pub fn new(types: impl Introspect + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(ContainerInner {
                types: Box::new(types),
                registry: Mutex::new(Registry::new()),
                build_lock: ReentrantMutex::new(()),
            }),
        }
    }

    /// Binds `name` to `type_id` (or to itself when `None`) with override arguments.
    ///
    /// Replaces any previous binding and overrides for `name`, and drops the
    /// instance cached for it. Only the existence of the type is checked here,
    /// whether it can be built is checked on resolution.
    ///
    /// # Errors
    /// - Returns [`ResolveErrorKind::UnknownType`] if the type isn't described
    pub fn set(&self, name: impl Into<String>, type_id: Option<&str>, overrides: impl IntoIterator<Item = Arg>) -> Result<(), ResolveErrorKind> {
        self.set_with_config(name, type_id, overrides, Config::default())
    }

    /// Same as [`Self::set`] with an explicit binding config.
    ///
    /// # Errors
    /// - Returns [`ResolveErrorKind::UnknownType`] if the type isn't described
    pub fn set_with_config(
        &self,
        name: impl Into<String>,
        type_id: Option<&str>,
        overrides: impl IntoIterator<Item = Arg>,
        config: Config,
    ) -> Result<(), ResolveErrorKind> {
        let name = name.into();
        let type_id = type_id.map_or_else(|| name.clone(), ToOwned::to_owned);

        if !self.inner.types.contains(&type_id) {
            let err = ResolveErrorKind::UnknownType { type_id };
            error!("{}", err);
            return Err(err);
        }

        let overrides = overrides.into_iter().collect();
        let _build = self.inner.build_lock.lock();
        let evicted = self
            .inner
            .registry
            .lock()
            .bind(name.clone(), Binding { type_id, config }, overrides);
        if evicted.is_some() {
            debug!(binding = name.as_str(), "Cached instance evicted by rebinding");
        }
        Ok(())
    }

    /// Stores a built value under `name`, bypassing construction.
    ///
    /// # Errors
    /// - Returns [`ResolveErrorKind::InvalidInstance`] if the value is a scalar
    pub fn set_instance(&self, name: impl Into<String>, value: impl Into<Value>) -> Result<(), ResolveErrorKind> {
        let name = name.into();
        let value = value.into();

        if !value.is_instance_like() {
            let err = ResolveErrorKind::InvalidInstance { name };
            error!("{}", err);
            return Err(err);
        }

        let _build = self.inner.build_lock.lock();
        self.inner.registry.lock().insert_instance(name, value);
        Ok(())
    }

    /// Indexed write: binds a type or stores a value depending on the shape of `concrete`.
    ///
    /// # Errors
    /// - Same as [`Self::set`] or [`Self::set_instance`]
    pub fn insert(&self, name: impl Into<String>, concrete: impl Into<Concrete>) -> Result<(), ResolveErrorKind> {
        match concrete.into() {
            Concrete::Type(type_id) => self.set(name, Some(type_id.as_str()), []),
            Concrete::Value(value) => self.set_instance(name, value),
        }
    }

    #[inline]
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.inner.registry.lock().has(name)
    }

    /// Gets the cached value for `name`, building it first if only a binding exists.
    /// Returns `Ok(None)` if `name` is neither bound nor cached.
    ///
    /// # Errors
    /// - Returns any error of [`Self::resolve`]
    pub fn get(&self, name: &str) -> Result<Option<Value>, ResolveErrorKind> {
        let span = info_span!("get", name = name);
        let _guard = span.enter();

        if !self.has(name) {
            debug!("Not registered");
            return Ok(None);
        }
        self.resolver().resolve(name).map(Some)
    }

    /// Typed [`Self::get`].
    ///
    /// # Errors
    /// - Returns [`ResolveErrorKind::IncorrectType`] if the value isn't a `T` object
    /// - Returns any error of [`Self::resolve`]
    pub fn get_as<T: Send + Sync + 'static>(&self, name: &str) -> Result<Option<Arc<T>>, ResolveErrorKind> {
        let Some(value) = self.get(name)? else {
            return Ok(None);
        };
        match value.downcast::<T>() {
            Some(value) => Ok(Some(value)),
            None => {
                let err = ResolveErrorKind::IncorrectType {
                    name: name.to_string(),
                    expected: type_name::<T>(),
                    actual: value.kind(),
                };
                error!("{}", err);
                Err(err)
            }
        }
    }

    /// Builds (or returns the cached) value for `name`.
    /// A name without a binding that is itself a described type is bound to itself first.
    ///
    /// # Errors
    /// - Returns [`ResolveErrorKind::UnknownType`] if a needed type isn't described
    /// - Returns [`ResolveErrorKind::NotInstantiable`] if a needed type is abstract, an interface or has no constructor
    /// - Returns [`ResolveErrorKind::MissingArgument`] if a parameter has no resolved, supplied or default value
    /// - Returns [`ResolveErrorKind::CyclicDependency`] if a type depends on itself
    /// - Returns [`ResolveErrorKind::Instantiate`] if a constructor fails
    pub fn resolve(&self, name: &str) -> Result<Value, ResolveErrorKind> {
        let span = info_span!("resolve", name = name);
        let _guard = span.enter();

        self.resolver().resolve(name)
    }

    /// Registers and resolves in one step.
    ///
    /// # Errors
    /// - Same as [`Self::insert`] and [`Self::resolve`]
    pub fn make(&self, name: &str, concrete: impl Into<Concrete>, overrides: impl IntoIterator<Item = Arg>) -> Result<Value, ResolveErrorKind> {
        match concrete.into() {
            Concrete::Type(type_id) => self.set(name, Some(type_id.as_str()), overrides)?,
            Concrete::Value(value) => self.set_instance(name, value)?,
        }
        self.resolve(name)
    }

    /// Resolves each dependency under its key, binding unregistered keys to their type first.
    ///
    /// # Errors
    /// - Same as [`Self::resolve`]
    pub fn make_bulk(&self, dependencies: impl IntoIterator<Item = Dependency>) -> Result<BTreeMap<String, Value>, ResolveErrorKind> {
        let span = info_span!("make_bulk");
        let _guard = span.enter();

        self.resolver().make_bulk(dependencies)
    }

    /// Invokes a callable or bound method, auto-resolving its class-typed parameters.
    /// Caller-supplied arguments win over resolved ones. The return value is passed through as is.
    ///
    /// # Errors
    /// - Returns [`ResolveErrorKind::InvalidInstance`] if a method receiver isn't an object
    /// - Returns [`ResolveErrorKind::UnknownMethod`] if the receiver's type has no such method
    /// - Same as [`Self::resolve`] for parameters and receivers
    pub fn call(&self, target: impl Into<Target>, extra: impl IntoIterator<Item = Arg>) -> Result<Value, ResolveErrorKind> {
        let span = info_span!("call");
        let _guard = span.enter();

        self.resolver().call(target.into(), extra.into_iter().collect())
    }

    /// Removes `name` from bindings, instances and overrides.
    pub fn unset(&self, name: &str) {
        let _build = self.inner.build_lock.lock();
        self.inner.registry.lock().unset(name);
        debug!(binding = name, "Unset");
    }

    /// Empties bindings, instances and overrides at once.
    pub fn clear(&self) {
        let _build = self.inner.build_lock.lock();
        self.inner.registry.lock().clear();
        debug!("Cleared");
    }

    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.inner
            .registry
            .lock()
            .names()
            .into_iter()
            .map(ToOwned::to_owned)
            .collect()
    }

    #[inline]
    fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&*self.inner.types, &self.inner.registry, &self.inner.build_lock)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::Container;
    use crate::{
        arguments::Arg,
        callable::{Callable, Receiver, Target},
        config::Config,
        descriptor::{Parameter, TypeDescriptor, TypeTable},
        errors::ResolveErrorKind,
        value::Value,
        Scalar,
    };

    use alloc::{
        format,
        string::{String, ToString as _},
        sync::Arc,
        vec,
        vec::Vec,
    };
    use core::{
        sync::atomic::{AtomicU8, Ordering},
        time::Duration,
    };
    use std::{sync::Barrier, thread};
    use tracing_test::traced_test;

    struct Logger;
    struct FileLogger;
    struct Service(Arc<Logger>);
    struct Database {
        dsn: String,
        pool: i64,
    }
    struct Mailer {
        logger: Arc<Logger>,
    }
    struct Notifier {
        file_logger: bool,
    }

    fn types(logger_calls: Arc<AtomicU8>) -> TypeTable {
        TypeTable::new()
            .with(TypeDescriptor::new("Logger").constructor(move |_| {
                logger_calls.fetch_add(1, Ordering::SeqCst);
                Ok(Logger)
            }))
            .with(TypeDescriptor::new("FileLogger").constructor(|_| Ok(FileLogger)))
            .with(
                TypeDescriptor::new("Service")
                    .param(Parameter::class("logger", "Logger"))
                    .constructor(|args| Ok(Service(args.object("logger")?))),
            )
            .with(
                TypeDescriptor::new("Database")
                    .param(Parameter::scalar("dsn"))
                    .param(Parameter::scalar("pool").with_default(4))
                    .constructor(|args| {
                        Ok(Database {
                            dsn: args.str("dsn")?.to_string(),
                            pool: args.int("pool")?,
                        })
                    }),
            )
            .with(
                TypeDescriptor::new("Mailer")
                    .param(Parameter::class("logger", "Logger"))
                    .constructor(|args| Ok(Mailer { logger: args.object("logger")? }))
                    .method(
                        "send",
                        [Parameter::class("db", "Database"), Parameter::scalar("to")],
                        |this: &Mailer, args| {
                            let _ = &this.logger;
                            Ok(Value::from(format!("{}@{}", args.str("to")?, args.object::<Database>("db")?.dsn)))
                        },
                    ),
            )
            .with(
                TypeDescriptor::new("Notifier")
                    .param(Parameter::class("logger", "Logger"))
                    .constructor(|args| {
                        Ok(Notifier {
                            file_logger: args.object::<FileLogger>("logger").is_ok(),
                        })
                    }),
            )
            .with(TypeDescriptor::abstract_type("Repository"))
            .with(TypeDescriptor::interface("Transport"))
            .with(TypeDescriptor::new("Hidden"))
    }

    fn container() -> (Container, Arc<AtomicU8>) {
        let logger_calls = Arc::new(AtomicU8::new(0));
        (Container::new(types(logger_calls.clone())), logger_calls)
    }

    #[test]
    #[traced_test]
    fn test_singleton_get() {
        let (container, logger_calls) = container();
        container.set("Logger", None, []).unwrap();

        let logger_1 = container.get("Logger").unwrap().unwrap();
        let logger_2 = container.get("Logger").unwrap().unwrap();

        assert!(logger_1.ptr_eq(&logger_2));
        assert_eq!(logger_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    #[traced_test]
    fn test_scenario_service_reuses_logger() {
        let (container, logger_calls) = container();
        container.set("Logger", None, []).unwrap();
        let logger = container.get_as::<Logger>("Logger").unwrap().unwrap();

        container.set("service", Some("Service"), []).unwrap();
        let service = container.get_as::<Service>("service").unwrap().unwrap();

        assert!(Arc::ptr_eq(&service.0, &logger));
        assert_eq!(logger_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    #[traced_test]
    fn test_override_precedence() {
        let (container, logger_calls) = container();
        container
            .set(
                "notifier",
                Some("Notifier"),
                [Arg::named("logger", Value::object(FileLogger))],
            )
            .unwrap();
        container.set("plain", Some("Notifier"), []).unwrap();

        let notifier = container.get_as::<Notifier>("notifier").unwrap().unwrap();
        let plain = container.get_as::<Notifier>("plain").unwrap().unwrap();

        assert!(notifier.file_logger);
        assert!(!plain.file_logger);
        // the overridden dependency is still resolved and cached under its own name
        assert!(container.has("Logger"));
        assert_eq!(logger_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_scalar_overrides_and_defaults() {
        let (container, _) = container();
        container
            .set("db", Some("Database"), [Arg::positional("postgres://localhost")])
            .unwrap();
        container
            .set("db_big", Some("Database"), [Arg::named("dsn", "sqlite::memory:"), Arg::named("pool", 32)])
            .unwrap();

        let db = container.get_as::<Database>("db").unwrap().unwrap();
        let db_big = container.get_as::<Database>("db_big").unwrap().unwrap();

        assert_eq!((db.dsn.as_str(), db.pool), ("postgres://localhost", 4));
        assert_eq!((db_big.dsn.as_str(), db_big.pool), ("sqlite::memory:", 32));
    }

    #[test]
    #[traced_test]
    fn test_missing_argument() {
        let (container, _) = container();
        container.set("db", Some("Database"), []).unwrap();

        let err = container.get("db").unwrap_err();

        assert!(matches!(err, ResolveErrorKind::MissingArgument { ref target, ref key } if target == "Database" && key == "dsn"));
        assert!(container.inner.registry.lock().instance("db").is_none());
    }

    #[test]
    #[traced_test]
    fn test_not_instantiable_is_lazy() {
        let (container, _) = container();
        container.set("repo", Some("Repository"), []).unwrap();
        container.set("Transport", None, []).unwrap();
        container.set("Hidden", None, []).unwrap();

        assert!(matches!(container.get("repo"), Err(ResolveErrorKind::NotInstantiable { .. })));
        assert!(matches!(container.get("Transport"), Err(ResolveErrorKind::NotInstantiable { .. })));
        assert!(matches!(container.get("Hidden"), Err(ResolveErrorKind::NotInstantiable { .. })));
    }

    #[test]
    #[traced_test]
    fn test_failed_resolution_leaves_no_bindings() {
        let (container, _) = container();
        container.set("db", Some("Database"), []).unwrap();

        assert!(container.resolve("Repository").is_err());
        assert!(container.call(("Mailer", "send"), [Arg::named("to", "ops")]).is_err());

        assert!(!container.has("Repository"));
        assert!(!container.has("Mailer"));
        assert!(!container.has("Logger"));
        assert!(!container.has("Database"));
        assert!(container.get("Repository").unwrap().is_none());
        // explicit bindings survive a failed resolution
        assert!(container.get("db").is_err());
        assert_eq!(container.names(), ["db"]);
    }

    #[test]
    fn test_unknown_type_on_set() {
        let (container, _) = container();

        assert!(matches!(
            container.set("cache", Some("Redis"), []),
            Err(ResolveErrorKind::UnknownType { ref type_id }) if type_id == "Redis"
        ));
        assert!(matches!(container.set("Redis", None, []), Err(ResolveErrorKind::UnknownType { .. })));
        assert!(!container.has("cache"));
    }

    #[test]
    fn test_set_instance() {
        let (container, logger_calls) = container();
        let logger = Value::object(Logger);
        container.set_instance("Logger", logger.clone()).unwrap();

        let service = container.resolve("Service").unwrap();

        assert!(Arc::ptr_eq(
            &service.downcast::<Service>().unwrap().0,
            &logger.downcast::<Logger>().unwrap()
        ));
        assert_eq!(logger_calls.load(Ordering::SeqCst), 0);
        assert!(matches!(
            container.set_instance("port", 8080),
            Err(ResolveErrorKind::InvalidInstance { ref name }) if name == "port"
        ));
        assert!(!container.has("port"));
    }

    #[test]
    fn test_get_absent() {
        let (container, _) = container();

        assert!(container.get("Logger").unwrap().is_none());
        assert!(container.get_as::<Logger>("nothing").unwrap().is_none());
        assert!(!container.has("Logger"));
    }

    #[test]
    fn test_get_as_incorrect_type() {
        let (container, _) = container();
        container.set("Logger", None, []).unwrap();

        assert!(matches!(
            container.get_as::<FileLogger>("Logger"),
            Err(ResolveErrorKind::IncorrectType { .. })
        ));
    }

    #[test]
    fn test_rebinding_evicts() {
        let (container, _) = container();
        container.set("log", Some("Logger"), []).unwrap();
        assert!(container.get_as::<Logger>("log").unwrap().is_some());

        container.set("log", Some("FileLogger"), []).unwrap();

        assert!(container.get_as::<FileLogger>("log").unwrap().is_some());
    }

    #[test]
    fn test_transient_config() {
        let (container, logger_calls) = container();
        container
            .set_with_config("Logger", None, [], Config::transient())
            .unwrap();

        let logger_1 = container.get("Logger").unwrap().unwrap();
        let logger_2 = container.get("Logger").unwrap().unwrap();

        assert!(!logger_1.ptr_eq(&logger_2));
        assert_eq!(logger_calls.load(Ordering::SeqCst), 2);
        assert!(container.inner.registry.lock().instance("Logger").is_none());
    }

    #[test]
    fn test_clear_and_unset() {
        let (container, _) = container();
        container.set("Logger", None, []).unwrap();
        container.set("service", Some("Service"), []).unwrap();
        container.get("service").unwrap();
        container.set_instance("extra", Value::object(FileLogger)).unwrap();

        container.unset("extra");
        assert!(!container.has("extra"));
        container.unset("never-registered");

        let names = container.names();
        container.clear();

        assert_eq!(names, ["Logger", "service"]);
        for name in &names {
            assert!(!container.has(name));
        }
        assert!(container.names().is_empty());
    }

    #[test]
    fn test_insert_by_shape() {
        let (container, _) = container();
        container.insert("log", "Logger").unwrap();
        container.insert("file", Value::object(FileLogger)).unwrap();

        assert!(container.get_as::<Logger>("log").unwrap().is_some());
        assert!(container.get_as::<FileLogger>("file").unwrap().is_some());
        assert!(matches!(
            container.insert("flag", Value::from(true)),
            Err(ResolveErrorKind::InvalidInstance { .. })
        ));
    }

    #[test]
    fn test_make() {
        let (container, _) = container();

        let db = container
            .make("db", "Database", [Arg::named("dsn", "mysql://")])
            .unwrap();
        let stored = container.make("file", Value::object(FileLogger), []).unwrap();

        assert_eq!(db.downcast::<Database>().unwrap().dsn, "mysql://");
        assert!(stored.ptr_eq(&container.get("file").unwrap().unwrap()));
    }

    #[test]
    fn test_call_function_matches_constructor() {
        let (container, logger_calls) = container();
        let greet = Callable::new("greet", [Parameter::class("logger", "Logger")], |args| {
            args.object::<Logger>("logger")?;
            Ok(Value::from("done"))
        });

        let value = container.call(greet, []).unwrap();

        assert!(matches!(value, Value::Scalar(Scalar::Str(ref s)) if s == "done"));
        assert!(container.has("Logger"));
        assert!(container.resolve("Service").is_ok());
        assert_eq!(logger_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_call_extra_wins() {
        let (container, logger_calls) = container();
        let check = Callable::new("check", [Parameter::class("logger", "Logger")], |args| {
            Ok(Value::from(args.object::<FileLogger>("logger").is_ok()))
        });

        let value = container
            .call(check, vec![Arg::named("logger", Value::object(FileLogger))])
            .unwrap();

        assert!(matches!(value, Value::Scalar(Scalar::Bool(true))));
        // dependencies are resolved before the merge, like constructor injection
        assert_eq!(logger_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    #[traced_test]
    fn test_call_method() {
        let (container, _) = container();
        container
            .set("Database", None, [Arg::named("dsn", "example.org")])
            .unwrap();

        let by_type = container
            .call(("Mailer", "send"), [Arg::named("to", "ops")])
            .unwrap();
        let mailer = container.get("Mailer").unwrap().unwrap();
        let by_instance = container
            .call(Target::method(Receiver::Instance(mailer), "send"), [Arg::named("to", "dev")])
            .unwrap();

        assert!(matches!(by_type, Value::Scalar(Scalar::Str(ref s)) if s == "ops@example.org"));
        assert!(matches!(by_instance, Value::Scalar(Scalar::Str(ref s)) if s == "dev@example.org"));
        assert!(matches!(
            container.call(("Mailer", "receive"), []),
            Err(ResolveErrorKind::UnknownMethod { ref method, .. }) if method == "receive"
        ));
    }

    #[test]
    fn test_cached_callable() {
        let (container, _) = container();
        let noop = Callable::new("noop", [], |_| Ok(Value::Scalar(Scalar::Null)));
        container.set_instance("noop", noop.clone()).unwrap();

        let stored = container.get("noop").unwrap().unwrap();

        assert!(stored.as_callable().unwrap().ptr_eq(&noop));
        assert!(matches!(
            container.call(stored.as_callable().unwrap().clone(), []),
            Ok(Value::Scalar(Scalar::Null))
        ));
    }

    #[test]
    fn test_thread_safe() {
        fn impl_bounds<T: Send + Sync + 'static>() {}

        impl_bounds::<Container>();

        let (container, logger_calls) = container();
        container.set("Logger", None, []).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let container = container.clone();
                thread::spawn(move || container.get("Logger").unwrap().unwrap())
            })
            .collect();
        let values: Vec<Value> = handles.into_iter().map(|handle| handle.join().unwrap()).collect();

        for value in &values {
            assert!(value.ptr_eq(&values[0]));
        }
        assert_eq!(logger_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    #[traced_test]
    fn test_concurrent_first_resolution_builds_once() {
        struct Pool;

        let built = Arc::new(AtomicU8::new(0));
        let container = Container::new(TypeTable::new().with(TypeDescriptor::new("Pool").constructor({
            let built = built.clone();
            move |_| {
                built.fetch_add(1, Ordering::SeqCst);
                thread::sleep(Duration::from_millis(50));
                Ok(Pool)
            }
        })));
        container.set("pool", Some("Pool"), []).unwrap();

        let barrier = Arc::new(Barrier::new(4));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let container = container.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    container.get("pool").unwrap().unwrap()
                })
            })
            .collect();
        let values: Vec<Value> = handles.into_iter().map(|handle| handle.join().unwrap()).collect();

        assert_eq!(built.load(Ordering::SeqCst), 1);
        for value in &values {
            assert!(value.ptr_eq(&values[0]));
        }
    }

    #[test]
    #[traced_test]
    fn test_rebinding_waits_for_build_in_progress() {
        struct Slow;

        let started = Arc::new(Barrier::new(2));
        let container = Container::new(
            TypeTable::new()
                .with(TypeDescriptor::new("Slow").constructor({
                    let started = started.clone();
                    move |_| {
                        started.wait();
                        thread::sleep(Duration::from_millis(50));
                        Ok(Slow)
                    }
                }))
                .with(TypeDescriptor::new("FileLogger").constructor(|_| Ok(FileLogger))),
        );
        container.set("slot", Some("Slow"), []).unwrap();

        let resolving = {
            let container = container.clone();
            thread::spawn(move || container.get_as::<Slow>("slot").unwrap().unwrap())
        };
        started.wait();
        container.set("slot", Some("FileLogger"), []).unwrap();
        resolving.join().unwrap();

        // the old build finished before the rebinding evicted it
        assert!(container.get_as::<FileLogger>("slot").unwrap().is_some());
    }
}
