//! Name-based IoC container.
//!
//! A [`Container`] turns a name into a fully built object graph. Types are
//! described once in a [`TypeTable`] (constructor parameters, constructor,
//! bound methods); class-typed parameters are resolved recursively by type
//! identifier, scalar ones come from override arguments or defaults. Built
//! values are cached per name unless the binding's [`Config`] says otherwise.

#![no_std]

extern crate alloc;

pub(crate) mod any;
pub(crate) mod arguments;
pub(crate) mod callable;
pub(crate) mod config;
pub(crate) mod container;
pub(crate) mod dependency;
pub(crate) mod descriptor;
pub(crate) mod errors;
pub(crate) mod registry;
pub(crate) mod resolver;
pub(crate) mod value;

pub use any::Instance;
pub use arguments::{Arg, Arguments};
pub use callable::{Callable, Receiver, Target};
pub use config::Config;
pub use container::Container;
pub use dependency::Dependency;
pub use descriptor::{Introspect, MethodDescriptor, ParamKind, Parameter, TypeDescriptor, TypeKind, TypeTable};
pub use errors::{InstantiateErrorKind, ResolveErrorKind};
pub use value::{Concrete, Scalar, Value};
