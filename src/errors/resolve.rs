use alloc::{boxed::Box, string::String};

use super::instantiate::InstantiateErrorKind;

#[derive(thiserror::Error, Debug)]
pub enum ResolveErrorKind {
    #[error("Type `{type_id}` not found in type table")]
    UnknownType { type_id: String },
    #[error("Type `{type_id}` is not instantiable")]
    NotInstantiable { type_id: String },
    #[error("Value for `{name}` is neither an object nor a callable")]
    InvalidInstance { name: String },
    #[error("Missing argument `{key}` for `{target}`")]
    MissingArgument { target: String, key: String },
    #[error("Method `{method}` not found on `{type_id}`")]
    UnknownMethod { type_id: String, method: String },
    #[error("Incorrect type for `{name}`. Actual: {actual}, expected: {expected}")]
    IncorrectType {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },
    #[error("Cyclic dependency detected: {}", .chain.join(" -> "))]
    CyclicDependency { chain: Box<[String]> },
    #[error("Failed to instantiate `{target}`: {source}")]
    Instantiate {
        target: String,
        #[source]
        source: InstantiateErrorKind,
    },
}

impl ResolveErrorKind {
    /// Lifts a constructor failure, keeping argument errors at the top level.
    pub(crate) fn from_instantiate(target: &str, err: InstantiateErrorKind) -> Self {
        match err {
            InstantiateErrorKind::MissingArgument { key } => Self::MissingArgument {
                target: target.into(),
                key,
            },
            source => Self::Instantiate {
                target: target.into(),
                source,
            },
        }
    }
}
