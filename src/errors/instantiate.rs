use alloc::string::String;

/// Error returned by constructors and bound methods.
///
/// Argument accessors of [`crate::Arguments`] produce the first two variants,
/// any other failure can be bubbled with `?` through [`anyhow::Error`].
#[derive(thiserror::Error, Debug)]
pub enum InstantiateErrorKind {
    #[error("Argument `{key}` not supplied")]
    MissingArgument { key: String },
    #[error("Argument `{key}` has incorrect type, expected {expected}")]
    IncorrectArgument { key: String, expected: &'static str },
    #[error(transparent)]
    Custom(#[from] anyhow::Error),
}
