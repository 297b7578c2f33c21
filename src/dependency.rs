use alloc::{string::String, vec::Vec};

use crate::descriptor::Parameter;

/// One auto-resolvable parameter: the key it is passed under and the type it resolves to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Dependency {
    pub key: String,
    pub type_id: String,
}

impl Dependency {
    #[inline]
    #[must_use]
    pub fn new(key: impl Into<String>, type_id: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            type_id: type_id.into(),
        }
    }

    /// Extracts class-typed parameters in declaration order, skipping scalar and untyped ones.
    #[must_use]
    pub fn of_parameters(parameters: &[Parameter]) -> Vec<Self> {
        parameters
            .iter()
            .filter_map(|parameter| parameter.class_type().map(|type_id| Self::new(parameter.key.clone(), type_id)))
            .collect()
    }
}
