use alloc::sync::Arc;
use core::{
    any::{type_name, Any},
    fmt::{self, Debug, Formatter},
};

/// Shared, type-erased object.
///
/// `class` is the type identifier used for method lookup: the descriptor the
/// object was built from, or the Rust type name for values created outside
/// the container. Clones share the same allocation.
#[derive(Clone)]
pub struct Instance {
    class: Arc<str>,
    type_name: &'static str,
    value: Arc<dyn Any + Send + Sync>,
}

impl Instance {
    #[inline]
    #[must_use]
    pub fn new<T: Send + Sync + 'static>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    #[inline]
    #[must_use]
    pub fn from_arc<T: Send + Sync + 'static>(value: Arc<T>) -> Self {
        Self::with_class(type_name::<T>(), value)
    }

    #[inline]
    #[must_use]
    pub fn with_class<T: Send + Sync + 'static>(class: impl Into<Arc<str>>, value: Arc<T>) -> Self {
        Self {
            class: class.into(),
            type_name: type_name::<T>(),
            value,
        }
    }

    #[inline]
    #[must_use]
    pub fn class(&self) -> &str {
        &self.class
    }

    /// Rust type name of the stored value.
    #[inline]
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    #[inline]
    #[must_use]
    pub fn is<T: 'static>(&self) -> bool {
        self.value.is::<T>()
    }

    #[must_use]
    pub fn downcast<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.value.clone().downcast().ok()
    }

    #[must_use]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.value.downcast_ref()
    }

    /// Pointer identity, ignoring the vtable half of the fat pointer.
    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::as_ptr(&self.value).cast::<()>() == Arc::as_ptr(&other.value).cast::<()>()
    }
}

impl Debug for Instance {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("class", &self.class)
            .field("type", &self.type_name)
            .finish_non_exhaustive()
    }
}
