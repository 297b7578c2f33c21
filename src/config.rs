/// Config for a binding
/// ## Fields
/// - `cache_provides`:
///   If `true`, the value built for the binding is cached under its name and every
///   later resolution returns the same instance.
///   If `false`, every resolution builds a fresh value.
///
///   This does **not** affect the dependencies of the value.
///   They follow their own bindings' configs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub cache_provides: bool,
}

impl Config {
    /// Config of a binding that is never cached.
    #[inline]
    #[must_use]
    pub const fn transient() -> Self {
        Self { cache_provides: false }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self { cache_provides: true }
    }
}
