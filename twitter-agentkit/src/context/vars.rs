//! Typed keys for context variables.

use std::marker::PhantomData;

/// Names a context variable holding a `T`.
///
/// Data variables require `T: Serialize + DeserializeOwned`; handle
/// variables require `T: Any + Send + Sync`.
pub struct ContextVar<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ContextVar<T> {
    /// Creates a new variable key.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    /// Returns the variable name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for ContextVar<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ContextVar<T> {}

impl<T> std::fmt::Debug for ContextVar<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ContextVar")
            .field(&self.name)
            .field(&std::any::type_name::<T>())
            .finish()
    }
}
