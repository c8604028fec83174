use std::any::Any;

/// A typed instance cached next to an entry's raw form
///
/// Once a caller reads or writes a property through a typed accessor, the
/// converted instance is kept here so later reads of the same type skip
/// conversion. A read through a different type simply misses.
#[derive(Debug)]
pub(crate) struct CachedValue(Box<dyn Any + Send + Sync>);

impl CachedValue {
    pub(crate) fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Box::new(value))
    }

    /// The cached instance, if it was stored as a `T`
    pub(crate) fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }
}
