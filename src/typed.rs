use crate::bag::{KeyComparer, PropertyBag};
use crate::descriptor::PropertyDescriptor;
use crate::error::Result;
use crate::value::{PropertyValue, RawValue};
use std::fmt;
use std::marker::PhantomData;

/// A property bag whose values all have the same type
///
/// `TypedPropertyBag` allows a rule to keep a named group of same-typed
/// options (for example one entry per variant of an enum) as a single nested
/// property. It stores entries exactly like [`PropertyBag`], so it converts and
/// persists identically, but its accessors only take descriptors of `T`.
///
/// # Examples
///
/// ```
/// use sovran_propbag::{property_enum, PropertyDescriptor, PropertyError, TypedPropertyBag};
///
/// property_enum! {
///     pub enum Severity { Hidden, Warning, Error }
/// }
///
/// static UNUSED: PropertyDescriptor<Severity> =
///     PropertyDescriptor::new("Diagnostics", "Unused", Severity::Warning);
/// static SHADOWED: PropertyDescriptor<Severity> =
///     PropertyDescriptor::new("Diagnostics", "Shadowed", Severity::Hidden);
///
/// let mut severities = TypedPropertyBag::<Severity>::new();
/// severities.set_property(&UNUSED, Severity::Error)?;
///
/// assert_eq!(severities.get_property(&UNUSED)?, Severity::Error);
/// assert_eq!(severities.get_property(&SHADOWED)?, Severity::Hidden);
/// assert_eq!(severities.len(), 1);
/// # Ok::<(), PropertyError>(())
/// ```
pub struct TypedPropertyBag<T> {
    bag: PropertyBag,
    _marker: PhantomData<T>,
}

impl<T: PropertyValue> TypedPropertyBag<T> {
    /// Creates an empty typed bag with ordinal key comparison
    pub fn new() -> Self {
        Self::with_comparer(KeyComparer::Ordinal)
    }

    /// Creates an empty typed bag with the given key comparer
    pub fn with_comparer(comparer: KeyComparer) -> Self {
        Self {
            bag: PropertyBag::with_comparer(comparer),
            _marker: PhantomData,
        }
    }

    /// Wraps an untyped bag after checking every entry converts to `T`
    ///
    /// # Errors
    ///
    /// Returns the conversion error of the first entry that is not a `T`.
    pub fn try_from_bag(bag: PropertyBag) -> Result<Self> {
        for (_, raw) in bag.iter() {
            T::from_raw(raw)?;
        }
        Ok(Self {
            bag,
            _marker: PhantomData,
        })
    }

    /// Returns the value of a property, caching a materialized default
    ///
    /// # Errors
    ///
    /// Propagates conversion errors for an explicitly-set entry.
    pub fn get_property(&mut self, descriptor: &PropertyDescriptor<T>) -> Result<T> {
        self.bag.get_property(descriptor)
    }

    /// Returns the value of a property, caching the default only if
    /// `cache_default` is set
    ///
    /// # Errors
    ///
    /// Propagates conversion errors for an explicitly-set entry.
    pub fn get_property_with(&mut self, descriptor: &PropertyDescriptor<T>, cache_default: bool) -> Result<T> {
        self.bag.get_property_with(descriptor, cache_default)
    }

    /// Sets the value of a property; the default or null removes the entry
    ///
    /// # Errors
    ///
    /// See [`PropertyBag::set_property`].
    pub fn set_property(&mut self, descriptor: &PropertyDescriptor<T>, value: T) -> Result<()> {
        self.bag.set_property(descriptor, value)
    }

    /// Resets a property to its default
    ///
    /// Returns true if an explicit entry was removed.
    pub fn reset_property(&mut self, descriptor: &PropertyDescriptor<T>) -> bool {
        self.bag.reset_property(descriptor)
    }

    /// Looks up `key` and converts its raw form to `T`
    ///
    /// # Errors
    ///
    /// See [`PropertyBag::try_get_property`].
    pub fn try_get_property(&self, key: &str) -> Result<Option<T>> {
        self.bag.try_get_property(key)
    }

    /// Returns the number of explicitly-set entries
    pub fn len(&self) -> usize {
        self.bag.len()
    }

    /// Returns true if no entry has been explicitly set
    pub fn is_empty(&self) -> bool {
        self.bag.is_empty()
    }

    /// Keys of the explicitly-set entries
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.bag.keys()
    }

    /// The underlying untyped bag
    pub fn as_bag(&self) -> &PropertyBag {
        &self.bag
    }

    /// Unwraps into the underlying untyped bag
    pub fn into_bag(self) -> PropertyBag {
        self.bag
    }
}

impl<T: PropertyValue> Default for TypedPropertyBag<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for TypedPropertyBag<T> {
    fn clone(&self) -> Self {
        Self {
            bag: self.bag.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> PartialEq for TypedPropertyBag<T> {
    fn eq(&self, other: &Self) -> bool {
        self.bag == other.bag
    }
}

impl<T> fmt::Debug for TypedPropertyBag<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedPropertyBag")
            .field("value_type", &std::any::type_name::<T>())
            .field("bag", &self.bag)
            .finish()
    }
}

impl<T: PropertyValue> PropertyValue for TypedPropertyBag<T> {
    fn to_raw(&self) -> Option<RawValue> {
        Some(RawValue::Nested(self.bag.clone()))
    }

    fn from_raw(raw: &RawValue) -> Result<Self> {
        Self::try_from_bag(PropertyBag::from_raw(raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PropertyError, StringSet};

    fn enabled() -> PropertyDescriptor<bool> {
        PropertyDescriptor::new("Rules", "Enabled", true)
    }

    fn verbose() -> PropertyDescriptor<bool> {
        PropertyDescriptor::new("Rules", "Verbose", false)
    }

    #[test]
    fn test_basic_operations() -> Result<()> {
        let mut store = TypedPropertyBag::<bool>::new();

        assert!(store.is_empty());
        assert!(store.get_property(&enabled())?);

        store.set_property(&verbose(), true)?;
        assert!(store.get_property(&verbose())?);
        assert_eq!(store.len(), 1);
        assert_eq!(store.keys().collect::<Vec<_>>(), vec!["Rules.Verbose"]);
        assert_eq!(store.try_get_property("Rules.Verbose")?, Some(true));

        assert!(store.reset_property(&verbose()));
        assert!(!store.reset_property(&verbose()));
        assert!(store.is_empty());

        Ok(())
    }

    #[test]
    fn test_typed_bag_round_trips_as_property_value() -> Result<()> {
        let mut store = TypedPropertyBag::<bool>::new();
        store.set_property(&enabled(), false)?;

        let raw = store.to_raw().unwrap();
        let back = TypedPropertyBag::<bool>::from_raw(&raw)?;
        assert_eq!(back, store);

        let text = raw.to_canonical_string();
        let parsed = TypedPropertyBag::<bool>::from_raw(&RawValue::Text(text))?;
        assert_eq!(parsed, store);
        Ok(())
    }

    #[test]
    fn test_foreign_entries_are_rejected() {
        let mut bag = PropertyBag::new();
        bag.set("Rules.Enabled", Some("maybe"));

        let err = TypedPropertyBag::<bool>::try_from_bag(bag.clone()).unwrap_err();
        assert!(matches!(err, PropertyError::Format { .. }));

        // every string is a valid string set element list
        assert!(TypedPropertyBag::<StringSet>::try_from_bag(bag).is_ok());
    }

    #[test]
    fn test_bag_of_bags_counts_only_explicit_entries() -> Result<()> {
        let nested = PropertyDescriptor::with_factory("Rules", "Nested", PropertyBag::new);
        let mut store = TypedPropertyBag::<PropertyBag>::new();

        let mut inner = store.get_property(&nested)?;
        assert_eq!(store.len(), 0);

        inner.set("Inner.Value", Some("1"));
        store.set_property(&nested, inner)?;
        assert_eq!(store.len(), 1);

        store.set_property(&nested, PropertyBag::new())?;
        assert_eq!(store.len(), 0);
        Ok(())
    }
}
