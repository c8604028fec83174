use crate::cached::CachedValue;
use crate::descriptor::PropertyDescriptor;
use crate::error::Result;
use crate::value::{PropertyValue, RawValue};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::btree_map::Entry as MapEntry;
use std::collections::BTreeMap;
use std::fmt;

/// How a bag compares keys, fixed for the bag's lifetime
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyComparer {
    /// Keys match only if they are identical
    #[default]
    Ordinal,
    /// Keys match ignoring case
    OrdinalIgnoreCase,
}

impl KeyComparer {
    /// Returns the form of `key` used for lookup
    pub fn fold<'a>(&self, key: &'a str) -> Cow<'a, str> {
        match self {
            KeyComparer::Ordinal => Cow::Borrowed(key),
            KeyComparer::OrdinalIgnoreCase => Cow::Owned(key.to_lowercase()),
        }
    }

    /// Returns true if the two keys are equal under this comparer
    pub fn matches(&self, a: &str, b: &str) -> bool {
        self.fold(a) == self.fold(b)
    }
}

struct Entry {
    key: String,
    // None while the entry only holds a materialized default
    raw: Option<RawValue>,
    cached: Option<CachedValue>,
}

impl Entry {
    fn explicit(key: String, raw: RawValue, cached: Option<CachedValue>) -> Self {
        Self {
            key,
            raw: Some(raw),
            cached,
        }
    }
}

/// A string-keyed property store with typed accessors
///
/// Values are held in their raw form ([`RawValue`]): a canonical string, or the
/// entries of a nested bag. Typed accessors convert on demand through
/// [`PropertyValue`] and cache the converted instance next to the raw form.
///
/// Setting a property to its descriptor default (or to null) removes the
/// entry, so a bag only ever records what differs from the defaults. Reading an
/// absent property materializes the default; that default may be cached, but
/// it is never counted by [`len`](Self::len) and never persisted.
///
/// A bag is a plain data structure with no interior locking; wrap it in a lock
/// to share it between threads.
///
/// # Examples
///
/// ```
/// use sovran_propbag::{PropertyBag, PropertyDescriptor, PropertyError};
///
/// static TAB_SIZE: PropertyDescriptor<u32> = PropertyDescriptor::new("Format", "TabSize", 4);
///
/// let mut bag = PropertyBag::new();
/// assert_eq!(bag.get_property(&TAB_SIZE)?, 4);
/// assert_eq!(bag.len(), 0);
///
/// bag.set_property(&TAB_SIZE, 8)?;
/// assert_eq!(bag.get("Format.TabSize").as_deref(), Some("8"));
///
/// bag.set_property(&TAB_SIZE, 4)?;
/// assert!(bag.is_empty());
/// # Ok::<(), PropertyError>(())
/// ```
pub struct PropertyBag {
    comparer: KeyComparer,
    entries: BTreeMap<String, Entry>,
}

impl PropertyBag {
    /// Creates an empty bag with ordinal key comparison
    pub fn new() -> Self {
        Self::with_comparer(KeyComparer::Ordinal)
    }

    /// Creates an empty bag with the given key comparer
    pub fn with_comparer(comparer: KeyComparer) -> Self {
        Self {
            comparer,
            entries: BTreeMap::new(),
        }
    }

    /// Copies the explicitly-set entries of `other` into a new bag that uses
    /// `comparer`
    ///
    /// Nested bags are copied deeply. Cached typed instances are not copied;
    /// they are rebuilt from the raw form on first access.
    ///
    /// # Examples
    ///
    /// ```
    /// use sovran_propbag::{KeyComparer, PropertyBag};
    ///
    /// let mut bag = PropertyBag::new();
    /// bag.set("TestValue", Some("72"));
    ///
    /// let copy = PropertyBag::copy_with_comparer(&bag, KeyComparer::OrdinalIgnoreCase);
    /// assert_eq!(bag.get("testvalue"), None);
    /// assert_eq!(copy.get("testvalue").as_deref(), Some("72"));
    /// ```
    pub fn copy_with_comparer(other: &PropertyBag, comparer: KeyComparer) -> Self {
        let mut bag = Self::with_comparer(comparer);
        for (key, raw) in other.iter() {
            bag.set_raw(key, Some(raw.clone()));
        }
        bag
    }

    /// The key comparer fixed at construction
    pub fn comparer(&self) -> KeyComparer {
        self.comparer
    }

    /// Number of explicitly-set entries
    pub fn len(&self) -> usize {
        self.entries.values().filter(|e| e.raw.is_some()).count()
    }

    /// Returns true if no entry has been explicitly set
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if `key` has an explicitly-set entry
    pub fn contains_key(&self, key: &str) -> bool {
        self.get_raw(key).is_some()
    }

    /// Keys of the explicitly-set entries, as first written
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.iter().map(|(key, _)| key)
    }

    /// Iterates over explicitly-set entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawValue)> {
        self.entries
            .values()
            .filter_map(|e| e.raw.as_ref().map(|raw| (e.key.as_str(), raw)))
    }

    /// Removes every entry, including cached defaults
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Returns the canonical string stored under `key`
    ///
    /// Nested bags are rendered as a single-line inline table.
    pub fn get(&self, key: &str) -> Option<String> {
        self.get_raw(key).map(RawValue::to_canonical_string)
    }

    /// Stores `value` verbatim under `key`; `None` removes the entry
    pub fn set(&mut self, key: &str, value: Option<&str>) {
        self.set_raw(key, value.map(RawValue::from));
    }

    /// Removes the entry for `key`; returns true if an explicit entry existed
    pub fn remove(&mut self, key: &str) -> bool {
        let folded = self.comparer.fold(key);
        match self.entries.remove(folded.as_ref()) {
            Some(entry) => entry.raw.is_some(),
            None => false,
        }
    }

    /// Returns the raw form stored under `key`
    pub fn get_raw(&self, key: &str) -> Option<&RawValue> {
        let folded = self.comparer.fold(key);
        self.entries
            .get(folded.as_ref())
            .and_then(|e| e.raw.as_ref())
    }

    /// Stores a raw form under `key`; `None` removes the entry
    ///
    /// Any cached typed instance for the key is dropped.
    pub fn set_raw(&mut self, key: &str, raw: Option<RawValue>) {
        match raw {
            Some(raw) => self.insert_entry(key, raw, None),
            None => {
                self.remove(key);
            }
        }
    }

    fn insert_entry(&mut self, key: &str, raw: RawValue, cached: Option<CachedValue>) {
        let folded = self.comparer.fold(key).into_owned();
        match self.entries.entry(folded) {
            MapEntry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                entry.raw = Some(raw);
                entry.cached = cached;
            }
            MapEntry::Vacant(vacant) => {
                vacant.insert(Entry::explicit(key.to_string(), raw, cached));
            }
        }
    }

    /// Looks up `key` and converts its raw form to `T`
    ///
    /// Returns `Ok(None)` only when the key has no explicit entry. A value that
    /// is present but cannot be converted is an error, never `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sovran_propbag::{PropertyBag, PropertyError};
    ///
    /// let mut bag = PropertyBag::new();
    /// bag.set("TestValue", Some("15"));
    ///
    /// assert_eq!(bag.try_get_property::<i32>("TestValue")?, Some(15));
    /// assert_eq!(bag.try_get_property::<i32>("Missing")?, None);
    /// assert!(bag.try_get_property::<PropertyBag>("TestValue").is_err());
    /// # Ok::<(), PropertyError>(())
    /// ```
    ///
    /// # Errors
    ///
    /// - `PropertyError::Format` if the stored text is not valid syntax for `T`
    /// - `PropertyError::Unsupported` if the stored form cannot become `T`
    pub fn try_get_property<T: PropertyValue>(&self, key: &str) -> Result<Option<T>> {
        let folded = self.comparer.fold(key);
        let entry = match self.entries.get(folded.as_ref()) {
            Some(entry) => entry,
            None => return Ok(None),
        };
        let raw = match &entry.raw {
            Some(raw) => raw,
            None => return Ok(None),
        };
        if let Some(value) = entry.cached.as_ref().and_then(|c| c.downcast_ref::<T>()) {
            return Ok(Some(value.clone()));
        }
        T::from_raw(raw).map(Some)
    }

    /// Returns the value of a property, caching a materialized default
    ///
    /// Equivalent to [`get_property_with`](Self::get_property_with) with
    /// `cache_default` set to true.
    ///
    /// # Errors
    ///
    /// Propagates conversion errors for an explicitly-set entry.
    pub fn get_property<T: PropertyValue>(
        &mut self,
        descriptor: &PropertyDescriptor<T>,
    ) -> Result<T> {
        self.get_property_with(descriptor, true)
    }

    /// Returns the value of a property
    ///
    /// An explicit entry is converted (or served from the cache) and the
    /// converted instance is cached. An absent entry yields the descriptor's
    /// default; with `cache_default` the default is kept for later calls
    /// without creating an explicit entry, so [`len`](Self::len) is unchanged
    /// either way.
    ///
    /// # Errors
    ///
    /// Propagates conversion errors for an explicitly-set entry. The bag is
    /// unchanged when an error is returned.
    pub fn get_property_with<T: PropertyValue>(
        &mut self,
        descriptor: &PropertyDescriptor<T>,
        cache_default: bool,
    ) -> Result<T> {
        let key = descriptor.key();
        let folded = self.comparer.fold(&key).into_owned();

        if let Some(entry) = self.entries.get_mut(&folded) {
            if let Some(value) = entry.cached.as_ref().and_then(|c| c.downcast_ref::<T>()) {
                return Ok(value.clone());
            }
            if let Some(raw) = &entry.raw {
                let value = T::from_raw(raw)?;
                entry.cached = Some(CachedValue::new(value.clone()));
                return Ok(value);
            }
        }

        let value = descriptor.default_value();
        if cache_default {
            let entry = self.entries.entry(folded).or_insert_with(|| Entry {
                key,
                raw: None,
                cached: None,
            });
            entry.cached = Some(CachedValue::new(value.clone()));
        }
        Ok(value)
    }

    /// Sets the value of a property
    ///
    /// A null value, or one equal to the descriptor's default, removes the
    /// entry so the property inherits the default again. Otherwise the raw
    /// form is stored and the instance is cached.
    ///
    /// # Errors
    ///
    /// Infallible for the built-in value types; the `Result` is kept so
    /// implementations of [`PropertyValue`] stay free to fail in future.
    pub fn set_property<T: PropertyValue>(
        &mut self,
        descriptor: &PropertyDescriptor<T>,
        value: T,
    ) -> Result<()> {
        let key = descriptor.key();
        if descriptor.is_default(&value) {
            self.remove(&key);
            return Ok(());
        }
        match value.to_raw() {
            Some(raw) => self.insert_entry(&key, raw, Some(CachedValue::new(value))),
            None => {
                self.remove(&key);
            }
        }
        Ok(())
    }

    /// Resets a property to its default by removing its entry
    ///
    /// Returns true if an explicit entry was removed.
    pub fn reset_property<T>(&mut self, descriptor: &PropertyDescriptor<T>) -> bool {
        self.remove(&descriptor.key())
    }

    /// Reads a property, lets `f` modify it, and writes it back
    ///
    /// Writing back follows [`set_property`](Self::set_property), so a value
    /// edited back to its default removes the entry.
    ///
    /// # Examples
    ///
    /// ```
    /// use sovran_propbag::{PropertyBag, PropertyDescriptor, PropertyError, StringSet};
    ///
    /// static SKIPPED: PropertyDescriptor<StringSet> =
    ///     PropertyDescriptor::with_factory("Copyright", "Skipped", StringSet::new);
    ///
    /// let mut bag = PropertyBag::new();
    /// let count = bag.with_property_mut(&SKIPPED, |set| {
    ///     set.insert("generated.rs");
    ///     set.len()
    /// })?;
    ///
    /// assert_eq!(count, 1);
    /// assert_eq!(bag.get("Copyright.Skipped").as_deref(), Some("generated.rs"));
    /// # Ok::<(), PropertyError>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Propagates conversion errors from reading the current value; `f` is
    /// not called in that case.
    pub fn with_property_mut<T, F, R>(
        &mut self,
        descriptor: &PropertyDescriptor<T>,
        f: F,
    ) -> Result<R>
    where
        T: PropertyValue,
        F: FnOnce(&mut T) -> R,
    {
        let mut value = self.get_property_with(descriptor, false)?;
        let result = f(&mut value);
        self.set_property(descriptor, value)?;
        Ok(result)
    }
}

impl Default for PropertyBag {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for PropertyBag {
    fn clone(&self) -> Self {
        Self::copy_with_comparer(self, self.comparer)
    }
}

/// Bags are equal when they share a comparer and hold equal explicit entries
///
/// Cached instances and materialized defaults are ignored.
impl PartialEq for PropertyBag {
    fn eq(&self, other: &Self) -> bool {
        self.comparer == other.comparer
            && self.len() == other.len()
            && self.iter().all(|(key, raw)| other.get_raw(key) == Some(raw))
    }
}

impl fmt::Debug for PropertyBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyBag")
            .field("comparer", &self.comparer)
            .field("entries", &self.iter().collect::<BTreeMap<_, _>>())
            .finish()
    }
}
