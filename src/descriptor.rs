use crate::value::{PropertyValue, ScalarValue};
use std::fmt;

/// Separator between the feature name and the property name in a bag key
pub const KEY_SEPARATOR: char = '.';

#[derive(Clone)]
enum DefaultValue<T> {
    Value(T),
    Factory(fn() -> T),
}

/// Immutable identity and default for one typed property
///
/// A descriptor is created once per logical option, usually as a `static`, and
/// handed to [`PropertyBag`](crate::PropertyBag) accessors. The key under which
/// the value is stored is `feature.name`.
///
/// Scalar properties carry their default by value. Composite properties
/// (string sets, nested bags) carry a factory instead, so every bag that
/// materializes the default gets its own instance.
///
/// # Examples
///
/// ```
/// use sovran_propbag::{PropertyDescriptor, StringSet};
///
/// static INDENT: PropertyDescriptor<u8> = PropertyDescriptor::new("Format", "Indent", 4);
/// static IGNORED: PropertyDescriptor<StringSet> =
///     PropertyDescriptor::with_factory("Format", "Ignored", StringSet::new);
///
/// assert_eq!(INDENT.key(), "Format.Indent");
/// assert_eq!(INDENT.default_value(), 4);
/// assert!(IGNORED.default_value().is_empty());
/// ```
///
/// # Panics
///
/// Construction panics if the feature name is empty or contains
/// [`KEY_SEPARATOR`], or if the property name is empty. For `const` and
/// `static` descriptors this surfaces at compile time.
#[derive(Clone)]
pub struct PropertyDescriptor<T> {
    feature: &'static str,
    name: &'static str,
    default: DefaultValue<T>,
}

const fn validate_names(feature: &str, name: &str) {
    assert!(!feature.is_empty(), "property feature name must not be empty");
    assert!(!name.is_empty(), "property name must not be empty");
    let bytes = feature.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        assert!(
            bytes[i] != KEY_SEPARATOR as u8,
            "property feature name must not contain '.'"
        );
        i += 1;
    }
}

impl<T: ScalarValue> PropertyDescriptor<T> {
    /// Creates a descriptor for a scalar property with a literal default
    pub const fn new(feature: &'static str, name: &'static str, default: T) -> Self {
        validate_names(feature, name);
        Self {
            feature,
            name,
            default: DefaultValue::Value(default),
        }
    }
}

impl<T> PropertyDescriptor<T> {
    /// Creates a descriptor whose default is produced by `factory` on every
    /// materialization
    pub const fn with_factory(feature: &'static str, name: &'static str, factory: fn() -> T) -> Self {
        validate_names(feature, name);
        Self {
            feature,
            name,
            default: DefaultValue::Factory(factory),
        }
    }

    /// The feature (rule) this property belongs to
    pub fn feature(&self) -> &'static str {
        self.feature
    }

    /// The property name within its feature
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The key used in the backing store
    pub fn key(&self) -> String {
        format!("{}{}{}", self.feature, KEY_SEPARATOR, self.name)
    }

    /// Returns true if the default is produced by a factory
    pub fn has_factory(&self) -> bool {
        matches!(self.default, DefaultValue::Factory(_))
    }
}

impl<T: PropertyValue> PropertyDescriptor<T> {
    /// Returns a freshly materialized default value
    pub fn default_value(&self) -> T {
        match &self.default {
            DefaultValue::Value(value) => value.clone(),
            DefaultValue::Factory(factory) => factory(),
        }
    }

    /// Returns true if `value` equals this descriptor's default
    pub fn is_default(&self, value: &T) -> bool {
        value.same_value(&self.default_value())
    }
}

impl<T> fmt::Debug for PropertyDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyDescriptor")
            .field("feature", &self.feature)
            .field("name", &self.name)
            .field("factory", &self.has_factory())
            .finish()
    }
}
