use crate::bag::PropertyBag;
use crate::convert;
use crate::error::Result;

/// The raw stored form of a property bag entry
///
/// Every value in a bag is kept in one of these two shapes. Scalars and string
/// sets live as their canonical string; nested bags (plain or typed) keep
/// their own entries so both persistence formats can recurse into them.
#[derive(Clone, Debug)]
pub enum RawValue {
    /// Canonical string form of a scalar or string set
    Text(String),
    /// Entries of a nested property bag
    Nested(PropertyBag),
}

impl RawValue {
    /// Renders the canonical string form
    ///
    /// Nested bags render as a single-line inline table, e.g.
    /// `{ "Rule.Enabled" = "true" }`.
    pub fn to_canonical_string(&self) -> String {
        match self {
            RawValue::Text(text) => text.clone(),
            RawValue::Nested(bag) => convert::bag_to_canonical(bag),
        }
    }

    /// Returns the text if this is a scalar form
    pub fn as_text(&self) -> Option<&str> {
        match self {
            RawValue::Text(text) => Some(text),
            RawValue::Nested(_) => None,
        }
    }

    /// Returns the nested bag if this is a nested form
    pub fn as_nested(&self) -> Option<&PropertyBag> {
        match self {
            RawValue::Text(_) => None,
            RawValue::Nested(bag) => Some(bag),
        }
    }
}

impl PartialEq for RawValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (RawValue::Text(a), RawValue::Text(b)) => a == b,
            (RawValue::Nested(a), RawValue::Nested(b)) => a == b,
            _ => self.to_canonical_string() == other.to_canonical_string(),
        }
    }
}

impl From<String> for RawValue {
    fn from(text: String) -> Self {
        RawValue::Text(text)
    }
}

impl From<&str> for RawValue {
    fn from(text: &str) -> Self {
        RawValue::Text(text.to_string())
    }
}

impl From<PropertyBag> for RawValue {
    fn from(bag: PropertyBag) -> Self {
        RawValue::Nested(bag)
    }
}

/// A type that can be stored in a [`PropertyBag`]
///
/// Implementations convert between the typed value and its [`RawValue`].
/// The crate implements this for booleans, chars, every fixed-width numeric
/// type, `String`, `Option<T>`, [`StringSet`](crate::StringSet),
/// [`PropertyBag`] and [`TypedPropertyBag`](crate::TypedPropertyBag). Other
/// types plug in with [`property_value_from_str!`](crate::property_value_from_str)
/// or [`property_enum!`](crate::property_enum), or by implementing the trait.
pub trait PropertyValue: Clone + PartialEq + Send + Sync + 'static {
    /// Converts to the raw stored form; `None` means null
    fn to_raw(&self) -> Option<RawValue>;

    /// Converts from the raw stored form
    ///
    /// # Errors
    ///
    /// - `PropertyError::Format` if the text is not valid syntax for the type
    /// - `PropertyError::Unsupported` if the raw shape cannot become this type
    fn from_raw(raw: &RawValue) -> Result<Self>;

    /// Equality used to decide whether a value equals a descriptor default
    fn same_value(&self, other: &Self) -> bool {
        self == other
    }
}

/// Marker for property types whose defaults may be held by value
///
/// Composite types (string sets, nested bags) deliberately do not implement
/// this, so their descriptors must be built with
/// [`PropertyDescriptor::with_factory`](crate::PropertyDescriptor::with_factory).
pub trait ScalarValue: PropertyValue {}

impl<T: PropertyValue> PropertyValue for Option<T> {
    fn to_raw(&self) -> Option<RawValue> {
        self.as_ref().and_then(T::to_raw)
    }

    fn from_raw(raw: &RawValue) -> Result<Self> {
        T::from_raw(raw).map(Some)
    }

    fn same_value(&self, other: &Self) -> bool {
        match (self, other) {
            (Some(a), Some(b)) => a.same_value(b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl<T: ScalarValue> ScalarValue for Option<T> {}
