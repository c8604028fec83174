//! Conversion between canonical strings and typed values.
//!
//! Every supported type goes through [`PropertyValue`]; the free functions here
//! are the string-level entry points used by callers that hold raw text.

use crate::bag::PropertyBag;
use crate::error::{PropertyError, Result};
use crate::serialization::text;
use crate::value::{PropertyValue, RawValue, ScalarValue};
use std::any::type_name;
use std::fmt::Display;
use std::str::FromStr;

/// Implements [`PropertyValue`] and [`ScalarValue`] for a type through its
/// `FromStr` and `Display` implementations
///
/// # Examples
///
/// ```
/// use sovran_propbag::{property_value_from_str, string_to_value, value_to_string};
/// use std::net::Ipv4Addr;
///
/// #[derive(Clone, PartialEq, Debug)]
/// struct Addr(Ipv4Addr);
///
/// impl std::fmt::Display for Addr {
///     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
///         self.0.fmt(f)
///     }
/// }
///
/// impl std::str::FromStr for Addr {
///     type Err = std::net::AddrParseError;
///     fn from_str(s: &str) -> Result<Self, Self::Err> {
///         s.parse().map(Addr)
///     }
/// }
///
/// property_value_from_str!(Addr);
///
/// let addr: Addr = string_to_value("10.0.0.1").unwrap();
/// assert_eq!(value_to_string(&addr).as_deref(), Some("10.0.0.1"));
/// ```
#[macro_export]
macro_rules! property_value_from_str {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::PropertyValue for $ty {
                fn to_raw(&self) -> ::std::option::Option<$crate::RawValue> {
                    ::std::option::Option::Some($crate::RawValue::Text(self.to_string()))
                }

                fn from_raw(raw: &$crate::RawValue) -> $crate::Result<Self> {
                    $crate::convert::parse_text::<Self>(raw)
                }
            }

            impl $crate::ScalarValue for $ty {}
        )+
    };
}

crate::property_value_from_str!(
    char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize
);

macro_rules! impl_float {
    ($($ty:ty),+) => {
        $(
            impl PropertyValue for $ty {
                // Debug keeps exponents for extreme magnitudes and round-trips exactly.
                fn to_raw(&self) -> Option<RawValue> {
                    Some(RawValue::Text(format!("{:?}", self)))
                }

                fn from_raw(raw: &RawValue) -> Result<Self> {
                    parse_text::<Self>(raw)
                }

                fn same_value(&self, other: &Self) -> bool {
                    self.to_bits() == other.to_bits()
                }
            }

            impl ScalarValue for $ty {}
        )+
    };
}

impl_float!(f32, f64);

impl PropertyValue for bool {
    fn to_raw(&self) -> Option<RawValue> {
        Some(RawValue::Text(self.to_string()))
    }

    fn from_raw(raw: &RawValue) -> Result<Self> {
        let text = text_of::<Self>(raw)?;
        if text.eq_ignore_ascii_case("true") {
            Ok(true)
        } else if text.eq_ignore_ascii_case("false") {
            Ok(false)
        } else {
            Err(PropertyError::format(
                type_name::<Self>(),
                text,
                "expected `true` or `false`",
            ))
        }
    }
}

impl ScalarValue for bool {}

impl PropertyValue for String {
    fn to_raw(&self) -> Option<RawValue> {
        Some(RawValue::Text(self.clone()))
    }

    fn from_raw(raw: &RawValue) -> Result<Self> {
        Ok(raw.to_canonical_string())
    }
}

impl ScalarValue for String {}

impl PropertyValue for PropertyBag {
    fn to_raw(&self) -> Option<RawValue> {
        Some(RawValue::Nested(self.clone()))
    }

    fn from_raw(raw: &RawValue) -> Result<Self> {
        match raw {
            RawValue::Nested(bag) => Ok(bag.clone()),
            RawValue::Text(text) => bag_from_canonical(text),
        }
    }
}

/// Returns the text of a scalar raw form
///
/// # Errors
///
/// Returns `PropertyError::Unsupported` if the raw form is a nested bag.
pub fn text_of<T>(raw: &RawValue) -> Result<&str> {
    match raw {
        RawValue::Text(text) => Ok(text),
        RawValue::Nested(_) => Err(PropertyError::unsupported(
            type_name::<T>(),
            "the stored value is a nested property bag",
        )),
    }
}

/// Parses a scalar raw form with `FromStr`
///
/// # Errors
///
/// - `PropertyError::Unsupported` if the raw form is a nested bag
/// - `PropertyError::Format` if parsing fails
pub fn parse_text<T>(raw: &RawValue) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    let text = text_of::<T>(raw)?;
    text.parse::<T>()
        .map_err(|e| PropertyError::format(type_name::<T>(), text, e))
}

/// Converts a canonical string to a typed value
///
/// # Examples
///
/// ```
/// use sovran_propbag::{string_to_value, PropertyError};
///
/// assert_eq!(string_to_value::<i32>("15").unwrap(), 15);
/// assert!(matches!(
///     string_to_value::<i32>("fifteen"),
///     Err(PropertyError::Format { .. })
/// ));
/// ```
///
/// # Errors
///
/// - `PropertyError::Format` if `raw` is not valid syntax for `T`
/// - `PropertyError::Unsupported` if `raw` cannot represent `T` at all
pub fn string_to_value<T: PropertyValue>(raw: &str) -> Result<T> {
    T::from_raw(&RawValue::Text(raw.to_string()))
}

/// Converts a typed value to its canonical string, `None` for null
pub fn value_to_string<T: PropertyValue>(value: &T) -> Option<String> {
    value.to_raw().map(|raw| raw.to_canonical_string())
}

pub(crate) fn bag_to_canonical(bag: &PropertyBag) -> String {
    text::bag_to_inline_string(bag)
}

/// Parses the single-line inline table form of a nested bag
pub(crate) fn bag_from_canonical(raw: &str) -> Result<PropertyBag> {
    let target = type_name::<PropertyBag>();
    let value = raw
        .parse::<toml_edit::Value>()
        .map_err(|_| PropertyError::unsupported(target, format!("{:?} is not a bag", raw)))?;
    match value {
        toml_edit::Value::InlineTable(table) => text::bag_from_table_like(&table, "inline")
            .map_err(|e| PropertyError::unsupported(target, e.to_string())),
        _ => Err(PropertyError::unsupported(
            target,
            format!("{:?} is not a bag", raw),
        )),
    }
}
