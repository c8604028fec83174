//! Enumerations stored by variant name.

use thiserror::Error;

/// Returned when text names no variant of an enum declared with
/// [`property_enum!`](crate::property_enum)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{value:?} is not a variant of {type_name}")]
pub struct UnknownVariant {
    type_name: &'static str,
    value: String,
}

impl UnknownVariant {
    /// Creates the error for `value` not naming a variant of `type_name`
    pub fn new(type_name: &'static str, value: &str) -> Self {
        Self {
            type_name,
            value: value.to_string(),
        }
    }
}

/// Finds the variant named `text`, preferring an exact match over an
/// ASCII-case-insensitive one
#[doc(hidden)]
pub fn parse_variant<E: Copy>(text: &str, variants: &[E], name: fn(&E) -> &'static str) -> Option<E> {
    let text = text.trim();
    variants
        .iter()
        .find(|v| name(v) == text)
        .or_else(|| variants.iter().find(|v| name(v).eq_ignore_ascii_case(text)))
        .copied()
}

/// Declares a fieldless enum stored in property bags by variant name
///
/// The macro derives `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq` and `Hash`,
/// implements `Display` and `FromStr` over the variant names, and plugs the
/// enum into [`PropertyValue`](crate::PropertyValue) as a scalar.
///
/// # Examples
///
/// ```
/// use sovran_propbag::{property_enum, PropertyBag, PropertyDescriptor};
///
/// property_enum! {
///     pub enum Placement {
///         Inside = 1,
///         Outside,
///     }
/// }
///
/// static PLACEMENT: PropertyDescriptor<Placement> =
///     PropertyDescriptor::new("Usings", "Placement", Placement::Outside);
///
/// let mut bag = PropertyBag::new();
/// bag.set("Usings.Placement", Some("inside"));
/// assert_eq!(bag.get_property(&PLACEMENT).unwrap(), Placement::Inside);
/// assert_eq!(Placement::Outside.to_string(), "Outside");
/// ```
#[macro_export]
macro_rules! property_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident $(= $disc:expr)? ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant $(= $disc)? ),+
        }

        impl $name {
            /// Every variant in declaration order
            pub const VARIANTS: &'static [$name] = &[$($name::$variant),+];

            /// The name this variant is stored under
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => stringify!($variant) ),+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::UnknownVariant;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                $crate::enums::parse_variant(s, Self::VARIANTS, Self::as_str)
                    .ok_or_else(|| $crate::UnknownVariant::new(stringify!($name), s))
            }
        }

        $crate::property_value_from_str!($name);
    };
}
