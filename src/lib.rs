//! # sovran-propbag
//!
//! A strongly-typed, hierarchical property bag for configuring pluggable rules.
//!
//! `sovran-propbag` lets independent components share one configuration store
//! without sharing a schema type. Each component describes its options with
//! [`PropertyDescriptor`]s (feature name, property name, default). The bag keeps
//! values in a string-keyed raw form and converts them to typed values on
//! demand, caching the converted instance.
//!
//! ## Key Features
//!
//! - **Type-safe**: Typed accessors convert through [`PropertyValue`]; wrong-shaped
//!   data is an error, never a silent default
//! - **Default-transparent**: Values equal to their default are not stored, so
//!   saved files stay minimal and default changes propagate
//! - **Nestable**: A value may itself be a [`PropertyBag`] or a
//!   [`TypedPropertyBag`], to any depth
//! - **Persistent**: A human-editable TOML format and a versioned binary graph
//!   format, both round-tripping nested bags exactly
//!
//! ## Usage Examples
//!
//! ### Basic Usage
//!
//! ```rust
//! use sovran_propbag::{PropertyBag, PropertyDescriptor, PropertyError, StringSet};
//!
//! static MAX_WIDTH: PropertyDescriptor<u32> =
//!     PropertyDescriptor::new("Wrap", "MaxWidth", 100);
//! static EXCLUDED: PropertyDescriptor<StringSet> =
//!     PropertyDescriptor::with_factory("Wrap", "Excluded", StringSet::new);
//!
//! fn main() -> Result<(), PropertyError> {
//!     let mut bag = PropertyBag::new();
//!
//!     // Absent properties read as their default
//!     assert_eq!(bag.get_property(&MAX_WIDTH)?, 100);
//!
//!     bag.set_property(&MAX_WIDTH, 120)?;
//!     bag.set_property(&EXCLUDED, StringSet::from_iter(["generated"]))?;
//!     assert_eq!(bag.len(), 2);
//!
//!     // Raw access sees the canonical strings
//!     assert_eq!(bag.get("Wrap.MaxWidth").as_deref(), Some("120"));
//!
//!     // Setting the default back removes the entry
//!     bag.set_property(&MAX_WIDTH, 100)?;
//!     assert_eq!(bag.len(), 1);
//!
//!     Ok(())
//! }
//! ```
//!
//! ### Nested Bags
//!
//! ```rust
//! use sovran_propbag::{property_enum, PropertyBag, PropertyDescriptor, PropertyError, TypedPropertyBag};
//!
//! property_enum! {
//!     pub enum Placement { Inside, Outside }
//! }
//!
//! static SYSTEM: PropertyDescriptor<Placement> =
//!     PropertyDescriptor::new("Usings", "System", Placement::Outside);
//! static GROUPS: PropertyDescriptor<TypedPropertyBag<Placement>> =
//!     PropertyDescriptor::with_factory("Usings", "Groups", TypedPropertyBag::new);
//!
//! let mut bag = PropertyBag::new();
//! bag.with_property_mut(&GROUPS, |groups| groups.set_property(&SYSTEM, Placement::Inside))??;
//!
//! let mut groups = bag.get_property(&GROUPS)?;
//! assert_eq!(groups.get_property(&SYSTEM)?, Placement::Inside);
//! # Ok::<(), PropertyError>(())
//! ```
//!
//! ### Persistence
//!
//! ```rust
//! use sovran_propbag::{serialization::text, PropertyBag, PropertyDescriptor, PropertyError};
//!
//! static ENABLED: PropertyDescriptor<bool> = PropertyDescriptor::new("Copyright", "Enabled", true);
//!
//! let mut bag = PropertyBag::new();
//! bag.set_property(&ENABLED, false)?;
//!
//! let mut buffer = Vec::new();
//! bag.save_to_writer(&mut buffer, "Settings")?;
//! assert!(String::from_utf8_lossy(&buffer).starts_with("[Settings]"));
//!
//! let mut loaded = PropertyBag::new();
//! loaded.load_from_reader(buffer.as_slice())?;
//! assert_eq!(loaded, bag);
//!
//! let (id, _) = text::from_str("[Settings]\n")?;
//! assert_eq!(id.as_deref(), Some("Settings"));
//! # Ok::<(), PropertyError>(())
//! ```
//!
//! ### Error Handling
//!
//! ```rust
//! use sovran_propbag::{PropertyBag, PropertyError};
//!
//! let mut bag = PropertyBag::new();
//! bag.set("Rule.Count", Some("many"));
//!
//! // Absence is not an error
//! assert!(matches!(bag.try_get_property::<i32>("Rule.Missing"), Ok(None)));
//!
//! // Present-but-unconvertible is
//! match bag.try_get_property::<i32>("Rule.Count") {
//!     Ok(value) => println!("Count: {:?}", value),
//!     Err(PropertyError::Format { value, .. }) => println!("Bad number: {}", value),
//!     Err(e) => println!("Other error: {}", e),
//! }
//! ```
//!
//! ## Concurrency
//!
//! Bags are plain data structures mutated through `&mut self`. They are
//! `Send + Sync`, so callers that need shared mutation wrap them in their own
//! lock.

mod bag;
mod cached;
pub mod convert;
mod descriptor;
#[doc(hidden)]
pub mod enums;
mod error;
pub mod serialization;
mod string_set;
mod typed;
mod value;

pub use bag::{KeyComparer, PropertyBag};
pub use convert::{string_to_value, value_to_string};
pub use descriptor::{PropertyDescriptor, KEY_SEPARATOR};
pub use enums::UnknownVariant;
pub use error::{PropertyError, Result};
pub use string_set::StringSet;
pub use typed::TypedPropertyBag;
pub use value::{PropertyValue, RawValue, ScalarValue};
