use crate::convert::text_of;
use crate::error::{PropertyError, Result};
use crate::value::{PropertyValue, RawValue};
use std::any::type_name;
use std::fmt;

const DELIMITER: char = ';';
const ESCAPE: char = '\\';

/// An insertion-ordered set of unique strings
///
/// Two sets are equal when they hold the same strings, regardless of order.
/// The canonical string form joins elements with `;` in insertion order, with
/// `;` and `\` inside elements escaped by `\`.
///
/// # Examples
///
/// ```
/// use sovran_propbag::{StringSet, value_to_string};
///
/// let mut set = StringSet::from_iter(["b", "a"]);
/// assert!(!set.insert("a"));
/// set.insert("x;y");
///
/// assert_eq!(value_to_string(&set).as_deref(), Some("b;a;x\\;y"));
/// assert_eq!(set, StringSet::from_iter(["a", "x;y", "b"]));
/// ```
#[derive(Clone, Default)]
pub struct StringSet {
    items: Vec<String>,
}

impl StringSet {
    /// Creates an empty set
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Adds a string; returns false if it was already present
    pub fn insert(&mut self, value: impl Into<String>) -> bool {
        let value = value.into();
        if self.contains(&value) {
            return false;
        }
        self.items.push(value);
        true
    }

    /// Removes a string; returns true if it was present
    pub fn remove(&mut self, value: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item != value);
        self.items.len() != before
    }

    /// Returns true if the set holds `value`
    pub fn contains(&self, value: &str) -> bool {
        self.items.iter().any(|item| item == value)
    }

    /// Number of strings in the set
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the set is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }

    fn to_canonical(&self) -> String {
        let mut out = String::new();
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                out.push(DELIMITER);
            }
            for c in item.chars() {
                if c == DELIMITER || c == ESCAPE {
                    out.push(ESCAPE);
                }
                out.push(c);
            }
        }
        // A lone empty element would otherwise render like the empty set;
        // ";" parses to two empty elements that collapse back into one.
        if out.is_empty() && !self.items.is_empty() {
            out.push(DELIMITER);
        }
        out
    }

    fn from_canonical(text: &str) -> Result<Self> {
        let mut set = StringSet::new();
        if text.is_empty() {
            return Ok(set);
        }
        let mut current = String::new();
        let mut chars = text.chars();
        while let Some(c) = chars.next() {
            match c {
                ESCAPE => match chars.next() {
                    Some(escaped) => current.push(escaped),
                    None => {
                        return Err(PropertyError::format(
                            type_name::<Self>(),
                            text,
                            "dangling escape at end of input",
                        ))
                    }
                },
                DELIMITER => {
                    set.insert(std::mem::take(&mut current));
                }
                _ => current.push(c),
            }
        }
        set.insert(current);
        Ok(set)
    }
}

impl PartialEq for StringSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|item| other.contains(item))
    }
}

impl Eq for StringSet {}

impl fmt::Debug for StringSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.items.iter()).finish()
    }
}

impl<S: Into<String>> FromIterator<S> for StringSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = StringSet::new();
        set.extend(iter);
        set
    }
}

impl<S: Into<String>> Extend<S> for StringSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for item in iter {
            self.insert(item);
        }
    }
}

impl<'a> IntoIterator for &'a StringSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl PropertyValue for StringSet {
    fn to_raw(&self) -> Option<RawValue> {
        Some(RawValue::Text(self.to_canonical()))
    }

    fn from_raw(raw: &RawValue) -> Result<Self> {
        Self::from_canonical(text_of::<Self>(raw)?)
    }
}
