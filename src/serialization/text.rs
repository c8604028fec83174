//! Human-readable TOML protocol.
//!
//! A bag saved under the id `Settings` looks like this:
//!
//! ```toml
//! [Settings]
//! "Format.TabSize" = "8"
//! "Format.Ignored" = "a.rs;b.rs"
//!
//! [Settings."Usings.Groups"]
//! "Usings.System" = "First"
//! ```
//!
//! Every value is written as a TOML string holding the canonical string form;
//! nested bags become sub-sections keyed by the entry key.

use crate::bag::PropertyBag;
use crate::error::{PropertyError, Result};
use crate::value::RawValue;
use log::debug;
use std::io::{Read, Write};
use toml_edit::{DocumentMut, InlineTable, Item, Table, TableLike, Value};

pub(crate) fn require_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(PropertyError::MissingArgument("id"));
    }
    Ok(())
}

/// Renders `bag` as a document with a single top-level section named `id`
///
/// # Errors
///
/// Returns `PropertyError::MissingArgument` if `id` is empty.
pub fn to_string(bag: &PropertyBag, id: &str) -> Result<String> {
    require_id(id)?;
    let mut doc = DocumentMut::new();
    doc.insert(id, Item::Table(bag_to_table(bag)));
    Ok(doc.to_string())
}

/// Writes `bag` as a document with a single top-level section named `id`
///
/// # Errors
///
/// - `PropertyError::MissingArgument` if `id` is empty
/// - `PropertyError::Io` if writing fails
pub fn write_document<W: Write>(bag: &PropertyBag, id: &str, mut writer: W) -> Result<()> {
    let text = to_string(bag, id)?;
    writer.write_all(text.as_bytes())?;
    writer.flush()?;
    debug!("wrote property section [{}] with {} entries", id, bag.len());
    Ok(())
}

/// Parses a document, returning its section id and entries
///
/// An empty document yields no id and an empty bag.
///
/// # Errors
///
/// Returns `PropertyError::MalformedDocument` for TOML syntax errors, keys
/// outside a section, more than one top-level section, or values that are
/// neither strings nor tables.
pub fn from_str(text: &str) -> Result<(Option<String>, PropertyBag)> {
    let doc = text
        .parse::<DocumentMut>()
        .map_err(|e| PropertyError::malformed("document", e.to_string()))?;

    let mut section: Option<(String, PropertyBag)> = None;
    for (name, item) in doc.iter() {
        let table = match item {
            Item::Table(table) => table,
            _ => {
                return Err(PropertyError::malformed(
                    format!("key {:?}", name),
                    "expected a [section] header before any key",
                ))
            }
        };
        if let Some((first, _)) = &section {
            return Err(PropertyError::malformed(
                format!("[{}]", name),
                format!("only one top-level section is allowed, found [{}] already", first),
            ));
        }
        section = Some((name.to_string(), bag_from_table_like(table, name)?));
    }

    Ok(match section {
        Some((id, bag)) => (Some(id), bag),
        None => (None, PropertyBag::new()),
    })
}

/// Reads and parses a document, returning its section id and entries
///
/// # Errors
///
/// - `PropertyError::Io` if reading fails
/// - `PropertyError::MalformedDocument` as for [`from_str`]
pub fn read_document<R: Read>(mut reader: R) -> Result<(Option<String>, PropertyBag)> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    let (id, bag) = from_str(&text)?;
    debug!(
        "read property section [{}] with {} entries",
        id.as_deref().unwrap_or(""),
        bag.len()
    );
    Ok((id, bag))
}

fn bag_to_table(bag: &PropertyBag) -> Table {
    let mut table = Table::new();
    for (key, raw) in bag.iter() {
        let item = match raw {
            RawValue::Text(text) => toml_edit::value(text.as_str()),
            RawValue::Nested(nested) => Item::Table(bag_to_table(nested)),
        };
        table.insert(key, item);
    }
    table
}

fn bag_to_inline(bag: &PropertyBag) -> InlineTable {
    let mut table = InlineTable::new();
    for (key, raw) in bag.iter() {
        let value = match raw {
            RawValue::Text(text) => Value::from(text.as_str()),
            RawValue::Nested(nested) => Value::InlineTable(bag_to_inline(nested)),
        };
        table.insert(key, value);
    }
    table
}

pub(crate) fn bag_to_inline_string(bag: &PropertyBag) -> String {
    Value::InlineTable(bag_to_inline(bag)).to_string().trim().to_string()
}

/// Builds a bag from a table or inline table; `location` names the section
/// for error messages
pub(crate) fn bag_from_table_like(table: &dyn TableLike, location: &str) -> Result<PropertyBag> {
    let mut bag = PropertyBag::new();
    for (key, item) in table.iter() {
        let raw = match item {
            Item::Value(Value::String(text)) => RawValue::Text(text.value().clone()),
            Item::Value(Value::InlineTable(nested)) => {
                RawValue::Nested(bag_from_table_like(nested, &nested_location(location, key))?)
            }
            Item::Table(nested) => {
                RawValue::Nested(bag_from_table_like(nested, &nested_location(location, key))?)
            }
            _ => {
                return Err(PropertyError::malformed(
                    format!("[{}] key {:?}", location, key),
                    "expected a quoted string or a nested section",
                ))
            }
        };
        bag.set_raw(key, Some(raw));
    }
    Ok(bag)
}

fn nested_location(parent: &str, key: &str) -> String {
    format!("{}.{:?}", parent, key)
}
