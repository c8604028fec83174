//! Binary graph protocol.
//!
//! Layout: the magic bytes `PBAG`, the protocol version as a little-endian
//! `u16`, then a bincode-encoded [`GraphBag`]. Each entry carries an explicit
//! tag for its raw form, and every bag in the graph records its key comparer,
//! so decoding needs no knowledge of the value types involved.
//!
//! Decoding rejects graphs nested more than [`MAX_DEPTH`] bags deep.

use crate::bag::{KeyComparer, PropertyBag};
use crate::error::{PropertyError, Result};
use crate::value::RawValue;
use log::trace;
use serde::de::{self, DeserializeSeed, EnumAccess, SeqAccess, VariantAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::io::{Read, Write};

const MAGIC: &[u8; 4] = b"PBAG";
const HEADER_LEN: usize = MAGIC.len() + 2;
const MAX_PAYLOAD: usize = 64 * 1024 * 1024;

/// Version written by this crate; other versions are rejected on read
pub const PROTOCOL_VERSION: u16 = 1;

/// Deepest bag nesting accepted when decoding; the top-level bag is depth 0
pub const MAX_DEPTH: usize = 64;

#[derive(Debug, Serialize)]
struct GraphBag {
    comparer: KeyComparer,
    entries: Vec<GraphEntry>,
}

#[derive(Debug, Serialize)]
struct GraphEntry {
    key: String,
    value: GraphValue,
}

#[derive(Debug, Serialize)]
enum GraphValue {
    Text(String),
    Nested(GraphBag),
}

#[derive(Deserialize)]
enum GraphTag {
    Text,
    Nested,
}

// The graph is recursive, so it is decoded through seeds that carry the
// current depth instead of derived impls.
#[derive(Clone, Copy)]
struct BagSeed {
    depth: usize,
}

impl<'de> DeserializeSeed<'de> for BagSeed {
    type Value = GraphBag;

    fn deserialize<D>(self, deserializer: D) -> std::result::Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_struct("GraphBag", &["comparer", "entries"], self)
    }
}

impl<'de> Visitor<'de> for BagSeed {
    type Value = GraphBag;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a property bag")
    }

    fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let comparer = seq
            .next_element::<KeyComparer>()?
            .ok_or_else(|| <A::Error as de::Error>::invalid_length(0, &self))?;
        let entries = seq
            .next_element_seed(EntriesSeed { depth: self.depth })?
            .ok_or_else(|| <A::Error as de::Error>::invalid_length(1, &self))?;
        Ok(GraphBag { comparer, entries })
    }
}

struct EntriesSeed {
    depth: usize,
}

impl<'de> DeserializeSeed<'de> for EntriesSeed {
    type Value = Vec<GraphEntry>;

    fn deserialize<D>(self, deserializer: D) -> std::result::Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(self)
    }
}

impl<'de> Visitor<'de> for EntriesSeed {
    type Value = Vec<GraphEntry>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a list of entries")
    }

    fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        // the length prefix is untrusted
        let mut entries = Vec::with_capacity(seq.size_hint().unwrap_or(0).min(1024));
        while let Some(entry) = seq.next_element_seed(EntrySeed { depth: self.depth })? {
            entries.push(entry);
        }
        Ok(entries)
    }
}

struct EntrySeed {
    depth: usize,
}

impl<'de> DeserializeSeed<'de> for EntrySeed {
    type Value = GraphEntry;

    fn deserialize<D>(self, deserializer: D) -> std::result::Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_struct("GraphEntry", &["key", "value"], self)
    }
}

impl<'de> Visitor<'de> for EntrySeed {
    type Value = GraphEntry;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a property entry")
    }

    fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let key = seq
            .next_element::<String>()?
            .ok_or_else(|| <A::Error as de::Error>::invalid_length(0, &self))?;
        let value = seq
            .next_element_seed(ValueSeed { depth: self.depth })?
            .ok_or_else(|| <A::Error as de::Error>::invalid_length(1, &self))?;
        Ok(GraphEntry { key, value })
    }
}

struct ValueSeed {
    depth: usize,
}

impl<'de> DeserializeSeed<'de> for ValueSeed {
    type Value = GraphValue;

    fn deserialize<D>(self, deserializer: D) -> std::result::Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_enum("GraphValue", &["Text", "Nested"], self)
    }
}

impl<'de> Visitor<'de> for ValueSeed {
    type Value = GraphValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a text or nested value")
    }

    fn visit_enum<A>(self, data: A) -> std::result::Result<Self::Value, A::Error>
    where
        A: EnumAccess<'de>,
    {
        match data.variant::<GraphTag>()? {
            (GraphTag::Text, variant) => variant.newtype_variant::<String>().map(GraphValue::Text),
            (GraphTag::Nested, variant) => {
                let depth = self.depth + 1;
                if depth > MAX_DEPTH {
                    return Err(de::Error::custom(format!(
                        "nesting exceeds {} levels",
                        MAX_DEPTH
                    )));
                }
                variant
                    .newtype_variant_seed(BagSeed { depth })
                    .map(GraphValue::Nested)
            }
        }
    }
}

impl GraphBag {
    fn capture(bag: &PropertyBag, depth: usize) -> Result<Self> {
        let mut entries = Vec::with_capacity(bag.len());
        for (key, raw) in bag.iter() {
            let value = match raw {
                RawValue::Text(text) => GraphValue::Text(text.clone()),
                RawValue::Nested(nested) => {
                    if depth >= MAX_DEPTH {
                        return Err(PropertyError::malformed(
                            format!("key {:?}", key),
                            format!("nesting exceeds {} levels", MAX_DEPTH),
                        ));
                    }
                    GraphValue::Nested(GraphBag::capture(nested, depth + 1)?)
                }
            };
            entries.push(GraphEntry {
                key: key.to_string(),
                value,
            });
        }
        Ok(Self {
            comparer: bag.comparer(),
            entries,
        })
    }

    fn restore(self) -> PropertyBag {
        let mut bag = PropertyBag::with_comparer(self.comparer);
        for entry in self.entries {
            let raw = match entry.value {
                GraphValue::Text(text) => RawValue::Text(text),
                GraphValue::Nested(nested) => RawValue::Nested(nested.restore()),
            };
            bag.set_raw(&entry.key, Some(raw));
        }
        bag
    }
}

/// Encodes `bag` and everything nested in it
///
/// # Errors
///
/// Returns `PropertyError::MalformedDocument` if bags nest more than
/// [`MAX_DEPTH`] levels deep or the encoder fails.
pub fn to_bytes(bag: &PropertyBag) -> Result<Vec<u8>> {
    let graph = GraphBag::capture(bag, 0)?;
    let payload = bincode::serde::encode_to_vec(&graph, bincode::config::standard())
        .map_err(|e| PropertyError::malformed("binary payload", e.to_string()))?;

    let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
    bytes.extend_from_slice(MAGIC);
    bytes.extend_from_slice(&PROTOCOL_VERSION.to_le_bytes());
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

/// Decodes a bag written by [`to_bytes`]
///
/// # Errors
///
/// Returns `PropertyError::MalformedDocument` for a missing or wrong header,
/// an unsupported protocol version, or a truncated or corrupt payload.
pub fn from_bytes(bytes: &[u8]) -> Result<PropertyBag> {
    if bytes.len() < HEADER_LEN || &bytes[..MAGIC.len()] != MAGIC {
        return Err(PropertyError::malformed(
            "binary header",
            "not a property bag graph",
        ));
    }
    let version = u16::from_le_bytes([bytes[MAGIC.len()], bytes[MAGIC.len() + 1]]);
    if version != PROTOCOL_VERSION {
        return Err(PropertyError::malformed(
            "binary header",
            format!(
                "protocol version {} is not supported (expected {})",
                version, PROTOCOL_VERSION
            ),
        ));
    }

    let payload = &bytes[HEADER_LEN..];
    let config = bincode::config::standard().with_limit::<MAX_PAYLOAD>();
    let (graph, read) =
        bincode::serde::seed_decode_from_slice(BagSeed { depth: 0 }, payload, config)
            .map_err(decode_error)?;
    if read != payload.len() {
        return Err(PropertyError::malformed(
            format!("binary payload offset {}", read),
            "unexpected trailing bytes",
        ));
    }
    Ok(graph.restore())
}

fn decode_error(err: bincode::error::DecodeError) -> PropertyError {
    let reason = match err {
        bincode::error::DecodeError::OtherString(reason) => reason,
        other => other.to_string(),
    };
    PropertyError::malformed("binary payload", reason)
}

/// Writes `bag` to `writer` in the binary graph format
///
/// # Errors
///
/// - `PropertyError::Io` if writing fails
/// - `PropertyError::MalformedDocument` if bags nest too deep or the encoder fails
pub fn write_graph<W: Write>(bag: &PropertyBag, mut writer: W) -> Result<()> {
    let bytes = to_bytes(bag)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    trace!("wrote property graph with {} entries ({} bytes)", bag.len(), bytes.len());
    Ok(())
}

/// Reads a bag from `reader` in the binary graph format
///
/// # Errors
///
/// - `PropertyError::Io` if reading fails
/// - `PropertyError::MalformedDocument` as for [`from_bytes`]
pub fn read_graph<R: Read>(mut reader: R) -> Result<PropertyBag> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    let bag = from_bytes(&bytes)?;
    trace!("read property graph with {} entries ({} bytes)", bag.len(), bytes.len());
    Ok(bag)
}
