//! Persistence protocols for property bags.
//!
//! [`text`] writes a human-editable TOML document with one section per bag;
//! [`binary`] writes a versioned graph that also preserves key comparers.
//! Both walk a bag only through its public entry surface.

pub mod binary;
pub mod text;

use crate::bag::PropertyBag;
use crate::error::{PropertyError, Result};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

fn require_path(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(PropertyError::MissingArgument("path"));
    }
    Ok(())
}

impl PropertyBag {
    /// Saves the bag as a text document with a top-level section named `id`
    ///
    /// # Errors
    ///
    /// - `PropertyError::MissingArgument` if `path` or `id` is empty
    /// - `PropertyError::Io` if the file cannot be written
    pub fn save_to<P: AsRef<Path>>(&self, path: P, id: &str) -> Result<()> {
        let path = path.as_ref();
        require_path(path)?;
        text::require_id(id)?;
        let file = File::create(path)?;
        self.save_to_writer(BufWriter::new(file), id)
    }

    /// Writes the bag as a text document with a top-level section named `id`
    ///
    /// # Errors
    ///
    /// - `PropertyError::MissingArgument` if `id` is empty
    /// - `PropertyError::Io` if writing fails
    pub fn save_to_writer<W: Write>(&self, writer: W, id: &str) -> Result<()> {
        text::write_document(self, id, writer)
    }

    /// Replaces the bag's entries with those of a text document on disk
    ///
    /// The bag keeps its own key comparer. On error the bag is unchanged.
    ///
    /// # Errors
    ///
    /// - `PropertyError::MissingArgument` if `path` is empty
    /// - `PropertyError::Io` if the file cannot be read
    /// - `PropertyError::MalformedDocument` if the document does not parse
    pub fn load_from<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        require_path(path)?;
        let file = File::open(path)?;
        self.load_from_reader(BufReader::new(file))
    }

    /// Replaces the bag's entries with those of a text document
    ///
    /// # Errors
    ///
    /// - `PropertyError::Io` if reading fails
    /// - `PropertyError::MalformedDocument` if the document does not parse
    pub fn load_from_reader<R: Read>(&mut self, reader: R) -> Result<()> {
        let (_, loaded) = text::read_document(reader)?;
        self.clear();
        for (key, raw) in loaded.iter() {
            self.set_raw(key, Some(raw.clone()));
        }
        Ok(())
    }

    /// Saves the bag in the binary graph format
    ///
    /// # Errors
    ///
    /// - `PropertyError::MissingArgument` if `path` is empty
    /// - `PropertyError::Io` if the file cannot be written
    pub fn save_binary_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        require_path(path)?;
        let file = File::create(path)?;
        binary::write_graph(self, BufWriter::new(file))
    }

    /// Loads a bag, including its key comparers, from the binary graph format
    ///
    /// # Errors
    ///
    /// - `PropertyError::MissingArgument` if `path` is empty
    /// - `PropertyError::Io` if the file cannot be read
    /// - `PropertyError::MalformedDocument` if the payload is not a graph of
    ///   this protocol version
    pub fn load_binary_from<P: AsRef<Path>>(path: P) -> Result<PropertyBag> {
        let path = path.as_ref();
        require_path(path)?;
        let file = File::open(path)?;
        binary::read_graph(BufReader::new(file))
    }
}
