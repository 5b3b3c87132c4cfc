// ── Manifest document ──
//
// A Munki manifest is a property-list dictionary. Only `included_manifests`
// is ever edited; every other key and every non-string array entry is
// carried through untouched.

use std::fs;
use std::io::Cursor;
use std::path::Path;

use plist::{Dictionary, Value, XmlWriteOptions};

use crate::error::{DocumentError, ManifestError};

pub const CATALOGS: &str = "catalogs";
pub const DISPLAY_NAME: &str = "display_name";
pub const INCLUDED_MANIFESTS: &str = "included_manifests";

#[derive(Debug, Clone, PartialEq)]
pub struct ManifestDocument {
    root: Dictionary,
}

impl ManifestDocument {
    pub(crate) fn from_dictionary(root: Dictionary) -> Self {
        Self { root }
    }

    pub fn from_value(value: Value) -> Result<Self, DocumentError> {
        value
            .into_dictionary()
            .map(Self::from_dictionary)
            .ok_or(DocumentError::NotADictionary)
    }

    /// Parse XML or binary plist bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ParseError> {
        let value = Value::from_reader(Cursor::new(bytes))?;
        Ok(Self::from_value(value)?)
    }

    pub fn read(path: &Path) -> Result<Self, ManifestError> {
        let bytes = fs::read(path).map_err(|e| ManifestError::io(path, e))?;
        Self::from_bytes(&bytes).map_err(|e| match e {
            ParseError::Plist(source) => ManifestError::Plist {
                path: path.to_path_buf(),
                source,
            },
            ParseError::Document(source) => ManifestError::Malformed {
                path: path.to_path_buf(),
                source,
            },
        })
    }

    /// Tab-indented XML with a trailing newline.
    pub fn to_xml(&self) -> Result<Vec<u8>, plist::Error> {
        let mut buf = Vec::new();
        let options = XmlWriteOptions::default().indent(b'\t', 1);
        Value::Dictionary(self.root.clone()).to_writer_xml_with_options(&mut buf, &options)?;
        buf.push(b'\n');
        Ok(buf)
    }

    /// Serialize fully, then replace the file contents.
    pub fn write(&self, path: &Path) -> Result<(), ManifestError> {
        let bytes = self.to_xml().map_err(|source| ManifestError::Plist {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, bytes).map_err(|e| ManifestError::io(path, e))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.root.get(key)
    }

    /// String entries of `included_manifests`, in order.
    pub fn included_manifests(&self) -> Vec<&str> {
        self.string_array(INCLUDED_MANIFESTS)
    }

    pub fn catalogs(&self) -> Vec<&str> {
        self.string_array(CATALOGS)
    }

    /// First `display_name` entry.
    pub fn display_name(&self) -> Option<&str> {
        self.string_array(DISPLAY_NAME).first().copied()
    }

    pub fn includes(&self, entry: &str) -> bool {
        self.included_manifests().contains(&entry)
    }

    /// Append `entry` to `included_manifests` unless already present.
    ///
    /// Returns whether the document changed. A missing key is created; a
    /// key holding anything but an array is an error.
    pub fn include(&mut self, entry: &str) -> Result<bool, DocumentError> {
        if !self.root.contains_key(INCLUDED_MANIFESTS) {
            self.root
                .insert(INCLUDED_MANIFESTS.to_owned(), Value::Array(Vec::new()));
        }
        let array = self
            .root
            .get_mut(INCLUDED_MANIFESTS)
            .and_then(Value::as_array_mut)
            .ok_or_else(|| DocumentError::NotAnArray {
                key: INCLUDED_MANIFESTS.to_owned(),
            })?;

        if array.iter().any(|item| item.as_string() == Some(entry)) {
            return Ok(false);
        }
        array.push(Value::String(entry.to_owned()));
        Ok(true)
    }

    fn string_array(&self, key: &str) -> Vec<&str> {
        self.root
            .get(key)
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_string).collect())
            .unwrap_or_default()
    }
}

/// Parse failure before a path is attached.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error(transparent)]
    Plist(#[from] plist::Error),
    #[error(transparent)]
    Document(#[from] DocumentError),
}
