//! Directory entry representation.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A directory entry: a distinguished name plus a multivalued attribute map.
///
/// Entries returned by searches are snapshots of server data. Entries built
/// by a caller (for `add`/`modify`) use the mutation methods to assemble the
/// attribute map before submission. The distinguished name is treated as an
/// opaque string; value order within an attribute is preserved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    dn: String,
    attributes: HashMap<String, Vec<String>>,
}

impl DirectoryEntry {
    /// Creates an empty entry for the given distinguished name.
    #[must_use]
    pub fn new(dn: impl Into<String>) -> Self {
        Self {
            dn: dn.into(),
            attributes: HashMap::new(),
        }
    }

    /// Creates an entry from a distinguished name and a prebuilt attribute map.
    #[must_use]
    pub fn from_parts(dn: impl Into<String>, attributes: HashMap<String, Vec<String>>) -> Self {
        Self {
            dn: dn.into(),
            attributes,
        }
    }

    /// Borrows the distinguished name.
    #[must_use]
    pub fn dn(&self) -> &str {
        &self.dn
    }

    /// Borrows the full attribute map.
    #[must_use]
    pub const fn attributes(&self) -> &HashMap<String, Vec<String>> {
        &self.attributes
    }

    /// Returns the first value of the attribute if present.
    #[must_use]
    pub fn first(&self, attribute: &str) -> Option<&str> {
        self.attributes
            .get(attribute)
            .and_then(|values| values.first().map(String::as_str))
    }

    /// Returns all values for the attribute.
    #[must_use]
    pub fn values(&self, attribute: &str) -> Option<&[String]> {
        self.attributes.get(attribute).map(Vec::as_slice)
    }

    /// Returns true if the entry carries the attribute.
    #[must_use]
    pub fn has_attribute(&self, attribute: &str) -> bool {
        self.attributes.contains_key(attribute)
    }

    /// Replaces all values of the attribute.
    pub fn set_attribute(
        &mut self,
        attribute: impl Into<String>,
        values: impl IntoIterator<Item = impl Into<String>>,
    ) {
        self.attributes.insert(
            attribute.into(),
            values.into_iter().map(Into::into).collect(),
        );
    }

    /// Appends a value to the attribute, creating it if absent.
    pub fn add_value(&mut self, attribute: impl Into<String>, value: impl Into<String>) {
        self.attributes
            .entry(attribute.into())
            .or_default()
            .push(value.into());
    }

    /// Removes the attribute entirely, returning its values if it existed.
    pub fn remove_attribute(&mut self, attribute: &str) -> Option<Vec<String>> {
        self.attributes.remove(attribute)
    }

    /// Builder-style variant of [`set_attribute`](Self::set_attribute).
    #[must_use]
    pub fn with_attribute(
        mut self,
        attribute: impl Into<String>,
        values: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.set_attribute(attribute, values);
        self
    }
}
