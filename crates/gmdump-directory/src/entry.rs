//! Directory entry model
//!
//! An [`Entry`] is one object returned by a directory search: its
//! distinguished name plus the multi-valued string attributes that were
//! requested. Entries are built once by a gateway and only read afterwards.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attribute holding group membership references.
pub const MEMBER_ATTRIBUTE: &str = "member";

/// Attribute holding the object classes of an entry.
pub const OBJECT_CLASS_ATTRIBUTE: &str = "objectClass";

/// Attribute used for ordering resolved members.
pub const CN_ATTRIBUTE: &str = "cn";

/// Object class that marks an entry as an expandable group.
pub const GROUP_OBJECT_CLASS: &str = "group";

/// Object class for person (leaf) entries.
pub const PERSON_OBJECT_CLASS: &str = "person";

/// One object in the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Distinguished name. Sole criterion for "same entry".
    identity: String,

    /// Attribute name to values, in the order the directory returned them.
    #[serde(default)]
    attributes: BTreeMap<String, Vec<String>>,
}

impl Entry {
    /// Create an entry with no attributes.
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Add values for an attribute using builder pattern.
    ///
    /// Values are appended when the attribute is already present.
    #[must_use]
    pub fn with<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes
            .entry(name.into())
            .or_default()
            .extend(values.into_iter().map(Into::into));
        self
    }

    /// Add a single value for an attribute using builder pattern.
    #[must_use]
    pub fn with_value(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.with(name, [value.into()])
    }

    /// The distinguished name of this entry.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// All values of an attribute; empty when the attribute is absent.
    ///
    /// Attribute names are matched case-insensitively, exact case first.
    pub fn values(&self, name: &str) -> &[String] {
        self.lookup(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First value of an attribute, if any.
    pub fn first_value(&self, name: &str) -> Option<&str> {
        self.values(name).first().map(String::as_str)
    }

    /// Check whether an attribute carries a value (ASCII case-insensitive).
    pub fn has_value(&self, name: &str, value: &str) -> bool {
        self.values(name)
            .iter()
            .any(|v| v.eq_ignore_ascii_case(value))
    }

    /// Check if an attribute is present with at least one value.
    pub fn has(&self, name: &str) -> bool {
        !self.values(name).is_empty()
    }

    /// The `cn` value used for ordering; empty when absent.
    pub fn cn(&self) -> &str {
        self.first_value(CN_ATTRIBUTE).unwrap_or("")
    }

    /// The `objectClass` values of this entry.
    pub fn object_classes(&self) -> &[String] {
        self.values(OBJECT_CLASS_ATTRIBUTE)
    }

    /// Whether this entry is a group whose members should be expanded.
    ///
    /// An entry without `objectClass` is never a group.
    pub fn is_group(&self) -> bool {
        self.has_value(OBJECT_CLASS_ATTRIBUTE, GROUP_OBJECT_CLASS)
    }

    /// The `member` references of this entry, in directory order.
    pub fn member_refs(&self) -> &[String] {
        self.values(MEMBER_ATTRIBUTE)
    }

    /// Project this entry onto an ordered attribute list.
    ///
    /// Each position holds the first value of that attribute, or an empty
    /// string when it is absent.
    pub fn project<S: AsRef<str>>(&self, attribute_names: &[S]) -> Vec<String> {
        attribute_names
            .iter()
            .map(|name| self.first_value(name.as_ref()).unwrap_or("").to_string())
            .collect()
    }

    /// Copy of this entry keeping only the requested attributes.
    ///
    /// `*` keeps every attribute.
    #[must_use]
    pub fn restricted_to<S: AsRef<str>>(&self, attribute_names: &[S]) -> Self {
        if attribute_names.iter().any(|a| a.as_ref() == "*") {
            return self.clone();
        }

        let attributes = self
            .attributes
            .iter()
            .filter(|(name, _)| {
                attribute_names
                    .iter()
                    .any(|wanted| wanted.as_ref().eq_ignore_ascii_case(name))
            })
            .map(|(name, values)| (name.clone(), values.clone()))
            .collect();

        Self {
            identity: self.identity.clone(),
            attributes,
        }
    }

    fn lookup(&self, name: &str) -> Option<&Vec<String>> {
        self.attributes.get(name).or_else(|| {
            self.attributes
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, values)| values)
        })
    }
}

impl std::fmt::Display for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.identity)
    }
}
