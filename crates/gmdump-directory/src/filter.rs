//! Search filter model
//!
//! A small boolean filter language that gateways either render to RFC 4515
//! text (LDAP) or evaluate directly against entries (in-memory snapshots).

use serde::{Deserialize, Serialize};

use crate::entry::{Entry, GROUP_OBJECT_CLASS, OBJECT_CLASS_ATTRIBUTE, PERSON_OBJECT_CLASS};

/// Attribute names that resolve to the entry identity when evaluated in memory.
const IDENTITY_ATTRIBUTES: [&str; 2] = ["distinguishedName", "dn"];

/// Filter for search operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Filter {
    /// Match objects where attribute equals value.
    Equals { attribute: String, value: String },

    /// Match objects where attribute exists (has any value).
    Present { attribute: String },

    /// Logical AND of multiple filters.
    And { filters: Vec<Filter> },

    /// Logical OR of multiple filters.
    Or { filters: Vec<Filter> },

    /// Logical NOT of a filter.
    Not { filter: Box<Filter> },
}

impl Filter {
    /// Create an equals filter.
    pub fn eq(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Filter::Equals {
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    /// Create a present (attribute exists) filter.
    pub fn present(attribute: impl Into<String>) -> Self {
        Filter::Present {
            attribute: attribute.into(),
        }
    }

    /// Create an AND filter.
    pub fn and(filters: Vec<Filter>) -> Self {
        Filter::And { filters }
    }

    /// Create an OR filter.
    pub fn or(filters: Vec<Filter>) -> Self {
        Filter::Or { filters }
    }

    /// Create a NOT filter (negation).
    pub fn negate(filter: Filter) -> Self {
        Filter::Not {
            filter: Box::new(filter),
        }
    }

    /// Match entries carrying any of the given object classes.
    pub fn object_class_in<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Filter::or(
            classes
                .into_iter()
                .map(|c| Filter::eq(OBJECT_CLASS_ATTRIBUTE, c))
                .collect(),
        )
    }

    /// Point lookup for a membership reference.
    ///
    /// Matches the entry named `dn` only if it is a person or a group:
    /// `(&(distinguishedName=<dn>)(|(objectClass=person)(objectClass=group)))`.
    pub fn membership_lookup(dn: &str) -> Self {
        Filter::and(vec![
            Filter::eq("distinguishedName", dn),
            Filter::object_class_in([PERSON_OBJECT_CLASS, GROUP_OBJECT_CLASS]),
        ])
    }

    /// Selection of the top-level groups below a base DN: `(&(objectClass=group))`.
    pub fn groups() -> Self {
        Filter::and(vec![Filter::eq(OBJECT_CLASS_ATTRIBUTE, GROUP_OBJECT_CLASS)])
    }

    /// Render as an RFC 4515 filter string.
    pub fn to_ldap(&self) -> String {
        match self {
            Filter::And { filters } => {
                let inner: Vec<String> = filters.iter().map(Self::to_ldap).collect();
                format!("(&{})", inner.join(""))
            }
            Filter::Or { filters } => {
                let inner: Vec<String> = filters.iter().map(Self::to_ldap).collect();
                format!("(|{})", inner.join(""))
            }
            Filter::Not { filter } => {
                format!("(!{})", filter.to_ldap())
            }
            Filter::Equals { attribute, value } => {
                format!("({}={})", attribute, escape_filter_value(value))
            }
            Filter::Present { attribute } => {
                format!("({}=*)", attribute)
            }
        }
    }

    /// Evaluate this filter against an entry.
    ///
    /// Equality is ASCII case-insensitive, which is the default matching rule
    /// for the attributes gmdump filters on (`objectClass`, DNs).
    pub fn matches(&self, entry: &Entry) -> bool {
        match self {
            Filter::And { filters } => filters.iter().all(|f| f.matches(entry)),
            Filter::Or { filters } => filters.iter().any(|f| f.matches(entry)),
            Filter::Not { filter } => !filter.matches(entry),
            Filter::Equals { attribute, value } => {
                if is_identity_attribute(attribute) {
                    entry.identity().eq_ignore_ascii_case(value)
                } else {
                    entry.has_value(attribute, value)
                }
            }
            Filter::Present { attribute } => {
                is_identity_attribute(attribute) || entry.has(attribute)
            }
        }
    }
}

impl std::fmt::Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_ldap())
    }
}

fn is_identity_attribute(attribute: &str) -> bool {
    IDENTITY_ATTRIBUTES
        .iter()
        .any(|a| a.eq_ignore_ascii_case(attribute))
}

/// Escape special characters in LDAP filter values (RFC 4515).
pub fn escape_filter_value(value: &str) -> String {
    value
        .replace('\\', "\\5c")
        .replace('*', "\\2a")
        .replace('(', "\\28")
        .replace(')', "\\29")
        .replace('\0', "\\00")
}
