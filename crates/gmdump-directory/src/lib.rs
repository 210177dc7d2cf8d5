//! # Directory Membership
//!
//! Core abstractions for dumping the transitive membership of directory groups.
//!
//! This crate provides the entry model, a search filter model, the
//! [`DirectoryGateway`] trait any directory backend implements, and the
//! [`MembershipResolver`] that walks nested groups through a gateway.
//!
//! ## Example
//!
//! ```ignore
//! use gmdump_directory::prelude::*;
//!
//! let gateway = InMemoryDirectory::new()
//!     .with_entry(Entry::new("cn=alice,dc=example,dc=com")
//!         .with_value("cn", "alice")
//!         .with("objectClass", ["person"]));
//!
//! let resolver = MembershipResolver::new(&gateway).with_attributes(["mail"]);
//! let groups = resolver.find_groups("dc=example,dc=com").await?;
//! let members = resolver.resolve_members(&groups).await?;
//! ```
//!
//! ## Crate Organization
//!
//! - [`entry`] - Directory entries and attribute accessors
//! - [`filter`] - Search filters (LDAP rendering and in-memory evaluation)
//! - [`error`] - Error types with transient/permanent classification
//! - [`gateway`] - The gateway trait and an in-memory snapshot gateway
//! - [`resolver`] - Nested membership resolution

pub mod entry;
pub mod error;
pub mod filter;
pub mod gateway;
pub mod resolver;

pub use entry::Entry;
pub use error::{DirectoryError, DirectoryResult};
pub use filter::Filter;
pub use gateway::{DirectoryGateway, InMemoryDirectory};
pub use resolver::{sort_and_dedup, MembershipResolver, BASE_ATTRIBUTES};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::entry::Entry;
    pub use crate::error::{DirectoryError, DirectoryResult};
    pub use crate::filter::Filter;
    pub use crate::gateway::{DirectoryGateway, InMemoryDirectory};
    pub use crate::resolver::{sort_and_dedup, MembershipResolver, BASE_ATTRIBUTES};
}

// Re-export async_trait for gateway implementors
pub use async_trait::async_trait;

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_prelude_imports() {
        let _entry = Entry::new("cn=test,dc=example,dc=com").with_value("cn", "test");
        let _filter = Filter::membership_lookup("cn=test,dc=example,dc=com");
        let dir = InMemoryDirectory::new();
        let resolver = MembershipResolver::new(&dir);
        assert_eq!(resolver.lookup_attributes().len(), BASE_ATTRIBUTES.len());
    }
}
