//! # LDAP Gateway
//!
//! LDAP/Active Directory implementation of [`gmdump_directory::DirectoryGateway`].
//!
//! Supports plain LDAP, LDAPS and STARTTLS, with anonymous or simple bind.
//!
//! ## Example
//!
//! ```ignore
//! use gmdump_directory::MembershipResolver;
//! use gmdump_ldap::{LdapConfig, LdapGateway};
//!
//! let config = LdapConfig::new("dc1.example.com")
//!     .with_ssl()
//!     .with_credentials("reader@example.com", "secret");
//!
//! let gateway = LdapGateway::new(config)?;
//! let resolver = MembershipResolver::new(&gateway).with_attributes(["mail"]);
//! let groups = resolver.find_groups("OU=Groups,DC=example,DC=com").await?;
//! let members = resolver.resolve_members(&groups).await?;
//! gateway.close().await?;
//! ```

pub mod config;
pub mod gateway;

pub use config::{ConnectionSettings, LdapConfig};
pub use gateway::LdapGateway;
