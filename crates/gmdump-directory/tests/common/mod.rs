//! Common test utilities for gmdump-directory integration tests.

#![allow(dead_code)]

use std::sync::Once;

use gmdump_directory::{Entry, InMemoryDirectory};

static INIT: Once = Once::new();

/// Initialize logging for tests (once).
pub fn init_test_logging() {
    INIT.call_once(|| {
        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::fmt()
                .with_test_writer()
                .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
                .try_init()
                .ok();
        }
    });
}

/// Test data factory for person entries.
pub fn person(dn: &str, cn: &str) -> Entry {
    Entry::new(dn)
        .with_value("cn", cn)
        .with("objectClass", ["top", "person", "organizationalPerson", "user"])
        .with_value("mail", format!("{cn}@example.com"))
}

/// Test data factory for group entries.
pub fn group(dn: &str, cn: &str, members: &[&str]) -> Entry {
    Entry::new(dn)
        .with_value("cn", cn)
        .with("objectClass", ["top", "group"])
        .with("member", members.iter().copied())
}

/// Test data factory for entries that are neither person nor group.
pub fn device(dn: &str, cn: &str) -> Entry {
    Entry::new(dn)
        .with_value("cn", cn)
        .with("objectClass", ["top", "device"])
}

pub const G1: &str = "CN=G1,OU=Groups,DC=example,DC=com";
pub const G2: &str = "CN=G2,OU=Groups,DC=example,DC=com";
pub const U1: &str = "CN=U1,OU=Users,DC=example,DC=com";
pub const U2: &str = "CN=U2,OU=Users,DC=example,DC=com";

/// G1 → {U1, G2}, G2 → {U1, U2}; U1 is "alice", U2 is "bob".
pub fn two_path_directory() -> InMemoryDirectory {
    InMemoryDirectory::new()
        .with_entry(group(G1, "g1", &[U1, G2]))
        .with_entry(group(G2, "g2", &[U1, U2]))
        .with_entry(person(U1, "alice"))
        .with_entry(person(U2, "bob"))
}

/// Identities of a result, in order.
pub fn identities(entries: &[Entry]) -> Vec<String> {
    entries.iter().map(|e| e.identity().to_string()).collect()
}

/// `cn` values of a result, in order.
pub fn cns(entries: &[Entry]) -> Vec<String> {
    entries.iter().map(|e| e.cn().to_string()).collect()
}
