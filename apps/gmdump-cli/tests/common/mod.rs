//! Common test utilities for gmdump-cli integration tests.

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

pub const BASE_DN: &str = "OU=Groups,DC=example,DC=com";

pub fn person(dn: &str, cn: &str, mail: &str) -> Entry {
    Entry::new(dn)
        .with_value("cn", cn)
        .with("objectClass", ["top", "person"])
        .with_value("mail", mail)
}

pub fn group(dn: &str, cn: &str, members: &[&str]) -> Entry {
    Entry::new(dn)
        .with_value("cn", cn)
        .with("objectClass", ["top", "group"])
        .with("member", members.iter().copied())
}

/// Engineering contains Platform; both list Carol.
pub fn company_directory() -> InMemoryDirectory {
    InMemoryDirectory::new()
        .with_entry(group(
            "CN=Engineering,OU=Groups,DC=example,DC=com",
            "Engineering",
            &[
                "CN=Platform,OU=Groups,DC=example,DC=com",
                "CN=Carol,OU=Users,DC=example,DC=com",
            ],
        ))
        .with_entry(group(
            "CN=Platform,OU=Groups,DC=example,DC=com",
            "Platform",
            &[
                "CN=Carol,OU=Users,DC=example,DC=com",
                "CN=Alice,OU=Users,DC=example,DC=com",
                "CN=Gone,OU=Users,DC=example,DC=com",
            ],
        ))
        .with_entry(person(
            "CN=Alice,OU=Users,DC=example,DC=com",
            "alice",
            "alice@example.com",
        ))
        .with_entry(person(
            "CN=Carol,OU=Users,DC=example,DC=com",
            "carol",
            "carol@example.com",
        ))
        .with_entry(
            Entry::new("CN=Printer,OU=Devices,DC=example,DC=com")
                .with_value("cn", "printer")
                .with("objectClass", ["top", "device"]),
        )
}
