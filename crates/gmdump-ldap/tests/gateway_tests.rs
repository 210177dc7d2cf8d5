//! Integration tests for the LDAP gateway that need no directory server.

use gmdump_directory::prelude::*;
use gmdump_ldap::{LdapConfig, LdapGateway};

/// Nothing listens on port 1 of the loopback interface.
fn unreachable_config() -> LdapConfig {
    LdapConfig::new("127.0.0.1:1").with_connection_timeout(2)
}

#[tokio::test]
async fn test_unreachable_server_is_connection_error() {
    let gateway = LdapGateway::new(unreachable_config()).unwrap();

    let err = gateway
        .search("dc=example,dc=com", &Filter::groups(), &["member".to_string()])
        .await
        .unwrap_err();

    assert!(
        matches!(
            err,
            DirectoryError::ConnectionFailed { .. } | DirectoryError::ConnectionTimeout { .. }
        ),
        "unexpected error: {err}"
    );
}

#[tokio::test]
async fn test_resolver_propagates_connection_error() {
    let gateway = LdapGateway::new(unreachable_config()).unwrap();
    let resolver = MembershipResolver::new(&gateway);

    let err = resolver.find_groups("dc=example,dc=com").await.unwrap_err();
    assert!(matches!(
        err,
        DirectoryError::ConnectionFailed { .. } | DirectoryError::ConnectionTimeout { .. }
    ));
}

#[tokio::test]
async fn test_close_without_connecting() {
    let gateway = LdapGateway::new(unreachable_config()).unwrap();
    assert!(gateway.close().await.is_ok());

    let err = gateway
        .search("dc=example,dc=com", &Filter::groups(), &[])
        .await
        .unwrap_err();
    assert!(matches!(err, DirectoryError::InvalidConfiguration { .. }));
}

#[test]
fn test_gateway_is_shareable() {
    fn assert_gateway<G: DirectoryGateway>() {}
    assert_gateway::<LdapGateway>();
    assert_gateway::<std::sync::Arc<LdapGateway>>();
}
