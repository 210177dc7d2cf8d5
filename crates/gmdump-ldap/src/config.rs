//! LDAP gateway configuration
//!
//! Configuration types for LDAP/Active Directory connections.

use serde::{Deserialize, Serialize};

use gmdump_directory::error::{DirectoryError, DirectoryResult};

const REDACTED: &str = "***REDACTED***";

/// Connection timeouts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionSettings {
    /// Connection timeout in seconds.
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout_secs: u64,

    /// Timeout for a single search in seconds (0 = no limit).
    #[serde(default)]
    pub operation_timeout_secs: u64,
}

fn default_connection_timeout() -> u64 {
    30
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            connection_timeout_secs: default_connection_timeout(),
            operation_timeout_secs: 0,
        }
    }
}

impl ConnectionSettings {
    /// Get connection timeout as Duration.
    pub fn connection_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.connection_timeout_secs)
    }

    /// Get the per-search timeout, if one is set.
    pub fn operation_timeout(&self) -> Option<std::time::Duration> {
        (self.operation_timeout_secs > 0)
            .then(|| std::time::Duration::from_secs(self.operation_timeout_secs))
    }
}

/// Configuration for the LDAP gateway.
#[derive(Clone, Serialize, Deserialize)]
pub struct LdapConfig {
    /// LDAP server hostname or IP address, optionally with `:port`.
    #[serde(default = "default_host")]
    pub host: String,

    /// LDAP server port (389 for LDAP, 636 for LDAPS).
    #[serde(default = "default_ldap_port")]
    pub port: u16,

    /// Use SSL/TLS (LDAPS).
    #[serde(default)]
    pub use_ssl: bool,

    /// Use STARTTLS upgrade on plain LDAP connection.
    #[serde(default)]
    pub use_starttls: bool,

    /// Bind DN or user principal (e.g. "user@example.com"); anonymous bind when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind_dn: Option<String>,

    /// Bind password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind_password: Option<String>,

    /// Verify the server certificate for LDAPS/STARTTLS.
    #[serde(default)]
    pub verify_certificate: bool,

    /// Connection settings (timeouts).
    #[serde(default)]
    pub connection: ConnectionSettings,
}

impl std::fmt::Debug for LdapConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LdapConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("use_ssl", &self.use_ssl)
            .field("use_starttls", &self.use_starttls)
            .field("bind_dn", &self.bind_dn)
            .field("bind_password", &self.bind_password.as_ref().map(|_| REDACTED))
            .field("verify_certificate", &self.verify_certificate)
            .field("connection", &self.connection)
            .finish()
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_ldap_port() -> u16 {
    389
}

impl Default for LdapConfig {
    fn default() -> Self {
        Self::new(default_host())
    }
}

impl LdapConfig {
    /// Create a new LDAP config for a host with anonymous bind.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: default_ldap_port(),
            use_ssl: false,
            use_starttls: false,
            bind_dn: None,
            bind_password: None,
            verify_certificate: false,
            connection: ConnectionSettings::default(),
        }
    }

    /// Set bind credentials.
    pub fn with_credentials(
        mut self,
        bind_dn: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.bind_dn = Some(bind_dn.into());
        self.bind_password = Some(password.into());
        self
    }

    /// Enable SSL (LDAPS).
    #[must_use]
    pub fn with_ssl(mut self) -> Self {
        self.use_ssl = true;
        self.port = 636;
        self
    }

    /// Enable STARTTLS.
    #[must_use]
    pub fn with_starttls(mut self) -> Self {
        self.use_starttls = true;
        self
    }

    /// Verify server certificates.
    #[must_use]
    pub fn with_certificate_verification(mut self, verify: bool) -> Self {
        self.verify_certificate = verify;
        self
    }

    /// Set the connection timeout.
    #[must_use]
    pub fn with_connection_timeout(mut self, secs: u64) -> Self {
        self.connection.connection_timeout_secs = secs;
        self
    }

    /// Set the per-search timeout.
    #[must_use]
    pub fn with_operation_timeout(mut self, secs: u64) -> Self {
        self.connection.operation_timeout_secs = secs;
        self
    }

    /// Whether a non-anonymous bind will be performed.
    pub fn is_authenticated(&self) -> bool {
        self.bind_dn.as_deref().is_some_and(|dn| !dn.is_empty())
    }

    /// Get the LDAP URL.
    ///
    /// A host that already carries a port is used as is.
    pub fn url(&self) -> String {
        let scheme = if self.use_ssl { "ldaps" } else { "ldap" };
        if host_has_port(&self.host) {
            format!("{}://{}", scheme, self.host)
        } else {
            format!("{}://{}:{}", scheme, self.host, self.port)
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> DirectoryResult<()> {
        if self.host.trim().is_empty() {
            return Err(DirectoryError::invalid_configuration("host is required"));
        }

        if self.use_ssl && self.use_starttls {
            return Err(DirectoryError::invalid_configuration(
                "cannot use both SSL and STARTTLS",
            ));
        }

        if self.bind_password.is_some() && !self.is_authenticated() {
            return Err(DirectoryError::invalid_configuration(
                "a bind password requires a bind DN",
            ));
        }

        if self.connection.connection_timeout_secs == 0 {
            return Err(DirectoryError::invalid_configuration(
                "connection timeout must be greater than zero",
            ));
        }

        Ok(())
    }

    /// Create a redacted version of this config (for logging/display).
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if config.bind_password.is_some() {
            config.bind_password = Some(REDACTED.to_string());
        }
        config
    }
}

/// `host:port`, but not a bare IPv6 address.
fn host_has_port(host: &str) -> bool {
    if let Some(rest) = host.strip_prefix('[') {
        return rest.contains("]:");
    }
    matches!(host.rsplit_once(':'), Some((name, port)) if !name.contains(':') && port.parse::<u16>().is_ok())
}
