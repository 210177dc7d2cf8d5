//! LDAP gateway implementation
//!
//! Implements [`DirectoryGateway`] for LDAP/Active Directory on top of `ldap3`.

use async_trait::async_trait;
use base64::Engine;
use ldap3::{Ldap, LdapConnAsync, LdapConnSettings, LdapError, Scope, SearchEntry};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use gmdump_directory::error::{DirectoryError, DirectoryResult};
use gmdump_directory::{DirectoryGateway, Entry, Filter};

use crate::config::LdapConfig;

/// LDAP result code for a successful operation.
const RC_SUCCESS: u32 = 0;

/// LDAP result code when the search base does not exist.
const RC_NO_SUCH_OBJECT: u32 = 32;

/// LDAP result code for a failed simple bind.
const RC_INVALID_CREDENTIALS: u32 = 49;

/// LDAP gateway for querying LDAP/Active Directory.
pub struct LdapGateway {
    /// Configuration.
    config: LdapConfig,

    /// Display name for this gateway instance.
    display_name: String,

    /// Cached LDAP connection (lazily initialized).
    connection: Arc<RwLock<Option<Ldap>>>,

    /// Whether the gateway has been closed.
    closed: Arc<RwLock<bool>>,
}

impl LdapGateway {
    /// Create a new LDAP gateway with the given configuration.
    ///
    /// No connection is made until the first search.
    pub fn new(config: LdapConfig) -> DirectoryResult<Self> {
        config.validate()?;

        let display_name = format!("LDAP: {}", config.host);

        Ok(Self {
            config,
            display_name,
            connection: Arc::new(RwLock::new(None)),
            closed: Arc::new(RwLock::new(false)),
        })
    }

    /// Configuration of this gateway.
    pub fn config(&self) -> &LdapConfig {
        &self.config
    }

    /// Unbind and drop the cached connection.
    ///
    /// Searches after this fail with an invalid configuration error.
    pub async fn close(&self) -> DirectoryResult<()> {
        *self.closed.write().await = true;

        let mut conn_guard = self.connection.write().await;
        if let Some(mut ldap) = conn_guard.take() {
            if let Err(e) = ldap.unbind().await {
                warn!(error = %e, "Error during LDAP unbind");
            }
        }

        debug!("LDAP gateway closed");
        Ok(())
    }

    /// Get an LDAP connection, creating one if necessary.
    async fn get_connection(&self) -> DirectoryResult<Ldap> {
        if *self.closed.read().await {
            return Err(DirectoryError::invalid_configuration(
                "LDAP gateway has been closed",
            ));
        }

        // Try to reuse existing connection
        {
            let conn_guard = self.connection.read().await;
            if let Some(ref conn) = *conn_guard {
                return Ok(conn.clone());
            }
        }

        let mut conn_guard = self.connection.write().await;
        if let Some(ref conn) = *conn_guard {
            return Ok(conn.clone());
        }

        let conn = self.create_connection().await?;
        *conn_guard = Some(conn.clone());

        Ok(conn)
    }

    /// Create a new LDAP connection and bind.
    async fn create_connection(&self) -> DirectoryResult<Ldap> {
        let url = self.config.url();

        debug!(url = %url, "Connecting to LDAP server");

        let settings = LdapConnSettings::new()
            .set_conn_timeout(self.config.connection.connection_timeout())
            .set_starttls(self.config.use_starttls)
            .set_no_tls_verify(!self.config.verify_certificate);

        let (conn, mut ldap) = LdapConnAsync::with_settings(settings, &url)
            .await
            .map_err(|e| match e {
                LdapError::Timeout { .. } => DirectoryError::ConnectionTimeout {
                    timeout_secs: self.config.connection.connection_timeout_secs,
                },
                e => DirectoryError::connection_failed_with_source(
                    format!("Failed to connect to LDAP server at {}", url),
                    e,
                ),
            })?;

        // Spawn the connection driver
        tokio::spawn(async move {
            if let Err(e) = conn.drive().await {
                warn!(error = %e, "LDAP connection driver error");
            }
        });

        let (bind_dn, bind_password) = if self.config.is_authenticated() {
            (
                self.config.bind_dn.as_deref().unwrap_or(""),
                self.config.bind_password.as_deref().unwrap_or(""),
            )
        } else {
            ("", "")
        };

        debug!(
            bind_dn = %bind_dn,
            anonymous = bind_dn.is_empty(),
            "Performing LDAP bind"
        );

        let result = ldap
            .simple_bind(bind_dn, bind_password)
            .await
            .map_err(|e| {
                DirectoryError::connection_failed_with_source(
                    format!("LDAP bind failed for '{}'", bind_dn),
                    e,
                )
            })?;

        if result.rc != RC_SUCCESS {
            if result.rc == RC_INVALID_CREDENTIALS {
                return Err(DirectoryError::AuthenticationFailed);
            }
            return Err(DirectoryError::connection_failed(format!(
                "LDAP bind failed with code {}: {}",
                result.rc, result.text
            )));
        }

        info!(host = %self.config.host, "LDAP connection established successfully");

        Ok(ldap)
    }
}

/// Convert an LDAP search entry to an [`Entry`].
///
/// Binary values are base64 encoded.
pub(crate) fn entry_from_search(entry: SearchEntry) -> Entry {
    let mut converted = Entry::new(entry.dn);

    for (name, values) in entry.attrs {
        converted = converted.with(name, values);
    }

    for (name, values) in entry.bin_attrs {
        converted = converted.with(
            name,
            values
                .iter()
                .map(|v| base64::engine::general_purpose::STANDARD.encode(v)),
        );
    }

    converted
}

/// Map the result code of a search rooted at `root` to an error.
///
/// A missing root is reported as [`DirectoryError::NoSuchObject`] so callers
/// can tell a dangling reference from a failed search.
fn check_search_result(root: &str, rc: u32, text: &str) -> DirectoryResult<()> {
    match rc {
        RC_SUCCESS => Ok(()),
        RC_NO_SUCH_OBJECT => {
            debug!(root = %root, "Search root does not exist");
            Err(DirectoryError::no_such_object(root))
        }
        rc => Err(DirectoryError::search_failed(
            root,
            format!("LDAP search failed with code {}: {}", rc, text),
        )),
    }
}

#[async_trait]
impl DirectoryGateway for LdapGateway {
    #[instrument(skip(self, filter, attributes), fields(filter = %filter))]
    async fn search(
        &self,
        root: &str,
        filter: &Filter,
        attributes: &[String],
    ) -> DirectoryResult<Vec<Entry>> {
        let mut ldap = self.get_connection().await?;
        let ldap_filter = filter.to_ldap();

        if let Some(timeout) = self.config.connection.operation_timeout() {
            ldap.with_timeout(timeout);
        }

        debug!(root = %root, filter = %ldap_filter, "Searching LDAP");

        let ldap3::SearchResult(entries, result) = ldap
            .search(root, Scope::Subtree, &ldap_filter, attributes)
            .await
            .map_err(|e| match e {
                LdapError::Timeout { .. } => DirectoryError::ConnectionTimeout {
                    timeout_secs: self.config.connection.operation_timeout_secs,
                },
                e => DirectoryError::search_failed_with_source(root, "LDAP search failed", e),
            })?;

        check_search_result(root, result.rc, &result.text)?;

        let found: Vec<Entry> = entries
            .into_iter()
            .map(SearchEntry::construct)
            .map(entry_from_search)
            .collect();

        debug!(root = %root, returned = found.len(), "LDAP search completed");

        Ok(found)
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }
}

impl std::fmt::Debug for LdapGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LdapGateway")
            .field("display_name", &self.display_name)
            .field("config", &self.config.redacted())
            .finish()
    }
}
