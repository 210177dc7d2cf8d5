//! Command-line arguments

use std::path::PathBuf;
use std::sync::OnceLock;

use clap::Parser;
use gmdump_ldap::LdapConfig;

use crate::error::{CliError, CliResult};

/// Version string, with the git commit when it was provided at build time.
pub fn version() -> &'static str {
    static VERSION: OnceLock<String> = OnceLock::new();
    VERSION.get_or_init(|| match option_env!("GMDUMP_GIT_COMMIT") {
        Some(commit) if !commit.is_empty() => {
            format!("{} (commit {})", env!("CARGO_PKG_VERSION"), commit)
        }
        _ => env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Dump the transitive membership of all groups below a base DN as CSV
#[derive(Parser, Debug, Clone)]
#[command(name = "gmdump")]
#[command(author, version = version(), about, long_about = None)]
pub struct Cli {
    /// LDAP server, optionally with :port
    #[arg(short = 'H', long, env = "GMDUMP_HOST", default_value = "localhost")]
    pub host: String,

    /// Bind user (DN or user principal name); anonymous bind when omitted
    #[arg(short, long, env = "GMDUMP_USERNAME")]
    pub username: Option<String>,

    /// Bind password; prompted for when a username is given without one
    #[arg(short, long, env = "GMDUMP_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Connect with LDAPS
    #[arg(long, env = "GMDUMP_SECURE", conflicts_with = "starttls")]
    pub secure: bool,

    /// Upgrade a plain connection with STARTTLS
    #[arg(long, env = "GMDUMP_STARTTLS")]
    pub starttls: bool,

    /// Verify the server certificate
    #[arg(long, env = "GMDUMP_VERIFY_CERTIFICATE")]
    pub verify_certificate: bool,

    /// Base DN under which groups are searched
    #[arg(short = 'b', long = "basedn", env = "GMDUMP_BASEDN")]
    pub base_dn: String,

    /// Output file (defaults to stdout)
    #[arg(short, long, env = "GMDUMP_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Attributes to report, comma separated
    #[arg(
        long,
        env = "GMDUMP_ATTRS",
        value_delimiter = ',',
        default_value = "cn,mail"
    )]
    pub attrs: Vec<String>,

    /// Fail when groups nest deeper than this
    #[arg(long, env = "GMDUMP_MAX_DEPTH")]
    pub max_depth: Option<u32>,

    /// Connection and per-search timeout in seconds
    #[arg(long, env = "GMDUMP_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Log level or filter directive (RUST_LOG overrides)
    #[arg(long, env = "GMDUMP_LOG_LEVEL", default_value = "warn")]
    pub log_level: String,
}

impl Cli {
    /// Reported attributes with blanks removed.
    pub fn attributes(&self) -> Vec<String> {
        self.attrs
            .iter()
            .map(|a| a.trim())
            .filter(|a| !a.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Check arguments clap cannot express.
    pub fn validate(&self) -> CliResult<()> {
        if self.base_dn.trim().is_empty() {
            return Err(CliError::Validation("--basedn must not be empty".into()));
        }

        if self.attributes().is_empty() {
            return Err(CliError::Validation(
                "--attrs must name at least one attribute".into(),
            ));
        }

        if self.password.is_some() && self.username.is_none() {
            return Err(CliError::Validation(
                "--password requires --username".into(),
            ));
        }

        if self.timeout == Some(0) {
            return Err(CliError::Validation(
                "--timeout must be greater than zero".into(),
            ));
        }

        Ok(())
    }

    /// Build the LDAP configuration, using `password` for the bind.
    pub fn ldap_config(&self, password: Option<String>) -> CliResult<LdapConfig> {
        let mut config = LdapConfig::new(self.host.clone());

        if self.secure {
            config = config.with_ssl();
        }
        if self.starttls {
            config = config.with_starttls();
        }
        config = config.with_certificate_verification(self.verify_certificate);

        if let Some(username) = &self.username {
            config = config.with_credentials(username.clone(), password.unwrap_or_default());
        }

        if let Some(timeout) = self.timeout {
            config = config
                .with_connection_timeout(timeout)
                .with_operation_timeout(timeout);
        }

        config.validate()?;
        Ok(config)
    }
}
