//! gmdump - dump the transitive membership of directory groups
//!
//! Finds every group below a base DN, expands nested groups into their
//! members and writes the de-duplicated members as CSV.

pub mod cli;
pub mod error;
pub mod logging;
pub mod prompt;
pub mod report;

use gmdump_directory::{DirectoryGateway, DirectoryResult, Entry, MembershipResolver};
use gmdump_ldap::LdapGateway;
use tracing::{info, warn};

pub use cli::Cli;
pub use error::{CliError, CliResult};

/// Find the groups below `base_dn` and resolve their members.
///
/// `attributes` are requested on every member lookup so they can be reported.
pub async fn dump_members<G: DirectoryGateway + ?Sized>(
    gateway: &G,
    base_dn: &str,
    attributes: &[String],
    max_depth: Option<u32>,
) -> DirectoryResult<Vec<Entry>> {
    let mut resolver = MembershipResolver::new(gateway).with_attributes(attributes.iter().cloned());
    if let Some(max_depth) = max_depth {
        resolver = resolver.with_max_depth(max_depth);
    }

    let groups = resolver.find_groups(base_dn).await?;
    resolver.resolve_members(&groups).await
}

/// Run the dump described by `cli` against its LDAP server.
pub async fn run(cli: Cli) -> CliResult<()> {
    cli.validate()?;

    let password = prompt::resolve_password(&cli)?;
    let config = cli.ldap_config(password)?;
    let gateway = LdapGateway::new(config)?;
    let attributes = cli.attributes();

    let members = dump_members(&gateway, &cli.base_dn, &attributes, cli.max_depth).await;

    if let Err(e) = gateway.close().await {
        warn!(error = %e, "Failed to close LDAP gateway");
    }

    let members = members?;
    info!(members = members.len(), base_dn = %cli.base_dn, "Writing report");

    let writer = report::open_output(cli.output.as_deref())?;
    report::write_csv(&members, &attributes, writer)
}
