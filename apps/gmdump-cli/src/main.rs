//! gmdump - Dump the transitive membership of LDAP/Active Directory groups
//!
//! Every group found below `--basedn` is expanded recursively. The resulting
//! persons are written as CSV, sorted by `cn` and without duplicates.

use clap::Parser;

use gmdump_cli::logging::init_logging;
use gmdump_cli::Cli;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_logging(&cli.log_level);

    if let Err(e) = gmdump_cli::run(cli).await {
        e.print();
        std::process::exit(e.exit_code());
    }
}
