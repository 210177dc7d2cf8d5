//! CSV reporter
//!
//! One record per entry holding the first value of each requested attribute,
//! empty when absent. No header row.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use gmdump_directory::Entry;

use crate::error::{CliError, CliResult};

/// Write `entries` as CSV, one column per name in `attributes`.
///
/// # Arguments
/// * `entries` - Resolved members, in output order
/// * `attributes` - Column attributes, in column order
/// * `writer` - Output writer (file or stdout)
pub fn write_csv<W: Write, S: AsRef<str>>(
    entries: &[Entry],
    attributes: &[S],
    writer: W,
) -> CliResult<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    for entry in entries {
        wtr.write_record(entry.project(attributes))
            .map_err(|e| CliError::Io(format!("CSV write error: {}", e)))?;
    }

    wtr.flush()
        .map_err(|e| CliError::Io(format!("Failed to flush CSV: {}", e)))?;

    Ok(())
}

/// Open the report sink: `path` when given, stdout otherwise.
pub fn open_output(path: Option<&Path>) -> CliResult<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = File::create(path).map_err(|e| {
                CliError::Io(format!("Cannot create '{}': {}", path.display(), e))
            })?;
            Ok(Box::new(file))
        }
        None => Ok(Box::new(std::io::stdout().lock())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(entries: &[Entry], attributes: &[&str]) -> String {
        let mut out = Vec::new();
        write_csv(entries, attributes, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_write_csv_first_values_in_column_order() {
        let entries = vec![
            Entry::new("cn=alice,dc=ex")
                .with_value("cn", "alice")
                .with("mail", ["alice@example.com", "a@example.com"]),
            Entry::new("cn=bob,dc=ex").with_value("cn", "bob"),
        ];

        assert_eq!(
            render(&entries, &["mail", "cn"]),
            "alice@example.com,alice\n,bob\n"
        );
    }

    #[test]
    fn test_write_csv_quotes_values() {
        let entries = vec![Entry::new("cn=x,dc=ex").with_value("cn", "Doe, Jane")];
        assert_eq!(render(&entries, &["cn"]), "\"Doe, Jane\"\n");
    }

    #[test]
    fn test_write_csv_empty() {
        assert_eq!(render(&[], &["cn", "mail"]), "");
    }
}
