#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line collision reports by zip code and date range.
//!
//! Loads a collision CSV file into the in-memory index, then either answers
//! one subcommand (`report`, `dump`, `tree`) or, with no subcommand, drops
//! into the interactive zip code / date range prompt.
//!
//! Set `RUST_LOG=debug` to see why individual rows were skipped.

mod interactive;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use collision_map_cli_utils::IndicatifProgress;
use collision_map_index::{CollisionIndex, ReportQuery};
use collision_map_ingest::IngestOptions;
use strum_macros::Display;

#[derive(Parser)]
#[command(
    name = "collision_map_cli",
    about = "Motor vehicle collision reports by zip code and date range"
)]
struct Cli {
    /// Collision CSV file to load
    file: PathBuf,
    /// Maximum number of rows to read from the file (for testing)
    #[arg(long)]
    limit: Option<u64>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print injury and fatality totals for one zip code and date range
    Report {
        /// Five-character zip code
        #[arg(long)]
        zip: String,
        /// First day of the range, MM/DD/YYYY (inclusive)
        #[arg(long)]
        from: String,
        /// Last day of the range, MM/DD/YYYY (inclusive)
        #[arg(long)]
        to: String,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Print every loaded collision in ascending zip/date order
    Dump,
    /// Print the shape of the index tree
    Tree,
}

/// How a report is written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, ValueEnum)]
#[strum(serialize_all = "snake_case")]
enum OutputFormat {
    /// The fixed-format text block.
    Text,
    /// The report as a JSON object.
    Json,
}

fn print_report(
    index: &CollisionIndex,
    query: &ReportQuery,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let report = index.report_for(query);
    log::debug!("Writing {} report as {format}", report.zip);
    match format {
        OutputFormat::Text => println!("{report}"),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = collision_map_cli_utils::init_logger();
    let cli = Cli::parse();

    let options = IngestOptions { limit: cli.limit };
    let progress = IndicatifProgress::bytes_bar(&multi, "Loading collisions");
    let (index, summary) =
        collision_map_ingest::load_file(&cli.file, &options, progress.as_ref())?;

    if summary.records_inserted == 0 {
        log::warn!(
            "No valid collisions found in {} ({} rows read)",
            cli.file.display(),
            summary.rows_read
        );
    }

    match cli.command {
        None => interactive::run(&index)?,
        Some(Commands::Report {
            zip,
            from,
            to,
            format,
        }) => {
            let query = ReportQuery::parse(&zip, &from, &to)?;
            print_report(&index, &query, format)?;
        }
        Some(Commands::Dump) => println!("{index}"),
        Some(Commands::Tree) => println!("{}", index.to_tree_string()),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn output_format_displays_snake_case() {
        assert_eq!(OutputFormat::Text.to_string(), "text");
        assert_eq!(OutputFormat::Json.to_string(), "json");
    }

    #[test]
    fn report_format_defaults_to_text() {
        let cli = Cli::try_parse_from([
            "collision_map_cli",
            "collisions.csv",
            "report",
            "--zip",
            "10001",
            "--from",
            "01/01/2017",
            "--to",
            "12/31/2017",
        ])
        .unwrap();
        let Some(Commands::Report { format, zip, .. }) = cli.command else {
            panic!("expected report subcommand");
        };
        assert_eq!(format, OutputFormat::Text);
        assert_eq!(zip, "10001");
    }

    #[test]
    fn parses_json_format_and_limit() {
        let cli = Cli::try_parse_from([
            "collision_map_cli",
            "collisions.csv",
            "--limit",
            "50",
            "report",
            "--zip",
            "10001",
            "--from",
            "01/01/2017",
            "--to",
            "12/31/2017",
            "--format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.limit, Some(50));
        assert!(matches!(
            cli.command,
            Some(Commands::Report {
                format: OutputFormat::Json,
                ..
            })
        ));
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }
}
