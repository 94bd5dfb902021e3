#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Streams collision CSV files into a [`CollisionIndex`].
//!
//! Rows are split with the `csv` crate (quote-aware, tolerant of ragged
//! rows) and turned into [`Collision`]s one at a time. A row that fails
//! validation is logged and skipped; it never aborts the rest of the file.
//! Header rows fail date validation and are skipped the same way.

pub mod progress;

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use collision_map_collision_models::Collision;
use collision_map_index::CollisionIndex;
use serde::{Deserialize, Serialize};

use crate::progress::ProgressCallback;

/// How often (in rows) progress is pushed to the [`ProgressCallback`].
const PROGRESS_INTERVAL: u64 = 1_000;

/// Errors that stop ingestion of a whole file.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// The collision file does not exist.
    #[error("collision file not found: {}", .path.display())]
    NotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// I/O error (file open/read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The CSV reader failed in a way that is not local to one row.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Knobs for a single ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestOptions {
    /// Stop after reading this many rows (useful for testing).
    pub limit: Option<u64>,
}

/// Outcome of reading one collision file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestSummary {
    /// Rows pulled from the CSV reader, headers and bad rows included.
    pub rows_read: u64,
    /// Rows that became collisions and were inserted into the index.
    pub records_inserted: u64,
    /// Rows rejected by validation.
    pub rows_skipped: u64,
    /// Wall-clock time spent reading.
    pub duration: Duration,
}

/// Reads collisions from any CSV byte stream into a fresh index.
///
/// # Errors
///
/// Returns [`IngestError::Csv`] if the underlying reader fails. Rows that
/// are malformed or fail validation (including rows that are not valid
/// UTF-8) are skipped instead.
pub fn read_collisions<R: Read>(
    reader: R,
    options: &IngestOptions,
    progress: &dyn ProgressCallback,
) -> Result<(CollisionIndex, IngestSummary), IngestError> {
    let start = Instant::now();
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut index = CollisionIndex::new();
    let mut summary = IngestSummary::default();
    let mut row = csv::StringRecord::new();

    loop {
        if let Some(max) = options.limit
            && summary.rows_read >= max
        {
            log::info!("Reached row limit ({max}), stopping CSV parse");
            break;
        }

        match csv_reader.read_record(&mut row) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) if matches!(e.kind(), csv::ErrorKind::Utf8 { .. }) => {
                summary.rows_read += 1;
                summary.rows_skipped += 1;
                log::debug!("Skipping undecodable row: {e}");
                continue;
            }
            Err(e) => return Err(e.into()),
        }
        summary.rows_read += 1;

        let fields: Vec<&str> = row.iter().collect();
        match Collision::from_fields(&fields) {
            Ok(collision) => {
                index.insert(collision);
                summary.records_inserted += 1;
            }
            Err(e) => {
                summary.rows_skipped += 1;
                log::debug!(
                    "Skipping line {}: {e}",
                    row.position().map_or(0, csv::Position::line)
                );
            }
        }

        if summary.rows_read.is_multiple_of(PROGRESS_INTERVAL) {
            progress.set_position(csv_reader.position().byte());
            progress.set_message(format!("{} collisions", summary.records_inserted));
        }
    }

    summary.duration = start.elapsed();
    progress.set_position(csv_reader.position().byte());
    progress.finish(format!(
        "Loaded {} collisions ({} rows skipped)",
        summary.records_inserted, summary.rows_skipped
    ));
    log::info!(
        "Ingested {} collisions from {} rows ({} skipped) in {:.1}s",
        summary.records_inserted,
        summary.rows_read,
        summary.rows_skipped,
        summary.duration.as_secs_f64()
    );

    Ok((index, summary))
}

/// Opens a collision CSV file and reads it with [`read_collisions`].
///
/// # Errors
///
/// Returns [`IngestError::NotFound`] if the file does not exist,
/// [`IngestError::Io`] if it cannot be opened, and [`IngestError::Csv`]
/// if reading fails part-way.
pub fn load_file(
    path: &Path,
    options: &IngestOptions,
    progress: &dyn ProgressCallback,
) -> Result<(CollisionIndex, IngestSummary), IngestError> {
    if !path.exists() {
        return Err(IngestError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let file = File::open(path)?;
    if let Ok(metadata) = file.metadata() {
        progress.set_total(metadata.len());
    }
    log::info!("Reading collisions from {}", path.display());

    read_collisions(file, options, progress)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NullProgress;

    const HEADER: &str = "DATE,TIME,BOROUGH,ZIP CODE,LATITUDE,LONGITUDE,LOCATION,ON STREET NAME,\
CROSS STREET NAME,OFF STREET NAME,NUMBER OF PERSONS INJURED,NUMBER OF PERSONS KILLED,\
NUMBER OF PEDESTRIANS INJURED,NUMBER OF PEDESTRIANS KILLED,NUMBER OF CYCLIST INJURED,\
NUMBER OF CYCLIST KILLED,NUMBER OF MOTORIST INJURED,NUMBER OF MOTORIST KILLED,\
CONTRIBUTING FACTOR VEHICLE 1,CONTRIBUTING FACTOR VEHICLE 2,CONTRIBUTING FACTOR VEHICLE 3,\
CONTRIBUTING FACTOR VEHICLE 4,CONTRIBUTING FACTOR VEHICLE 5,UNIQUE KEY";

    fn line(date: &str, zip: &str, counts: &str, key: &str) -> String {
        format!(
            "{date},14:30,MANHATTAN,{zip},40.75,-73.99,\"(40.75, -73.99)\",\"W 34 ST, NEAR 8 AVE\",,,\
{counts},Unspecified,,,,,{key}"
        )
    }

    fn csv_text(lines: &[String]) -> String {
        let mut text = String::from(HEADER);
        for l in lines {
            text.push('\n');
            text.push_str(l);
        }
        text.push('\n');
        text
    }

    #[test]
    fn reads_valid_rows_and_skips_header() {
        let text = csv_text(&[
            line("01/01/2017", "10001", "1,0,1,0,0,0,0,0", "A"),
            line("06/15/2017", "10001", "1,1,0,0,0,1,1,0", "B"),
            line("01/01/2017", "10002", "2,0,0,0,0,0,2,0", "C"),
        ]);
        let (index, summary) =
            read_collisions(text.as_bytes(), &IngestOptions::default(), &NullProgress).unwrap();

        assert_eq!(summary.rows_read, 4);
        assert_eq!(summary.records_inserted, 3);
        assert_eq!(summary.rows_skipped, 1);
        assert_eq!(index.size(), 3);

        let date_begin = collision_map_collision_models::parse_collision_date("01/01/2017").unwrap();
        let date_end = collision_map_collision_models::parse_collision_date("12/31/2017").unwrap();
        let report = index.report("10001", date_begin, date_end);
        assert_eq!(report.total_collisions, 2);
        assert_eq!(report.cyclists_killed, 1);
        assert_eq!(report.pedestrians_injured, 1);
        assert_eq!(report.motorists_injured, 1);
    }

    #[test]
    fn quoted_commas_do_not_shift_columns() {
        let text = csv_text(&[line("03/04/2017", "11201", "0,0,0,0,0,0,0,0", "Q")]);
        let (index, _) =
            read_collisions(text.as_bytes(), &IngestOptions::default(), &NullProgress).unwrap();
        let stored: Vec<_> = index.iter().collect();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].zip(), "11201");
        assert_eq!(stored[0].key(), "Q");
    }

    #[test]
    fn skips_invalid_rows_and_continues() {
        let text = csv_text(&[
            line("01/01/2017", "", "0,0,0,0,0,0,0,0", "no-zip"),
            line("01/01/2017", "10001", "0,0,-1,0,0,0,0,0", "negative"),
            line("13/45/2017", "10001", "0,0,0,0,0,0,0,0", "bad-date"),
            line("01/01/2017", "10001", "0,0,0,0,0,0,0,0", ""),
            "too,short".to_string(),
            line("01/02/2017", "10001", "0,0,0,0,0,0,0,0", "good"),
        ]);
        let (index, summary) =
            read_collisions(text.as_bytes(), &IngestOptions::default(), &NullProgress).unwrap();
        assert_eq!(summary.rows_read, 7);
        assert_eq!(summary.records_inserted, 1);
        assert_eq!(summary.rows_skipped, 6);
        assert_eq!(index.iter().next().unwrap().key(), "good");
    }

    #[test]
    fn honours_row_limit() {
        let text = csv_text(&[
            line("01/01/2017", "10001", "0,0,0,0,0,0,0,0", "A"),
            line("01/02/2017", "10001", "0,0,0,0,0,0,0,0", "B"),
            line("01/03/2017", "10001", "0,0,0,0,0,0,0,0", "C"),
        ]);
        let options = IngestOptions { limit: Some(2) };
        let (index, summary) = read_collisions(text.as_bytes(), &options, &NullProgress).unwrap();
        assert_eq!(summary.rows_read, 2);
        assert_eq!(summary.records_inserted, 1);
        assert_eq!(index.size(), 1);
    }

    #[test]
    fn empty_input_yields_empty_index() {
        let (index, summary) =
            read_collisions(&b""[..], &IngestOptions::default(), &NullProgress).unwrap();
        assert!(index.is_empty());
        assert_eq!(summary.rows_read, 0);
    }

    #[test]
    fn missing_file_is_not_found() {
        let result = load_file(
            Path::new("/definitely/not/here/collisions.csv"),
            &IngestOptions::default(),
            &NullProgress,
        );
        assert!(matches!(result, Err(IngestError::NotFound { .. })));
    }
}
