//! Zip code and date range casualty reports.
//!
//! `aggregate` walks the index using the zip/date ordering to skip every
//! subtree that cannot hold a matching collision. [`CollisionReport`]
//! carries the totals and renders the fixed-format text block.

use chrono::NaiveDate;
use collision_map_collision_models::{
    Collision, format_collision_date, is_valid_zip, parse_collision_date,
};
use serde::{Deserialize, Serialize};

use crate::node::Node;

/// Printed instead of the report block when nothing matched.
pub const NO_DATA_MESSAGE: &str = "There are no reports to show for this zip code.";

const RULE: &str = "====================================================================";

/// Invalid report query input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    /// The zip code is not 5 characters or contains no digit.
    #[error("invalid zip code: {value:?}")]
    InvalidZip {
        /// The rejected input.
        value: String,
    },

    /// A date is not a valid `MM/DD/YYYY` date.
    #[error("invalid date format: {value:?}")]
    InvalidDate {
        /// The rejected input.
        value: String,
    },
}

/// A validated report request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    /// Zip code to report on.
    pub zip: String,
    /// First day of the range (inclusive).
    pub date_begin: NaiveDate,
    /// Last day of the range (inclusive).
    pub date_end: NaiveDate,
}

impl ReportQuery {
    /// Validates a zip code and two `MM/DD/YYYY` dates as typed by a user.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidZip`] or [`QueryError::InvalidDate`] for
    /// the first input that fails.
    pub fn parse(zip: &str, date_begin: &str, date_end: &str) -> Result<Self, QueryError> {
        let zip = Self::check_zip(zip)?;
        Ok(Self {
            zip: zip.to_string(),
            date_begin: parse_date(date_begin)?,
            date_end: parse_date(date_end)?,
        })
    }

    /// Validates a zip code on its own, returning it without surrounding
    /// whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidZip`] if the zip code is not 5
    /// characters or contains no digit.
    pub fn check_zip(zip: &str) -> Result<&str, QueryError> {
        let zip = zip.trim();
        if is_valid_zip(zip) {
            Ok(zip)
        } else {
            Err(QueryError::InvalidZip {
                value: zip.to_string(),
            })
        }
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, QueryError> {
    parse_collision_date(value).ok_or_else(|| QueryError::InvalidDate {
        value: value.to_string(),
    })
}

/// Collision, fatality and injury totals for one zip code over a date
/// range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollisionReport {
    /// Zip code the report covers.
    pub zip: String,
    /// First day of the range (inclusive).
    pub date_begin: NaiveDate,
    /// Last day of the range (inclusive).
    pub date_end: NaiveDate,
    /// Number of matching collisions.
    pub total_collisions: u64,
    /// Pedestrians killed.
    pub pedestrians_killed: u64,
    /// Cyclists killed.
    pub cyclists_killed: u64,
    /// Motorists killed.
    pub motorists_killed: u64,
    /// Pedestrians injured.
    pub pedestrians_injured: u64,
    /// Cyclists injured.
    pub cyclists_injured: u64,
    /// Motorists injured.
    pub motorists_injured: u64,
}

impl CollisionReport {
    /// An all-zero report for the given range.
    #[must_use]
    pub fn empty(zip: impl Into<String>, date_begin: NaiveDate, date_end: NaiveDate) -> Self {
        Self {
            zip: zip.into(),
            date_begin,
            date_end,
            total_collisions: 0,
            pedestrians_killed: 0,
            cyclists_killed: 0,
            motorists_killed: 0,
            pedestrians_injured: 0,
            cyclists_injured: 0,
            motorists_injured: 0,
        }
    }

    /// Whether at least one collision matched.
    #[must_use]
    pub const fn has_data(&self) -> bool {
        self.total_collisions > 0
    }

    /// Pedestrian, cyclist and motorist fatalities combined.
    #[must_use]
    pub const fn total_killed(&self) -> u64 {
        self.pedestrians_killed + self.cyclists_killed + self.motorists_killed
    }

    /// Pedestrian, cyclist and motorist injuries combined.
    #[must_use]
    pub const fn total_injured(&self) -> u64 {
        self.pedestrians_injured + self.cyclists_injured + self.motorists_injured
    }

    fn count(&mut self, collision: &Collision) {
        let c = collision.casualties();
        self.total_collisions += 1;
        self.pedestrians_killed += u64::from(c.pedestrians_killed);
        self.cyclists_killed += u64::from(c.cyclists_killed);
        self.motorists_killed += u64::from(c.motorists_killed);
        self.pedestrians_injured += u64::from(c.pedestrians_injured);
        self.cyclists_injured += u64::from(c.cyclists_injured);
        self.motorists_injured += u64::from(c.motorists_injured);
    }
}

impl std::fmt::Display for CollisionReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !self.has_data() {
            return f.write_str(NO_DATA_MESSAGE);
        }

        writeln!(
            f,
            "Motor Vehicle Collisions for zipcode {} {} - {}",
            self.zip,
            format_collision_date(self.date_begin),
            format_collision_date(self.date_end),
        )?;
        writeln!(f, "{RULE}")?;
        writeln!(f, "Total number of collisions: {}", self.total_collisions)?;
        writeln!(f, "Number of fatalities: {}", self.total_killed())?;
        writeln!(f, "         pedestrians: {}", self.pedestrians_killed)?;
        writeln!(f, "            cyclists: {}", self.cyclists_killed)?;
        writeln!(f, "           motorists: {}", self.motorists_killed)?;
        writeln!(f, "Number of injuries: {}", self.total_injured())?;
        writeln!(f, "       pedestrians: {}", self.pedestrians_injured)?;
        writeln!(f, "          cyclists: {}", self.cyclists_injured)?;
        writeln!(f, "         motorists: {}", self.motorists_injured)
    }
}

/// Adds every collision below `link` whose zip equals `report.zip` and
/// whose date lies in `[report.date_begin, report.date_end]`.
///
/// Left subtrees hold keys no greater than their parent and right subtrees
/// keys no smaller, so once the zip matches a node outside the date range
/// only one side can still contain matches.
pub(crate) fn aggregate(link: Option<&Node>, report: &mut CollisionReport) {
    let Some(node) = link else {
        return;
    };
    let record = &node.record;

    match report.zip.as_str().cmp(record.zip()) {
        std::cmp::Ordering::Less => aggregate(node.left.as_deref(), report),
        std::cmp::Ordering::Greater => aggregate(node.right.as_deref(), report),
        std::cmp::Ordering::Equal => {
            if report.date_begin > record.date() {
                aggregate(node.right.as_deref(), report);
            } else if record.date() > report.date_end {
                aggregate(node.left.as_deref(), report);
            } else {
                report.count(record);
                aggregate(node.left.as_deref(), report);
                aggregate(node.right.as_deref(), report);
            }
        }
    }
}
