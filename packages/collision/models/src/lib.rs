#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Collision record types, ordering key, and field validation.
//!
//! A [`Collision`] is one motor vehicle incident: where (zip code), when
//! (calendar date), a unique key, and eight casualty counters. Records are
//! immutable once built and can only be built from values that pass
//! validation, so everything downstream (the index, the report aggregator)
//! can trust them.

pub mod date;

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

pub use date::{DATE_FORMAT, format_collision_date, parse_collision_date};

/// Minimum number of fields a raw collision row must carry.
pub const MIN_FIELDS: usize = 24;

/// Column holding the `MM/DD/YYYY` date.
pub const DATE_COLUMN: usize = 0;

/// Column holding the zip code.
pub const ZIP_COLUMN: usize = 3;

/// Column holding the unique collision key.
pub const KEY_COLUMN: usize = 23;

/// Required length of a zip code, in characters.
pub const ZIP_LEN: usize = 5;

/// The eight casualty counters carried by every collision, in column order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CasualtyColumn {
    /// Persons injured (any role)
    PersonsInjured,
    /// Persons killed (any role)
    PersonsKilled,
    /// Pedestrians injured
    PedestriansInjured,
    /// Pedestrians killed
    PedestriansKilled,
    /// Cyclists injured
    CyclistsInjured,
    /// Cyclists killed
    CyclistsKilled,
    /// Motorists injured
    MotoristsInjured,
    /// Motorists killed
    MotoristsKilled,
}

impl CasualtyColumn {
    /// Returns the zero-based column this counter is read from.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::PersonsInjured => 10,
            Self::PersonsKilled => 11,
            Self::PedestriansInjured => 12,
            Self::PedestriansKilled => 13,
            Self::CyclistsInjured => 14,
            Self::CyclistsKilled => 15,
            Self::MotoristsInjured => 16,
            Self::MotoristsKilled => 17,
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::PersonsInjured,
            Self::PersonsKilled,
            Self::PedestriansInjured,
            Self::PedestriansKilled,
            Self::CyclistsInjured,
            Self::CyclistsKilled,
            Self::MotoristsInjured,
            Self::MotoristsKilled,
        ]
    }
}

/// Reasons a raw row cannot become a [`Collision`].
///
/// Construction is all-or-nothing: the first failing check is reported and
/// no record is produced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    /// The row is shorter than [`MIN_FIELDS`].
    #[error("expected at least 24 fields, found {found}")]
    TooFewFields {
        /// Number of fields actually present.
        found: usize,
    },

    /// The date field is not a valid `MM/DD/YYYY` date.
    #[error("invalid date: {value:?}")]
    InvalidDate {
        /// The rejected input.
        value: String,
    },

    /// The zip code is not 5 characters or contains no digit.
    #[error("invalid zip code: {value:?}")]
    InvalidZip {
        /// The rejected input.
        value: String,
    },

    /// The unique key is empty.
    #[error("missing unique key")]
    MissingKey,

    /// A counter is missing or not an integer.
    #[error("invalid {field} count: {value:?}")]
    InvalidCount {
        /// Which counter failed.
        field: CasualtyColumn,
        /// The rejected input.
        value: String,
    },

    /// A counter parsed to a negative number.
    #[error("negative {field} count: {value}")]
    NegativeCount {
        /// Which counter failed.
        field: CasualtyColumn,
        /// The parsed value.
        value: i64,
    },
}

/// Injury and fatality counts for a single collision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Casualties {
    /// Persons injured (any role).
    pub persons_injured: u32,
    /// Persons killed (any role).
    pub persons_killed: u32,
    /// Pedestrians injured.
    pub pedestrians_injured: u32,
    /// Pedestrians killed.
    pub pedestrians_killed: u32,
    /// Cyclists injured.
    pub cyclists_injured: u32,
    /// Cyclists killed.
    pub cyclists_killed: u32,
    /// Motorists injured.
    pub motorists_injured: u32,
    /// Motorists killed.
    pub motorists_killed: u32,
}

impl Casualties {
    /// Returns the counter for `column`.
    #[must_use]
    pub const fn get(&self, column: CasualtyColumn) -> u32 {
        match column {
            CasualtyColumn::PersonsInjured => self.persons_injured,
            CasualtyColumn::PersonsKilled => self.persons_killed,
            CasualtyColumn::PedestriansInjured => self.pedestrians_injured,
            CasualtyColumn::PedestriansKilled => self.pedestrians_killed,
            CasualtyColumn::CyclistsInjured => self.cyclists_injured,
            CasualtyColumn::CyclistsKilled => self.cyclists_killed,
            CasualtyColumn::MotoristsInjured => self.motorists_injured,
            CasualtyColumn::MotoristsKilled => self.motorists_killed,
        }
    }

    const fn set(&mut self, column: CasualtyColumn, value: u32) {
        match column {
            CasualtyColumn::PersonsInjured => self.persons_injured = value,
            CasualtyColumn::PersonsKilled => self.persons_killed = value,
            CasualtyColumn::PedestriansInjured => self.pedestrians_injured = value,
            CasualtyColumn::PedestriansKilled => self.pedestrians_killed = value,
            CasualtyColumn::CyclistsInjured => self.cyclists_injured = value,
            CasualtyColumn::CyclistsKilled => self.cyclists_killed = value,
            CasualtyColumn::MotoristsInjured => self.motorists_injured = value,
            CasualtyColumn::MotoristsKilled => self.motorists_killed = value,
        }
    }

    /// Reads all eight counters from a raw row.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::InvalidCount`] if a counter column is missing
    /// or not an integer, and [`RecordError::NegativeCount`] if it is below
    /// zero.
    pub fn from_fields<S: AsRef<str>>(fields: &[S]) -> Result<Self, RecordError> {
        let mut casualties = Self::default();
        for &column in CasualtyColumn::all() {
            let raw = fields.get(column.index()).map_or("", |f| f.as_ref());
            casualties.set(column, parse_count(column, raw)?);
        }
        Ok(casualties)
    }
}

fn parse_count(field: CasualtyColumn, raw: &str) -> Result<u32, RecordError> {
    let value: i64 = raw
        .trim()
        .parse()
        .map_err(|_| RecordError::InvalidCount {
            field,
            value: raw.to_string(),
        })?;
    if value < 0 {
        return Err(RecordError::NegativeCount { field, value });
    }
    u32::try_from(value).map_err(|_| RecordError::InvalidCount {
        field,
        value: raw.to_string(),
    })
}

/// Returns `true` if `zip` is exactly [`ZIP_LEN`] characters and contains
/// at least one ASCII digit.
#[must_use]
pub fn is_valid_zip(zip: &str) -> bool {
    zip.chars().count() == ZIP_LEN && zip.chars().any(|c| c.is_ascii_digit())
}

/// A single motor vehicle collision.
///
/// Equality ([`PartialEq`]) compares zip, date and key. Ordering is exposed
/// through [`Collision::cmp_key`] instead of [`Ord`] because it stops at the
/// date: two collisions on the same day in the same zip code order as
/// equal even when their keys differ.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Collision {
    zip: String,
    date: NaiveDate,
    key: String,
    casualties: Casualties,
}

impl Collision {
    /// Builds a collision from already-typed values.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::InvalidZip`] or [`RecordError::MissingKey`] if
    /// the zip code or key fail validation.
    pub fn new(
        zip: impl Into<String>,
        date: NaiveDate,
        key: impl Into<String>,
        casualties: Casualties,
    ) -> Result<Self, RecordError> {
        let zip = zip.into();
        if !is_valid_zip(&zip) {
            return Err(RecordError::InvalidZip { value: zip });
        }
        let key = key.into();
        if key.is_empty() {
            return Err(RecordError::MissingKey);
        }
        Ok(Self {
            zip,
            date,
            key,
            casualties,
        })
    }

    /// Builds a collision from one raw row of the collisions file.
    ///
    /// Fields are checked in column order: row length, date, zip code, key,
    /// then the eight counters.
    ///
    /// # Errors
    ///
    /// Returns the [`RecordError`] for the first field that fails.
    pub fn from_fields<S: AsRef<str>>(fields: &[S]) -> Result<Self, RecordError> {
        if fields.len() < MIN_FIELDS {
            return Err(RecordError::TooFewFields {
                found: fields.len(),
            });
        }

        let raw_date = fields[DATE_COLUMN].as_ref();
        let date = parse_collision_date(raw_date).ok_or_else(|| RecordError::InvalidDate {
            value: raw_date.to_string(),
        })?;

        let zip = fields[ZIP_COLUMN].as_ref();
        if !is_valid_zip(zip) {
            return Err(RecordError::InvalidZip {
                value: zip.to_string(),
            });
        }

        let key = fields[KEY_COLUMN].as_ref();
        if key.is_empty() {
            return Err(RecordError::MissingKey);
        }

        let casualties = Casualties::from_fields(fields)?;

        Ok(Self {
            zip: zip.to_string(),
            date,
            key: key.to_string(),
            casualties,
        })
    }

    /// The 5-character zip code.
    #[must_use]
    pub fn zip(&self) -> &str {
        &self.zip
    }

    /// The day the collision happened.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// The unique collision key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Injury and fatality counts.
    #[must_use]
    pub const fn casualties(&self) -> &Casualties {
        &self.casualties
    }

    /// Orders by zip code, then by date.
    ///
    /// Collisions sharing both compare [`Ordering::Equal`] regardless of
    /// their keys.
    #[must_use]
    pub fn cmp_key(&self, other: &Self) -> Ordering {
        self.zip
            .cmp(&other.zip)
            .then_with(|| self.date.cmp(&other.date))
    }
}

impl PartialEq for Collision {
    fn eq(&self, other: &Self) -> bool {
        self.zip == other.zip && self.date == other.date && self.key == other.key
    }
}

impl Eq for Collision {}

impl std::fmt::Display for Collision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let c = &self.casualties;
        write!(
            f,
            "{} {} {} {} {} {} {} {} {}",
            self.zip,
            c.persons_injured,
            c.pedestrians_injured,
            c.cyclists_injured,
            c.motorists_injured,
            c.persons_killed,
            c.pedestrians_killed,
            c.cyclists_killed,
            c.motorists_killed,
        )
    }
}
