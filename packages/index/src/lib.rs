#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! In-memory AVL index of collisions with zip/date range reports.
//!
//! [`CollisionIndex`] keeps [`Collision`]s ordered by zip code and then by
//! date, rebalancing after every insert and removal so that lookups and
//! [`CollisionIndex::report`] queries stay logarithmic in the number of
//! stored records.
//!
//! The index is a plain single-owner value: mutation goes through
//! `&mut self` and nothing is synchronised internally.

mod iter;
mod node;
pub mod report;

use chrono::NaiveDate;
use collision_map_collision_models::Collision;

pub use iter::Iter;
pub use report::{CollisionReport, NO_DATA_MESSAGE, QueryError, ReportQuery};

use node::Link;

/// A self-balancing ordered index of collisions.
///
/// Ordering follows [`Collision::cmp_key`]: zip code, then date. Records
/// that tie on both are all kept; later ones are placed after earlier ones.
#[derive(Debug, Clone, Default)]
pub struct CollisionIndex {
    root: Link,
    allocated: usize,
}

impl CollisionIndex {
    /// Creates an empty index.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            root: None,
            allocated: 0,
        }
    }

    /// Inserts a collision and rebalances. Passing `None` leaves the index
    /// untouched.
    pub fn insert(&mut self, record: impl Into<Option<Collision>>) {
        let Some(record) = record.into() else {
            return;
        };
        self.root = Some(node::insert(self.root.take(), record, &mut self.allocated));
    }

    /// Removes the first stored collision that ties with `target` on zip
    /// code and date, and rebalances.
    ///
    /// The stored record's key is not compared, so when several collisions
    /// share a zip code and day any one of them may be the one removed.
    /// Returns `false` if nothing matched.
    pub fn remove(&mut self, target: &Collision) -> bool {
        let (root, removed) = node::remove(self.root.take(), target);
        self.root = root;
        if removed {
            log::debug!("Removed collision at {} {}", target.zip(), target.date());
        }
        removed
    }

    /// Returns `true` if a collision equal to `target` on zip code, date and
    /// key is stored.
    #[must_use]
    pub fn contains(&self, target: &Collision) -> bool {
        node::contains(self.root.as_deref(), target)
    }

    /// Number of nodes allocated by [`CollisionIndex::insert`].
    ///
    /// Removals do not decrease this count; use [`CollisionIndex::iter`] to
    /// count the records currently stored.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.allocated
    }

    /// Returns `true` if no collision is currently stored.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Height of the tree: -1 when empty, 0 for a single record.
    #[must_use]
    pub fn height(&self) -> i32 {
        node::height(&self.root)
    }

    /// Checks every cached height and every balance factor against a full
    /// recomputation.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        node::verified_height(self.root.as_deref()).is_some()
    }

    /// Iterates over stored collisions in ascending zip/date order.
    #[must_use]
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(self.root.as_deref())
    }

    /// Renders the tree shape: one record per line in pre-order, indented by
    /// depth, with empty children shown as `null`.
    #[must_use]
    pub fn to_tree_string(&self) -> String {
        let mut out = String::new();
        node::write_tree(self.root.as_deref(), 0, &mut out);
        out
    }

    /// Totals collisions, fatalities and injuries for `zip` between
    /// `date_begin` and `date_end`, both inclusive.
    #[must_use]
    pub fn report(&self, zip: &str, date_begin: NaiveDate, date_end: NaiveDate) -> CollisionReport {
        let mut report = CollisionReport::empty(zip, date_begin, date_end);
        report::aggregate(self.root.as_deref(), &mut report);
        log::debug!(
            "Report for {zip} {date_begin}..={date_end}: {} collision(s)",
            report.total_collisions
        );
        report
    }

    /// Runs [`CollisionIndex::report`] for a parsed [`ReportQuery`].
    #[must_use]
    pub fn report_for(&self, query: &ReportQuery) -> CollisionReport {
        self.report(&query.zip, query.date_begin, query.date_end)
    }
}

impl<'a> IntoIterator for &'a CollisionIndex {
    type Item = &'a Collision;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Extend<Collision> for CollisionIndex {
    fn extend<T: IntoIterator<Item = Collision>>(&mut self, iter: T) {
        for record in iter {
            self.insert(record);
        }
    }
}

impl FromIterator<Collision> for CollisionIndex {
    fn from_iter<T: IntoIterator<Item = Collision>>(iter: T) -> Self {
        let mut index = Self::new();
        index.extend(iter);
        index
    }
}

/// Lists every stored collision in ascending order, each followed by two
/// spaces.
impl std::fmt::Display for CollisionIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for record in self {
            write!(f, "{record}  ")?;
        }
        Ok(())
    }
}
