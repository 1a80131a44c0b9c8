//! Two-party vote tallies.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};

use crate::types::GeoId;

/// Vote counts for a two-party contest.
///
/// The pipeline only tracks the Democratic and Republican columns the
/// data-source catalog names for a contest; `total()` is always their sum.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    /// Democratic vote count.
    pub dem: u64,
    /// Republican vote count.
    pub rep: u64,
}

impl VoteTally {
    /// Creates a new tally.
    pub fn new(dem: u64, rep: u64) -> Self {
        Self { dem, rep }
    }

    /// Total two-party votes.
    pub fn total(&self) -> u64 {
        self.dem + self.rep
    }

    /// Whether both counts are zero.
    pub fn is_empty(&self) -> bool {
        self.dem == 0 && self.rep == 0
    }
}

impl Add for VoteTally {
    type Output = VoteTally;

    fn add(self, rhs: VoteTally) -> VoteTally {
        VoteTally {
            dem: self.dem + rhs.dem,
            rep: self.rep + rhs.rep,
        }
    }
}

impl AddAssign for VoteTally {
    fn add_assign(&mut self, rhs: VoteTally) {
        self.dem += rhs.dem;
        self.rep += rhs.rep;
    }
}

/// A vote tally attached to a census geography.
///
/// Rollup output rows: one per GEOID at the requested aggregation level,
/// sorted by GEOID.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallyRow {
    /// GEOID of the unit.
    pub geoid: GeoId,
    /// Votes apportioned to the unit.
    pub votes: VoteTally,
}

impl TallyRow {
    /// Creates a new row.
    pub fn new(geoid: GeoId, votes: VoteTally) -> Self {
        Self { geoid, votes }
    }
}
