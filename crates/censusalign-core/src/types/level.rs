//! Census aggregation levels.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// A census aggregation level.
///
/// Census GEOIDs are hierarchical: every coarser identifier is a fixed-width
/// prefix of the 15-digit block GEOID (state 2 + county 3 + tract 6 +
/// block group 1 + block suffix 3).
///
/// # Examples
///
/// ```
/// use censusalign_core::Level;
///
/// assert_eq!(Level::BlockGroup.prefix_len(), 12);
/// assert_eq!("blockgroup".parse::<Level>().unwrap(), Level::BlockGroup);
/// assert_eq!(Level::Tract.to_string(), "tract");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// County (GEOID prefix of 5 digits).
    County,
    /// Census tract (11 digits).
    Tract,
    /// Census block group (12 digits).
    BlockGroup,
    /// Census block (full 15-digit GEOID).
    Block,
}

impl Level {
    /// Number of leading GEOID digits that identify a unit at this level.
    pub fn prefix_len(&self) -> usize {
        match self {
            Level::County => 5,
            Level::Tract => 11,
            Level::BlockGroup => 12,
            Level::Block => 15,
        }
    }

    /// Returns the level name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::County => "county",
            Level::Tract => "tract",
            Level::BlockGroup => "blockgroup",
            Level::Block => "block",
        }
    }

    /// All levels, coarsest first.
    pub fn all() -> [Level; 4] {
        [Level::County, Level::Tract, Level::BlockGroup, Level::Block]
    }

    /// Infers the level from a GEOID prefix length, if any level matches.
    pub fn from_prefix_len(len: usize) -> Option<Level> {
        Level::all().into_iter().find(|l| l.prefix_len() == len)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "county" => Ok(Level::County),
            "tract" => Ok(Level::Tract),
            "blockgroup" | "block_group" | "block-group" => Ok(Level::BlockGroup),
            "block" => Ok(Level::Block),
            other => Err(Error::validation_field(
                "level",
                format!(
                    "invalid level {other:?}; choose from 'block', 'blockgroup', 'tract', or 'county'"
                ),
            )),
        }
    }
}
