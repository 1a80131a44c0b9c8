//! Normalized census GEOID handling.
//!
//! Statewide Database exports drop the leading zero of California's state
//! FIPS code ("06"), so block keys arrive as 14 digits while census TIGER
//! products carry the full 15. Everything downstream (water filtering,
//! aggregation, geometry joins) works on normalized identifiers, so raw keys
//! are padded once on entry and all coarser identifiers are fixed-width
//! prefixes from then on.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};
use crate::types::Level;

/// A normalized census GEOID.
///
/// The inner string is always an ASCII digit string whose length matches one
/// of the [`Level`] prefix widths. Ordering is lexicographic, which for
/// equal-width GEOIDs is the usual census sort order.
///
/// # Examples
///
/// ```
/// use censusalign_core::{GeoId, Level};
///
/// // A 14-digit Statewide Database block key is padded to the full GEOID.
/// let block = GeoId::block("60750101011001").unwrap();
/// assert_eq!(block.as_str(), "060750101011001");
///
/// let bg = block.truncate(Level::BlockGroup).unwrap();
/// assert_eq!(bg.as_str(), "060750101011");
/// assert_eq!(bg.level(), Some(Level::BlockGroup));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeoId(String);

impl GeoId {
    /// Normalizes a raw block key into a full 15-digit block GEOID.
    ///
    /// Accepts 15-digit census GEOIDs verbatim and left-pads 14-digit
    /// Statewide Database / CVAP keys with `'0'`. Anything else is rejected.
    pub fn block(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::invalid_geoid(trimmed, "not a digit string"));
        }
        match trimmed.len() {
            15 => Ok(Self(trimmed.to_string())),
            14 => Ok(Self(format!("0{trimmed}"))),
            n => Err(Error::invalid_geoid(
                trimmed,
                format!("expected 14 or 15 digits for a block key, got {n}"),
            )),
        }
    }

    /// Parses a GEOID that is already at the given level's width.
    ///
    /// Unlike [`GeoId::block`], no padding is applied; the input must be
    /// exactly `level.prefix_len()` digits.
    pub fn from_prefix(raw: &str, level: Level) -> Result<Self> {
        let trimmed = raw.trim();
        if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::invalid_geoid(trimmed, "not a digit string"));
        }
        if trimmed.len() != level.prefix_len() {
            return Err(Error::invalid_geoid(
                trimmed,
                format!(
                    "expected {} digits for a {} GEOID, got {}",
                    level.prefix_len(),
                    level,
                    trimmed.len()
                ),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The level implied by this GEOID's width, if it matches a known level.
    pub fn level(&self) -> Option<Level> {
        Level::from_prefix_len(self.0.len())
    }

    /// Truncates to a coarser (or equal) level by prefix.
    ///
    /// Returns an error when asked for a level finer than this GEOID carries.
    pub fn truncate(&self, level: Level) -> Result<Self> {
        let n = level.prefix_len();
        if n > self.0.len() {
            return Err(Error::invalid_geoid(
                &self.0,
                format!("cannot refine a {}-digit GEOID to {} level", self.0.len(), level),
            ));
        }
        Ok(Self(self.0[..n].to_string()))
    }

    /// The block-group digit, when this GEOID is at least block-group width.
    ///
    /// This is the 12th digit of the GEOID (the last digit of the
    /// block-group prefix).
    pub fn block_group_digit(&self) -> Option<char> {
        if self.0.len() >= Level::BlockGroup.prefix_len() {
            self.0.chars().nth(Level::BlockGroup.prefix_len() - 1)
        } else {
            None
        }
    }

    /// Whether this GEOID falls in a census water block group.
    ///
    /// Census numbering reserves block group `0` of each tract for
    /// water-only blocks; tabulation excludes them.
    pub fn is_water_block_group(&self) -> bool {
        self.block_group_digit() == Some('0')
    }

    /// Returns the GEOID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GeoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for GeoId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<GeoId> for String {
    fn from(id: GeoId) -> Self {
        id.0
    }
}
