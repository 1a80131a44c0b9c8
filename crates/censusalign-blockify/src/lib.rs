//! Vote disaggregation from precincts to census geography.
//!
//! Election results arrive at the Statewide Database precinct ("SRPrecinct")
//! level; districting analysis needs them on census geography. The
//! conversion table says how many of a precinct's registered voters live in
//! each census block, so votes are split proportionally to registration and
//! rounded with the largest-remainder (Hamilton) method, which keeps each
//! precinct's total intact. Block tallies then roll up to any coarser
//! census level by GEOID prefix.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod blockify;
mod hamilton;

pub use blockify::Blockify;
pub use hamilton::hamilton_floor;
