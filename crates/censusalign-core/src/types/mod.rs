//! Shared domain types.

mod geoid;
mod level;
mod proptests;
mod tally;

pub use geoid::GeoId;
pub use level::Level;
pub use tally::{TallyRow, VoteTally};
