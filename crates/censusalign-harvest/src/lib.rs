//! Data acquisition for CensusAlign.
//!
//! The [`Harvest`] loader fetches the four datasets a vintage needs — the
//! precinct statement-of-vote, the precinct-to-block correspondence, the
//! block-level CVAP counts, and the TIGER block-group shapefile — from the
//! URLs in a [`Catalog`], transparently unwrapping ZIP payloads. Transports
//! are pluggable so tests and offline runs never touch the network.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod archive;
pub mod catalog;
pub mod harvest;
pub mod transport;

pub use catalog::{Catalog, ElectionColumns, ManualEdgeSpec};
pub use harvest::Harvest;
pub use transport::{HttpTransport, Payload, Transport};

#[cfg(any(test, feature = "test-utils"))]
pub use transport::StaticTransport;
