#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod cultivate;

pub use cultivate::Cultivate;

// Re-export the workspace surface at the facade root.
pub use censusalign_blockify::{hamilton_floor, Blockify};
pub use censusalign_core::{DataTable, Error, GeoId, Level, Result, TallyRow, VoteTally};
pub use censusalign_geo::{
    merge_population_and_geometry, Contiguity, GeoTable, GeoUnit, ShapeRecord,
};
pub use censusalign_graphify::{
    Adjacency, BuildStats, DualGraph, EdgeOrigin, Graphify, ManualEdge, UnitNode,
};
pub use censusalign_harvest::{Catalog, ElectionColumns, Harvest, ManualEdgeSpec};
