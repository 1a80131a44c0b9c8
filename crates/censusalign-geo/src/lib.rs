//! Geometry handling for CensusAlign.
//!
//! This crate covers everything between a raw TIGER block-group shapefile
//! and the geometry-backed table the dual-graph builder consumes:
//!
//! - [`shapes`]: ESRI shapefile decoding into [`ShapeRecord`]s
//! - [`clean`]: degenerate-ring repair and ring orientation
//! - [`albers`]: the NAD83 / California Albers (EPSG:3310) forward projection
//! - [`merge`]: block-level population rollup joined onto block-group shapes
//! - [`adjacency`]: rook/queen contiguity with shared-perimeter weights

#![forbid(unsafe_code)]

pub mod adjacency;
pub mod albers;
pub mod clean;
pub mod merge;
pub mod shapes;

pub use adjacency::{find_adjacencies, AdjacencyPair, Contiguity};
pub use albers::CaliforniaAlbers;
pub use merge::{merge_population_and_geometry, GeoTable, GeoUnit};
pub use shapes::{read_shapefile, ShapeRecord};
