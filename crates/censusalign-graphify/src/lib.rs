//! Dual-graph construction for districting analysis.
//!
//! The dual graph of a districting problem has one node per geographic unit
//! and one edge per pair of adjacent units. Nodes carry the population and
//! vote attributes MCMC samplers balance on; edges carry shared-perimeter
//! weights for compactness scoring. Island units that rook contiguity can
//! never reach are wired in through curated manual edges.
//!
//! The graph serializes to node-link JSON so downstream redistricting
//! toolchains can consume it directly.

#![forbid(unsafe_code)]

mod builder;
mod json;
mod types;

pub use builder::{BuildStats, Graphify, ManualEdge};
pub use types::{Adjacency, DualGraph, EdgeOrigin, UnitNode};
