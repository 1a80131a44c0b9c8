//! Core dual-graph types.

use std::collections::HashMap;

use censusalign_core::{Error, GeoId, Result, VoteTally};
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};

// ============================================================================
// Node and edge types
// ============================================================================

/// A geographic unit in the dual graph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnitNode {
    /// Block-group GEOID.
    pub geoid: GeoId,
    /// State + county FIPS.
    pub fips: String,
    /// Citizen voting-age population.
    pub pop_total: f64,
    /// Area in square meters (EPSG:3310).
    pub area: f64,
    /// Two-party vote tally.
    pub votes: VoteTally,
}

/// Where an edge came from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeOrigin {
    /// Derived from geometry by contiguity detection.
    #[default]
    Spatial,
    /// Curated connectivity (islands, harbors, continuity fixes).
    Manual,
}

/// An adjacency between two units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Adjacency {
    /// Shared boundary length in meters (0 for manual and point-touch edges).
    pub shared_perim: f64,
    /// Edge provenance.
    pub origin: EdgeOrigin,
}

impl Adjacency {
    /// A spatial adjacency with the given shared perimeter.
    pub fn spatial(shared_perim: f64) -> Self {
        Self {
            shared_perim,
            origin: EdgeOrigin::Spatial,
        }
    }

    /// A curated manual adjacency.
    pub fn manual() -> Self {
        Self {
            shared_perim: 0.0,
            origin: EdgeOrigin::Manual,
        }
    }
}

// ============================================================================
// DualGraph
// ============================================================================

/// The dual graph: an undirected petgraph with a GEOID lookup table.
#[derive(Clone, Debug, Default)]
pub struct DualGraph {
    /// The underlying undirected graph.
    pub graph: UnGraph<UnitNode, Adjacency>,
    node_indices: HashMap<GeoId, NodeIndex>,
}

impl DualGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self {
            graph: UnGraph::default(),
            node_indices: HashMap::new(),
        }
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Whether a unit is in the graph.
    pub fn contains_node(&self, geoid: &GeoId) -> bool {
        self.node_indices.contains_key(geoid)
    }

    /// The petgraph index for a unit.
    pub fn get_index(&self, geoid: &GeoId) -> Option<NodeIndex> {
        self.node_indices.get(geoid).copied()
    }

    /// A unit's attributes.
    pub fn node(&self, geoid: &GeoId) -> Option<&UnitNode> {
        self.get_index(geoid).map(|idx| &self.graph[idx])
    }

    /// Adds a unit. If the GEOID is already present, returns the existing
    /// index unchanged.
    pub fn add_node(&mut self, node: UnitNode) -> NodeIndex {
        if let Some(&existing) = self.node_indices.get(&node.geoid) {
            return existing;
        }
        let geoid = node.geoid.clone();
        let idx = self.graph.add_node(node);
        self.node_indices.insert(geoid, idx);
        idx
    }

    /// Adds an edge between two existing units.
    pub fn add_edge(&mut self, from: &GeoId, to: &GeoId, adjacency: Adjacency) -> Result<()> {
        let from_idx = self
            .get_index(from)
            .ok_or_else(|| Error::node_not_found(from.as_str()))?;
        let to_idx = self
            .get_index(to)
            .ok_or_else(|| Error::node_not_found(to.as_str()))?;
        self.graph.add_edge(from_idx, to_idx, adjacency);
        Ok(())
    }

    /// Whether two units are already connected (in either direction).
    pub fn has_edge(&self, a: &GeoId, b: &GeoId) -> bool {
        match (self.get_index(a), self.get_index(b)) {
            (Some(ai), Some(bi)) => self.graph.find_edge(ai, bi).is_some(),
            _ => false,
        }
    }

    /// GEOIDs of a unit's neighbors.
    pub fn neighbors(&self, geoid: &GeoId) -> Vec<&GeoId> {
        let Some(idx) = self.get_index(geoid) else {
            return Vec::new();
        };
        self.graph
            .neighbors(idx)
            .map(|n| &self.graph[n].geoid)
            .collect()
    }

    /// GEOIDs of degree-0 units.
    ///
    /// An isolated unit usually means a missing manual edge: an island the
    /// contiguity pass could not reach.
    pub fn isolated_nodes(&self) -> Vec<&GeoId> {
        self.graph
            .node_indices()
            .filter(|&idx| self.graph.neighbors(idx).next().is_none())
            .map(|idx| &self.graph[idx].geoid)
            .collect()
    }

    /// Iterates over all units.
    pub fn iter_nodes(&self) -> impl Iterator<Item = &UnitNode> {
        self.graph.node_indices().map(|idx| &self.graph[idx])
    }

    /// Iterates over all edges as (unit, unit, adjacency).
    pub fn iter_edges(&self) -> impl Iterator<Item = (&UnitNode, &UnitNode, &Adjacency)> {
        self.graph.edge_references().map(|edge| {
            (
                &self.graph[edge.source()],
                &self.graph[edge.target()],
                edge.weight(),
            )
        })
    }

    /// Total population across all units.
    pub fn total_population(&self) -> f64 {
        self.iter_nodes().map(|n| n.pop_total).sum()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use censusalign_core::Level;

    fn node(geoid: &str) -> UnitNode {
        UnitNode {
            geoid: GeoId::from_prefix(geoid, Level::BlockGroup).unwrap(),
            fips: geoid[..5].to_string(),
            pop_total: 100.0,
            area: 1.0,
            votes: VoteTally::new(60, 40),
        }
    }

    fn geoid(s: &str) -> GeoId {
        GeoId::from_prefix(s, Level::BlockGroup).unwrap()
    }

    #[test]
    fn test_empty_graph() {
        let graph = DualGraph::new();
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.edge_count(), 0);
        assert!(!graph.contains_node(&geoid("060750101011")));
    }

    #[test]
    fn test_add_node_dedupes() {
        let mut graph = DualGraph::new();
        let a = graph.add_node(node("060750101011"));
        let b = graph.add_node(node("060750101011"));
        assert_eq!(a, b);
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn test_add_edge_requires_nodes() {
        let mut graph = DualGraph::new();
        graph.add_node(node("060750101011"));
        let err = graph
            .add_edge(
                &geoid("060750101011"),
                &geoid("060750101012"),
                Adjacency::manual(),
            )
            .unwrap_err();
        assert!(err.to_string().contains("060750101012"));
    }

    #[test]
    fn test_has_edge_is_undirected() {
        let mut graph = DualGraph::new();
        graph.add_node(node("060750101011"));
        graph.add_node(node("060750101012"));
        graph
            .add_edge(
                &geoid("060750101011"),
                &geoid("060750101012"),
                Adjacency::spatial(12.5),
            )
            .unwrap();

        assert!(graph.has_edge(&geoid("060750101011"), &geoid("060750101012")));
        assert!(graph.has_edge(&geoid("060750101012"), &geoid("060750101011")));
    }

    #[test]
    fn test_neighbors_and_isolated() {
        let mut graph = DualGraph::new();
        graph.add_node(node("060750101011"));
        graph.add_node(node("060750101012"));
        graph.add_node(node("060750101013"));
        graph
            .add_edge(
                &geoid("060750101011"),
                &geoid("060750101012"),
                Adjacency::spatial(1.0),
            )
            .unwrap();

        assert_eq!(
            graph.neighbors(&geoid("060750101011")),
            vec![&geoid("060750101012")]
        );
        let isolated = graph.isolated_nodes();
        assert_eq!(isolated, vec![&geoid("060750101013")]);
    }

    #[test]
    fn test_total_population() {
        let mut graph = DualGraph::new();
        graph.add_node(node("060750101011"));
        graph.add_node(node("060750101012"));
        assert_eq!(graph.total_population(), 200.0);
    }
}
