//! Graph construction from a geometry-backed table.

use std::path::Path;

use censusalign_core::{Error, GeoId, Level, Result};
use censusalign_geo::{find_adjacencies, Contiguity, GeoTable};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::types::{Adjacency, DualGraph, UnitNode};

/// A curated edge between two block groups, by GEOID.
///
/// Loaded from the vintage catalog or from a user-supplied JSON file
/// (an array of `{"from", "to", "note"?}` objects).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManualEdge {
    /// Block-group GEOID of one endpoint.
    pub from: String,
    /// Block-group GEOID of the other endpoint.
    pub to: String,
    /// Why the edge exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Statistics from a graph build.
#[derive(Clone, Debug, Default)]
pub struct BuildStats {
    /// Nodes created.
    pub nodes: usize,
    /// Edges found by contiguity detection.
    pub spatial_edges: usize,
    /// Manual edges added.
    pub manual_edges_added: usize,
    /// Manual edges skipped (missing endpoint, invalid GEOID, duplicate).
    pub manual_edges_skipped: usize,
    /// Degree-0 nodes remaining after manual edges.
    pub isolated_nodes: usize,
}

/// Builder for dual graphs.
///
/// ```
/// use censusalign_graphify::Graphify;
/// use censusalign_geo::Contiguity;
///
/// let builder = Graphify::new().with_contiguity(Contiguity::Queen);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Graphify {
    contiguity: Contiguity,
    manual_edges: Vec<ManualEdge>,
}

impl Graphify {
    /// Creates a builder with rook contiguity and no manual edges.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the contiguity rule.
    pub fn with_contiguity(mut self, contiguity: Contiguity) -> Self {
        self.contiguity = contiguity;
        self
    }

    /// Appends manual edges.
    pub fn with_manual_edges(mut self, edges: impl IntoIterator<Item = ManualEdge>) -> Self {
        self.manual_edges.extend(edges);
        self
    }

    /// Appends manual edges from a JSON file.
    pub fn with_manual_edges_file(self, path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let edges: Vec<ManualEdge> = serde_json::from_str(&json)?;
        Ok(self.with_manual_edges(edges))
    }

    /// Builds the dual graph from a vote-joined table.
    ///
    /// Every unit must carry a tally (run [`GeoTable::join_votes`] first).
    /// Manual edges whose endpoints are missing from the table are logged
    /// and counted, never fatal: an island with no votes legitimately drops
    /// out of the table along with its curated link.
    pub fn build(&self, table: &GeoTable) -> Result<(DualGraph, BuildStats)> {
        let mut graph = DualGraph::new();
        let mut stats = BuildStats::default();

        for unit in table.units() {
            let votes = unit.votes.ok_or_else(|| {
                Error::validation(format!(
                    "unit {} has no vote tally; join votes before building the graph",
                    unit.geoid
                ))
            })?;
            graph.add_node(UnitNode {
                geoid: unit.geoid.clone(),
                fips: unit.fips.clone(),
                pop_total: unit.pop_total,
                area: unit.area,
                votes,
            });
        }
        stats.nodes = graph.node_count();

        for pair in find_adjacencies(table, self.contiguity) {
            let from = &table.units()[pair.i].geoid;
            let to = &table.units()[pair.j].geoid;
            graph.add_edge(from, to, Adjacency::spatial(pair.shared_perim))?;
            stats.spatial_edges += 1;
        }

        for edge in &self.manual_edges {
            match self.apply_manual_edge(&mut graph, edge) {
                Ok(true) => stats.manual_edges_added += 1,
                Ok(false) => stats.manual_edges_skipped += 1,
                Err(e) => return Err(e),
            }
        }

        stats.isolated_nodes = graph.isolated_nodes().len();
        if stats.isolated_nodes > 0 {
            warn!(
                isolated = stats.isolated_nodes,
                "graph has isolated units; consider adding manual edges"
            );
        }
        info!(
            nodes = stats.nodes,
            spatial_edges = stats.spatial_edges,
            manual_edges = stats.manual_edges_added,
            "built dual graph"
        );

        Ok((graph, stats))
    }

    /// Applies one manual edge; `Ok(true)` if added, `Ok(false)` if skipped.
    fn apply_manual_edge(&self, graph: &mut DualGraph, edge: &ManualEdge) -> Result<bool> {
        let (from, to) = match (
            GeoId::from_prefix(&edge.from, Level::BlockGroup),
            GeoId::from_prefix(&edge.to, Level::BlockGroup),
        ) {
            (Ok(from), Ok(to)) => (from, to),
            _ => {
                warn!(from = %edge.from, to = %edge.to, "manual edge has invalid GEOIDs");
                return Ok(false);
            }
        };

        if !graph.contains_node(&from) || !graph.contains_node(&to) {
            warn!(from = %from, to = %to, "manual edge endpoint not in graph");
            return Ok(false);
        }
        if graph.has_edge(&from, &to) {
            return Ok(false);
        }

        graph.add_edge(&from, &to, Adjacency::manual())?;
        Ok(true)
    }
}
