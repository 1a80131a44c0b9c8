//! Node-link JSON serialization.
//!
//! The export format is the undirected node-link layout redistricting
//! toolchains read: a `nodes` array keyed by GEOID with per-unit attributes,
//! and a `links` array of GEOID pairs with shared-perimeter weights. Output
//! is deterministic: nodes sort by GEOID, links by endpoint pair.

use std::path::Path;

use censusalign_core::{Error, GeoId, Level, Result, VoteTally};
use serde::{Deserialize, Serialize};

use crate::types::{Adjacency, DualGraph, EdgeOrigin, UnitNode};

/// Marker written into the `graph` metadata object.
const GENERATOR: &str = "censusalign";

#[derive(Debug, Serialize, Deserialize)]
struct NodeLinkDocument {
    directed: bool,
    multigraph: bool,
    graph: GraphMeta,
    nodes: Vec<JsonNode>,
    links: Vec<JsonLink>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GraphMeta {
    generator: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonNode {
    id: String,
    fips: String,
    pop_total: f64,
    area: f64,
    total_vote: u64,
    dem_vote: u64,
    rep_vote: u64,
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonLink {
    source: String,
    target: String,
    shared_perim: f64,
    origin: EdgeOrigin,
}

impl DualGraph {
    /// Serializes to node-link JSON.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        let mut nodes: Vec<JsonNode> = self
            .iter_nodes()
            .map(|node| JsonNode {
                id: node.geoid.as_str().to_string(),
                fips: node.fips.clone(),
                pop_total: node.pop_total,
                area: node.area,
                total_vote: node.votes.total(),
                dem_vote: node.votes.dem,
                rep_vote: node.votes.rep,
            })
            .collect();
        nodes.sort_by(|a, b| a.id.cmp(&b.id));

        let mut links: Vec<JsonLink> = self
            .iter_edges()
            .map(|(a, b, adjacency)| {
                // Canonical endpoint order keeps the output stable.
                let (source, target) = if a.geoid <= b.geoid {
                    (a.geoid.as_str(), b.geoid.as_str())
                } else {
                    (b.geoid.as_str(), a.geoid.as_str())
                };
                JsonLink {
                    source: source.to_string(),
                    target: target.to_string(),
                    shared_perim: adjacency.shared_perim,
                    origin: adjacency.origin,
                }
            })
            .collect();
        links.sort_by(|a, b| (&a.source, &a.target).cmp(&(&b.source, &b.target)));

        let document = NodeLinkDocument {
            directed: false,
            multigraph: false,
            graph: GraphMeta {
                generator: GENERATOR.to_string(),
            },
            nodes,
            links,
        };
        Ok(serde_json::to_value(document)?)
    }

    /// Reconstructs a graph from node-link JSON.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        let document: NodeLinkDocument = serde_json::from_value(value)?;
        if document.directed {
            return Err(Error::validation("dual graphs are undirected"));
        }

        let mut graph = DualGraph::new();
        for node in document.nodes {
            let geoid = GeoId::from_prefix(&node.id, Level::BlockGroup)?;
            graph.add_node(UnitNode {
                geoid,
                fips: node.fips,
                pop_total: node.pop_total,
                area: node.area,
                votes: VoteTally::new(node.dem_vote, node.rep_vote),
            });
        }
        for link in document.links {
            let source = GeoId::from_prefix(&link.source, Level::BlockGroup)?;
            let target = GeoId::from_prefix(&link.target, Level::BlockGroup)?;
            graph.add_edge(
                &source,
                &target,
                Adjacency {
                    shared_perim: link.shared_perim,
                    origin: link.origin,
                },
            )?;
        }
        Ok(graph)
    }

    /// Writes node-link JSON to a file.
    pub fn write_json_file(&self, path: &Path) -> Result<()> {
        let value = self.to_json()?;
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, &value)?;
        Ok(())
    }

    /// Reads node-link JSON from a file.
    pub fn read_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(serde_json::from_str(&json)?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn geoid(s: &str) -> GeoId {
        GeoId::from_prefix(s, Level::BlockGroup).unwrap()
    }

    fn sample_graph() -> DualGraph {
        let mut graph = DualGraph::new();
        for (id, dem, rep, pop) in [
            ("060750101012", 5, 5, 80.0),
            ("060750101011", 6, 4, 120.0),
            ("060759804011", 1, 1, 10.0),
        ] {
            graph.add_node(UnitNode {
                geoid: geoid(id),
                fips: id[..5].to_string(),
                pop_total: pop,
                area: 1.5,
                votes: VoteTally::new(dem, rep),
            });
        }
        graph
            .add_edge(
                &geoid("060750101011"),
                &geoid("060750101012"),
                Adjacency::spatial(42.0),
            )
            .unwrap();
        graph
            .add_edge(
                &geoid("060759804011"),
                &geoid("060750101011"),
                Adjacency::manual(),
            )
            .unwrap();
        graph
    }

    #[test]
    fn test_to_json_shape() {
        let value = sample_graph().to_json().unwrap();
        assert_eq!(value["directed"], false);
        assert_eq!(value["multigraph"], false);
        assert_eq!(value["graph"]["generator"], "censusalign");
        assert_eq!(value["nodes"].as_array().unwrap().len(), 3);
        assert_eq!(value["links"].as_array().unwrap().len(), 2);

        // Nodes sorted by GEOID.
        assert_eq!(value["nodes"][0]["id"], "060750101011");
        assert_eq!(value["nodes"][0]["total_vote"], 10);
        assert_eq!(value["nodes"][0]["pop_total"], 120.0);

        // Links use canonical endpoint order.
        assert_eq!(value["links"][1]["source"], "060750101011");
        assert_eq!(value["links"][1]["target"], "060759804011");
        assert_eq!(value["links"][1]["origin"], "manual");
    }

    #[test]
    fn test_json_roundtrip() {
        let original = sample_graph();
        let restored = DualGraph::from_json(original.to_json().unwrap()).unwrap();

        assert_eq!(restored.node_count(), original.node_count());
        assert_eq!(restored.edge_count(), original.edge_count());

        let node = restored.node(&geoid("060750101011")).unwrap();
        assert_eq!(node.votes, VoteTally::new(6, 4));
        assert_eq!(node.pop_total, 120.0);

        assert!(restored.has_edge(&geoid("060750101011"), &geoid("060750101012")));
        assert!(restored.has_edge(&geoid("060750101011"), &geoid("060759804011")));
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.json");

        let original = sample_graph();
        original.write_json_file(&path).unwrap();
        let restored = DualGraph::read_json_file(&path).unwrap();
        assert_eq!(restored.node_count(), 3);
        assert_eq!(restored.edge_count(), 2);
    }

    #[test]
    fn test_from_json_rejects_directed() {
        let mut value = sample_graph().to_json().unwrap();
        value["directed"] = serde_json::Value::Bool(true);
        let err = DualGraph::from_json(value).unwrap_err();
        assert!(err.to_string().contains("undirected"));
    }

    #[test]
    fn test_from_json_rejects_bad_geoid() {
        let mut value = sample_graph().to_json().unwrap();
        value["nodes"][0]["id"] = serde_json::Value::String("nope".to_string());
        assert!(DualGraph::from_json(value).is_err());
    }
}
