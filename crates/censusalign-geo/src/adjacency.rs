//! Contiguity detection between geographic units.
//!
//! Candidate pairs come from an R-tree over bounding boxes; exact predicates
//! then decide adjacency. Rook contiguity requires a shared boundary of
//! positive length and is the default for dual-graph construction. Queen
//! contiguity also admits point touches (corner neighbors).
//!
//! Shared perimeter is measured by accumulating collinear overlap between
//! boundary segments of the two units, which is exact for the
//! shared-vertex boundaries census geographies have.

use std::fmt;
use std::str::FromStr;

use censusalign_core::Error;
use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::{BoundingRect, Intersects};
use geo_types::{Line, MultiPolygon};
use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{RTree, AABB};

use crate::merge::GeoTable;

/// Shared boundaries shorter than this (meters) are treated as point touches.
const MIN_SHARED_PERIM: f64 = 1e-6;

/// Contiguity rule for spatial adjacency.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Contiguity {
    /// Units must share a boundary of positive length.
    #[default]
    Rook,
    /// Any touching geometry counts, including single points.
    Queen,
}

impl Contiguity {
    /// Returns the rule name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Contiguity::Rook => "rook",
            Contiguity::Queen => "queen",
        }
    }
}

impl fmt::Display for Contiguity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Contiguity {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rook" => Ok(Contiguity::Rook),
            "queen" => Ok(Contiguity::Queen),
            other => Err(Error::validation_field(
                "contiguity",
                format!("invalid contiguity {other:?}; choose 'rook' or 'queen'"),
            )),
        }
    }
}

/// An adjacency between two table positions, with `i < j`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AdjacencyPair {
    /// Position of the first unit in the table.
    pub i: usize,
    /// Position of the second unit.
    pub j: usize,
    /// Shared boundary length in meters (0 for queen point touches).
    pub shared_perim: f64,
}

/// Finds all adjacent unit pairs in a table under the given contiguity rule.
pub fn find_adjacencies(table: &GeoTable, contiguity: Contiguity) -> Vec<AdjacencyPair> {
    let mut entries = Vec::with_capacity(table.len());
    for (idx, unit) in table.units().iter().enumerate() {
        if let Some(rect) = unit.geometry.bounding_rect() {
            entries.push(GeomWithData::new(
                Rectangle::from_corners(
                    [rect.min().x, rect.min().y],
                    [rect.max().x, rect.max().y],
                ),
                idx,
            ));
        }
    }
    let tree = RTree::bulk_load(entries);

    let mut pairs = Vec::new();
    for (i, unit) in table.units().iter().enumerate() {
        let Some(rect) = unit.geometry.bounding_rect() else {
            continue;
        };
        let envelope = AABB::from_corners(
            [rect.min().x, rect.min().y],
            [rect.max().x, rect.max().y],
        );

        for candidate in tree.locate_in_envelope_intersecting(&envelope) {
            let j = candidate.data;
            if j <= i {
                continue;
            }
            let other = &table.units()[j];
            if !unit.geometry.intersects(&other.geometry) {
                continue;
            }

            let shared_perim = shared_perimeter(&unit.geometry, &other.geometry);
            match contiguity {
                Contiguity::Rook => {
                    if shared_perim > MIN_SHARED_PERIM {
                        pairs.push(AdjacencyPair { i, j, shared_perim });
                    }
                }
                Contiguity::Queen => {
                    pairs.push(AdjacencyPair { i, j, shared_perim });
                }
            }
        }
    }

    pairs
}

/// Total collinear overlap between the boundaries of two multipolygons.
pub fn shared_perimeter(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> f64 {
    let segments_b: Vec<Line<f64>> = boundary_segments(b).collect();

    let mut total = 0.0;
    for seg_a in boundary_segments(a) {
        for seg_b in &segments_b {
            if !segment_envelopes_overlap(&seg_a, seg_b) {
                continue;
            }
            if let Some(LineIntersection::Collinear { intersection }) =
                line_intersection(seg_a, *seg_b)
            {
                total += segment_length(&intersection);
            }
        }
    }
    total
}

/// Iterates every boundary segment (exterior and interior rings).
fn boundary_segments(geometry: &MultiPolygon<f64>) -> impl Iterator<Item = Line<f64>> + '_ {
    geometry.0.iter().flat_map(|polygon| {
        polygon
            .exterior()
            .lines()
            .chain(polygon.interiors().iter().flat_map(|ring| ring.lines()))
    })
}

fn segment_length(line: &Line<f64>) -> f64 {
    let dx = line.end.x - line.start.x;
    let dy = line.end.y - line.start.y;
    (dx * dx + dy * dy).sqrt()
}

fn segment_envelopes_overlap(a: &Line<f64>, b: &Line<f64>) -> bool {
    let (ax0, ax1) = minmax(a.start.x, a.end.x);
    let (ay0, ay1) = minmax(a.start.y, a.end.y);
    let (bx0, bx1) = minmax(b.start.x, b.end.x);
    let (by0, by1) = minmax(b.start.y, b.end.y);
    ax0 <= bx1 && bx0 <= ax1 && ay0 <= by1 && by0 <= ay1
}

fn minmax(a: f64, b: f64) -> (f64, f64) {
    if a <= b { (a, b) } else { (b, a) }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::merge::{GeoTable, GeoUnit};
    use censusalign_core::{GeoId, Level};
    use geo_types::polygon;

    fn square(x0: f64, y0: f64, size: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![polygon![
            (x: x0, y: y0),
            (x: x0 + size, y: y0),
            (x: x0 + size, y: y0 + size),
            (x: x0, y: y0 + size),
        ]])
    }

    fn unit(geoid: &str, geometry: MultiPolygon<f64>) -> GeoUnit {
        GeoUnit {
            geoid: GeoId::from_prefix(geoid, Level::BlockGroup).unwrap(),
            fips: geoid[..5].to_string(),
            pop_total: 0.0,
            area: 1.0,
            geometry,
            votes: None,
        }
    }

    /// 2x2 grid of unit squares:
    ///
    /// ```text
    ///   c d
    ///   a b
    /// ```
    fn grid() -> GeoTable {
        GeoTable::new(vec![
            unit("060750101011", square(0.0, 0.0, 1.0)), // a
            unit("060750101012", square(1.0, 0.0, 1.0)), // b
            unit("060750101013", square(0.0, 1.0, 1.0)), // c
            unit("060750101014", square(1.0, 1.0, 1.0)), // d
        ])
    }

    fn pair_set(pairs: &[AdjacencyPair]) -> Vec<(usize, usize)> {
        let mut set: Vec<(usize, usize)> = pairs.iter().map(|p| (p.i, p.j)).collect();
        set.sort_unstable();
        set
    }

    // ------------------------------------------------------------------------
    // Contiguity rule tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_rook_grid_adjacency() {
        let pairs = find_adjacencies(&grid(), Contiguity::Rook);
        // Rook: edge neighbors only, no diagonals.
        assert_eq!(pair_set(&pairs), [(0, 1), (0, 2), (1, 3), (2, 3)]);
        for pair in &pairs {
            assert!((pair.shared_perim - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_queen_grid_adjacency_includes_diagonals() {
        let pairs = find_adjacencies(&grid(), Contiguity::Queen);
        assert_eq!(
            pair_set(&pairs),
            [(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]
        );
        // Diagonal pairs share no perimeter.
        let diagonal = pairs.iter().find(|p| (p.i, p.j) == (0, 3)).unwrap();
        assert!(diagonal.shared_perim < MIN_SHARED_PERIM);
    }

    #[test]
    fn test_disjoint_units_not_adjacent() {
        let table = GeoTable::new(vec![
            unit("060750101011", square(0.0, 0.0, 1.0)),
            unit("060750101012", square(5.0, 5.0, 1.0)),
        ]);
        assert!(find_adjacencies(&table, Contiguity::Queen).is_empty());
    }

    #[test]
    fn test_partial_edge_overlap() {
        // Second square offset half a side: shared boundary is 0.5.
        let table = GeoTable::new(vec![
            unit("060750101011", square(0.0, 0.0, 1.0)),
            unit("060750101012", square(1.0, 0.5, 1.0)),
        ]);
        let pairs = find_adjacencies(&table, Contiguity::Rook);
        assert_eq!(pairs.len(), 1);
        assert!((pairs[0].shared_perim - 0.5).abs() < 1e-9);
    }

    // ------------------------------------------------------------------------
    // shared_perimeter tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_shared_perimeter_is_symmetric() {
        let a = square(0.0, 0.0, 2.0);
        let b = square(2.0, 1.0, 2.0);
        assert!((shared_perimeter(&a, &b) - shared_perimeter(&b, &a)).abs() < 1e-12);
        assert!((shared_perimeter(&a, &b) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_shared_perimeter_split_segments() {
        // One long edge against two half-edges: overlap still sums to 1.0.
        let left = square(0.0, 0.0, 1.0);
        let right = MultiPolygon(vec![
            polygon![
                (x: 1.0, y: 0.0),
                (x: 2.0, y: 0.0),
                (x: 2.0, y: 0.5),
                (x: 1.0, y: 0.5),
            ],
            polygon![
                (x: 1.0, y: 0.5),
                (x: 2.0, y: 0.5),
                (x: 2.0, y: 1.0),
                (x: 1.0, y: 1.0),
            ],
        ]);
        assert!((shared_perimeter(&left, &right) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_contiguity_parse() {
        assert_eq!("rook".parse::<Contiguity>().unwrap(), Contiguity::Rook);
        assert_eq!("Queen".parse::<Contiguity>().unwrap(), Contiguity::Queen);
        assert!("bishop".parse::<Contiguity>().is_err());
    }
}
