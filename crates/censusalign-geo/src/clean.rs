//! Geometry repair for source shapefiles.
//!
//! TIGER block-group polygons occasionally carry degenerate artifacts:
//! collapsed rings, zero-area slivers, inconsistent winding. Downstream
//! measurement assumes well-formed rings, so shapes are repaired on load:
//! degenerate rings are dropped and the survivors re-oriented to the
//! conventional winding.

use geo::algorithm::orient::{Direction, Orient};
use geo::Area;
use geo_types::{LineString, MultiPolygon, Polygon};

/// Rings below this unsigned area are treated as slivers and dropped.
const MIN_RING_AREA: f64 = 1e-12;

/// Repairs a multipolygon, returning `None` when nothing valid remains.
pub fn clean_multipolygon(geometry: &MultiPolygon<f64>) -> Option<MultiPolygon<f64>> {
    let mut polygons = Vec::new();

    for polygon in &geometry.0 {
        if !ring_is_valid(polygon.exterior()) {
            continue;
        }

        let interiors: Vec<LineString<f64>> = polygon
            .interiors()
            .iter()
            .filter(|ring| ring_is_valid(ring))
            .cloned()
            .collect();

        let repaired = Polygon::new(polygon.exterior().clone(), interiors);
        polygons.push(repaired.orient(Direction::Default));
    }

    if polygons.is_empty() {
        None
    } else {
        Some(MultiPolygon(polygons))
    }
}

/// A ring is valid when it has enough coordinates to close and encloses
/// nonzero area.
fn ring_is_valid(ring: &LineString<f64>) -> bool {
    if ring.0.len() < 4 {
        return false;
    }
    let as_polygon = Polygon::new(ring.clone(), Vec::new());
    as_polygon.unsigned_area() > MIN_RING_AREA
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use geo_types::{polygon, Coord};

    fn unit_square() -> Polygon<f64> {
        polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 1.0, y: 1.0),
            (x: 0.0, y: 1.0),
        ]
    }

    #[test]
    fn test_valid_polygon_survives() {
        let mp = MultiPolygon(vec![unit_square()]);
        let cleaned = clean_multipolygon(&mp).unwrap();
        assert_eq!(cleaned.0.len(), 1);
    }

    #[test]
    fn test_degenerate_ring_dropped() {
        let line = LineString::from(vec![
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 1.0, y: 0.0 },
            Coord { x: 0.0, y: 0.0 },
        ]);
        let degenerate = Polygon::new(line, Vec::new());
        let mp = MultiPolygon(vec![degenerate, unit_square()]);
        let cleaned = clean_multipolygon(&mp).unwrap();
        assert_eq!(cleaned.0.len(), 1);
    }

    #[test]
    fn test_zero_area_ring_dropped() {
        // Four coordinates, but all collinear.
        let line = LineString::from(vec![
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 1.0, y: 0.0 },
            Coord { x: 2.0, y: 0.0 },
            Coord { x: 0.0, y: 0.0 },
        ]);
        let flat = Polygon::new(line, Vec::new());
        let mp = MultiPolygon(vec![flat]);
        assert!(clean_multipolygon(&mp).is_none());
    }

    #[test]
    fn test_sliver_interior_dropped() {
        let mut poly = unit_square();
        let sliver = LineString::from(vec![
            Coord { x: 0.2, y: 0.2 },
            Coord { x: 0.4, y: 0.2 },
            Coord { x: 0.2, y: 0.2 },
        ]);
        poly.interiors_push(sliver);
        let cleaned = clean_multipolygon(&MultiPolygon(vec![poly])).unwrap();
        assert!(cleaned.0[0].interiors().is_empty());
    }

    #[test]
    fn test_orientation_normalized() {
        // Clockwise exterior ring gets re-wound counter-clockwise.
        let cw = polygon![
            (x: 0.0, y: 0.0),
            (x: 0.0, y: 1.0),
            (x: 1.0, y: 1.0),
            (x: 1.0, y: 0.0),
        ];
        let cleaned = clean_multipolygon(&MultiPolygon(vec![cw])).unwrap();
        let shell = Polygon::new(cleaned.0[0].exterior().clone(), Vec::new());
        assert!(shell.signed_area() > 0.0);
    }
}
