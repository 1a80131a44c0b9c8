//! Shared fixtures for pipeline integration tests.
//!
//! A miniature vintage: four block groups in a 2x2 grid, one offshore
//! island, two precincts on the mainland and one on the island.

use censusalign::{Catalog, Cultivate, DataTable, GeoId, Level, ShapeRecord};
use geo_types::{polygon, MultiPolygon};

/// Grid cell size in degrees.
const CELL: f64 = 0.01;

pub const BG1: &str = "060750101011";
pub const BG2: &str = "060750101012";
pub const BG3: &str = "060750101013";
pub const BG4: &str = "060750101014";
pub const ISLAND: &str = "060759804011";

pub fn geoid(s: &str) -> GeoId {
    GeoId::from_prefix(s, Level::BlockGroup).unwrap()
}

pub fn catalog() -> Catalog {
    Catalog::from_yaml(
        r#"
year: 2022
vote_url: "https://example.org/vote.zip"
conversion_url: "https://example.org/conversion.csv"
census_url: "https://example.org/census.csv"
shapefile_url: "https://example.org/shapes.zip"
population_column: CIT_22
elections:
  governor:
    dem_column: GOVDEM01
    rep_column: GOVREP01
manual_edges:
  - from: "060759804011"
    to: "060750101014"
    note: "island ferry"
  - from: "060759999999"
    to: "060750101011"
    note: "refers to a block group outside the fixture"
"#,
    )
    .unwrap()
}

pub fn vote_table() -> DataTable {
    DataTable::parse(
        b"SRPREC_KEY,GOVDEM01,GOVREP01\n\
          P1,10,6\n\
          P2,3,5\n\
          PI,2,0\n",
    )
    .unwrap()
}

pub fn conversion_table() -> DataTable {
    DataTable::parse(
        b"SRPREC_KEY,BLOCK_KEY,BLKREG,SRTOTREG\n\
          P1,60750101011001,30,40\n\
          P1,60750101012001,10,40\n\
          P2,60750101013001,10,20\n\
          P2,60750101014001,10,20\n\
          PI,60759804011001,5,5\n",
    )
    .unwrap()
}

pub fn census_table() -> DataTable {
    DataTable::parse(
        b"BLOCK20,CIT_22\n\
          60750101011001,60\n\
          60750101011002,40\n\
          60750101012001,80\n\
          60750101013001,50\n\
          60750101014001,70\n\
          60759804011001,10\n",
    )
    .unwrap()
}

fn square(x0: f64, y0: f64) -> MultiPolygon<f64> {
    MultiPolygon(vec![polygon![
        (x: x0, y: y0),
        (x: x0 + CELL, y: y0),
        (x: x0 + CELL, y: y0 + CELL),
        (x: x0, y: y0 + CELL),
    ]])
}

pub fn shapes() -> Vec<ShapeRecord> {
    let base_x = -120.0;
    let base_y = 36.0;
    vec![
        shape(BG1, square(base_x, base_y)),
        shape(BG2, square(base_x + CELL, base_y)),
        shape(BG3, square(base_x, base_y + CELL)),
        shape(BG4, square(base_x + CELL, base_y + CELL)),
        shape(ISLAND, square(-119.5, 36.5)),
    ]
}

fn shape(id: &str, geometry: MultiPolygon<f64>) -> ShapeRecord {
    ShapeRecord {
        geoid: geoid(id),
        fips: id[..5].to_string(),
        geometry,
    }
}

pub fn cultivate() -> Cultivate {
    Cultivate::from_tables(
        catalog(),
        "governor",
        vote_table(),
        conversion_table(),
        census_table(),
        shapes(),
    )
    .unwrap()
}
