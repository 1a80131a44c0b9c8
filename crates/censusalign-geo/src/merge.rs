//! Population/geometry merge.
//!
//! Joins block-level CVAP counts (rolled up to block groups) onto cleaned
//! block-group shapes, projects everything into EPSG:3310, and yields the
//! [`GeoTable`] the graph builder consumes. Join semantics follow the
//! upstream data: the join is inner, so block groups without population
//! records (and later, without vote tallies) drop out of the table.

use std::collections::HashMap;

use censusalign_core::{DataTable, GeoId, Level, Result, TallyRow, VoteTally};
use geo::Area;
use geo_types::MultiPolygon;
use tracing::{debug, warn};

use crate::albers::CaliforniaAlbers;
use crate::clean::clean_multipolygon;
use crate::shapes::ShapeRecord;

/// The census block-key column in CVAP exports.
const BLOCK_COLUMN: &str = "BLOCK20";

/// One geographic unit with everything the dual graph needs.
#[derive(Clone, Debug)]
pub struct GeoUnit {
    /// Block-group GEOID.
    pub geoid: GeoId,
    /// State + county FIPS.
    pub fips: String,
    /// Citizen voting-age population aggregated from blocks.
    pub pop_total: f64,
    /// Geometry in EPSG:3310 meters.
    pub geometry: MultiPolygon<f64>,
    /// Area in square meters, measured after projection.
    pub area: f64,
    /// Vote tally, present once [`GeoTable::join_votes`] has run.
    pub votes: Option<VoteTally>,
}

/// Geometry-backed block-group table, sorted by GEOID.
#[derive(Clone, Debug, Default)]
pub struct GeoTable {
    units: Vec<GeoUnit>,
    index: HashMap<GeoId, usize>,
}

impl GeoTable {
    /// Builds a table from units, sorting by GEOID and dropping duplicates.
    pub fn new(mut units: Vec<GeoUnit>) -> Self {
        units.sort_by(|a, b| a.geoid.cmp(&b.geoid));

        let mut deduped: Vec<GeoUnit> = Vec::with_capacity(units.len());
        for unit in units {
            if deduped.last().map(|u| &u.geoid) == Some(&unit.geoid) {
                warn!(geoid = %unit.geoid, "dropping duplicate block group");
                continue;
            }
            deduped.push(unit);
        }

        let index = deduped
            .iter()
            .enumerate()
            .map(|(i, u)| (u.geoid.clone(), i))
            .collect();

        Self {
            units: deduped,
            index,
        }
    }

    /// The units, in GEOID order.
    pub fn units(&self) -> &[GeoUnit] {
        &self.units
    }

    /// Number of units.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Index of a unit by GEOID.
    pub fn position(&self, geoid: &GeoId) -> Option<usize> {
        self.index.get(geoid).copied()
    }

    /// Inner-joins vote tallies onto the table.
    ///
    /// Units with no tally are dropped, mirroring the upstream inner merge;
    /// tallies with no matching unit are ignored (typically offshore or
    /// unpopulated block groups the shapefile join already removed).
    pub fn join_votes(self, rows: &[TallyRow]) -> GeoTable {
        let tallies: HashMap<&GeoId, VoteTally> =
            rows.iter().map(|r| (&r.geoid, r.votes)).collect();

        let before = self.units.len();
        let joined: Vec<GeoUnit> = self
            .units
            .into_iter()
            .filter_map(|mut unit| {
                let votes = tallies.get(&unit.geoid)?;
                unit.votes = Some(*votes);
                Some(unit)
            })
            .collect();

        debug!(
            kept = joined.len(),
            dropped = before - joined.len(),
            "joined vote tallies onto geometry table"
        );
        GeoTable::new(joined)
    }
}

/// Merges block-level population counts with block-group shapes.
///
/// `population_column` names the CVAP count column for the vintage
/// (e.g. `CIT_22`). Returns the projected, sorted [`GeoTable`] with votes
/// unset.
pub fn merge_population_and_geometry(
    shapes: Vec<ShapeRecord>,
    census: &DataTable,
    population_column: &str,
) -> Result<GeoTable> {
    let block_col = census.column(BLOCK_COLUMN, "census")?;
    let pop_col = census.column(population_column, "census")?;

    // Aggregate block CVAP counts to block groups.
    let mut population: HashMap<GeoId, f64> = HashMap::new();
    for row in census.rows() {
        let raw_key = &row[block_col];
        if raw_key.is_empty() {
            continue;
        }
        let block = match GeoId::block(raw_key) {
            Ok(block) => block,
            Err(e) => {
                warn!(key = %raw_key, error = %e, "skipping census row with invalid block key");
                continue;
            }
        };
        let block_group = block.truncate(Level::BlockGroup)?;

        // Unparseable counts contribute nothing, like a NaN in a sum.
        let count = row[pop_col].trim().parse::<f64>().unwrap_or(0.0);
        *population.entry(block_group).or_insert(0.0) += count;
    }

    let albers = CaliforniaAlbers::new();
    let mut units = Vec::new();
    for shape in shapes {
        let Some(pop_total) = population.get(&shape.geoid).copied() else {
            continue;
        };
        let Some(cleaned) = clean_multipolygon(&shape.geometry) else {
            warn!(geoid = %shape.geoid, "dropping block group with no valid rings");
            continue;
        };

        let projected = albers.project_multipolygon(&cleaned);
        let area = projected.unsigned_area();
        units.push(GeoUnit {
            geoid: shape.geoid,
            fips: shape.fips,
            pop_total,
            geometry: projected,
            area,
            votes: None,
        });
    }

    Ok(GeoTable::new(units))
}
