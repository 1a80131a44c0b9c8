//! The precinct-to-census rollup.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use censusalign_core::{DataTable, GeoId, Level, Result, TallyRow, VoteTally};
use tracing::{debug, warn};

use crate::hamilton::hamilton_floor;

/// The precinct key column shared by the vote and conversion tables.
const PRECINCT_COLUMN: &str = "SRPREC_KEY";
/// The block key column in the conversion table.
const BLOCK_COLUMN: &str = "BLOCK_KEY";
/// Registered voters of the precinct living in the block.
const BLOCK_REG_COLUMN: &str = "BLKREG";
/// Total registered voters in the precinct.
const PRECINCT_REG_COLUMN: &str = "SRTOTREG";

/// A conversion-table row binding a precinct to a census block.
#[derive(Clone, Debug)]
struct ConversionRow {
    precinct: String,
    block: GeoId,
    block_reg: f64,
    precinct_reg: f64,
}

/// Disaggregates precinct election results onto census geography.
///
/// Construction parses and filters the two source tables once; [`rollup`]
/// can then be called for any aggregation level.
///
/// [`rollup`]: Blockify::rollup
#[derive(Clone, Debug)]
pub struct Blockify {
    tallies: HashMap<String, VoteTally>,
    conversion: Vec<ConversionRow>,
}

impl Blockify {
    /// Builds from parsed vote and conversion tables.
    ///
    /// `dem_column` / `rep_column` name the contest's candidate columns in
    /// the vote table (the data-source catalog supplies them per contest).
    /// Rows with missing keys or unparseable counts are skipped with a
    /// warning rather than failing the whole run.
    pub fn from_tables(
        vote: &DataTable,
        conversion: &DataTable,
        dem_column: &str,
        rep_column: &str,
    ) -> Result<Self> {
        let tallies = parse_vote_table(vote, dem_column, rep_column)?;
        let conversion = parse_conversion_table(conversion)?;
        Ok(Self { tallies, conversion })
    }

    /// Builds from CSV/TXT files on disk.
    pub fn from_files(
        election_path: &Path,
        conversion_path: &Path,
        dem_column: &str,
        rep_column: &str,
    ) -> Result<Self> {
        let vote = DataTable::parse(&std::fs::read(election_path)?)?;
        let conversion = DataTable::parse(&std::fs::read(conversion_path)?)?;
        Self::from_tables(&vote, &conversion, dem_column, rep_column)
    }

    /// Aggregates precinct-level election data to the given census level.
    ///
    /// Votes are apportioned to blocks proportionally to registration, with
    /// Hamilton rounding applied within each precinct so precinct totals are
    /// preserved. Water block groups are removed before aggregation. Output
    /// rows are sorted by GEOID.
    pub fn rollup(&self, level: Level) -> Result<Vec<TallyRow>> {
        // Group surviving conversion rows by precinct so rounding can run
        // per precinct.
        let mut groups: BTreeMap<&str, Vec<&ConversionRow>> = BTreeMap::new();
        for row in &self.conversion {
            if row.precinct_reg <= 0.0 {
                continue;
            }
            if !self.tallies.contains_key(&row.precinct) {
                continue;
            }
            groups.entry(&row.precinct).or_default().push(row);
        }

        let mut block_votes: BTreeMap<GeoId, VoteTally> = BTreeMap::new();
        for (precinct, rows) in &groups {
            let tally = self.tallies[*precinct];

            let dem_raw: Vec<f64> = rows
                .iter()
                .map(|r| tally.dem as f64 * r.block_reg / r.precinct_reg)
                .collect();
            let rep_raw: Vec<f64> = rows
                .iter()
                .map(|r| tally.rep as f64 * r.block_reg / r.precinct_reg)
                .collect();

            let dem_alloc = hamilton_floor(&dem_raw);
            let rep_alloc = hamilton_floor(&rep_raw);

            for (i, row) in rows.iter().enumerate() {
                *block_votes.entry(row.block.clone()).or_default() +=
                    VoteTally::new(dem_alloc[i], rep_alloc[i]);
            }
        }

        // Water block groups hold no population; drop them before rollup.
        let land_blocks = block_votes
            .into_iter()
            .filter(|(block, _)| !block.is_water_block_group());

        let mut aggregated: BTreeMap<GeoId, VoteTally> = BTreeMap::new();
        for (block, votes) in land_blocks {
            *aggregated.entry(block.truncate(level)?).or_default() += votes;
        }

        debug!(level = %level, rows = aggregated.len(), "rolled up votes");
        Ok(aggregated
            .into_iter()
            .map(|(geoid, votes)| TallyRow::new(geoid, votes))
            .collect())
    }
}

/// Parses the vote table into per-precinct tallies.
fn parse_vote_table(
    vote: &DataTable,
    dem_column: &str,
    rep_column: &str,
) -> Result<HashMap<String, VoteTally>> {
    let key_col = vote.column(PRECINCT_COLUMN, "vote")?;
    let dem_col = vote.column(dem_column, "vote")?;
    let rep_col = vote.column(rep_column, "vote")?;

    let mut tallies = HashMap::new();
    for row in vote.rows() {
        let key = row[key_col].trim();
        if key.is_empty() {
            continue;
        }
        let (Ok(dem), Ok(rep)) = (
            row[dem_col].trim().parse::<u64>(),
            row[rep_col].trim().parse::<u64>(),
        ) else {
            warn!(precinct = key, "skipping vote row with unparseable counts");
            continue;
        };
        if tallies
            .insert(key.to_string(), VoteTally::new(dem, rep))
            .is_some()
        {
            warn!(precinct = key, "duplicate precinct in vote data; keeping last");
        }
    }
    Ok(tallies)
}

/// Parses the conversion table, dropping rows with missing keys or
/// registration data.
fn parse_conversion_table(conversion: &DataTable) -> Result<Vec<ConversionRow>> {
    let key_col = conversion.column(PRECINCT_COLUMN, "conversion")?;
    let block_col = conversion.column(BLOCK_COLUMN, "conversion")?;
    let block_reg_col = conversion.column(BLOCK_REG_COLUMN, "conversion")?;
    let precinct_reg_col = conversion.column(PRECINCT_REG_COLUMN, "conversion")?;

    let mut rows = Vec::new();
    for row in conversion.rows() {
        let precinct = row[key_col].trim();
        let block_raw = row[block_col].trim();
        if precinct.is_empty() || block_raw.is_empty() {
            continue;
        }
        let block = match GeoId::block(block_raw) {
            Ok(block) => block,
            Err(e) => {
                warn!(key = block_raw, error = %e, "skipping conversion row with invalid block key");
                continue;
            }
        };
        let (Ok(block_reg), Ok(precinct_reg)) = (
            row[block_reg_col].trim().parse::<f64>(),
            row[precinct_reg_col].trim().parse::<f64>(),
        ) else {
            continue;
        };
        if !block_reg.is_finite() || !precinct_reg.is_finite() {
            continue;
        }
        rows.push(ConversionRow {
            precinct: precinct.to_string(),
            block,
            block_reg,
            precinct_reg,
        });
    }
    Ok(rows)
}
