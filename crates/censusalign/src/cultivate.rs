//! The end-to-end pipeline.

use std::path::Path;

use censusalign_blockify::Blockify;
use censusalign_core::{DataTable, Error, Level, Result, TallyRow};
use censusalign_geo::{merge_population_and_geometry, Contiguity, GeoTable, ShapeRecord};
use censusalign_graphify::{BuildStats, DualGraph, Graphify, ManualEdge};
use censusalign_harvest::{Catalog, Harvest};
use tracing::info;

/// Loads a vintage's datasets once and runs the alignment pipeline over
/// them: precinct votes to block groups, population onto geometry, and the
/// combined table into a dual graph.
///
/// The contest is fixed at construction; the catalog maps it to the
/// statement-of-vote columns.
#[derive(Clone, Debug)]
pub struct Cultivate {
    catalog: Catalog,
    election: String,
    vote: DataTable,
    conversion: DataTable,
    census: DataTable,
    shapes: Vec<ShapeRecord>,
}

impl Cultivate {
    /// Downloads everything for a bundled vintage and contest.
    pub async fn new(year: u16, election: &str) -> Result<Self> {
        let harvest = Harvest::new(year)?;
        Self::with_harvest(&harvest, election).await
    }

    /// Downloads everything through an existing loader.
    pub async fn with_harvest(harvest: &Harvest, election: &str) -> Result<Self> {
        let catalog = harvest.catalog().clone();
        catalog.election(election)?;

        info!("loading election data");
        let vote = harvest.load_vote().await?;
        info!("loading conversion data");
        let conversion = harvest.load_conversion().await?;
        info!("loading census data");
        let census = harvest.load_census().await?;
        info!("loading shapefile data");
        let shapes = harvest.load_shapefile().await?;
        info!("all data loaded");

        Ok(Self {
            catalog,
            election: election.to_string(),
            vote,
            conversion,
            census,
            shapes,
        })
    }

    /// Runs offline from a directory written by
    /// [`Harvest::fetch_and_store`].
    pub fn from_local(dir: &Path, year: u16, election: &str) -> Result<Self> {
        let catalog = Catalog::for_year(year)?;
        Self::from_tables(
            catalog,
            election,
            Harvest::table_from_path(&Harvest::vote_path(dir, year))?,
            Harvest::table_from_path(&Harvest::conversion_path(dir, year))?,
            Harvest::table_from_path(&Harvest::census_path(dir, year))?,
            Harvest::shapes_from_archive_path(&Harvest::shapefile_path(dir, year))?,
        )
    }

    /// Builds a pipeline from already-parsed datasets.
    pub fn from_tables(
        catalog: Catalog,
        election: &str,
        vote: DataTable,
        conversion: DataTable,
        census: DataTable,
        shapes: Vec<ShapeRecord>,
    ) -> Result<Self> {
        catalog.election(election)?;
        Ok(Self {
            catalog,
            election: election.to_string(),
            vote,
            conversion,
            census,
            shapes,
        })
    }

    /// The catalog in use.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Aggregates the contest's votes to census geography.
    ///
    /// The dual graph is block-group based, so only
    /// [`Level::BlockGroup`] is accepted here; use [`Blockify`] directly for
    /// other levels.
    pub fn blockify(&self, level: Level) -> Result<Vec<TallyRow>> {
        if level != Level::BlockGroup {
            return Err(Error::validation_field(
                "level",
                "only 'blockgroup' is supported by the pipeline; \
                 use Blockify::rollup for other levels",
            ));
        }
        self.rollup(level)
    }

    /// Merges block-level population onto projected block-group geometry.
    pub fn merge_population_and_geometry(&self) -> Result<GeoTable> {
        merge_population_and_geometry(
            self.shapes.clone(),
            &self.census,
            &self.catalog.population_column,
        )
    }

    /// Runs the full pipeline and returns the dual graph.
    ///
    /// Manual edges come from the catalog; [`Cultivate::graphify_with_edges`]
    /// merges in extra ones.
    pub fn graphify(&self, contiguity: Contiguity) -> Result<(DualGraph, BuildStats)> {
        self.graphify_with_edges(contiguity, Vec::new())
    }

    /// Runs the full pipeline with extra manual edges.
    pub fn graphify_with_edges(
        &self,
        contiguity: Contiguity,
        extra_edges: Vec<ManualEdge>,
    ) -> Result<(DualGraph, BuildStats)> {
        info!("blockifying election data");
        let rollup = self.rollup(Level::BlockGroup)?;

        info!("merging population and geometry data");
        let table = self.merge_population_and_geometry()?;
        let table = table.join_votes(&rollup);

        let catalog_edges = self.catalog.manual_edges.iter().map(|spec| ManualEdge {
            from: spec.from.clone(),
            to: spec.to.clone(),
            note: spec.note.clone(),
        });

        info!(contiguity = %contiguity, "building dual graph");
        Graphify::new()
            .with_contiguity(contiguity)
            .with_manual_edges(catalog_edges)
            .with_manual_edges(extra_edges)
            .build(&table)
    }

    fn rollup(&self, level: Level) -> Result<Vec<TallyRow>> {
        let columns = self.catalog.election(&self.election)?;
        let blockify = Blockify::from_tables(
            &self.vote,
            &self.conversion,
            &columns.dem_column,
            &columns.rep_column,
        )?;
        blockify.rollup(level)
    }
}
