//! The dataset loader.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use censusalign_core::{DataTable, Error, Result};
use censusalign_geo::{read_shapefile, ShapeRecord};
use tracing::info;

use crate::archive::{extract_all, extract_table_member, find_shp};
use crate::catalog::Catalog;
use crate::transport::{HttpTransport, Transport};

/// Fetches and parses the datasets a catalog describes.
///
/// Tabular payloads (vote, conversion, census) may arrive as plain CSV/TXT
/// or as a ZIP holding one; both are handled transparently. The shapefile
/// must be a ZIP of the usual ESRI sidecar files.
#[derive(Clone)]
pub struct Harvest {
    catalog: Catalog,
    transport: Arc<dyn Transport>,
}

impl Harvest {
    /// Creates a loader for a bundled vintage, over HTTP.
    pub fn new(year: u16) -> Result<Self> {
        Ok(Self::with_transport(
            Catalog::for_year(year)?,
            Arc::new(HttpTransport::new()),
        ))
    }

    /// Creates a loader with an explicit catalog and transport.
    pub fn with_transport(catalog: Catalog, transport: Arc<dyn Transport>) -> Self {
        Self { catalog, transport }
    }

    /// The catalog this loader reads from.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Loads the precinct statement-of-vote table.
    pub async fn load_vote(&self) -> Result<DataTable> {
        self.load_table(&self.catalog.vote_url, "vote").await
    }

    /// Loads the precinct-to-block conversion table.
    pub async fn load_conversion(&self) -> Result<DataTable> {
        self.load_table(&self.catalog.conversion_url, "conversion").await
    }

    /// Loads the block-level CVAP table.
    pub async fn load_census(&self) -> Result<DataTable> {
        self.load_table(&self.catalog.census_url, "census").await
    }

    /// Loads and decodes the block-group shapefile.
    pub async fn load_shapefile(&self) -> Result<Vec<ShapeRecord>> {
        let payload = self.transport.fetch(&self.catalog.shapefile_url).await?;
        if !payload.is_zip() {
            return Err(Error::archive(
                "expected a zip archive containing shapefile components",
            ));
        }
        let records = Self::shapes_from_archive_bytes(&payload.bytes)?;
        info!(features = records.len(), "loaded shapefile");
        Ok(records)
    }

    /// Downloads all four datasets and persists them under `out_dir`.
    ///
    /// Tables are written as normalized CSV; the shapefile archive is kept
    /// verbatim. The directory is created if needed, and the layout matches
    /// what [`Harvest::vote_path`] and friends expect, so a later offline
    /// run can pick the files straight up.
    pub async fn fetch_and_store(&self, out_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(out_dir)?;
        let year = self.catalog.year;

        let vote = self.load_vote().await?;
        write_table(&vote, &Self::vote_path(out_dir, year))?;

        let conversion = self.load_conversion().await?;
        write_table(&conversion, &Self::conversion_path(out_dir, year))?;

        let census = self.load_census().await?;
        write_table(&census, &Self::census_path(out_dir, year))?;

        let shapefile = self.transport.fetch(&self.catalog.shapefile_url).await?;
        if !shapefile.is_zip() {
            return Err(Error::archive(
                "expected a zip archive containing shapefile components",
            ));
        }
        std::fs::write(Self::shapefile_path(out_dir, year), &shapefile.bytes)?;

        info!(dir = %out_dir.display(), year, "stored all datasets");
        Ok(())
    }

    /// Parses a stored table from disk.
    pub fn table_from_path(path: &Path) -> Result<DataTable> {
        DataTable::parse(&std::fs::read(path)?)
    }

    /// Decodes shapes from a stored shapefile archive.
    pub fn shapes_from_archive_path(path: &Path) -> Result<Vec<ShapeRecord>> {
        Self::shapes_from_archive_bytes(&std::fs::read(path)?)
    }

    /// Where `fetch_and_store` puts the vote table.
    pub fn vote_path(dir: &Path, year: u16) -> PathBuf {
        dir.join(format!("vote_data_{year}.csv"))
    }

    /// Where `fetch_and_store` puts the conversion table.
    pub fn conversion_path(dir: &Path, year: u16) -> PathBuf {
        dir.join(format!("conversion_data_{year}.csv"))
    }

    /// Where `fetch_and_store` puts the census table.
    pub fn census_path(dir: &Path, year: u16) -> PathBuf {
        dir.join(format!("census_data_{year}.csv"))
    }

    /// Where `fetch_and_store` puts the shapefile archive.
    pub fn shapefile_path(dir: &Path, year: u16) -> PathBuf {
        dir.join(format!("shapefile_data_{year}.zip"))
    }

    async fn load_table(&self, url: &str, what: &str) -> Result<DataTable> {
        let payload = self.transport.fetch(url).await?;
        let bytes = if payload.is_zip() {
            extract_table_member(&payload.bytes)?
        } else {
            payload.bytes
        };
        let table = DataTable::parse(&bytes)?;
        info!(dataset = what, rows = table.len(), "loaded table");
        Ok(table)
    }

    fn shapes_from_archive_bytes(bytes: &[u8]) -> Result<Vec<ShapeRecord>> {
        let dir = tempfile::tempdir()?;
        let extracted = extract_all(bytes, dir.path())?;
        let shp = find_shp(&extracted)?;
        read_shapefile(shp)
    }
}

/// Writes a table as CSV, creating the file.
fn write_table(table: &DataTable, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)?;
    table.write_csv(file)
}
