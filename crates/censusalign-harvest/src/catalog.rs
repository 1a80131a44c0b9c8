//! Data-source catalogs.
//!
//! A catalog describes one census/election vintage: where each dataset
//! lives, which statement-of-vote columns belong to each contest, which
//! CVAP column counts population, and the curated connectivity edges for
//! that geography. The 2022 California catalog ships embedded in the crate;
//! external catalogs load from disk.

use std::collections::BTreeMap;
use std::path::Path;

use censusalign_core::{Error, Result};
use serde::Deserialize;

/// The embedded California 2022 catalog.
const CA_2022: &str = include_str!("../config/ca_2022.yaml");

/// Statement-of-vote column names for one contest.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct ElectionColumns {
    /// Democratic candidate column (e.g. `GOVDEM01`).
    pub dem_column: String,
    /// Republican candidate column (e.g. `GOVREP01`).
    pub rep_column: String,
}

/// A curated connectivity edge between two block groups.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct ManualEdgeSpec {
    /// Block-group GEOID of one endpoint.
    pub from: String,
    /// Block-group GEOID of the other endpoint.
    pub to: String,
    /// Why the edge exists (island, harbor, continuity fix).
    #[serde(default)]
    pub note: Option<String>,
}

/// A data-source catalog for one vintage.
#[derive(Clone, Debug, Deserialize)]
pub struct Catalog {
    /// Election year the catalog describes.
    pub year: u16,
    /// Statement-of-vote download URL (ZIP or plain CSV/TXT).
    pub vote_url: String,
    /// Precinct-to-block correspondence download URL.
    pub conversion_url: String,
    /// Block-level CVAP download URL.
    pub census_url: String,
    /// TIGER block-group shapefile download URL (ZIP).
    pub shapefile_url: String,
    /// CVAP count column for this vintage (e.g. `CIT_22`).
    pub population_column: String,
    /// Contest name to candidate columns.
    pub elections: BTreeMap<String, ElectionColumns>,
    /// Curated connectivity edges for the dual graph.
    #[serde(default)]
    pub manual_edges: Vec<ManualEdgeSpec>,
}

impl Catalog {
    /// Returns the embedded catalog for a supported year.
    ///
    /// Only the 2022 vintage is bundled; other years need an external
    /// catalog via [`Catalog::from_path`].
    pub fn for_year(year: u16) -> Result<Self> {
        match year {
            2022 => Self::from_yaml(CA_2022),
            other => Err(Error::config(format!(
                "no embedded catalog for year {other}; only 2022 is bundled \
                 (pass an external catalog file for other vintages)"
            ))),
        }
    }

    /// Parses a catalog from YAML text.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Loads a catalog from a YAML file.
    pub fn from_path(path: &Path) -> Result<Self> {
        Self::from_yaml(&std::fs::read_to_string(path)?)
    }

    /// Looks up the candidate columns for a contest.
    pub fn election(&self, name: &str) -> Result<&ElectionColumns> {
        self.elections.get(name).ok_or_else(|| {
            let known: Vec<&str> = self.elections.keys().map(String::as_str).collect();
            Error::validation_field(
                "election",
                format!("unknown contest {name:?}; catalog defines: {}", known.join(", ")),
            )
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_catalog_parses() {
        let catalog = Catalog::for_year(2022).unwrap();
        assert_eq!(catalog.year, 2022);
        assert_eq!(catalog.population_column, "CIT_22");
        assert!(catalog.vote_url.ends_with(".zip"));
        assert!(!catalog.manual_edges.is_empty());
    }

    #[test]
    fn test_embedded_catalog_has_governor_contest() {
        let catalog = Catalog::for_year(2022).unwrap();
        let columns = catalog.election("governor").unwrap();
        assert_eq!(columns.dem_column, "GOVDEM01");
        assert_eq!(columns.rep_column, "GOVREP01");
    }

    #[test]
    fn test_unknown_year_is_config_error() {
        let err = Catalog::for_year(2010).unwrap_err();
        assert!(err.to_string().contains("2010"));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_unknown_contest_lists_known_ones() {
        let catalog = Catalog::for_year(2022).unwrap();
        let err = catalog.election("mayor").unwrap_err();
        assert!(err.to_string().contains("mayor"));
        assert!(err.to_string().contains("governor"));
    }

    #[test]
    fn test_manual_edges_are_twelve_digit_geoids() {
        let catalog = Catalog::for_year(2022).unwrap();
        for edge in &catalog.manual_edges {
            assert_eq!(edge.from.len(), 12, "bad edge endpoint {}", edge.from);
            assert_eq!(edge.to.len(), 12, "bad edge endpoint {}", edge.to);
        }
    }

    #[test]
    fn test_external_catalog_roundtrip() {
        let yaml = r#"
year: 2026
vote_url: "https://example.org/vote.zip"
conversion_url: "https://example.org/conversion.csv"
census_url: "https://example.org/census.csv"
shapefile_url: "https://example.org/shapes.zip"
population_column: CIT_26
elections:
  governor:
    dem_column: GOVDEM01
    rep_column: GOVREP01
"#;
        let catalog = Catalog::from_yaml(yaml).unwrap();
        assert_eq!(catalog.year, 2026);
        assert!(catalog.manual_edges.is_empty());
    }
}
