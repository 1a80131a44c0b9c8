//! ESRI shapefile decoding.

use std::path::Path;

use censusalign_core::{Error, GeoId, Level, Result};
use geo_types::MultiPolygon;
use shapefile::dbase::{FieldValue, Record};
use tracing::warn;

/// One block-group feature from a TIGER shapefile.
#[derive(Clone, Debug)]
pub struct ShapeRecord {
    /// Block-group GEOID (`GEOID20`).
    pub geoid: GeoId,
    /// State + county FIPS (`STATEFP20` + `COUNTYFP20`).
    pub fips: String,
    /// Feature geometry in geographic coordinates (NAD83 degrees).
    pub geometry: MultiPolygon<f64>,
}

/// Reads block-group features from a `.shp` file (with its `.dbf` sidecar).
///
/// Every feature must carry `GEOID20`, `STATEFP20`, and `COUNTYFP20`
/// attributes; non-polygon shapes are rejected.
pub fn read_shapefile(path: &Path) -> Result<Vec<ShapeRecord>> {
    let mut reader = shapefile::Reader::from_path(path)
        .map_err(|e| Error::shapefile(format!("failed to open {}: {e}", path.display())))?;

    let mut records = Vec::new();
    for pair in reader.iter_shapes_and_records() {
        let (shape, record) =
            pair.map_err(|e| Error::shapefile(format!("failed to read feature: {e}")))?;

        let geoid_raw = character_field(&record, "GEOID20")?;
        let statefp = character_field(&record, "STATEFP20")?;
        let countyfp = character_field(&record, "COUNTYFP20")?;

        let geoid = match GeoId::from_prefix(&geoid_raw, Level::BlockGroup) {
            Ok(geoid) => geoid,
            Err(e) => {
                warn!(geoid = %geoid_raw, error = %e, "skipping feature with invalid GEOID20");
                continue;
            }
        };

        let geometry = match shape {
            shapefile::Shape::Polygon(polygon) => MultiPolygon::<f64>::try_from(polygon)
                .map_err(|e| Error::shapefile(format!("feature {geoid_raw}: {e:?}")))?,
            _ => {
                return Err(Error::shapefile(format!(
                    "non-polygon shape in feature {geoid_raw}"
                )));
            }
        };

        records.push(ShapeRecord {
            geoid,
            fips: format!("{statefp}{countyfp}"),
            geometry,
        });
    }

    Ok(records)
}

/// Extracts a required character attribute from a DBF record.
fn character_field(record: &Record, name: &str) -> Result<String> {
    match record.get(name) {
        Some(FieldValue::Character(Some(value))) => Ok(value.trim().to_string()),
        Some(FieldValue::Character(None)) => {
            Err(Error::shapefile(format!("attribute {name} is empty")))
        }
        Some(other) => Err(Error::shapefile(format!(
            "attribute {name} has unexpected type: {other:?}"
        ))),
        None => Err(Error::shapefile(format!("attribute {name} is missing"))),
    }
}
