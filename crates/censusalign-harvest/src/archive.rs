//! ZIP archive handling for downloaded payloads.

use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use censusalign_core::{Error, Result};
use tracing::warn;
use zip::ZipArchive;

/// Extracts the first `.csv` or `.txt` member from a ZIP archive.
///
/// Statement-of-vote archives hold a single data file alongside layout
/// documentation; the first table-like member is the data.
pub fn extract_table_member(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut archive = open(bytes)?;

    let names: Vec<String> = archive.file_names().map(String::from).collect();
    let member = names
        .iter()
        .find(|name| {
            let lower = name.to_ascii_lowercase();
            lower.ends_with(".csv") || lower.ends_with(".txt")
        })
        .ok_or_else(|| Error::archive("no CSV or TXT file found in the archive"))?;

    let mut file = archive
        .by_name(member)
        .map_err(|e| Error::archive(format!("failed to open member {member}: {e}")))?;
    let mut buf = Vec::new();
    file.read_to_end(&mut buf)?;
    Ok(buf)
}

/// Extracts every member of a ZIP archive into a directory.
///
/// Returns the extracted paths. Members with unsafe names (absolute paths,
/// `..` traversal) are skipped.
pub fn extract_all(bytes: &[u8], dir: &Path) -> Result<Vec<PathBuf>> {
    let mut archive = open(bytes)?;

    let mut extracted = Vec::new();
    for i in 0..archive.len() {
        let mut file = archive
            .by_index(i)
            .map_err(|e| Error::archive(format!("failed to open member {i}: {e}")))?;
        if file.is_dir() {
            continue;
        }
        let Some(relative) = file.enclosed_name() else {
            warn!(member = file.name(), "skipping archive member with unsafe path");
            continue;
        };

        let out_path = dir.join(relative);
        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut out = std::fs::File::create(&out_path)?;
        std::io::copy(&mut file, &mut out)?;
        extracted.push(out_path);
    }

    Ok(extracted)
}

/// Finds the `.shp` member among extracted paths.
pub fn find_shp(paths: &[PathBuf]) -> Result<&PathBuf> {
    paths
        .iter()
        .find(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("shp"))
        })
        .ok_or_else(|| Error::archive("no .shp file found in the archive"))
}

fn open(bytes: &[u8]) -> Result<ZipArchive<Cursor<&[u8]>>> {
    ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| Error::archive(format!("invalid ZIP archive: {e}")))
}
