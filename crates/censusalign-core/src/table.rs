//! A minimal in-memory table for delimited source files.
//!
//! Statewide Database publishes some vintages comma-delimited and some
//! tab-delimited, occasionally with ragged trailing cells. `DataTable`
//! sniffs the delimiter from the header line and pads short rows, so the
//! loaders never have to parse the same payload twice.

use std::io::Write;

use crate::error::{Error, Result};

/// An in-memory table of string cells with named columns.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DataTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl DataTable {
    /// Parses delimited bytes, sniffing the delimiter from the header line.
    ///
    /// The header is taken from the first record. A header line containing a
    /// tab and no comma selects tab delimiting; everything else parses as
    /// comma-separated.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        Self::parse_with_delimiter(bytes, sniff_delimiter(bytes))
    }

    /// Parses delimited bytes with an explicit delimiter.
    pub fn parse_with_delimiter(bytes: &[u8], delimiter: u8) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .from_reader(bytes);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let mut row: Vec<String> = record.iter().map(|c| c.to_string()).collect();
            // Ragged rows are padded so column indexing stays valid.
            row.resize(headers.len(), String::new());
            rows.push(row);
        }

        Ok(Self { headers, rows })
    }

    /// Builds a table from headers and rows, for in-process construction.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        let width = headers.len();
        if let Some(bad) = rows.iter().find(|r| r.len() != width) {
            return Err(Error::validation(format!(
                "row width {} does not match header width {width}",
                bad.len()
            )));
        }
        Ok(Self { headers, rows })
    }

    /// Column index for a header name.
    ///
    /// `table` names the dataset for the error message ("vote",
    /// "conversion", "census").
    pub fn column(&self, name: &str, table: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| Error::missing_column(name, table))
    }

    /// The header names, in column order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterates over data rows.
    pub fn rows(&self) -> impl Iterator<Item = &[String]> {
        self.rows.iter().map(|r| r.as_slice())
    }

    /// A single cell, by row index and column index.
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row).and_then(|r| r.get(col)).map(String::as_str)
    }

    /// Writes the table as comma-separated CSV.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut out = csv::Writer::from_writer(writer);
        out.write_record(&self.headers)?;
        for row in &self.rows {
            out.write_record(row)?;
        }
        out.flush()?;
        Ok(())
    }
}

/// Picks the field delimiter from the first line of the payload.
fn sniff_delimiter(bytes: &[u8]) -> u8 {
    let header_end = bytes
        .iter()
        .position(|&b| b == b'\n')
        .unwrap_or(bytes.len());
    let header = &bytes[..header_end];
    if header.contains(&b'\t') && !header.contains(&b',') {
        b'\t'
    } else {
        b','
    }
}
