//! Record Loader: structural CSV parsing with no schema checks.

use crate::error::{InsightsError, Result};
use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use tracing::{debug, info};

/// Cell spellings read as MISSING, matching what common CSV exports write
/// for an absent value.
pub const NA_TOKENS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn is_na(cell: &str) -> bool {
    NA_TOKENS.contains(&cell.trim())
}

/// One untyped source row.
pub type RawRecord = StringRecord;

/// Every source row in source order, with the header row kept so later
/// stages can address cells by column name.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: StringRecord,
    pub records: Vec<RawRecord>,
}

impl RawTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name)
    }

    /// Cells of one column, or `None` when the column is absent. Empty cells,
    /// [`NA_TOKENS`] and cells past the end of a short row come back as `None`.
    pub fn column<'a>(
        &'a self,
        name: &str,
    ) -> Option<impl Iterator<Item = Option<&'a str>> + 'a> {
        let idx = self.column_index(name)?;
        Some(
            self.records
                .iter()
                .map(move |r| r.get(idx).filter(|cell| !is_na(cell))),
        )
    }
}

pub fn load_raw(path: &Path) -> Result<RawTable> {
    info!(path = %path.display(), "reading movie data");
    let file = File::open(path).map_err(|source| InsightsError::LoadIo {
        path: path.to_path_buf(),
        source,
    })?;
    let table = read_raw(file).map_err(|source| InsightsError::Load {
        path: path.to_path_buf(),
        source,
    })?;
    info!(rows = table.len(), columns = table.headers.len(), "loaded raw table");
    Ok(table)
}

/// Parse CSV from any reader.
///
/// Short rows are kept; their trailing cells read as MISSING. A row with more
/// fields than the header row is a structural error.
pub fn read_raw<R: Read>(reader: R) -> std::result::Result<RawTable, csv::Error> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers()?.clone();
    debug!(headers = ?headers, "parsed header row");

    let mut records = Vec::new();
    let mut short_rows = 0usize;
    for result in rdr.records() {
        let record = result?;
        if record.len() > headers.len() {
            let line = record.position().map_or(0, |p| p.line());
            return Err(csv::Error::from(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "record on line {line} has {} fields, but the header has {}",
                    record.len(),
                    headers.len()
                ),
            )));
        }
        if record.len() < headers.len() {
            short_rows += 1;
        }
        records.push(record);
    }
    if short_rows > 0 {
        debug!(short_rows, "rows shorter than the header; missing cells read as MISSING");
    }
    Ok(RawTable { headers, records })
}
