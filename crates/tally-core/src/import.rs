//! Statement file reading
//!
//! Statement exports are CSV files with ragged rows: a few account-detail lines
//! of one or two cells, then the ledger. Rows are read verbatim with no header
//! handling so the ledger can be located afterwards.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use tracing::debug;

use crate::error::Result;
use crate::models::RawRow;

/// UTF-8 byte order mark some banks prepend to their exports
const BOM: char = '\u{feff}';

/// Read all rows of a statement CSV
///
/// Invalid UTF-8 is replaced rather than rejected (some exports are Latin-1).
pub fn read_rows<R: Read>(reader: R) -> Result<Vec<RawRow>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for result in rdr.byte_records() {
        let record = result?;
        let row: RawRow = record
            .iter()
            .map(|cell| String::from_utf8_lossy(cell).into_owned())
            .collect();
        rows.push(row);
    }

    if let Some(first) = rows.first_mut().and_then(|row| row.first_mut()) {
        if first.starts_with(BOM) {
            *first = first.trim_start_matches(BOM).to_string();
        }
    }

    debug!("Read {} rows", rows.len());
    Ok(rows)
}

/// Read all rows of a statement CSV file
pub fn read_rows_from_path(path: &Path) -> Result<Vec<RawRow>> {
    let file = File::open(path)?;
    read_rows(file)
}
