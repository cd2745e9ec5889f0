//! Output sinks for annotated statements
//!
//! The pipeline writes rows in input order through a [`RowSink`]. The CSV sink
//! flushes after every row so a crash mid-file leaves everything processed so
//! far on disk.

use std::io::Write;
use std::path::Path;

use csv::WriterBuilder;

use crate::error::Result;
use crate::models::{MetadataBlock, RawRow};

/// Destination for output rows
pub trait RowSink {
    fn write_row(&mut self, row: &[String]) -> Result<()>;
}

impl<S: RowSink + ?Sized> RowSink for &mut S {
    fn write_row(&mut self, row: &[String]) -> Result<()> {
        (**self).write_row(row)
    }
}

/// Writes rows as CSV, one record per row, ragged widths allowed
pub struct CsvRowSink<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvRowSink<W> {
    pub fn new(inner: W) -> Self {
        let writer = WriterBuilder::new().flexible(true).from_writer(inner);
        Self { writer }
    }

    /// Flush and return the underlying writer
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| crate::error::Error::Io(e.into_error()))
    }
}

impl<W: Write> RowSink for CsvRowSink<W> {
    fn write_row(&mut self, row: &[String]) -> Result<()> {
        // The csv writer rejects zero-field records; write a single empty cell
        // so blank rows survive as blank lines.
        if row.is_empty() {
            self.writer.write_record([""])?;
        } else {
            self.writer.write_record(row)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

/// Collects rows in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    pub rows: Vec<RawRow>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RowSink for MemorySink {
    fn write_row(&mut self, row: &[String]) -> Result<()> {
        self.rows.push(row.to_vec());
        Ok(())
    }
}

/// Output file name for an input statement: `processed_<basename>`
pub fn output_file_name(input: &Path) -> String {
    let base = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "statement.csv".to_string());
    format!("processed_{}", base)
}

/// Output file name built from the statement period:
/// `processed_statement_<Start Date>_<End Date>.csv`
///
/// Missing dates become `Unknown`; path separators in dates become `-`.
pub fn statement_file_name(metadata: &MetadataBlock) -> String {
    let part = |key: &str| {
        metadata
            .get(key)
            .filter(|v| !v.is_empty())
            .unwrap_or("Unknown")
            .replace(['/', '\\', ':'], "-")
    };
    format!(
        "processed_statement_{}_{}.csv",
        part("Start Date"),
        part("End Date")
    )
}
