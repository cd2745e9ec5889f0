//! Statement layout handling
//!
//! Bank exports put a block of free-form account details ("Account Number:",
//! "Start Date:", ...) above the ledger. The ledger starts at the row whose
//! first cell is exactly `Txn Date`; everything after it is either a
//! transaction row or trailing noise (summary lines, blank rows).

use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{MetadataBlock, RawRow, TransactionRecord, TRANSACTION_COLUMNS};

/// First cell of the ledger header row
pub const HEADER_TOKEN: &str = "Txn Date";

/// A statement split into its account details and ledger
#[derive(Debug, Clone, Serialize)]
pub struct ParsedStatement {
    pub metadata: MetadataBlock,
    /// Index of the header row in the input
    pub header_index: usize,
    pub transactions: Vec<TransactionRecord>,
}

/// Find the index of the ledger header row.
///
/// Returns `Error::TableNotFound` when no row starts with the header token.
pub fn locate_table(rows: &[RawRow]) -> Result<usize> {
    rows.iter()
        .position(|row| row.first().is_some_and(|cell| cell == HEADER_TOKEN))
        .ok_or(Error::TableNotFound)
}

/// Collect "Key: Value" rows that precede the header.
///
/// The key is the text before the first colon of the first cell. The value is
/// the second cell when it has content, otherwise whatever follows the colon
/// in the first cell. Rows without a colon in their first cell are skipped.
pub fn extract_metadata(rows: &[RawRow]) -> MetadataBlock {
    let mut metadata = MetadataBlock::new();

    for row in rows {
        let Some(first) = row.first() else {
            continue;
        };
        let Some((key, rest)) = first.split_once(':') else {
            continue;
        };

        let key = key.trim();
        let value = row
            .get(1)
            .map(|cell| cell.trim())
            .filter(|cell| !cell.is_empty())
            .unwrap_or_else(|| rest.trim());

        debug!("Extracted account detail: {} = {}", key, value);
        metadata.insert(key, value);
    }

    metadata
}

/// Convert a raw row into a transaction record.
///
/// Returns `None` for rows with fewer than seven cells; those are not
/// transactions and are passed through by the pipeline.
pub fn normalize_row(row: &[String]) -> Option<TransactionRecord> {
    if row.len() < TRANSACTION_COLUMNS {
        return None;
    }

    let cell = |i: usize| row[i].trim().to_string();
    Some(TransactionRecord {
        txn_date: cell(0),
        value_date: cell(1),
        description: cell(2),
        ref_no: cell(3),
        debit: cell(4),
        credit: cell(5),
        balance: cell(6),
    })
}

/// Split a statement into account details and normalized transactions.
///
/// Ledger rows with an empty first cell or fewer than seven cells are dropped.
pub fn parse_statement(rows: &[RawRow]) -> Result<ParsedStatement> {
    let header_index = locate_table(rows)?;
    let metadata = extract_metadata(&rows[..header_index]);

    let transactions: Vec<TransactionRecord> = rows[header_index + 1..]
        .iter()
        .filter(|row| row.first().is_some_and(|cell| !cell.trim().is_empty()))
        .filter_map(|row| normalize_row(row))
        .collect();

    debug!(
        "Parsed {} transactions ({} account details)",
        transactions.len(),
        metadata.len()
    );

    Ok(ParsedStatement {
        metadata,
        header_index,
        transactions,
    })
}
