//! CSV transaction loader.
//!
//! Reads a ledger export into a validated `core_types::Table`. Expected columns
//! (any order, extra columns ignored):
//!   transaction_id, transaction_date, total_spent, quantity,
//!   category, item, payment_method, location

pub mod error;

pub use error::IngestError;

use core_types::{RawTransaction, Table};
use std::io::Read;
use std::path::Path;

/// Load a transaction table from any CSV reader.
///
/// Stops at the first unreadable or malformed row; nothing is skipped.
pub fn load_transactions<R: Read>(reader: R) -> Result<Table, IngestError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (index, result) in csv_reader.deserialize::<RawTransaction>().enumerate() {
        let row = result.map_err(|source| IngestError::Csv {
            row: index + 1,
            source,
        })?;
        rows.push(row);
    }

    let table = Table::from_raw(rows)?;
    tracing::info!(rows = table.len(), "Loaded transactions.");
    Ok(table)
}

/// Load a transaction table from a CSV file path.
pub fn load_transactions_file(path: impl AsRef<Path>) -> Result<Table, IngestError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "Reading transaction export.");
    load_transactions(file)
}
