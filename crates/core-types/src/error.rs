use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A ledger row that cannot become a `TransactionRecord`. `row` is 1-based
    /// over data rows (the header is not counted).
    #[error("Malformed record at row {row}: field '{field}' has value '{value}' ({reason})")]
    MalformedRecord {
        row: usize,
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("Invalid date window: start {start} is after end {end}")]
    InvalidWindow { start: NaiveDate, end: NaiveDate },

    #[error("Invalid input for {0}: {1}")]
    InvalidInput(String, String),
}
