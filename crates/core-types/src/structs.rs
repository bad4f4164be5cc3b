use crate::error::CoreError;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A ledger row exactly as a loader hands it over: every column still text.
///
/// Converting it into a `TransactionRecord` is the single place where dates,
/// amounts and quantities are validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTransaction {
    pub transaction_id: String,
    pub transaction_date: String,
    pub total_spent: String,
    pub quantity: String,
    pub category: String,
    pub item: String,
    pub payment_method: String,
    pub location: String,
}

/// One validated row of the transaction ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub transaction_id: String,
    /// Calendar date of the sale. Any time-of-day in the source is discarded.
    pub transaction_date: NaiveDate,
    pub total_spent: Decimal,
    pub quantity: u64,
    pub category: String,
    pub item: String,
    pub payment_method: String,
    pub location: String,
}

impl TransactionRecord {
    /// Validates a raw row. `row` is the 1-based data row used in error reports.
    pub fn from_raw(row: usize, raw: RawTransaction) -> Result<Self, CoreError> {
        let transaction_date = parse_transaction_date(&raw.transaction_date).ok_or_else(|| {
            CoreError::MalformedRecord {
                row,
                field: "transaction_date",
                value: raw.transaction_date.clone(),
                reason: "not a recognised date".to_string(),
            }
        })?;
        let total_spent = parse_amount(row, &raw.total_spent)?;
        let quantity = parse_quantity(row, &raw.quantity)?;

        Ok(Self {
            transaction_id: raw.transaction_id,
            transaction_date,
            total_spent,
            quantity,
            category: raw.category,
            item: raw.item,
            payment_method: raw.payment_method,
            location: raw.location,
        })
    }
}

/// An in-memory transaction table. Row order carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    records: Vec<TransactionRecord>,
}

impl Table {
    /// Builds a table from already-typed records, enforcing the non-negative
    /// amount invariant.
    pub fn new(records: Vec<TransactionRecord>) -> Result<Self, CoreError> {
        for (i, record) in records.iter().enumerate() {
            if record.total_spent.is_sign_negative() && !record.total_spent.is_zero() {
                return Err(CoreError::MalformedRecord {
                    row: i + 1,
                    field: "total_spent",
                    value: record.total_spent.to_string(),
                    reason: "amount must not be negative".to_string(),
                });
            }
        }
        Ok(Self { records })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Validates every raw row; the first malformed one aborts construction.
    pub fn from_raw<I>(rows: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = RawTransaction>,
    {
        let records = rows
            .into_iter()
            .enumerate()
            .map(|(i, raw)| TransactionRecord::from_raw(i + 1, raw))
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(rows = records.len(), "Built transaction table.");
        Ok(Self { records })
    }

    /// Returns a new table holding clones of the records that satisfy `predicate`.
    pub fn filtered<F>(&self, predicate: F) -> Table
    where
        F: Fn(&TransactionRecord) -> bool,
    {
        Self {
            records: self.records.iter().filter(|r| predicate(r)).cloned().collect(),
        }
    }

    pub fn records(&self) -> &[TransactionRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TransactionRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a Table {
    type Item = &'a TransactionRecord;
    type IntoIter = std::slice::Iter<'a, TransactionRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

const DATE_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Parses the date part of a transaction timestamp.
///
/// Accepts a bare `YYYY-MM-DD`, the common date-time layouts and RFC 3339.
/// The time of day is dropped.
pub fn parse_transaction_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    for format in DATE_TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt.date());
        }
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.date_naive())
}

fn parse_amount(row: usize, value: &str) -> Result<Decimal, CoreError> {
    let malformed = |reason: &str| CoreError::MalformedRecord {
        row,
        field: "total_spent",
        value: value.to_string(),
        reason: reason.to_string(),
    };
    let amount = Decimal::from_str(value.trim()).map_err(|_| malformed("not a decimal number"))?;
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(malformed("amount must not be negative"));
    }
    Ok(amount)
}

fn parse_quantity(row: usize, value: &str) -> Result<u64, CoreError> {
    let malformed = |reason: &str| CoreError::MalformedRecord {
        row,
        field: "quantity",
        value: value.to_string(),
        reason: reason.to_string(),
    };
    // Exports written by spreadsheet tools often carry integral floats ("3.0").
    let number = Decimal::from_str(value.trim()).map_err(|_| malformed("not a number"))?;
    if !number.fract().is_zero() {
        return Err(malformed("quantity must be a whole number"));
    }
    if number.is_sign_negative() && !number.is_zero() {
        return Err(malformed("quantity must not be negative"));
    }
    number.to_u64().ok_or_else(|| malformed("quantity out of range"))
}
