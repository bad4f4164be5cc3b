use chrono::NaiveDate;
use core_types::CoreError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalyticsError {
    /// A ratio was requested whose denominator is zero. Callers usually render
    /// this as "N/A".
    #[error("Division undefined: metric '{0}' has a zero denominator")]
    DivisionUndefined(String),

    #[error("Transaction dated {date} falls before the week epoch {epoch}")]
    DateBeforeEpoch { date: NaiveDate, epoch: NaiveDate },

    #[error("Calculation error: {0}")]
    Calculation(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}
