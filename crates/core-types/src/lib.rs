pub mod enums;
pub mod error;
pub mod structs;
pub mod window;

// Re-export the core types to provide a clean public API.
pub use enums::{Aggregator, GroupField, MetricField, ValueField};
pub use error::CoreError;
pub use structs::{parse_transaction_date, RawTransaction, Table, TransactionRecord};
pub use window::{DateWindow, Quarter, QuarterWindows};
