//! # Quarterly Sales Analytics
//!
//! This crate is the time-windowed aggregation engine behind the quarterly
//! sales report. It slices a transaction table into date windows, computes a
//! uniform metric bundle per window and derives growth figures between them.
//!
//! ## Architectural Principles
//!
//! - **Pure Logic:** No file, CSV or terminal I/O. It depends only on `core-types`.
//! - **Stateless Calculation:** `MetricsCalculator` and `ComparativeAnalyzer` hold no
//!   state between calls. Every window and the week epoch are explicit inputs.
//! - **Typed Undefined Ratios:** A zero denominator yields `AnalyticsError::DivisionUndefined`
//!   or `None`, never a panic.
//!
//! ## Public API
//!
//! - `select`: inclusive date-window selection.
//! - `MetricsCalculator`: bundles, grouped breakdowns, week/weekday buckets, items per transaction.
//! - `ComparativeAnalyzer`: absolute and percentage change between two bundles.
//! - `QuarterlyAnalysis`: the current / previous / prior-year pipeline, producing a
//!   `QuarterSummary`.

pub mod breakdown;
pub mod comparison;
pub mod engine;
pub mod error;
pub mod report;
pub mod summary;
pub mod window;

pub use breakdown::{GroupBreakdown, GroupEntry};
pub use comparison::{ComparativeAnalyzer, ComparativeResult};
pub use engine::{custom_week, day_of_week, day_of_week_label, MetricsCalculator};
pub use error::AnalyticsError;
pub use report::MetricsBundle;
pub use summary::{
    undefined_as_none, QuarterSummary, QuarterlyAnalysis, ReportPlan, WindowMetrics,
};
pub use window::select;
