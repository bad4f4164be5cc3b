use crate::breakdown::{GroupBreakdown, GroupEntry};
use crate::comparison::{ComparativeAnalyzer, ComparativeResult};
use crate::engine::MetricsCalculator;
use crate::error::AnalyticsError;
use crate::report::MetricsBundle;
use crate::window::select;
use chrono::NaiveDate;
use core_types::{
    Aggregator, DateWindow, GroupField, MetricField, QuarterWindows, Table, ValueField,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Everything the quarterly analysis needs besides the table itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPlan {
    pub windows: QuarterWindows,
    /// Day that custom week 1 starts on. Always supplied by the caller.
    pub custom_epoch: NaiveDate,
    pub compare_field: MetricField,
    /// Truncates the category, item, payment and location rankings when set.
    pub top_n: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowMetrics {
    pub window: DateWindow,
    pub metrics: MetricsBundle,
}

/// The full quarterly result handed to the report renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuarterSummary {
    pub current: WindowMetrics,
    pub previous: WindowMetrics,
    pub prior_year: WindowMetrics,
    pub compare_field: MetricField,
    /// `None` when the compared field is undefined in either window.
    pub quarter_over_quarter: Option<ComparativeResult>,
    pub year_over_year: Option<ComparativeResult>,
    pub top_categories: GroupBreakdown<String>,
    pub top_items: GroupBreakdown<String>,
    pub sales_by_payment: GroupBreakdown<String>,
    pub sales_by_location: GroupBreakdown<String>,
    pub custom_epoch: NaiveDate,
    pub weekly_sales: Vec<GroupEntry<u32>>,
    /// Mean sale per row on each weekday, 0 = Monday.
    pub weekday_average_sales: Vec<GroupEntry<u8>>,
    pub items_per_transaction: Option<Decimal>,
}

/// Runs the whole quarterly pipeline over one table.
#[derive(Debug, Clone)]
pub struct QuarterlyAnalysis {
    plan: ReportPlan,
    calculator: MetricsCalculator,
    analyzer: ComparativeAnalyzer,
}

impl QuarterlyAnalysis {
    pub fn new(plan: ReportPlan) -> Self {
        let analyzer = ComparativeAnalyzer::new(plan.compare_field);
        Self {
            plan,
            calculator: MetricsCalculator::new(),
            analyzer,
        }
    }

    pub fn plan(&self) -> &ReportPlan {
        &self.plan
    }

    pub fn run(&self, table: &Table) -> Result<QuarterSummary, AnalyticsError> {
        let windows = &self.plan.windows;
        let current_rows = select(table, &windows.current);
        if current_rows.is_empty() {
            tracing::warn!(window = %windows.current, "Current window has no transactions.");
        }

        let current = self.window_metrics(&current_rows, windows.current)?;
        let previous = self.window_metrics(&select(table, &windows.previous), windows.previous)?;
        let prior_year =
            self.window_metrics(&select(table, &windows.prior_year), windows.prior_year)?;

        let quarter_over_quarter = self.compare(&current.metrics, &previous.metrics)?;
        let year_over_year = self.compare(&current.metrics, &prior_year.metrics)?;

        let top_categories =
            self.ranking(&current_rows, GroupField::Category, ValueField::TotalSpent)?;
        let top_items = self.ranking(&current_rows, GroupField::Item, ValueField::Quantity)?;
        let sales_by_payment =
            self.ranking(&current_rows, GroupField::PaymentMethod, ValueField::TotalSpent)?;
        let sales_by_location =
            self.ranking(&current_rows, GroupField::Location, ValueField::TotalSpent)?;

        let weekly_sales = self
            .calculator
            .by_custom_week(
                &current_rows,
                self.plan.custom_epoch,
                ValueField::TotalSpent,
                Aggregator::Sum,
            )?
            .in_key_order();
        let weekday_average_sales = self
            .calculator
            .by_day_of_week(&current_rows, ValueField::TotalSpent, Aggregator::Mean)?
            .in_key_order();

        let items_per_transaction =
            undefined_as_none(self.calculator.items_per_transaction(&current_rows))?;

        tracing::info!(
            window = %windows.current,
            sales = %current.metrics.sales,
            transactions = current.metrics.transaction_count,
            "Quarterly analysis complete."
        );

        Ok(QuarterSummary {
            current,
            previous,
            prior_year,
            compare_field: self.plan.compare_field,
            quarter_over_quarter,
            year_over_year,
            top_categories,
            top_items,
            sales_by_payment,
            sales_by_location,
            custom_epoch: self.plan.custom_epoch,
            weekly_sales,
            weekday_average_sales,
            items_per_transaction,
        })
    }

    fn window_metrics(
        &self,
        rows: &Table,
        window: DateWindow,
    ) -> Result<WindowMetrics, AnalyticsError> {
        Ok(WindowMetrics {
            window,
            metrics: self.calculator.compute(rows)?,
        })
    }

    fn compare(
        &self,
        current: &MetricsBundle,
        baseline: &MetricsBundle,
    ) -> Result<Option<ComparativeResult>, AnalyticsError> {
        undefined_as_none(self.analyzer.compare(current, baseline))
    }

    fn ranking(
        &self,
        rows: &Table,
        key: GroupField,
        value: ValueField,
    ) -> Result<GroupBreakdown<String>, AnalyticsError> {
        let breakdown = self.calculator.group_by(rows, key, value, Aggregator::Sum)?;
        Ok(match self.plan.top_n {
            Some(n) => breakdown.top(n),
            None => breakdown,
        })
    }
}

/// Maps `DivisionUndefined` to `Ok(None)` and passes every other outcome through.
///
/// For reports where an undefined ratio is displayed rather than raised.
pub fn undefined_as_none<T>(
    result: Result<T, AnalyticsError>,
) -> Result<Option<T>, AnalyticsError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(AnalyticsError::DivisionUndefined(metric)) => {
            tracing::debug!(%metric, "Ratio undefined for this window.");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
