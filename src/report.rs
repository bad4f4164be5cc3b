//! Presentation of analysis results: comfy-table text output and the window report shape.
//!
//! Rounding happens only here; the engine hands over unrounded decimals.

use analytics::{
    day_of_week_label, select, undefined_as_none, AnalyticsError, ComparativeResult,
    GroupBreakdown, GroupEntry, MetricsBundle, MetricsCalculator, QuarterSummary,
};
use chrono::NaiveDate;
use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, ContentArrangement, Table};
use core_types::{Aggregator, DateWindow, GroupField, ValueField};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt::Write;

const NOT_AVAILABLE: &str = "N/A";

/// Metrics and breakdowns for one ad-hoc window.
#[derive(Debug, Clone, Serialize)]
pub struct WindowReport {
    pub window: DateWindow,
    pub metrics: MetricsBundle,
    pub items_per_transaction: Option<Decimal>,
    pub sales_by_category: GroupBreakdown<String>,
    pub quantity_by_item: GroupBreakdown<String>,
    pub sales_by_payment: GroupBreakdown<String>,
    pub sales_by_location: GroupBreakdown<String>,
    pub custom_epoch: NaiveDate,
    pub weekly_sales: Vec<GroupEntry<u32>>,
    pub weekday_average_sales: Vec<GroupEntry<u8>>,
}

impl WindowReport {
    pub fn build(
        table: &core_types::Table,
        window: DateWindow,
        epoch: NaiveDate,
        calculator: &MetricsCalculator,
    ) -> Result<Self, AnalyticsError> {
        let rows = select(table, &window);
        let items_per_transaction = undefined_as_none(calculator.items_per_transaction(&rows))?;
        let sales_by = |field| {
            calculator.group_by(&rows, field, ValueField::TotalSpent, Aggregator::Sum)
        };

        Ok(Self {
            window,
            metrics: calculator.compute(&rows)?,
            items_per_transaction,
            sales_by_category: sales_by(GroupField::Category)?,
            quantity_by_item: calculator.group_by(
                &rows,
                GroupField::Item,
                ValueField::Quantity,
                Aggregator::Sum,
            )?,
            sales_by_payment: sales_by(GroupField::PaymentMethod)?,
            sales_by_location: sales_by(GroupField::Location)?,
            custom_epoch: epoch,
            weekly_sales: calculator
                .by_custom_week(&rows, epoch, ValueField::TotalSpent, Aggregator::Sum)?
                .in_key_order(),
            weekday_average_sales: calculator
                .by_day_of_week(&rows, ValueField::TotalSpent, Aggregator::Mean)?
                .in_key_order(),
        })
    }
}

pub fn render_summary(summary: &QuarterSummary) -> String {
    let mut out = String::new();

    section(&mut out, &format!("Current window ({})", summary.current.window));
    push_table(
        &mut out,
        bundle_table(&summary.current.metrics, summary.items_per_transaction),
    );

    section(&mut out, &format!("Growth in {}", summary.compare_field));
    let mut growth = new_table(vec![
        "Comparison",
        "Baseline window",
        "Current",
        "Baseline",
        "Change",
        "Change %",
    ]);
    for (label, baseline, result) in [
        ("QoQ", &summary.previous, &summary.quarter_over_quarter),
        ("YoY", &summary.prior_year, &summary.year_over_year),
    ] {
        match result {
            Some(r) => growth.add_row(vec![
                Cell::new(label),
                Cell::new(baseline.window),
                number_cell(Some(r.current)),
                number_cell(Some(r.baseline)),
                number_cell(Some(r.absolute_delta)),
                percent_cell(r.percent_delta),
            ]),
            None => growth.add_row(vec![
                Cell::new(label),
                Cell::new(baseline.window),
                Cell::new(NOT_AVAILABLE),
                Cell::new(NOT_AVAILABLE),
                Cell::new(NOT_AVAILABLE),
                Cell::new(NOT_AVAILABLE),
            ]),
        };
    }
    push_table(&mut out, growth);

    push_breakdown(
        &mut out,
        "Sales by category",
        ("Category", "Sales"),
        &summary.top_categories,
    );
    push_breakdown(
        &mut out,
        "Quantity by item",
        ("Item", "Quantity"),
        &summary.top_items,
    );
    push_breakdown(
        &mut out,
        "Sales by payment method",
        ("Payment method", "Sales"),
        &summary.sales_by_payment,
    );
    push_breakdown(
        &mut out,
        "Sales by location",
        ("Location", "Sales"),
        &summary.sales_by_location,
    );
    push_time_series(
        &mut out,
        summary.custom_epoch,
        &summary.weekly_sales,
        &summary.weekday_average_sales,
    );

    out
}

pub fn render_window(report: &WindowReport) -> String {
    let mut out = String::new();

    section(&mut out, &format!("Window ({})", report.window));
    push_table(
        &mut out,
        bundle_table(&report.metrics, report.items_per_transaction),
    );
    push_breakdown(
        &mut out,
        "Sales by category",
        ("Category", "Sales"),
        &report.sales_by_category,
    );
    push_breakdown(
        &mut out,
        "Quantity by item",
        ("Item", "Quantity"),
        &report.quantity_by_item,
    );
    push_breakdown(
        &mut out,
        "Sales by payment method",
        ("Payment method", "Sales"),
        &report.sales_by_payment,
    );
    push_breakdown(
        &mut out,
        "Sales by location",
        ("Location", "Sales"),
        &report.sales_by_location,
    );
    push_time_series(
        &mut out,
        report.custom_epoch,
        &report.weekly_sales,
        &report.weekday_average_sales,
    );

    out
}

pub fn render_comparison(
    current: &DateWindow,
    baseline: &DateWindow,
    result: &ComparativeResult,
) -> String {
    let mut out = String::new();
    section(&mut out, &format!("Change in {}", result.field));
    let mut table = new_table(vec!["", "Window", "Value"]);
    table.add_row(vec![
        Cell::new("Current"),
        Cell::new(current),
        number_cell(Some(result.current)),
    ]);
    table.add_row(vec![
        Cell::new("Baseline"),
        Cell::new(baseline),
        number_cell(Some(result.baseline)),
    ]);
    table.add_row(vec![
        Cell::new("Change"),
        Cell::new(""),
        number_cell(Some(result.absolute_delta)),
    ]);
    table.add_row(vec![
        Cell::new("Change %"),
        Cell::new(""),
        percent_cell(result.percent_delta),
    ]);
    push_table(&mut out, table);
    out
}

/// Two decimal places, or `N/A` for an undefined value.
pub fn format_decimal(value: Option<Decimal>) -> String {
    match value {
        Some(v) => v.round_dp(2).to_string(),
        None => NOT_AVAILABLE.to_string(),
    }
}

pub fn format_percent(value: Option<Decimal>) -> String {
    match value {
        Some(v) => format!("{}%", v.round_dp(2)),
        None => NOT_AVAILABLE.to_string(),
    }
}

fn bundle_table(metrics: &MetricsBundle, items_per_transaction: Option<Decimal>) -> Table {
    let mut table = new_table(vec!["Metric", "Value"]);
    table.add_row(vec![Cell::new("Total sales"), number_cell(Some(metrics.sales))]);
    table.add_row(vec![
        Cell::new("Transactions"),
        Cell::new(metrics.transaction_count).set_alignment(CellAlignment::Right),
    ]);
    table.add_row(vec![Cell::new("Average order value"), number_cell(metrics.aov)]);
    table.add_row(vec![
        Cell::new("Total quantity"),
        Cell::new(metrics.total_quantity).set_alignment(CellAlignment::Right),
    ]);
    table.add_row(vec![
        Cell::new("Items per transaction"),
        number_cell(items_per_transaction),
    ]);
    table
}

/// `headers` is the (key column, value column) pair.
fn push_breakdown(
    out: &mut String,
    title: &str,
    headers: (&str, &str),
    breakdown: &GroupBreakdown<String>,
) {
    section(out, title);
    if breakdown.is_empty() {
        out.push_str("(no transactions)\n");
        return;
    }
    let mut table = new_table(vec!["#", headers.0, headers.1]);
    for (rank, entry) in breakdown.entries().iter().enumerate() {
        table.add_row(vec![
            Cell::new(rank + 1),
            Cell::new(&entry.key),
            number_cell(Some(entry.value)),
        ]);
    }
    push_table(out, table);
}

fn push_time_series(
    out: &mut String,
    epoch: NaiveDate,
    weekly: &[GroupEntry<u32>],
    weekday: &[GroupEntry<u8>],
) {
    section(out, &format!("Weekly sales (week 1 starts {})", epoch));
    if weekly.is_empty() {
        out.push_str("(no transactions)\n");
    } else {
        let mut table = new_table(vec!["Week", "Sales"]);
        for entry in weekly {
            table.add_row(vec![Cell::new(entry.key), number_cell(Some(entry.value))]);
        }
        push_table(out, table);
    }

    section(out, "Average sale by day of week");
    if weekday.is_empty() {
        out.push_str("(no transactions)\n");
    } else {
        let mut table = new_table(vec!["Day", "Average sale"]);
        for entry in weekday {
            let label = day_of_week_label(entry.key).unwrap_or("?");
            table.add_row(vec![Cell::new(label), number_cell(Some(entry.value))]);
        }
        push_table(out, table);
    }
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn number_cell(value: Option<Decimal>) -> Cell {
    Cell::new(format_decimal(value)).set_alignment(CellAlignment::Right)
}

fn percent_cell(value: Option<Decimal>) -> Cell {
    Cell::new(format_percent(value)).set_alignment(CellAlignment::Right)
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n== {} ==", title);
}

fn push_table(out: &mut String, table: Table) {
    let _ = writeln!(out, "{}", table);
}

#[cfg(test)]
mod tests {
    use super::*;
    use analytics::{QuarterlyAnalysis, ReportPlan};
    use core_types::{MetricField, Quarter, QuarterWindows, TransactionRecord};
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn table() -> core_types::Table {
        let record = |id: &str, day: NaiveDate, spent: Decimal| TransactionRecord {
            transaction_id: id.to_string(),
            transaction_date: day,
            total_spent: spent,
            quantity: 2,
            category: "Beverages".to_string(),
            item: "Coffee".to_string(),
            payment_method: "Card".to_string(),
            location: "Online".to_string(),
        };
        core_types::Table::new(vec![
            record("A", date(2024, 10, 5), dec!(100.556)),
            record("B", date(2024, 7, 20), dec!(80)),
        ])
        .unwrap()
    }

    #[test]
    fn formatting_rounds_and_marks_undefined() {
        assert_eq!(format_decimal(Some(dec!(33.3333))), "33.33");
        assert_eq!(format_decimal(None), "N/A");
        assert_eq!(format_percent(Some(dec!(25.0))), "25.0%");
        assert_eq!(format_percent(None), "N/A");
    }

    #[test]
    fn summary_text_shows_undefined_yoy_as_na() {
        let plan = ReportPlan {
            windows: QuarterWindows::for_quarter(Quarter::new(2024, 4).unwrap()).unwrap(),
            custom_epoch: date(2024, 10, 1),
            compare_field: MetricField::Sales,
            top_n: None,
        };
        let summary = QuarterlyAnalysis::new(plan).run(&table()).unwrap();
        let text = render_summary(&summary);
        assert!(text.contains("Beverages"));
        assert!(text.contains("100.56"));
        assert!(text.contains("N/A"));
        assert!(text.contains("Saturday"));
    }

    #[test]
    fn window_report_handles_an_empty_window() {
        let window = DateWindow::new(date(2022, 1, 1), date(2022, 3, 31)).unwrap();
        let report =
            WindowReport::build(&table(), window, date(2022, 1, 1), &MetricsCalculator::new())
                .unwrap();
        assert_eq!(report.metrics.transaction_count, 0);
        assert_eq!(report.items_per_transaction, None);
        assert!(render_window(&report).contains("(no transactions)"));
    }

    #[test]
    fn window_report_propagates_overflow() {
        let record = |id: &str, spent: Decimal| TransactionRecord {
            transaction_id: id.to_string(),
            transaction_date: date(2024, 10, 5),
            total_spent: spent,
            quantity: 1,
            category: "Beverages".to_string(),
            item: "Coffee".to_string(),
            payment_method: "Card".to_string(),
            location: "Online".to_string(),
        };
        let table =
            core_types::Table::new(vec![record("A", Decimal::MAX), record("B", dec!(1))]).unwrap();
        let window = DateWindow::new(date(2024, 10, 1), date(2024, 12, 31)).unwrap();
        let result =
            WindowReport::build(&table, window, date(2024, 10, 1), &MetricsCalculator::new());
        assert!(matches!(result, Err(AnalyticsError::Calculation(_))));
    }
}
