use analytics::{
    select, AnalyticsError, ComparativeAnalyzer, MetricsCalculator, QuarterlyAnalysis, ReportPlan,
};
use chrono::NaiveDate;
use core_types::{DateWindow, MetricField, Quarter, QuarterWindows, Table, TransactionRecord};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashSet;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn record(id: &str, day: NaiveDate, spent: Decimal, quantity: u64) -> TransactionRecord {
    TransactionRecord {
        transaction_id: id.to_string(),
        transaction_date: day,
        total_spent: spent,
        quantity,
        category: "Groceries".to_string(),
        item: "Milk".to_string(),
        payment_method: "Card".to_string(),
        location: "In-store".to_string(),
    }
}

fn labelled(
    id: &str,
    day: NaiveDate,
    spent: Decimal,
    quantity: u64,
    category: &str,
    item: &str,
    payment: &str,
    location: &str,
) -> TransactionRecord {
    TransactionRecord {
        category: category.to_string(),
        item: item.to_string(),
        payment_method: payment.to_string(),
        location: location.to_string(),
        ..record(id, day, spent, quantity)
    }
}

fn q4_plan(epoch: NaiveDate) -> ReportPlan {
    ReportPlan {
        windows: QuarterWindows::for_quarter(Quarter::new(2024, 4).unwrap()).unwrap(),
        custom_epoch: epoch,
        compare_field: MetricField::Sales,
        top_n: None,
    }
}

#[test]
fn three_quarter_scenario_matches_hand_computed_values() {
    let table = Table::new(vec![
        record("A", date(2024, 10, 5), dec!(100), 1),
        record("B", date(2024, 7, 20), dec!(80), 1),
        record("C", date(2023, 10, 15), dec!(90), 1),
    ])
    .unwrap();
    let calculator = MetricsCalculator::new();

    let q4_window = DateWindow::new(date(2024, 10, 1), date(2024, 12, 31)).unwrap();
    let q4 = calculator.compute(&select(&table, &q4_window)).unwrap();
    assert_eq!(q4.sales, dec!(100));
    assert_eq!(q4.transaction_count, 1);
    assert_eq!(q4.aov, Some(dec!(100)));

    let q3_window = DateWindow::new(date(2024, 7, 1), date(2024, 9, 30)).unwrap();
    let q3 = calculator.compute(&select(&table, &q3_window)).unwrap();
    assert_eq!(q3.sales, dec!(80));

    let qoq = ComparativeAnalyzer::default().compare(&q4, &q3).unwrap();
    assert_eq!(qoq.percent_delta, Some(dec!(25.0)));

    let summary = QuarterlyAnalysis::new(q4_plan(date(2024, 10, 1))).run(&table).unwrap();
    assert_eq!(summary.prior_year.metrics.sales, dec!(90));
    let yoy = summary.year_over_year.expect("prior year has sales");
    assert_eq!(yoy.absolute_delta, dec!(10));
    assert_eq!(yoy.percent_delta, Some(dec!(10) / dec!(90) * dec!(100)));
}

#[test]
fn selection_and_compute_agree_with_brute_force() {
    let mut rows = Vec::new();
    let start = date(2024, 6, 1);
    for i in 0..240u32 {
        let day = start + chrono::Duration::days(i64::from(i % 200));
        // Every third row shares an id with its predecessor.
        let id = format!("T{}", i - i % 3 / 2);
        rows.push(record(&id, day, Decimal::new(i64::from(i * 37 % 1000), 2), u64::from(i % 5)));
    }
    let table = Table::new(rows).unwrap();
    let window = DateWindow::new(date(2024, 8, 15), date(2024, 10, 31)).unwrap();

    let subset = select(&table, &window);
    assert!(subset.iter().all(|r| window.contains(r.transaction_date)));

    let expected: Vec<&TransactionRecord> = table
        .iter()
        .filter(|r| r.transaction_date >= window.start() && r.transaction_date <= window.end())
        .collect();
    assert_eq!(subset.len(), expected.len());

    let expected_sales: Decimal = expected.iter().map(|r| r.total_spent).sum();
    let expected_quantity: u64 = expected.iter().map(|r| r.quantity).sum();
    let expected_ids: HashSet<&str> = expected.iter().map(|r| r.transaction_id.as_str()).collect();

    let bundle = MetricsCalculator::new().compute(&subset).unwrap();
    assert_eq!(bundle.sales, expected_sales);
    assert_eq!(bundle.total_quantity, expected_quantity);
    assert_eq!(bundle.transaction_count, expected_ids.len() as u64);
    assert_eq!(bundle.aov, Some(expected_sales / Decimal::from(expected_ids.len())));
}

#[test]
fn summary_ranks_breakdowns_and_orders_time_series() {
    let table = Table::new(vec![
        labelled("1", date(2024, 10, 1), dec!(30), 2, "Dairy", "Milk", "Card", "Online"),
        labelled("2", date(2024, 10, 2), dec!(30), 5, "Bakery", "Bread", "Cash", "In-store"),
        labelled("3", date(2024, 10, 9), dec!(15), 1, "Produce", "Apples", "Card", "In-store"),
        labelled("3", date(2024, 10, 9), dec!(5), 1, "Produce", "Pears", "Card", "In-store"),
        labelled("4", date(2024, 11, 4), dec!(40), 3, "Dairy", "Cheese", "Mobile", "Online"),
        labelled("Q3", date(2024, 8, 1), dec!(50), 1, "Dairy", "Milk", "Card", "Online"),
    ])
    .unwrap();

    let summary = QuarterlyAnalysis::new(q4_plan(date(2024, 10, 1))).run(&table).unwrap();

    let categories: Vec<(&str, Decimal)> = summary
        .top_categories
        .entries()
        .iter()
        .map(|e| (e.key.as_str(), e.value))
        .collect();
    assert_eq!(
        categories,
        vec![("Dairy", dec!(70)), ("Bakery", dec!(30)), ("Produce", dec!(20))]
    );
    assert_eq!(summary.top_items.entries()[0].key, "Bread");
    assert_eq!(summary.sales_by_payment.entries()[0].key, "Card");
    assert_eq!(summary.sales_by_payment.get(&"Card".to_string()), Some(dec!(50)));
    assert_eq!(summary.sales_by_location.get(&"Online".to_string()), Some(dec!(70)));

    let weeks: Vec<(u32, Decimal)> =
        summary.weekly_sales.iter().map(|e| (e.key, e.value)).collect();
    assert_eq!(weeks, vec![(1, dec!(60)), (2, dec!(20)), (5, dec!(40))]);

    // Tuesday 2024-10-01, Wednesday 2024-10-02 and 2024-10-09, Monday 2024-11-04.
    let weekdays: Vec<u8> = summary.weekday_average_sales.iter().map(|e| e.key).collect();
    assert_eq!(weekdays, vec![0, 1, 2]);
    assert_eq!(summary.weekday_average_sales[2].value, dec!(50) / dec!(3));

    // 4 transactions carrying 2, 5, 2 and 3 items.
    assert_eq!(summary.items_per_transaction, Some(dec!(3)));

    let qoq = summary.quarter_over_quarter.expect("q3 has sales");
    assert_eq!(qoq.percent_delta, Some(dec!(140)));
    assert_eq!(summary.year_over_year.as_ref().and_then(|r| r.percent_delta), None);
}

#[test]
fn top_n_truncates_rankings() {
    let table = Table::new(vec![
        labelled("1", date(2024, 10, 1), dec!(3), 1, "A", "a", "Card", "X"),
        labelled("2", date(2024, 10, 1), dec!(2), 1, "B", "b", "Card", "X"),
        labelled("3", date(2024, 10, 1), dec!(1), 1, "C", "c", "Card", "X"),
    ])
    .unwrap();
    let plan = ReportPlan {
        top_n: Some(2),
        ..q4_plan(date(2024, 10, 1))
    };
    let summary = QuarterlyAnalysis::new(plan).run(&table).unwrap();
    assert_eq!(summary.top_categories.len(), 2);
    assert_eq!(summary.top_items.len(), 2);
}

#[test]
fn empty_current_quarter_is_reported_not_failed() {
    let table = Table::new(vec![record("old", date(2024, 8, 1), dec!(80), 2)]).unwrap();
    let plan = ReportPlan {
        compare_field: MetricField::Aov,
        ..q4_plan(date(2024, 10, 1))
    };

    let summary = QuarterlyAnalysis::new(plan).run(&table).unwrap();

    assert_eq!(summary.current.metrics.sales, Decimal::ZERO);
    assert_eq!(summary.current.metrics.transaction_count, 0);
    assert_eq!(summary.current.metrics.total_quantity, 0);
    assert_eq!(summary.current.metrics.aov, None);
    assert_eq!(summary.items_per_transaction, None);
    assert_eq!(summary.quarter_over_quarter, None);
    assert!(summary.top_categories.is_empty());
    assert!(summary.weekly_sales.is_empty());
}

#[test]
fn epoch_after_quarter_start_is_an_error() {
    let table = Table::new(vec![record("A", date(2024, 10, 5), dec!(100), 1)]).unwrap();
    let result = QuarterlyAnalysis::new(q4_plan(date(2024, 10, 6))).run(&table);
    assert!(matches!(result, Err(AnalyticsError::DateBeforeEpoch { .. })));
}

#[test]
fn summary_serializes_undefined_values_as_null() {
    let summary = QuarterlyAnalysis::new(q4_plan(date(2024, 10, 1)))
        .run(&Table::empty())
        .unwrap();
    let json = serde_json::to_value(&summary).unwrap();
    assert!(json["current"]["metrics"]["aov"].is_null());
    assert!(json["items_per_transaction"].is_null());
    assert_eq!(json["compare_field"], "sales");
}

#[test]
fn overflowing_quarter_totals_fail_the_analysis() {
    let table = Table::new(vec![
        record("A", date(2024, 10, 5), Decimal::MAX, 1),
        record("B", date(2024, 11, 5), dec!(1), 1),
    ])
    .unwrap();
    let result = QuarterlyAnalysis::new(q4_plan(date(2024, 10, 1))).run(&table);
    assert!(matches!(result, Err(AnalyticsError::Calculation(_))));
}
