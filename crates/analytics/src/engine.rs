use crate::breakdown::GroupBreakdown;
use crate::error::AnalyticsError;
use crate::report::MetricsBundle;
use chrono::{Datelike, NaiveDate};
use core_types::{Aggregator, GroupField, Table, TransactionRecord, ValueField};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Day-of-week labels indexed by the crate-wide encoding, 0 = Monday.
const WEEKDAY_LABELS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// A stateless calculator for deriving sales metrics from a transaction table.
#[derive(Debug, Default, Clone, Copy)]
pub struct MetricsCalculator {}

impl MetricsCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes the canonical metrics bundle for a (usually window-selected) table.
    ///
    /// An empty table is not an error: counters are zero and the AOV is undefined.
    /// Totals that exceed `Decimal` or `u64` range fail with `Calculation`.
    pub fn compute(&self, table: &Table) -> Result<MetricsBundle, AnalyticsError> {
        if table.is_empty() {
            return Ok(MetricsBundle::empty());
        }

        let mut sales = Decimal::ZERO;
        let mut total_quantity: u64 = 0;
        for record in table {
            sales = sales
                .checked_add(record.total_spent)
                .ok_or_else(|| overflow("sales"))?;
            total_quantity = total_quantity
                .checked_add(record.quantity)
                .ok_or_else(|| overflow("total_quantity"))?;
        }
        let transaction_count = distinct_transactions(table) as u64;
        let aov = sales.checked_div(Decimal::from(transaction_count));

        Ok(MetricsBundle {
            sales,
            transaction_count,
            aov,
            total_quantity,
        })
    }

    /// Groups rows by a categorical column and aggregates one numeric column.
    pub fn group_by(
        &self,
        table: &Table,
        key: GroupField,
        value: ValueField,
        aggregator: Aggregator,
    ) -> Result<GroupBreakdown<String>, AnalyticsError> {
        aggregate(
            table,
            |record| Ok(group_key(record, key).to_string()),
            value,
            aggregator,
        )
    }

    /// Buckets rows into custom weeks counted from `epoch` (week 1 starts on the epoch).
    pub fn by_custom_week(
        &self,
        table: &Table,
        epoch: NaiveDate,
        value: ValueField,
        aggregator: Aggregator,
    ) -> Result<GroupBreakdown<u32>, AnalyticsError> {
        aggregate(
            table,
            |record| custom_week(record.transaction_date, epoch),
            value,
            aggregator,
        )
    }

    /// Buckets rows by weekday, 0 = Monday through 6 = Sunday.
    pub fn by_day_of_week(
        &self,
        table: &Table,
        value: ValueField,
        aggregator: Aggregator,
    ) -> Result<GroupBreakdown<u8>, AnalyticsError> {
        aggregate(
            table,
            |record| Ok(day_of_week(record.transaction_date)),
            value,
            aggregator,
        )
    }

    /// The mean number of items per distinct transaction.
    pub fn items_per_transaction(&self, table: &Table) -> Result<Decimal, AnalyticsError> {
        let mut per_transaction: HashMap<&str, u64> = HashMap::new();
        for record in table {
            let items = per_transaction
                .entry(record.transaction_id.as_str())
                .or_insert(0);
            *items = items
                .checked_add(record.quantity)
                .ok_or_else(|| overflow("items_per_transaction"))?;
        }

        if per_transaction.is_empty() {
            return Err(AnalyticsError::DivisionUndefined(
                "items_per_transaction".to_string(),
            ));
        }

        let total = per_transaction
            .values()
            .try_fold(0u64, |acc, items| acc.checked_add(*items))
            .ok_or_else(|| overflow("items_per_transaction"))?;
        Decimal::from(total)
            .checked_div(Decimal::from(per_transaction.len()))
            .ok_or_else(|| AnalyticsError::DivisionUndefined("items_per_transaction".to_string()))
    }
}

/// The 1-based custom week a date falls in: `floor(days_since_epoch / 7) + 1`.
pub fn custom_week(date: NaiveDate, epoch: NaiveDate) -> Result<u32, AnalyticsError> {
    let days = (date - epoch).num_days();
    if days < 0 {
        return Err(AnalyticsError::DateBeforeEpoch { date, epoch });
    }
    u32::try_from(days / 7 + 1)
        .map_err(|_| AnalyticsError::Calculation(format!("week number for {} overflows", date)))
}

/// Weekday index with 0 = Monday and 6 = Sunday.
pub fn day_of_week(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_monday() as u8
}

/// The display name for a weekday index, if it is in 0..=6.
pub fn day_of_week_label(index: u8) -> Option<&'static str> {
    WEEKDAY_LABELS.get(index as usize).copied()
}

fn overflow(metric: &str) -> AnalyticsError {
    AnalyticsError::Calculation(format!("{} exceeds the representable range", metric))
}

fn distinct_transactions(table: &Table) -> usize {
    table
        .iter()
        .map(|r| r.transaction_id.as_str())
        .collect::<HashSet<_>>()
        .len()
}

fn group_key(record: &TransactionRecord, key: GroupField) -> &str {
    match key {
        GroupField::Category => &record.category,
        GroupField::Item => &record.item,
        GroupField::PaymentMethod => &record.payment_method,
        GroupField::Location => &record.location,
    }
}

fn field_value(record: &TransactionRecord, value: ValueField) -> Decimal {
    match value {
        ValueField::TotalSpent => record.total_spent,
        ValueField::Quantity => Decimal::from(record.quantity),
    }
}

/// Folds every row into its group, then ranks the groups.
fn aggregate<K, F>(
    table: &Table,
    key_of: F,
    value: ValueField,
    aggregator: Aggregator,
) -> Result<GroupBreakdown<K>, AnalyticsError>
where
    K: Ord,
    F: Fn(&TransactionRecord) -> Result<K, AnalyticsError>,
{
    let mut groups: BTreeMap<K, (Decimal, u64)> = BTreeMap::new();
    for record in table {
        let slot = groups.entry(key_of(record)?).or_insert((Decimal::ZERO, 0));
        slot.0 = slot
            .0
            .checked_add(field_value(record, value))
            .ok_or_else(|| overflow("group total"))?;
        slot.1 += 1;
    }
    tracing::debug!(groups = groups.len(), ?aggregator, "Aggregated groups.");

    let totals = groups
        .into_iter()
        .map(|(key, (sum, rows))| {
            let folded = match aggregator {
                Aggregator::Sum => sum,
                Aggregator::Mean => sum
                    .checked_div(Decimal::from(rows))
                    .ok_or_else(|| AnalyticsError::DivisionUndefined("group mean".to_string()))?,
            };
            Ok((key, folded))
        })
        .collect::<Result<Vec<_>, AnalyticsError>>()?;

    Ok(GroupBreakdown::from_totals(totals))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(
        id: &str,
        day: NaiveDate,
        spent: Decimal,
        quantity: u64,
        category: &str,
    ) -> TransactionRecord {
        TransactionRecord {
            transaction_id: id.to_string(),
            transaction_date: day,
            total_spent: spent,
            quantity,
            category: category.to_string(),
            item: format!("{category} item"),
            payment_method: if quantity % 2 == 0 { "Card" } else { "Cash" }.to_string(),
            location: "Online".to_string(),
        }
    }

    fn sample() -> Table {
        Table::new(vec![
            record("T1", date(2024, 10, 7), dec!(40.00), 2, "Dairy"),
            record("T1", date(2024, 10, 7), dec!(10.00), 1, "Bakery"),
            record("T2", date(2024, 10, 8), dec!(30.00), 3, "Dairy"),
            record("T3", date(2024, 10, 14), dec!(20.00), 4, "Produce"),
        ])
        .unwrap()
    }

    #[test]
    fn compute_counts_distinct_transactions() {
        let bundle = MetricsCalculator::new().compute(&sample()).unwrap();
        assert_eq!(bundle.sales, dec!(100.00));
        assert_eq!(bundle.transaction_count, 3);
        assert_eq!(bundle.total_quantity, 10);
        assert_eq!(bundle.aov, Some(dec!(100.00) / dec!(3)));
    }

    #[test]
    fn compute_on_empty_table_has_zero_counters() {
        let calculator = MetricsCalculator::new();
        let bundle = calculator.compute(&Table::empty()).unwrap();
        assert_eq!(bundle.sales, Decimal::ZERO);
        assert_eq!(bundle.transaction_count, 0);
        assert_eq!(bundle.total_quantity, 0);
        assert!(matches!(
            bundle.average_order_value(),
            Err(AnalyticsError::DivisionUndefined(_))
        ));
        assert!(matches!(
            calculator.items_per_transaction(&Table::empty()),
            Err(AnalyticsError::DivisionUndefined(_))
        ));
    }

    #[test]
    fn compute_is_repeatable() {
        let calculator = MetricsCalculator::new();
        let table = sample();
        assert_eq!(calculator.compute(&table), calculator.compute(&table));
        assert!(calculator.compute(&table).is_ok());
    }

    #[test]
    fn group_by_sums_and_ranks() {
        let breakdown = MetricsCalculator::new()
            .group_by(&sample(), GroupField::Category, ValueField::TotalSpent, Aggregator::Sum)
            .unwrap();
        let entries: Vec<(&str, Decimal)> = breakdown
            .entries()
            .iter()
            .map(|e| (e.key.as_str(), e.value))
            .collect();
        assert_eq!(
            entries,
            vec![("Dairy", dec!(70.00)), ("Produce", dec!(20.00)), ("Bakery", dec!(10.00))]
        );
    }

    #[test]
    fn group_by_quantity_per_item() {
        let breakdown = MetricsCalculator::new()
            .group_by(&sample(), GroupField::Item, ValueField::Quantity, Aggregator::Sum)
            .unwrap();
        assert_eq!(breakdown.get(&"Dairy item".to_string()), Some(dec!(5)));
        assert_eq!(breakdown.entries()[0].key, "Dairy item");
    }

    #[test]
    fn group_by_on_empty_table_is_empty() {
        let breakdown = MetricsCalculator::new()
            .group_by(
                &Table::empty(),
                GroupField::Location,
                ValueField::TotalSpent,
                Aggregator::Mean,
            )
            .unwrap();
        assert!(breakdown.is_empty());
    }

    #[test]
    fn day_of_week_mean_uses_row_counts() {
        // 2024-10-07 and 2024-10-14 are Mondays, 2024-10-08 is a Tuesday.
        let breakdown = MetricsCalculator::new()
            .by_day_of_week(&sample(), ValueField::TotalSpent, Aggregator::Mean)
            .unwrap();
        assert_eq!(breakdown.get(&0), Some(dec!(70.00) / dec!(3)));
        assert_eq!(breakdown.get(&1), Some(dec!(30.00)));
        assert_eq!(day_of_week_label(0), Some("Monday"));
        assert_eq!(day_of_week_label(6), Some("Sunday"));
        assert_eq!(day_of_week_label(7), None);
    }

    #[test]
    fn custom_week_numbering() {
        let epoch = date(2024, 10, 1);
        assert_eq!(custom_week(epoch, epoch), Ok(1));
        assert_eq!(custom_week(date(2024, 10, 7), epoch), Ok(1));
        assert_eq!(custom_week(date(2024, 10, 8), epoch), Ok(2));
        assert_eq!(custom_week(date(2024, 12, 31), epoch), Ok(14));
        assert_eq!(
            custom_week(date(2024, 9, 30), epoch),
            Err(AnalyticsError::DateBeforeEpoch { date: date(2024, 9, 30), epoch })
        );
    }

    #[test]
    fn weekly_sales_bucket_from_the_epoch() {
        let calculator = MetricsCalculator::new();
        let weekly = calculator
            .by_custom_week(&sample(), date(2024, 10, 7), ValueField::TotalSpent, Aggregator::Sum)
            .unwrap();
        assert_eq!(weekly.get(&1), Some(dec!(80.00)));
        assert_eq!(weekly.get(&2), Some(dec!(20.00)));

        let late_epoch = calculator.by_custom_week(
            &sample(),
            date(2024, 10, 8),
            ValueField::TotalSpent,
            Aggregator::Sum,
        );
        assert!(matches!(late_epoch, Err(AnalyticsError::DateBeforeEpoch { .. })));
    }

    #[test]
    fn items_per_transaction_sums_within_each_transaction() {
        // T1 = 3 items, T2 = 3, T3 = 4.
        let mean = MetricsCalculator::new().items_per_transaction(&sample()).unwrap();
        assert_eq!(mean, dec!(10) / dec!(3));
    }

    #[test]
    fn quantity_overflow_is_a_calculation_error() {
        let table = Table::new(vec![
            record("T1", date(2024, 10, 7), dec!(1), u64::MAX, "Dairy"),
            record("T2", date(2024, 10, 8), dec!(1), 1, "Dairy"),
        ])
        .unwrap();
        let calculator = MetricsCalculator::new();
        assert!(matches!(calculator.compute(&table), Err(AnalyticsError::Calculation(_))));
        assert!(matches!(
            calculator.items_per_transaction(&table),
            Err(AnalyticsError::Calculation(_))
        ));
    }

    #[test]
    fn sales_overflow_is_a_calculation_error() {
        let table = Table::new(vec![
            record("T1", date(2024, 10, 7), Decimal::MAX, 1, "Dairy"),
            record("T2", date(2024, 10, 8), dec!(1), 1, "Dairy"),
        ])
        .unwrap();
        let calculator = MetricsCalculator::new();
        assert!(matches!(calculator.compute(&table), Err(AnalyticsError::Calculation(_))));
        assert!(matches!(
            calculator.group_by(
                &table,
                GroupField::Category,
                ValueField::TotalSpent,
                Aggregator::Sum,
            ),
            Err(AnalyticsError::Calculation(_))
        ));
    }
}
