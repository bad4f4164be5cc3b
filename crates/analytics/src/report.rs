use crate::error::AnalyticsError;
use core_types::MetricField;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The canonical summary metrics for one window of the ledger.
///
/// Produced fresh by `MetricsCalculator::compute` and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsBundle {
    /// Sum of `total_spent`.
    pub sales: Decimal,
    /// Number of distinct transaction ids.
    pub transaction_count: u64,
    /// Average order value. `None` when there are no transactions.
    pub aov: Option<Decimal>,
    /// Sum of `quantity`.
    pub total_quantity: u64,
}

impl MetricsBundle {
    /// The bundle of an empty window: zero counters and an undefined AOV.
    pub fn empty() -> Self {
        Self {
            sales: Decimal::ZERO,
            transaction_count: 0,
            aov: None,
            total_quantity: 0,
        }
    }

    /// Average order value, or `DivisionUndefined` when the window had no transactions.
    pub fn average_order_value(&self) -> Result<Decimal, AnalyticsError> {
        self.aov
            .ok_or_else(|| AnalyticsError::DivisionUndefined("aov".to_string()))
    }

    /// Reads one scalar field as a decimal, for comparisons across windows.
    pub fn value(&self, field: MetricField) -> Result<Decimal, AnalyticsError> {
        match field {
            MetricField::Sales => Ok(self.sales),
            MetricField::TransactionCount => Ok(Decimal::from(self.transaction_count)),
            MetricField::Aov => self.average_order_value(),
            MetricField::TotalQuantity => Ok(Decimal::from(self.total_quantity)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.transaction_count == 0
    }
}

impl Default for MetricsBundle {
    fn default() -> Self {
        Self::empty()
    }
}
