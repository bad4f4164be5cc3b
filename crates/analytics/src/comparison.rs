use crate::error::AnalyticsError;
use crate::report::MetricsBundle;
use core_types::MetricField;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The change in one metric between a current and a baseline window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparativeResult {
    pub field: MetricField,
    pub current: Decimal,
    pub baseline: Decimal,
    pub absolute_delta: Decimal,
    /// Percentage change relative to the baseline. `None` when the baseline is zero.
    pub percent_delta: Option<Decimal>,
}

impl ComparativeResult {
    /// `percent_delta` is `None` only for a zero baseline; a delta or ratio
    /// outside `Decimal` range fails with `Calculation`.
    pub fn between(
        field: MetricField,
        current: Decimal,
        baseline: Decimal,
    ) -> Result<Self, AnalyticsError> {
        let overflow = || {
            AnalyticsError::Calculation(format!(
                "change in {} exceeds the representable range",
                field
            ))
        };
        let absolute_delta = current.checked_sub(baseline).ok_or_else(overflow)?;
        let percent_delta = if baseline.is_zero() {
            None
        } else {
            let percent = absolute_delta
                .checked_div(baseline)
                .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
                .ok_or_else(overflow)?;
            Some(percent)
        };
        Ok(Self {
            field,
            current,
            baseline,
            absolute_delta,
            percent_delta,
        })
    }

    /// The percentage change, or `DivisionUndefined` for a zero baseline.
    pub fn percent_change(&self) -> Result<Decimal, AnalyticsError> {
        self.percent_delta.ok_or_else(|| {
            AnalyticsError::DivisionUndefined(format!("percent change in {}", self.field))
        })
    }
}

/// Compares metrics bundles on a single scalar field.
#[derive(Debug, Default, Clone, Copy)]
pub struct ComparativeAnalyzer {
    field: MetricField,
}

impl ComparativeAnalyzer {
    pub fn new(field: MetricField) -> Self {
        Self { field }
    }

    pub fn field(&self) -> MetricField {
        self.field
    }

    /// Fails only when the field itself is undefined in either bundle (an AOV
    /// over an empty window). A zero baseline is not a failure.
    pub fn compare(
        &self,
        current: &MetricsBundle,
        baseline: &MetricsBundle,
    ) -> Result<ComparativeResult, AnalyticsError> {
        let current_value = current.value(self.field)?;
        let baseline_value = baseline.value(self.field)?;
        ComparativeResult::between(self.field, current_value, baseline_value)
    }
}
