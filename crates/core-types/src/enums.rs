use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The categorical columns a table can be grouped on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupField {
    Category,
    Item,
    PaymentMethod,
    Location,
}

impl GroupField {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupField::Category => "category",
            GroupField::Item => "item",
            GroupField::PaymentMethod => "payment_method",
            GroupField::Location => "location",
        }
    }
}

impl fmt::Display for GroupField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The numeric columns that can be aggregated inside a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueField {
    TotalSpent,
    Quantity,
}

/// How the values inside one group are folded into a single number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregator {
    Sum,
    Mean,
}

/// The scalar fields of a metrics bundle that can be compared across windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricField {
    #[default]
    Sales,
    TransactionCount,
    Aov,
    TotalQuantity,
}

impl MetricField {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricField::Sales => "sales",
            MetricField::TransactionCount => "transaction_count",
            MetricField::Aov => "aov",
            MetricField::TotalQuantity => "total_quantity",
        }
    }
}

impl fmt::Display for MetricField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sales" => Ok(MetricField::Sales),
            "transaction_count" | "transactions" => Ok(MetricField::TransactionCount),
            "aov" => Ok(MetricField::Aov),
            "total_quantity" | "quantity" => Ok(MetricField::TotalQuantity),
            other => Err(format!(
                "unknown metric '{}', expected sales, transaction_count, aov or total_quantity",
                other
            )),
        }
    }
}
