use crate::error::CoreError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A closed date interval `[start, end]`. Both bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "WindowBounds")]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

/// Unchecked bounds as they appear in configuration files.
#[derive(Debug, Clone, Copy, Deserialize)]
struct WindowBounds {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<WindowBounds> for DateWindow {
    type Error = CoreError;

    fn try_from(bounds: WindowBounds) -> Result<Self, Self::Error> {
        DateWindow::new(bounds.start, bounds.end)
    }
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, CoreError> {
        if start > end {
            return Err(CoreError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of calendar days covered, counting both ends.
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// A calendar quarter, e.g. Q4 of 2024.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Quarter {
    pub year: i32,
    pub quarter: u32,
}

impl Quarter {
    pub fn new(year: i32, quarter: u32) -> Result<Self, CoreError> {
        if !(1..=4).contains(&quarter) {
            return Err(CoreError::InvalidInput(
                "quarter".to_string(),
                format!("{} is not in 1..=4", quarter),
            ));
        }
        Ok(Self { year, quarter })
    }

    /// The immediately preceding quarter (Q1 rolls back to Q4 of the prior year).
    pub fn previous(&self) -> Self {
        if self.quarter == 1 {
            Self { year: self.year - 1, quarter: 4 }
        } else {
            Self { year: self.year, quarter: self.quarter - 1 }
        }
    }

    /// The same quarter one year earlier.
    pub fn prior_year(&self) -> Self {
        Self { year: self.year - 1, quarter: self.quarter }
    }

    /// The first through last calendar day of the quarter.
    pub fn window(&self) -> Result<DateWindow, CoreError> {
        let out_of_range = || {
            CoreError::InvalidInput(
                "quarter".to_string(),
                format!("{} has no calendar dates", self),
            )
        };
        let first_month = (self.quarter - 1) * 3 + 1;
        let start = NaiveDate::from_ymd_opt(self.year, first_month, 1).ok_or_else(out_of_range)?;
        let next_start = if self.quarter == 4 {
            NaiveDate::from_ymd_opt(self.year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(self.year, first_month + 3, 1)
        };
        let end = next_start
            .and_then(|d| d.pred_opt())
            .ok_or_else(out_of_range)?;
        DateWindow::new(start, end)
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{}-{}", self.quarter, self.year)
    }
}

/// The three windows a quarterly report compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuarterWindows {
    pub current: DateWindow,
    /// Used for quarter-over-quarter growth.
    pub previous: DateWindow,
    /// Used for year-over-year growth.
    pub prior_year: DateWindow,
}

impl QuarterWindows {
    /// Derives all three windows from an explicit calendar quarter.
    pub fn for_quarter(quarter: Quarter) -> Result<Self, CoreError> {
        Ok(Self {
            current: quarter.window()?,
            previous: quarter.previous().window()?,
            prior_year: quarter.prior_year().window()?,
        })
    }
}
