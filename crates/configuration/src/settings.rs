use crate::error::ConfigError;
use chrono::NaiveDate;
use core_types::{DateWindow, MetricField, Quarter, QuarterWindows};
use serde::Deserialize;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub data: DataSettings,
    pub report: ReportSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Where the transaction export lives.
#[derive(Debug, Clone, Deserialize)]
pub struct DataSettings {
    /// Path to the CSV export. Relative paths resolve against the working directory.
    pub path: PathBuf,
}

/// Contains parameters for the quarterly report.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportSettings {
    /// The day custom week 1 starts on. Required; there is no fallback.
    pub custom_epoch: NaiveDate,
    /// The metric used for QoQ and YoY growth.
    #[serde(default)]
    pub compare_field: MetricField,
    /// Truncates the category, item, payment and location rankings.
    #[serde(default)]
    pub top_n: Option<usize>,
    #[serde(default)]
    pub format: OutputFormat,
    pub windows: WindowSettings,
}

/// The comparison windows, either as a quarter shorthand or spelled out.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WindowSettings {
    Quarter { year: i32, quarter: u32 },
    Explicit {
        current: DateWindow,
        previous: DateWindow,
        prior_year: DateWindow,
    },
}

impl WindowSettings {
    /// Expands the settings into the three report windows.
    pub fn resolve(&self) -> Result<QuarterWindows, ConfigError> {
        match self {
            WindowSettings::Quarter { year, quarter } => {
                let quarter = Quarter::new(*year, *quarter)
                    .map_err(|e| ConfigError::ValidationError(e.to_string()))?;
                QuarterWindows::for_quarter(quarter)
                    .map_err(|e| ConfigError::ValidationError(e.to_string()))
            }
            WindowSettings::Explicit {
                current,
                previous,
                prior_year,
            } => Ok(QuarterWindows {
                current: *current,
                previous: *previous,
                prior_year: *prior_year,
            }),
        }
    }
}

/// How the report is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Contains parameters for log output.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// An `EnvFilter` directive such as `info` or `analytics=debug`. `RUST_LOG` wins when set.
    #[serde(default = "default_level")]
    pub level: String,
    /// When set, logs are also written to a daily rolling file in this directory.
    #[serde(default)]
    pub directory: Option<PathBuf>,
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

fn default_level() -> String {
    "info".to_string()
}

fn default_file_prefix() -> String {
    "basket-metrics.log".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
            directory: None,
            file_prefix: default_file_prefix(),
        }
    }
}

impl Config {
    /// Checks the cross-field rules that deserialization alone cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.report.windows.resolve()?;
        if self.report.top_n == Some(0) {
            return Err(ConfigError::ValidationError(
                "report.top_n must be greater than zero".to_string(),
            ));
        }
        if self.data.path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "data.path must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
