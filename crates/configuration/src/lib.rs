use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use settings::{
    Config, DataSettings, LoggingSettings, OutputFormat, ReportSettings, WindowSettings,
};

/// Prefix for environment overrides, e.g. `BASKET__REPORT__TOP_N=5`.
pub const ENV_PREFIX: &str = "BASKET";

/// Loads the application configuration from a TOML file plus environment overrides.
///
/// This function is the primary entry point for this crate. It reads the configuration file,
/// deserializes it into our strongly-typed `Config` struct, validates it and returns it.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path).required(true))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    tracing::info!(
        path = %path.display(),
        data = %config.data.path.display(),
        compare_field = %config.report.compare_field,
        "Configuration loaded."
    );

    Ok(config)
}
