use crate::error::ConfigError;
use crate::settings::Config;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{ConfigOverrides, DeflatedSharpeConfig, MetricsConfig};

/// Prefix for environment overrides, e.g. `RETURNLENS_RETURNS__RISK_FREE=0.02`.
pub const ENV_PREFIX: &str = "RETURNLENS";

/// Loads the application configuration.
///
/// Reads `path` when given (it must exist), otherwise an optional `config.toml` in the
/// working directory, then layers `RETURNLENS_*` environment variables on top. Every
/// field has a default, so an empty source yields `Config::default()`.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let file = match path {
        Some(p) => config::File::from(p).required(true),
        None => config::File::with_name("config.toml").required(false),
    };

    let builder = config::Config::builder()
        .add_source(file)
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.returns.validate()?;

    tracing::debug!(year_freq = %config.returns.year_freq, "Loaded metrics configuration.");
    Ok(config)
}
