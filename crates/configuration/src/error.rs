use thiserror::Error;

/// Failures while reading or checking the metrics configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The TOML file or a `RETURNLENS_` environment variable could not be parsed.
    #[error("Failed to load configuration from file: {0}")]
    LoadError(#[from] config::ConfigError),

    /// A metric default is out of range, e.g. a cutoff outside (0, 1) or zero trials.
    #[error("Invalid metrics configuration: {0}")]
    ValidationError(String),
}
