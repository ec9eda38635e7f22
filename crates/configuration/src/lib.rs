use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use settings::{
    AnalyticsConfig, Backtest, Config, LoggingConfig, MACrossoverParams, RiskGateConfig, RiskManagement,
    RiskWeights, SizingMode, Strategies,
};

/// Loads and validates the application configuration.
///
/// Sources are layered in order: the built-in defaults, the optional TOML file
/// at `path` (defaults to `config.toml`, which may be absent), then
/// `RETROTRADE__SECTION__KEY` environment variables.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let file = match path {
        Some(p) => config::File::from(p).required(true),
        None => config::File::with_name("config.toml").required(false),
    };

    let builder = config::Config::builder()
        .add_source(file)
        .add_source(
            config::Environment::with_prefix("RETROTRADE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    Ok(config)
}
