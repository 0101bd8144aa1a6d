use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_logging;
pub use settings::{
    AnalysisSettings, BollingerSettings, Config, DatabaseSettings, LoggingSettings,
    VolatilitySettings,
};

/// Loads and validates the application configuration.
///
/// Reads `path` when given (it must exist), otherwise an optional `config.toml`
/// in the working directory. Environment variables of the form
/// `TIDEMARK__SECTION__KEY` override file values, e.g.
/// `TIDEMARK__ANALYSIS__BOLLINGER__K=2.5`.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let file = match path {
        Some(path) => config::File::from(path).required(true),
        None => config::File::with_name("config").required(false),
    };

    let builder = config::Config::builder()
        .add_source(file)
        .add_source(
            config::Environment::with_prefix("TIDEMARK")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    Ok(config)
}
