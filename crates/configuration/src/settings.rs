use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The root configuration structure for the entire application.
///
/// Every section has defaults, so an absent or partial `config.toml` is valid.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub analysis: AnalysisSettings,
    pub database: DatabaseSettings,
    pub logging: LoggingSettings,
}

/// Window sizes and multipliers for the derived series.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// One trailing moving average is computed per entry (e.g. 50 and 200 days).
    pub moving_average_windows: Vec<usize>,
    pub bollinger: BollingerSettings,
    pub volatility: VolatilitySettings,
}

/// Parameters for the Bollinger bands.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BollingerSettings {
    pub window: usize,
    /// Number of standard deviations between the middle band and each outer band.
    pub k: f64,
}

/// Parameters for the rolling annualized volatility of daily returns.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct VolatilitySettings {
    pub window: usize,
    /// Trading days per year, used to annualize the daily standard deviation.
    pub periods_per_year: u32,
}

/// Where the price series and the two equity curves live.
///
/// Table and column names are spliced into SQL, so they are validated as
/// plain identifiers before use.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub price_table: String,
    pub price_column: String,
    pub benchmark_table: String,
    pub benchmark_column: String,
    pub strategy_table: String,
    pub strategy_column: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive; `RUST_LOG` takes precedence when set.
    pub level: String,
    /// When set, logs are also written to a daily rolling file in this directory.
    pub directory: Option<PathBuf>,
    pub file_prefix: String,
}

// --- Default Implementations ---

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            moving_average_windows: vec![50, 200],
            bollinger: BollingerSettings::default(),
            volatility: VolatilitySettings::default(),
        }
    }
}

impl Default for BollingerSettings {
    fn default() -> Self {
        Self { window: 50, k: 2.0 }
    }
}

impl Default for VolatilitySettings {
    fn default() -> Self {
        Self {
            window: 30,
            periods_per_year: 252,
        }
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            price_table: "sp500".to_string(),
            price_column: "close_price".to_string(),
            benchmark_table: "sp500_buy_and_hold".to_string(),
            benchmark_column: "bnh_equity".to_string(),
            strategy_table: "sp500_backtest".to_string(),
            strategy_column: "equity_value".to_string(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
            file_prefix: "tidemark.log".to_string(),
        }
    }
}

// --- Validation ---

impl Config {
    /// Rejects settings that would make every run fail, before any data is loaded.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let analysis = &self.analysis;

        if let Some(window) = analysis.moving_average_windows.iter().find(|&&w| w == 0) {
            return Err(ConfigError::ValidationError(format!(
                "moving average window must be positive, got {window}"
            )));
        }
        if analysis.bollinger.window == 0 || analysis.volatility.window == 0 {
            return Err(ConfigError::ValidationError(
                "bollinger and volatility windows must be positive".to_string(),
            ));
        }
        if !analysis.bollinger.k.is_finite() || analysis.bollinger.k < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "bollinger multiplier must be a non-negative number, got {}",
                analysis.bollinger.k
            )));
        }
        if analysis.volatility.periods_per_year == 0 {
            return Err(ConfigError::ValidationError(
                "periods_per_year must be positive".to_string(),
            ));
        }

        let db = &self.database;
        for name in [
            &db.price_table,
            &db.price_column,
            &db.benchmark_table,
            &db.benchmark_column,
            &db.strategy_table,
            &db.strategy_column,
        ] {
            if !is_identifier(name) {
                return Err(ConfigError::ValidationError(format!(
                    "'{name}' is not a valid SQL identifier"
                )));
            }
        }

        Ok(())
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
