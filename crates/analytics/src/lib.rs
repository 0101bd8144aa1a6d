//! # Tidemark Analytics Engine
//!
//! This crate turns a raw daily closing-price series of a market index into
//! derived series for inspection or charting: period returns, rolling
//! statistics, drawdown, and aligned equity curves.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of
//!   databases, files or rendering. It depends only on `core-types` and on
//!   `configuration` for its settings struct.
//! - **Clean once, derive many:** `missing::clean` is the single place where
//!   malformed input is tolerated. Every other function assumes a clean,
//!   ordered `TimeSeries` and fails fast otherwise.
//! - **No mutation:** every function returns a new series; inputs are never
//!   modified.
//!
//! ## Public API
//!
//! - `AnalyticsEngine`: cleans a raw series and computes every component.
//! - `IndexReport`: the per-component results of one analysis.
//! - The individual operations (`clean`, `aggregate`, `moving_average`,
//!   `rolling_std`, `bollinger_bands`, `drawdown`, `align`, ...).
//! - `AnalyticsError`: the specific error types that can be returned from this crate.

pub mod align;
pub mod drawdown;
pub mod engine;
pub mod error;
pub mod missing;
pub mod period;
pub mod report;
pub mod returns;
pub mod rolling;

// Re-export the key components to create a clean, public-facing API.
pub use align::{EquityCurvePair, align};
pub use drawdown::{DrawdownSeries, drawdown};
pub use engine::AnalyticsEngine;
pub use error::AnalyticsError;
pub use missing::{clean, coerce};
pub use period::{PeriodBucket, PeriodReturn, aggregate, buckets};
pub use report::{IndexReport, MovingAverage};
pub use returns::daily_returns;
pub use rolling::{BollingerBands, bollinger_bands, moving_average, rolling_std, rolling_volatility};
