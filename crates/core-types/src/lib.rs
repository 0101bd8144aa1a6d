//! # Tidemark Core Types
//!
//! The shared vocabulary of the workspace: the date-indexed series that every
//! other crate consumes or produces.
//!
//! - `TimeSeries`: a validated, immutable series of `(date, Option<f64>)` pairs.
//! - `RawSeries`: what an ingestion source hands over before any cleaning.
//! - `Granularity` / `PeriodKey`: calendar bucketing for period returns.

pub mod enums;
pub mod error;
pub mod period;
pub mod raw;
pub mod series;

// Re-export the core types to provide a clean public API.
pub use enums::Granularity;
pub use error::CoreError;
pub use period::PeriodKey;
pub use raw::{RawObservation, RawSeries, RawValue};
pub use series::{Observation, TimeSeries};
