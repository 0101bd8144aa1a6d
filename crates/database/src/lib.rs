//! # Tidemark Database Crate
//!
//! PostgreSQL ingestion for the analytics engine: the daily close-price table
//! and the two equity-curve tables of a backtest.
//!
//! ## Architectural Principles
//!
//! - **Adapter:** All SQL lives here. Callers get `core_types` series back and
//!   never see rows or connection details.
//! - **No Cleaning:** Prices are returned as a `RawSeries` exactly as stored;
//!   coercion and forward-filling belong to the analytics crate.
//! - **Asynchronous & Pooled:** All operations are asynchronous over a shared
//!   connection pool (`PgPool`).
//!
//! ## Public API
//!
//! - `connect`: Establishes the connection pool from `DATABASE_URL`.
//! - `run_migrations`: Creates the price and equity tables if missing.
//! - `DbRepository`: Reads the configured price series and equity curves.
//! - `DbError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod repository;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, run_migrations};
pub use error::DbError;
pub use repository::DbRepository;
