use crate::DbError;
use chrono::NaiveDate;
use configuration::DatabaseSettings;
use core_types::{RawObservation, RawSeries, RawValue, TimeSeries};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use sqlx::Row;
use sqlx::postgres::PgPool;

/// The `DbRepository` provides a high-level, application-specific interface
/// to the database. It encapsulates all SQL queries and data access logic.
///
/// Table and column names come from [`DatabaseSettings`] and are spliced into
/// the SQL text; `Config::validate` guarantees they are plain identifiers.
#[derive(Debug, Clone)]
pub struct DbRepository {
    pool: PgPool,
    settings: DatabaseSettings,
}

impl DbRepository {
    /// Creates a new `DbRepository` with a shared database connection pool.
    pub fn new(pool: PgPool, settings: DatabaseSettings) -> Self {
        Self { pool, settings }
    }

    pub fn settings(&self) -> &DatabaseSettings {
        &self.settings
    }

    /// Fetches the configured close-price column as an uncleaned series.
    ///
    /// Values are read as text so that anything the column holds reaches the
    /// missing-data policy unchanged; it decides what counts as a number.
    pub async fn get_price_series(&self) -> Result<RawSeries, DbError> {
        let (table, column) = (&self.settings.price_table, &self.settings.price_column);
        let sql = format!(
            "SELECT observation_date, {column}::text AS value FROM {table} ORDER BY observation_date ASC"
        );

        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        let observations: Vec<RawObservation> = rows
            .into_iter()
            .map(|row| RawObservation {
                date: row.get("observation_date"),
                value: price_cell(row.get("value")),
            })
            .collect();

        tracing::debug!(table = %table, rows = observations.len(), "Fetched price series.");
        Ok(RawSeries::new(Some(column.clone()), observations))
    }

    /// Fetches the buy-and-hold equity curve.
    pub async fn get_benchmark_curve(&self) -> Result<TimeSeries, DbError> {
        self.get_equity_curve(&self.settings.benchmark_table, &self.settings.benchmark_column)
            .await
    }

    /// Fetches the strategy equity curve.
    pub async fn get_strategy_curve(&self) -> Result<TimeSeries, DbError> {
        self.get_equity_curve(&self.settings.strategy_table, &self.settings.strategy_column)
            .await
    }

    async fn get_equity_curve(&self, table: &str, column: &str) -> Result<TimeSeries, DbError> {
        let sql = format!(
            "SELECT observation_date, {column}::numeric AS value FROM {table} ORDER BY observation_date ASC"
        );

        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        let points: Vec<(NaiveDate, Option<Decimal>)> = rows
            .into_iter()
            .map(|row| -> (NaiveDate, Option<Decimal>) {
                (row.get("observation_date"), row.get("value"))
            })
            .collect();

        tracing::debug!(table = %table, rows = points.len(), "Fetched equity curve.");
        equity_series(table, column, points)
    }
}

/// Maps a nullable text cell to the raw value handed to the cleaner.
fn price_cell(value: Option<String>) -> RawValue {
    match value {
        Some(text) => RawValue::Text(text),
        None => RawValue::Null,
    }
}

fn equity_series(
    table: &str,
    column: &str,
    points: Vec<(NaiveDate, Option<Decimal>)>,
) -> Result<TimeSeries, DbError> {
    let (dates, values): (Vec<NaiveDate>, Vec<Option<f64>>) = points
        .into_iter()
        .map(|(date, value)| (date, value.and_then(|v| v.to_f64())))
        .unzip();

    TimeSeries::from_parts(Some(column.to_string()), dates, values).map_err(|source| {
        DbError::InvalidSeries {
            table: table.to_string(),
            source,
        }
    })
}
