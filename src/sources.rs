use analytics::coerce;
use anyhow::{Context, bail};
use chrono::NaiveDate;
use configuration::DatabaseSettings;
use core_types::{RawSeries, RawValue, TimeSeries};
use csv::{ReaderBuilder, StringRecord, Trim};
use database::{DbRepository, connect, run_migrations};
use std::path::Path;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Where a price series or equity curve is read from.
#[derive(Debug, Clone, Copy)]
pub enum Source<'a> {
    Csv(&'a Path),
    Database,
}

impl<'a> Source<'a> {
    pub fn from_flag(csv: Option<&'a Path>) -> Self {
        match csv {
            Some(path) => Source::Csv(path),
            None => Source::Database,
        }
    }
}

/// Opens the connection pool and brings the schema up to date.
async fn repository(settings: &DatabaseSettings) -> anyhow::Result<DbRepository> {
    let pool = connect().await.context("Failed to connect to the database")?;
    run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    Ok(DbRepository::new(pool, settings.clone()))
}

pub async fn load_prices(source: Source<'_>, settings: &DatabaseSettings) -> anyhow::Result<RawSeries> {
    let prices = match source {
        Source::Csv(path) => read_price_csv(path)?,
        Source::Database => repository(settings).await?.get_price_series().await?,
    };
    tracing::info!(rows = prices.len(), "Loaded price series.");
    Ok(prices)
}

/// Loads the benchmark and strategy curves, each from its own source.
pub async fn load_equity_curves(
    benchmark: Source<'_>,
    strategy: Source<'_>,
    settings: &DatabaseSettings,
) -> anyhow::Result<(TimeSeries, TimeSeries)> {
    let repo = match (benchmark, strategy) {
        (Source::Csv(_), Source::Csv(_)) => None,
        _ => Some(repository(settings).await?),
    };

    let benchmark = match (benchmark, &repo) {
        (Source::Csv(path), _) => read_equity_csv(path)?,
        (Source::Database, Some(repo)) => repo.get_benchmark_curve().await?,
        (Source::Database, None) => bail!("no database connection for the benchmark curve"),
    };
    let strategy = match (strategy, &repo) {
        (Source::Csv(path), _) => read_equity_csv(path)?,
        (Source::Database, Some(repo)) => repo.get_strategy_curve().await?,
        (Source::Database, None) => bail!("no database connection for the strategy curve"),
    };

    tracing::info!(
        benchmark_rows = benchmark.len(),
        strategy_rows = strategy.len(),
        "Loaded equity curves."
    );
    Ok((benchmark, strategy))
}

/// Reads an `observation_date,close` file into an uncleaned series.
///
/// Value cells are kept as text; an empty cell is a null.
pub fn read_price_csv(path: &Path) -> anyhow::Result<RawSeries> {
    let mut series = RawSeries::new(Some(series_name(path)), Vec::new());
    for row in read_rows(path)? {
        let (date, value) = row?;
        series.push(date, value);
    }
    Ok(series)
}

/// Reads an `observation_date,equity` file into a validated series.
///
/// Cells that do not hold a finite number become missing values.
pub fn read_equity_csv(path: &Path) -> anyhow::Result<TimeSeries> {
    let mut dates = Vec::new();
    let mut values = Vec::new();
    for row in read_rows(path)? {
        let (date, value) = row?;
        dates.push(date);
        values.push(coerce(&value));
    }

    TimeSeries::from_parts(Some(series_name(path)), dates, values)
        .with_context(|| format!("Invalid equity curve in {}", path.display()))
}

/// Yields `(date, value)` for every data row; the first two columns are used.
fn read_rows(
    path: &Path,
) -> anyhow::Result<impl Iterator<Item = anyhow::Result<(NaiveDate, RawValue)>>> {
    let reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let display = path.display().to_string();
    Ok(reader.into_records().map(move |record| {
        let record = record.with_context(|| format!("Malformed CSV in {display}"))?;
        parse_record(&record).with_context(|| {
            let line = record.position().map_or(0, |p| p.line());
            format!("{display}, line {line}")
        })
    }))
}

fn parse_record(record: &StringRecord) -> anyhow::Result<(NaiveDate, RawValue)> {
    let Some(date) = record.get(0) else {
        bail!("empty row");
    };
    let date = NaiveDate::parse_from_str(date, DATE_FORMAT)
        .with_context(|| format!("'{date}' is not a {DATE_FORMAT} date"))?;

    let value = match record.get(1) {
        None | Some("") => RawValue::Null,
        Some(text) => RawValue::Text(text.to_string()),
    };
    Ok((date, value))
}

fn series_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "series".to_string())
}
