//! Terminal tables and JSON documents for the CLI commands.
//!
//! JSON output is meant for an external charting tool: every series is a list
//! of `{date, value}` points, and a component that failed is replaced by
//! `{"error": message}` so the rest of the document stays usable.

use analytics::{
    AnalyticsError, BollingerBands, DrawdownSeries, EquityCurvePair, IndexReport, PeriodReturn,
};
use chrono::NaiveDate;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table, presets::UTF8_FULL};
use core_types::{Granularity, TimeSeries};
use rust_decimal::prelude::ToPrimitive;
use serde_json::{Value, json};

const MISSING: &str = "-";

fn table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn number(value: Option<f64>) -> Cell {
    let text = value.map_or_else(|| MISSING.to_string(), |v| format!("{v:.2}"));
    Cell::new(text).set_alignment(CellAlignment::Right)
}

/// The last non-missing point of a series.
fn latest(series: &TimeSeries) -> Option<(NaiveDate, f64)> {
    series.iter().rev().find_map(|o| o.value.map(|v| (o.date, v)))
}

fn latest_text(series: &TimeSeries) -> String {
    latest(series).map_or_else(|| MISSING.to_string(), |(date, v)| format!("{v:.2} ({date})"))
}

fn outcome<T>(result: &Result<T, AnalyticsError>, describe: impl FnOnce(&T) -> String) -> String {
    match result {
        Ok(value) => describe(value),
        Err(err) => format!("error: {err}"),
    }
}

/// Index of the first row to print when only the last `tail` rows are shown.
/// A `tail` of zero shows everything.
fn first_row(len: usize, tail: usize) -> usize {
    if tail == 0 { 0 } else { len.saturating_sub(tail) }
}

// ==============================================================================
// Tables
// ==============================================================================

pub fn report_table(report: &IndexReport) -> Table {
    let mut table = table(vec!["Metric", "Value"]);
    let close = &report.close;

    let range = close
        .date_range()
        .map_or_else(|| MISSING.to_string(), |(start, end)| format!("{start} to {end}"));
    table.add_row(vec!["Observations".to_string(), close.len().to_string()]);
    table.add_row(vec!["Date range".to_string(), range]);
    table.add_row(vec!["Leading missing".to_string(), close.missing_count().to_string()]);
    table.add_row(vec!["Latest close".to_string(), latest_text(close)]);
    table.add_row(vec![
        "Latest daily return (%)".to_string(),
        outcome(&report.daily_returns, latest_text),
    ]);

    for ma in &report.moving_averages {
        table.add_row(vec![
            format!("{}-day moving average", ma.window),
            outcome(&ma.series, latest_text),
        ]);
    }

    table.add_row(vec![
        "Bollinger bands".to_string(),
        outcome(&report.bollinger, |bands| {
            format!(
                "{}-day, k = {}: upper {}, lower {}",
                bands.window,
                bands.k,
                latest_text(&bands.upper),
                latest_text(&bands.lower)
            )
        }),
    ]);
    table.add_row(vec![
        "Annualized volatility (%)".to_string(),
        outcome(&report.volatility, latest_text),
    ]);
    table.add_row(vec![
        "Max drawdown (%)".to_string(),
        outcome(&report.drawdown, |dd| {
            dd.max_drawdown()
                .map_or_else(|| MISSING.to_string(), |(date, v)| format!("{v:.2} ({date})"))
        }),
    ]);
    table.add_row(vec![
        "Current drawdown (%)".to_string(),
        outcome(&report.drawdown, |dd| latest_text(&dd.drawdown)),
    ]);
    table.add_row(vec![
        "Last monthly return (%)".to_string(),
        outcome(&report.monthly_returns, |r| last_return_text(r)),
    ]);
    table.add_row(vec![
        "Last yearly return (%)".to_string(),
        outcome(&report.yearly_returns, |r| last_return_text(r)),
    ]);

    table
}

fn last_return_text(returns: &[PeriodReturn]) -> String {
    returns.last().map_or_else(
        || MISSING.to_string(),
        |r| format!("{} ({})", r.return_pct, r.period),
    )
}

pub fn returns_table(granularity: Granularity, returns: &[PeriodReturn]) -> Table {
    let header = match granularity {
        Granularity::Month => "Month",
        Granularity::Year => "Year",
    };
    let mut table = table(vec![header, "Return (%)"]);
    for r in returns {
        table.add_row(vec![
            Cell::new(r.period),
            Cell::new(r.return_pct).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

pub fn drawdown_table(close: &TimeSeries, dd: &DrawdownSeries, tail: usize) -> Table {
    let mut table = table(vec!["Date", "Close", "Running max", "Drawdown (%)"]);
    let start = first_row(close.len(), tail);
    let rows = close
        .iter()
        .zip(dd.running_max.iter())
        .zip(dd.drawdown.iter())
        .skip(start);

    for ((obs, peak), depth) in rows {
        table.add_row(vec![
            Cell::new(obs.date),
            number(obs.value),
            number(peak.value),
            number(depth.value),
        ]);
    }
    table
}

pub fn bands_table(close: &TimeSeries, bands: &BollingerBands, tail: usize) -> Table {
    let mut table = table(vec!["Date", "Close", "Lower", "Middle", "Upper"]);
    let start = first_row(close.len(), tail);
    let rows = close
        .iter()
        .zip(bands.lower.iter())
        .zip(bands.middle.iter())
        .zip(bands.upper.iter())
        .skip(start);

    for (((obs, lower), middle), upper) in rows {
        table.add_row(vec![
            Cell::new(obs.date),
            number(obs.value),
            number(lower.value),
            number(middle.value),
            number(upper.value),
        ]);
    }
    table
}

pub fn compare_table(pair: &EquityCurvePair, tail: usize) -> Table {
    let mut table = table(vec!["Date", "Buy & hold", "Strategy"]);
    let start = first_row(pair.len(), tail);
    for (date, benchmark, strategy) in pair.rows().skip(start) {
        table.add_row(vec![Cell::new(date), number(benchmark), number(strategy)]);
    }
    table
}

// ==============================================================================
// JSON
// ==============================================================================

fn series_json(series: &TimeSeries) -> Value {
    let points: Vec<Value> = series
        .iter()
        .map(|o| json!({ "date": o.date, "value": o.value }))
        .collect();
    json!({ "name": series.name(), "points": points })
}

fn result_json<T>(result: &Result<T, AnalyticsError>, to_json: impl FnOnce(&T) -> Value) -> Value {
    match result {
        Ok(value) => to_json(value),
        Err(err) => json!({ "error": err.to_string() }),
    }
}

pub fn returns_json(returns: &[PeriodReturn]) -> Value {
    let rows: Vec<Value> = returns
        .iter()
        .map(|r| {
            json!({
                "period": r.period.to_string(),
                "start": r.period.start_date(),
                "return_pct": r.return_pct.to_f64(),
            })
        })
        .collect();
    Value::Array(rows)
}

pub fn bands_json(bands: &BollingerBands) -> Value {
    json!({
        "window": bands.window,
        "k": bands.k,
        "middle": series_json(&bands.middle),
        "upper": series_json(&bands.upper),
        "lower": series_json(&bands.lower),
    })
}

pub fn drawdown_json(dd: &DrawdownSeries) -> Value {
    let max = dd
        .max_drawdown()
        .map(|(date, value)| json!({ "date": date, "value": value }));
    json!({
        "running_max": series_json(&dd.running_max),
        "drawdown": series_json(&dd.drawdown),
        "max_drawdown": max,
    })
}

pub fn report_json(report: &IndexReport) -> Value {
    let moving_averages: Vec<Value> = report
        .moving_averages
        .iter()
        .map(|ma| {
            json!({
                "window": ma.window,
                "series": result_json(&ma.series, series_json),
            })
        })
        .collect();

    json!({
        "close": series_json(&report.close),
        "daily_returns": result_json(&report.daily_returns, series_json),
        "moving_averages": moving_averages,
        "bollinger": result_json(&report.bollinger, bands_json),
        "volatility": result_json(&report.volatility, series_json),
        "drawdown": result_json(&report.drawdown, drawdown_json),
        "monthly_returns": result_json(&report.monthly_returns, |r| returns_json(r)),
        "yearly_returns": result_json(&report.yearly_returns, |r| returns_json(r)),
    })
}

pub fn compare_json(pair: &EquityCurvePair) -> Value {
    let rows: Vec<Value> = pair
        .rows()
        .map(|(date, benchmark, strategy)| {
            json!({ "date": date, "benchmark": benchmark, "strategy": strategy })
        })
        .collect();
    json!({ "rows": rows })
}
