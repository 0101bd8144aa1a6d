use crate::error::AnalyticsError;
use core_types::{Observation, RawSeries, RawValue, TimeSeries};

/// Coerces a raw cell to a usable price.
///
/// Never fails: text that does not parse, NaN and infinities all become the
/// missing marker.
pub fn coerce(value: &RawValue) -> Option<f64> {
    match value {
        RawValue::Number(v) => v.is_finite().then_some(*v),
        RawValue::Text(text) => text.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        RawValue::Null => None,
    }
}

/// Turns a raw ingestion series into the clean `TimeSeries` every other
/// component consumes.
///
/// Malformed values are coerced to missing, then each missing value takes the
/// nearest preceding non-missing value. Missing values before the first valid
/// price stay missing. The only failure is a date ordering violation.
pub fn clean(raw: &RawSeries) -> Result<TimeSeries, AnalyticsError> {
    let mut observations = Vec::with_capacity(raw.len());
    let mut last_valid: Option<f64> = None;
    let mut malformed = 0usize;
    let mut filled = 0usize;

    for obs in &raw.observations {
        let value = match coerce(&obs.value) {
            Some(price) => {
                last_valid = Some(price);
                Some(price)
            }
            None => {
                if !matches!(obs.value, RawValue::Null) {
                    malformed += 1;
                }
                if last_valid.is_some() {
                    filled += 1;
                }
                last_valid
            }
        };
        observations.push(Observation::new(obs.date, value));
    }

    let series = TimeSeries::new(raw.name.clone(), observations)?;

    tracing::debug!(
        series = series.name().unwrap_or("unnamed"),
        observations = series.len(),
        malformed,
        filled,
        "Cleaned raw series"
    );

    Ok(series)
}
