use crate::error::AnalyticsError;
use core_types::TimeSeries;

/// Fractional one-step returns, aligned to the input: position `t` holds
/// `v(t) / v(t-1) - 1`. The first position, and any position where either
/// value is missing, is `None`.
pub(crate) fn simple_returns(series: &TimeSeries) -> Result<Vec<Option<f64>>, AnalyticsError> {
    let observations = series.observations();
    let mut returns = Vec::with_capacity(observations.len());

    for (i, current) in observations.iter().enumerate() {
        if i == 0 {
            returns.push(None);
            continue;
        }

        let previous = &observations[i - 1];
        match (previous.value, current.value) {
            (Some(prev), Some(curr)) => {
                if prev == 0.0 {
                    return Err(AnalyticsError::DivisionByZero(format!(
                        "return on {}: previous close on {} is zero",
                        current.date, previous.date
                    )));
                }
                returns.push(Some((curr - prev) / prev));
            }
            _ => returns.push(None),
        }
    }

    Ok(returns)
}

/// Day-over-day percentage change (×100) of a cleaned price series.
pub fn daily_returns(series: &TimeSeries) -> Result<TimeSeries, AnalyticsError> {
    let values = simple_returns(series)?
        .into_iter()
        .map(|r| r.map(|r| r * 100.0))
        .collect();

    let result = series.derive("daily_return_pct", values)?;
    tracing::debug!(observations = result.len(), "Computed daily returns");
    Ok(result)
}
