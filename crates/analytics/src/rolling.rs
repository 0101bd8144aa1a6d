//! Trailing-window statistics over a cleaned price series.
//!
//! Every function here returns a series aligned to the input dates. A
//! position is defined only when the full trailing window ending at it is
//! present and free of missing values; otherwise it carries the missing
//! marker. There is no partial-window averaging.

use crate::error::AnalyticsError;
use crate::returns::simple_returns;
use core_types::TimeSeries;
use serde::Serialize;

/// Bollinger-style volatility envelope around a moving average.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BollingerBands {
    pub window: usize,
    pub k: f64,
    pub middle: TimeSeries,
    pub upper: TimeSeries,
    pub lower: TimeSeries,
}

/// Trailing simple moving average.
pub fn moving_average(series: &TimeSeries, window: usize) -> Result<TimeSeries, AnalyticsError> {
    validate_window(window)?;
    let values = rolling(&series.values(), window, |w| Some(mean(w)));
    let result = series.derive(format!("ma_{window}"), values)?;
    tracing::debug!(window, observations = result.len(), "Computed moving average");
    Ok(result)
}

/// Trailing sample standard deviation (N-1 denominator).
///
/// A window of 1 has no sample deviation, so every position is missing.
pub fn rolling_std(series: &TimeSeries, window: usize) -> Result<TimeSeries, AnalyticsError> {
    validate_window(window)?;
    let values = rolling(&series.values(), window, sample_std);
    let result = series.derive(format!("std_{window}"), values)?;
    tracing::debug!(window, observations = result.len(), "Computed rolling standard deviation");
    Ok(result)
}

/// Upper and lower bands at `k` standard deviations around the moving average.
pub fn bollinger_bands(series: &TimeSeries, window: usize, k: f64) -> Result<BollingerBands, AnalyticsError> {
    if !k.is_finite() {
        return Err(AnalyticsError::InvalidInput(format!(
            "Bollinger multiplier must be finite, got {k}"
        )));
    }

    let middle = moving_average(series, window)?;
    let std = rolling_std(series, window)?;

    let (upper, lower): (Vec<_>, Vec<_>) = middle
        .iter()
        .zip(std.iter())
        .map(|(ma, sd)| match (ma.value, sd.value) {
            (Some(ma), Some(sd)) => (Some(ma + k * sd), Some(ma - k * sd)),
            _ => (None, None),
        })
        .unzip();

    Ok(BollingerBands {
        window,
        k,
        upper: series.derive(format!("bb_upper_{window}"), upper)?,
        lower: series.derive(format!("bb_lower_{window}"), lower)?,
        middle,
    })
}

/// Annualized rolling volatility of daily returns, in percent.
///
/// The sample standard deviation of the trailing `window` fractional returns,
/// scaled by `sqrt(periods_per_year)`. The first return is at position 1, so
/// the first defined value is at position `window`.
pub fn rolling_volatility(
    series: &TimeSeries,
    window: usize,
    periods_per_year: u32,
) -> Result<TimeSeries, AnalyticsError> {
    validate_window(window)?;
    if periods_per_year == 0 {
        return Err(AnalyticsError::InvalidInput(
            "periods per year must be positive".to_string(),
        ));
    }

    let scale = f64::from(periods_per_year).sqrt() * 100.0;
    let returns = simple_returns(series)?;
    let values = rolling(&returns, window, |w| sample_std(w).map(|sd| sd * scale));

    let result = series.derive(format!("volatility_{window}"), values)?;
    tracing::debug!(window, periods_per_year, "Computed rolling volatility");
    Ok(result)
}

fn validate_window(window: usize) -> Result<(), AnalyticsError> {
    if window == 0 {
        return Err(AnalyticsError::InvalidInput(
            "rolling window must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// Applies `stat` to each complete, gap-free trailing window.
fn rolling<F>(values: &[Option<f64>], window: usize, stat: F) -> Vec<Option<f64>>
where
    F: Fn(&[f64]) -> Option<f64>,
{
    let mut buffer = Vec::with_capacity(window);
    (0..values.len())
        .map(|end| {
            if end + 1 < window {
                return None;
            }
            buffer.clear();
            for value in &values[end + 1 - window..=end] {
                buffer.push((*value)?);
            }
            stat(&buffer)
        })
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(variance.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rstest::rstest;

    fn series(values: &[Option<f64>]) -> TimeSeries {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let dates = (0..values.len())
            .map(|i| start + chrono::Days::new(i as u64))
            .collect();
        TimeSeries::from_parts(Some("close".into()), dates, values.to_vec()).unwrap()
    }

    fn closes(values: &[f64]) -> TimeSeries {
        series(&values.iter().copied().map(Some).collect::<Vec<_>>())
    }

    fn assert_close(actual: Option<f64>, expected: f64) {
        let actual = actual.expect("value should be defined");
        assert!((actual - expected).abs() < 1e-9, "{actual} != {expected}");
    }

    #[test]
    fn test_moving_average_three_period() {
        let ma = moving_average(&closes(&[1.0, 2.0, 3.0, 4.0, 5.0]), 3).unwrap();
        assert_eq!(ma.values(), vec![None, None, Some(2.0), Some(3.0), Some(4.0)]);
        assert_eq!(ma.name(), Some("ma_3"));
    }

    #[test]
    fn test_window_longer_than_series_is_all_missing() {
        let ma = moving_average(&closes(&[1.0, 2.0]), 200).unwrap();
        assert_eq!(ma.values(), vec![None, None]);
    }

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(4)]
    fn test_warm_up_positions_are_missing(#[case] window: usize) {
        let ma = moving_average(&closes(&[3.0, 1.0, 4.0, 1.0, 5.0, 9.0]), window).unwrap();
        let values = ma.values();
        assert!(values[..window - 1].iter().all(Option::is_none));
        assert!(values[window - 1..].iter().all(Option::is_some));
    }

    #[test]
    fn test_missing_value_poisons_every_window_that_spans_it() {
        let ma = moving_average(&series(&[Some(1.0), Some(2.0), None, Some(4.0), Some(5.0), Some(6.0)]), 2).unwrap();
        assert_eq!(ma.values(), vec![None, Some(1.5), None, None, Some(4.5), Some(5.5)]);
    }

    #[test]
    fn test_zero_window_is_rejected() {
        assert!(matches!(
            moving_average(&closes(&[1.0]), 0),
            Err(AnalyticsError::InvalidInput(_))
        ));
        assert!(rolling_std(&closes(&[1.0]), 0).is_err());
    }

    #[test]
    fn test_rolling_std_uses_sample_definition() {
        let sd = rolling_std(&closes(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]), 8).unwrap();
        // Sum of squared deviations is 32 over 7 degrees of freedom.
        assert_close(sd.values()[7], (32.0_f64 / 7.0).sqrt());
    }

    #[test]
    fn test_rolling_std_window_of_one_is_undefined() {
        let sd = rolling_std(&closes(&[1.0, 2.0, 3.0]), 1).unwrap();
        assert_eq!(sd.values(), vec![None, None, None]);
    }

    #[test]
    fn test_bollinger_bands() {
        let bands = bollinger_bands(&closes(&[1.0, 2.0, 3.0, 4.0]), 3, 2.0).unwrap();
        assert!(bands.upper.values()[..2].iter().all(Option::is_none));
        assert_eq!(bands.lower.values()[1], None);
        // Window [1, 2, 3]: mean 2, sample std 1.
        assert_close(bands.upper.values()[2], 4.0);
        assert_close(bands.lower.values()[2], 0.0);
        assert_close(bands.middle.values()[3], 3.0);
        assert_eq!(bands.upper.name(), Some("bb_upper_3"));
    }

    #[test]
    fn test_bollinger_gap_inside_window_is_missing() {
        let s = series(&[Some(1.0), Some(2.0), Some(3.0), None, Some(5.0), Some(6.0), Some(7.0), Some(8.0)]);
        let bands = bollinger_bands(&s, 3, 2.0).unwrap();

        // Windows ending at positions 3, 4 and 5 all span the gap.
        for i in 3..=5 {
            assert_eq!(bands.middle.values()[i], None, "middle at {i}");
            assert_eq!(bands.upper.values()[i], None, "upper at {i}");
            assert_eq!(bands.lower.values()[i], None, "lower at {i}");
        }
        // Window [5, 6, 7] is complete again.
        assert_close(bands.middle.values()[6], 6.0);
        assert_close(bands.upper.values()[6], 8.0);
        assert_close(bands.lower.values()[6], 4.0);
    }

    #[test]
    fn test_bollinger_rejects_non_finite_multiplier() {
        assert!(bollinger_bands(&closes(&[1.0, 2.0]), 2, f64::NAN).is_err());
    }

    #[test]
    fn test_rolling_volatility() {
        // Returns: +10%, -10%, +10%.
        let vol = rolling_volatility(&closes(&[100.0, 110.0, 99.0, 108.9]), 3, 252).unwrap();
        let values = vol.values();
        assert!(values[..3].iter().all(Option::is_none));

        let returns = [0.1, -0.1, 0.1];
        let expected = sample_std(&returns).unwrap() * 252_f64.sqrt() * 100.0;
        assert_close(values[3], expected);
    }

    #[test]
    fn test_rolling_volatility_rejects_zero_periods() {
        assert!(rolling_volatility(&closes(&[1.0, 2.0, 3.0]), 2, 0).is_err());
    }
}
