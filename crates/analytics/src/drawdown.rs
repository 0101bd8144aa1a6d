use crate::error::AnalyticsError;
use chrono::NaiveDate;
use core_types::TimeSeries;
use serde::Serialize;

/// The running peak of a price series and the percentage decline from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawdownSeries {
    /// Highest value seen so far. Carried across missing positions.
    pub running_max: TimeSeries,
    /// `(value / running_max - 1) * 100`. Always `<= 0`.
    pub drawdown: TimeSeries,
}

impl DrawdownSeries {
    /// The deepest point of the drawdown curve, if any value is defined.
    pub fn max_drawdown(&self) -> Option<(NaiveDate, f64)> {
        self.drawdown
            .iter()
            .filter_map(|o| o.value.map(|v| (o.date, v)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    pub fn len(&self) -> usize {
        self.drawdown.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drawdown.is_empty()
    }
}

/// Computes the drawdown from the all-time high in a single pass.
///
/// The running maximum is seeded at the first non-missing value. A missing
/// value yields a missing drawdown and leaves the running maximum untouched.
/// Every defined price must be strictly positive.
pub fn drawdown(series: &TimeSeries) -> Result<DrawdownSeries, AnalyticsError> {
    if let Some(bad) = series.iter().find(|o| o.value.is_some_and(|v| v <= 0.0)) {
        return Err(AnalyticsError::InvalidInput(format!(
            "drawdown requires positive prices, got {} on {}",
            bad.value.unwrap_or_default(),
            bad.date
        )));
    }

    let mut peak: Option<f64> = None;
    let mut running_max = Vec::with_capacity(series.len());
    let mut drawdowns = Vec::with_capacity(series.len());

    for obs in series {
        match obs.value {
            Some(value) => {
                let current_peak = peak.map_or(value, |p| p.max(value));
                peak = Some(current_peak);
                running_max.push(Some(current_peak));
                drawdowns.push(Some((value / current_peak - 1.0) * 100.0));
            }
            None => {
                running_max.push(peak);
                drawdowns.push(None);
            }
        }
    }

    let result = DrawdownSeries {
        running_max: series.derive("running_max", running_max)?,
        drawdown: series.derive("drawdown_pct", drawdowns)?,
    };

    if let Some((date, depth)) = result.max_drawdown() {
        tracing::debug!(%date, depth, "Computed drawdown series");
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(values: &[Option<f64>]) -> TimeSeries {
        let dates = (1..=values.len() as u32)
            .map(|d| NaiveDate::from_ymd_opt(2021, 8, d).unwrap())
            .collect();
        TimeSeries::from_parts(None, dates, values.to_vec()).unwrap()
    }

    fn round2(v: f64) -> f64 {
        (v * 100.0).round() / 100.0
    }

    #[test]
    fn test_new_highs_and_dips() {
        let dd = drawdown(&series(&[Some(100.0), Some(102.0), Some(101.0), Some(105.0)])).unwrap();
        let values: Vec<f64> = dd.drawdown.values().into_iter().map(|v| round2(v.unwrap())).collect();

        assert_eq!(values, vec![0.0, 0.0, -0.98, 0.0]);
        assert_eq!(
            dd.running_max.values(),
            vec![Some(100.0), Some(102.0), Some(102.0), Some(105.0)]
        );
    }

    #[test]
    fn test_missing_values_do_not_reset_peak() {
        let dd = drawdown(&series(&[None, Some(50.0), None, Some(40.0)])).unwrap();

        assert_eq!(dd.running_max.values(), vec![None, Some(50.0), Some(50.0), Some(50.0)]);
        assert_eq!(dd.drawdown.values()[0], None);
        assert_eq!(dd.drawdown.values()[2], None);
        assert_eq!(round2(dd.drawdown.values()[3].unwrap()), -20.0);
    }

    #[test]
    fn test_non_positive_prices_are_rejected() {
        for bad in [0.0, -1.0] {
            let err = drawdown(&series(&[Some(10.0), Some(bad)])).unwrap_err();
            assert!(matches!(err, AnalyticsError::InvalidInput(_)));
        }
    }

    #[test]
    fn test_max_drawdown() {
        let dd = drawdown(&series(&[Some(10.0), Some(8.0), Some(12.0), Some(6.0), Some(7.0)])).unwrap();
        let (date, depth) = dd.max_drawdown().unwrap();

        assert_eq!(date, NaiveDate::from_ymd_opt(2021, 8, 4).unwrap());
        assert_eq!(round2(depth), -50.0);
        assert!(drawdown(&TimeSeries::empty(None)).unwrap().max_drawdown().is_none());
    }
}
