use crate::error::AnalyticsError;
use core_types::{Granularity, Observation, PeriodKey, TimeSeries};
use rust_decimal::prelude::*;
use rust_decimal::RoundingStrategy;
use serde::Serialize;
use std::collections::BTreeMap;

/// The observations of one calendar period, summarized by their boundaries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodBucket {
    pub key: PeriodKey,
    /// Observation with the earliest date in the period.
    pub first_observation: Observation,
    /// Observation with the latest date in the period.
    pub last_observation: Observation,
    pub observations: usize,
}

/// Percentage change of the period's last close over the previous period's
/// last close, rounded to exactly two decimal places.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodReturn {
    pub period: PeriodKey,
    pub return_pct: Decimal,
}

/// Groups `series` into calendar buckets ordered by key.
///
/// Boundaries are chosen by date, not by position, so the result does not
/// depend on the order observations are visited in.
pub fn buckets(series: &TimeSeries, granularity: Granularity) -> Vec<PeriodBucket> {
    let mut grouped: BTreeMap<PeriodKey, PeriodBucket> = BTreeMap::new();

    for obs in series {
        let key = PeriodKey::of(obs.date, granularity);
        grouped
            .entry(key)
            .and_modify(|bucket| {
                if obs.date < bucket.first_observation.date {
                    bucket.first_observation = *obs;
                }
                if obs.date > bucket.last_observation.date {
                    bucket.last_observation = *obs;
                }
                bucket.observations += 1;
            })
            .or_insert(PeriodBucket {
                key,
                first_observation: *obs,
                last_observation: *obs,
                observations: 1,
            });
    }

    grouped.into_values().collect()
}

/// Period-over-period returns of a cleaned daily series.
///
/// The first period has no predecessor and is therefore absent from the
/// output, so `n` periods yield `n - 1` returns.
pub fn aggregate(series: &TimeSeries, granularity: Granularity) -> Result<Vec<PeriodReturn>, AnalyticsError> {
    let buckets = buckets(series, granularity);
    let closes = buckets
        .iter()
        .map(last_close)
        .collect::<Result<Vec<_>, _>>()?;

    let mut returns = Vec::with_capacity(buckets.len().saturating_sub(1));
    for (i, bucket) in buckets.iter().enumerate().skip(1) {
        let previous = closes[i - 1];
        let current = closes[i];

        if previous.is_zero() {
            return Err(AnalyticsError::DivisionByZero(format!(
                "{} return for {}: closing price of {} is zero",
                granularity.label(),
                bucket.key,
                buckets[i - 1].key
            )));
        }

        returns.push(PeriodReturn {
            period: bucket.key,
            return_pct: percent_change(previous, current)
                .ok_or_else(|| overflow(bucket.key, granularity))?,
        });
    }

    tracing::debug!(
        granularity = granularity.label(),
        periods = buckets.len(),
        returns = returns.len(),
        "Aggregated period returns"
    );

    Ok(returns)
}

fn last_close(bucket: &PeriodBucket) -> Result<Decimal, AnalyticsError> {
    let last = bucket.last_observation;
    let value = last.value.ok_or_else(|| {
        AnalyticsError::InvalidInput(format!(
            "period {} has no closing price on {}",
            bucket.key, last.date
        ))
    })?;

    Decimal::from_f64(value).ok_or_else(|| {
        AnalyticsError::InvalidInput(format!(
            "closing price {value} on {} cannot be represented as a decimal",
            last.date
        ))
    })
}

/// `(current - previous) * 100 / previous`, rounded half away from zero to
/// two places and always carrying a scale of two.
fn percent_change(previous: Decimal, current: Decimal) -> Option<Decimal> {
    let mut pct = current
        .checked_sub(previous)?
        .checked_mul(Decimal::ONE_HUNDRED)?
        .checked_div(previous)?
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    pct.rescale(2);
    Some(pct)
}

fn overflow(key: PeriodKey, granularity: Granularity) -> AnalyticsError {
    AnalyticsError::InvalidInput(format!(
        "{} return for {key} overflows decimal range",
        granularity.label()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn series(points: &[(NaiveDate, Option<f64>)]) -> TimeSeries {
        let observations = points.iter().map(|&(d, v)| Observation::new(d, v)).collect();
        TimeSeries::new(Some("close".into()), observations).unwrap()
    }

    #[test]
    fn test_monthly_returns_from_last_closes() {
        let s = series(&[
            (date(2024, 1, 2), Some(95.0)),
            (date(2024, 1, 31), Some(100.0)),
            (date(2024, 2, 1), Some(104.0)),
            (date(2024, 2, 29), Some(110.0)),
            (date(2024, 3, 15), Some(120.0)),
            (date(2024, 3, 28), Some(99.0)),
        ]);

        let returns = aggregate(&s, Granularity::Month).unwrap();

        assert_eq!(
            returns,
            vec![
                PeriodReturn {
                    period: PeriodKey::month(2024, 2),
                    return_pct: dec!(10.00),
                },
                PeriodReturn {
                    period: PeriodKey::month(2024, 3),
                    return_pct: dec!(-10.00),
                },
            ]
        );
        assert_eq!(returns[0].return_pct.to_string(), "10.00");
    }

    #[test]
    fn test_two_periods_give_one_return() {
        let s = series(&[(date(2020, 12, 31), Some(50.0)), (date(2021, 1, 4), Some(55.0))]);

        let yearly = aggregate(&s, Granularity::Year).unwrap();
        assert_eq!(yearly.len(), 1);
        assert_eq!(yearly[0].period, PeriodKey::year(2021));
        assert_eq!(yearly[0].return_pct, dec!(10));
    }

    #[rstest]
    #[case(&[])]
    #[case(&[(date(2022, 5, 2), Some(1.0)), (date(2022, 5, 3), Some(2.0))])]
    fn test_fewer_than_two_periods_give_no_returns(#[case] points: &[(NaiveDate, Option<f64>)]) {
        assert!(aggregate(&series(points), Granularity::Month).unwrap().is_empty());
    }

    #[test]
    fn test_bucket_boundaries() {
        let s = series(&[
            (date(2023, 11, 3), Some(1.0)),
            (date(2023, 11, 30), Some(2.0)),
            (date(2023, 12, 1), Some(3.0)),
        ]);
        let monthly = buckets(&s, Granularity::Month);

        assert_eq!(monthly.len(), 2);
        assert_eq!(monthly[0].first_observation.date, date(2023, 11, 3));
        assert_eq!(monthly[0].last_observation.value, Some(2.0));
        assert_eq!(monthly[0].observations, 2);
        assert_eq!(monthly[1].first_observation, monthly[1].last_observation);
        assert_eq!(buckets(&s, Granularity::Year).len(), 1);
    }

    #[test]
    fn test_zero_previous_close_is_division_by_zero() {
        let s = series(&[(date(2010, 1, 29), Some(0.0)), (date(2010, 2, 26), Some(5.0))]);
        assert!(matches!(
            aggregate(&s, Granularity::Month),
            Err(AnalyticsError::DivisionByZero(_))
        ));
    }

    #[test]
    fn test_missing_close_is_rejected() {
        let s = series(&[(date(2010, 1, 29), None), (date(2010, 2, 26), Some(5.0))]);
        assert!(matches!(
            aggregate(&s, Granularity::Month),
            Err(AnalyticsError::InvalidInput(_))
        ));
    }

    #[rstest]
    #[case(200.0, 200.01, dec!(0.01))]
    #[case(200.0, 199.99, dec!(-0.01))]
    #[case(3.0, 4.0, dec!(33.33))]
    #[case(3.0, 2.0, dec!(-33.33))]
    fn test_rounding_is_half_away_from_zero(#[case] previous: f64, #[case] current: f64, #[case] expected: Decimal) {
        let s = series(&[(date(2000, 1, 31), Some(previous)), (date(2000, 2, 29), Some(current))]);
        assert_eq!(aggregate(&s, Granularity::Month).unwrap()[0].return_pct, expected);
    }
}
