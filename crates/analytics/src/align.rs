use chrono::NaiveDate;
use core_types::TimeSeries;
use serde::Serialize;
use std::cmp::Ordering;

/// A benchmark and a strategy equity curve restricted to their shared dates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquityCurvePair {
    pub benchmark: TimeSeries,
    pub strategy: TimeSeries,
}

impl EquityCurvePair {
    pub fn len(&self) -> usize {
        self.benchmark.len()
    }

    /// An empty pair means the curves share no date; callers must check this
    /// before comparing anything.
    pub fn is_empty(&self) -> bool {
        self.benchmark.is_empty()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.benchmark.dates()
    }

    /// `(date, benchmark, strategy)` rows in date order.
    pub fn rows(&self) -> impl Iterator<Item = (NaiveDate, Option<f64>, Option<f64>)> + '_ {
        self.benchmark
            .iter()
            .zip(self.strategy.iter())
            .map(|(b, s)| (b.date, b.value, s.value))
    }
}

/// Inner-joins two equity curves on date.
///
/// Dates present in only one curve are dropped, not interpolated. Drops are
/// logged, because differing calendars silently narrow the comparison window.
pub fn align(benchmark: &TimeSeries, strategy: &TimeSeries) -> EquityCurvePair {
    let common = shared_dates(benchmark, strategy);

    let dropped_benchmark = benchmark.len() - common.len();
    let dropped_strategy = strategy.len() - common.len();
    if dropped_benchmark > 0 || dropped_strategy > 0 {
        tracing::warn!(
            shared = common.len(),
            dropped_benchmark,
            dropped_strategy,
            "Equity curves have different calendars; unmatched dates were dropped"
        );
    }

    EquityCurvePair {
        benchmark: benchmark.retain_dates(&common),
        strategy: strategy.retain_dates(&common),
    }
}

/// Merge-walks both ascending date axes and collects the dates they share.
fn shared_dates(a: &TimeSeries, b: &TimeSeries) -> Vec<NaiveDate> {
    let a = a.observations();
    let b = b.observations();
    let mut common = Vec::with_capacity(a.len().min(b.len()));
    let (mut i, mut j) = (0, 0);

    while i < a.len() && j < b.len() {
        match a[i].date.cmp(&b[j].date) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                common.push(a[i].date);
                i += 1;
                j += 1;
            }
        }
    }

    common
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve(name: &str, days: &[u32]) -> TimeSeries {
        let dates = days
            .iter()
            .map(|&d| NaiveDate::from_ymd_opt(2019, 4, d).unwrap())
            .collect();
        let values = days.iter().map(|&d| Some(1_000.0 + f64::from(d))).collect();
        TimeSeries::from_parts(Some(name.to_string()), dates, values).unwrap()
    }

    #[test]
    fn test_inner_join_on_dates() {
        let pair = align(&curve("buy_and_hold", &[1, 2, 3, 5]), &curve("strategy", &[1, 2, 4, 5]));
        let days: Vec<u32> = pair.dates().map(|d| chrono::Datelike::day(&d)).collect();

        assert_eq!(days, vec![1, 2, 5]);
        assert_eq!(pair.len(), 3);
        assert_eq!(pair.strategy.dates().collect::<Vec<_>>(), pair.benchmark.dates().collect::<Vec<_>>());
        assert_eq!(pair.benchmark.name(), Some("buy_and_hold"));
    }

    #[test]
    fn test_rows_pair_values_by_date() {
        let pair = align(&curve("a", &[1, 3]), &curve("b", &[3, 4]));
        let rows: Vec<_> = pair.rows().collect();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].1, Some(1_003.0));
        assert_eq!(rows[0].2, Some(1_003.0));
    }

    #[test]
    fn test_disjoint_curves_give_empty_pair() {
        let pair = align(&curve("a", &[1, 2]), &curve("b", &[3, 4]));
        assert!(pair.is_empty());
        assert!(pair.strategy.is_empty());
    }

    #[test]
    fn test_empty_input() {
        let pair = align(&TimeSeries::empty(None), &curve("b", &[1]));
        assert!(pair.is_empty());
    }
}
