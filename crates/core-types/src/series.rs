use crate::error::CoreError;
use chrono::NaiveDate;
use serde::Serialize;

/// A single dated value. `None` is the explicit "missing" marker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

impl Observation {
    pub fn new(date: NaiveDate, value: Option<f64>) -> Self {
        Self { date, value }
    }

    pub fn is_missing(&self) -> bool {
        self.value.is_none()
    }
}

/// An ordered, immutable series of daily observations.
///
/// Dates are strictly increasing. Every transformation in the workspace
/// produces a new `TimeSeries`; nothing mutates one after construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeries {
    name: Option<String>,
    observations: Vec<Observation>,
}

impl TimeSeries {
    /// Builds a series, rejecting unordered or duplicate dates and non-finite values.
    pub fn new(name: Option<String>, observations: Vec<Observation>) -> Result<Self, CoreError> {
        ensure_ascending(observations.iter().map(|o| o.date))?;
        ensure_finite(&observations)?;
        Ok(Self { name, observations })
    }

    /// Builds a series from parallel date and value vectors.
    pub fn from_parts(
        name: Option<String>,
        dates: Vec<NaiveDate>,
        values: Vec<Option<f64>>,
    ) -> Result<Self, CoreError> {
        if dates.len() != values.len() {
            return Err(CoreError::LengthMismatch {
                dates: dates.len(),
                values: values.len(),
            });
        }

        let observations = dates
            .into_iter()
            .zip(values)
            .map(|(date, value)| Observation::new(date, value))
            .collect();

        Self::new(name, observations)
    }

    pub fn empty(name: Option<String>) -> Self {
        Self {
            name,
            observations: Vec::new(),
        }
    }

    /// A new series on this series' dates carrying `values`.
    ///
    /// This is how derived series (averages, drawdowns, ...) are produced: the
    /// date axis is reused as-is, so only the values are checked.
    pub fn derive(&self, name: impl Into<String>, values: Vec<Option<f64>>) -> Result<Self, CoreError> {
        if values.len() != self.observations.len() {
            return Err(CoreError::LengthMismatch {
                dates: self.observations.len(),
                values: values.len(),
            });
        }

        let observations: Vec<Observation> = self
            .observations
            .iter()
            .zip(values)
            .map(|(o, value)| Observation::new(o.date, value))
            .collect();
        ensure_finite(&observations)?;

        Ok(Self {
            name: Some(name.into()),
            observations,
        })
    }

    /// The subset of this series on `dates`, which must be sorted ascending.
    ///
    /// A subset of an ordered series is still ordered, so this cannot fail.
    #[must_use]
    pub fn retain_dates(&self, dates: &[NaiveDate]) -> Self {
        let observations = self
            .observations
            .iter()
            .filter(|o| dates.binary_search(&o.date).is_ok())
            .copied()
            .collect();

        Self {
            name: self.name.clone(),
            observations,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn with_name(self, name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..self
        }
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Observation> {
        self.observations.iter()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.observations.iter().map(|o| o.date)
    }

    pub fn values(&self) -> Vec<Option<f64>> {
        self.observations.iter().map(|o| o.value).collect()
    }

    pub fn first(&self) -> Option<&Observation> {
        self.observations.first()
    }

    pub fn last(&self) -> Option<&Observation> {
        self.observations.last()
    }

    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.observations.first(), self.observations.last()) {
            (Some(first), Some(last)) => Some((first.date, last.date)),
            _ => None,
        }
    }

    /// Looks up the observation on `date`.
    pub fn get(&self, date: NaiveDate) -> Option<&Observation> {
        self.observations
            .binary_search_by_key(&date, |o| o.date)
            .ok()
            .map(|idx| &self.observations[idx])
    }

    /// Number of observations carrying the missing marker.
    pub fn missing_count(&self) -> usize {
        self.observations.iter().filter(|o| o.is_missing()).count()
    }
}

impl<'a> IntoIterator for &'a TimeSeries {
    type Item = &'a Observation;
    type IntoIter = std::slice::Iter<'a, Observation>;

    fn into_iter(self) -> Self::IntoIter {
        self.observations.iter()
    }
}

/// Checks that `dates` are strictly increasing.
pub fn ensure_ascending(dates: impl IntoIterator<Item = NaiveDate>) -> Result<(), CoreError> {
    let mut previous: Option<NaiveDate> = None;
    for current in dates {
        if let Some(previous) = previous
            && current <= previous
        {
            return Err(CoreError::NotAscending { previous, current });
        }
        previous = Some(current);
    }
    Ok(())
}

/// NaN and infinities are not prices; missing data must use `None`.
fn ensure_finite(observations: &[Observation]) -> Result<(), CoreError> {
    match observations.iter().find(|o| o.value.is_some_and(|v| !v.is_finite())) {
        Some(bad) => Err(CoreError::InvalidInput(
            "value".to_string(),
            format!("{} on {} is not a finite number", bad.value.unwrap_or_default(), bad.date),
        )),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn series(values: &[Option<f64>]) -> TimeSeries {
        let dates = (1..=values.len() as u32).map(day).collect();
        TimeSeries::from_parts(Some("close".to_string()), dates, values.to_vec()).unwrap()
    }

    #[test]
    fn test_rejects_duplicate_dates() {
        let err = TimeSeries::new(
            None,
            vec![Observation::new(day(1), Some(1.0)), Observation::new(day(1), Some(2.0))],
        )
        .unwrap_err();
        assert_eq!(
            err,
            CoreError::NotAscending {
                previous: day(1),
                current: day(1)
            }
        );
    }

    #[test]
    fn test_rejects_descending_dates() {
        let result = TimeSeries::from_parts(None, vec![day(3), day(2)], vec![Some(1.0), Some(2.0)]);
        assert!(matches!(result, Err(CoreError::NotAscending { .. })));
    }

    #[rstest]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    #[case(f64::NEG_INFINITY)]
    fn test_rejects_non_finite_values(#[case] bad: f64) {
        let result = TimeSeries::from_parts(None, vec![day(1), day(2)], vec![Some(bad), Some(5.0)]);
        assert!(matches!(result, Err(CoreError::InvalidInput(..))));

        let result = TimeSeries::new(None, vec![Observation::new(day(1), Some(bad))]);
        assert!(matches!(result, Err(CoreError::InvalidInput(..))));

        let source = series(&[Some(1.0), None]);
        assert!(matches!(
            source.derive("ratio", vec![None, Some(bad)]),
            Err(CoreError::InvalidInput(..))
        ));
    }

    #[test]
    fn test_length_mismatch() {
        let result = TimeSeries::from_parts(None, vec![day(1)], vec![]);
        assert_eq!(result, Err(CoreError::LengthMismatch { dates: 1, values: 0 }));
    }

    #[test]
    fn test_derive_keeps_dates_and_does_not_touch_source() {
        let source = series(&[Some(1.0), None, Some(3.0)]);
        let derived = source.derive("double", vec![Some(2.0), None, Some(6.0)]).unwrap();

        assert_eq!(derived.name(), Some("double"));
        assert_eq!(derived.dates().collect::<Vec<_>>(), source.dates().collect::<Vec<_>>());
        assert_eq!(source.values(), vec![Some(1.0), None, Some(3.0)]);
        assert!(source.derive("short", vec![Some(1.0)]).is_err());
    }

    #[test]
    fn test_retain_dates() {
        let s = series(&[Some(1.0), Some(2.0), Some(3.0), Some(4.0)]);
        let subset = s.retain_dates(&[day(2), day(4), day(7)]);

        assert_eq!(subset.dates().collect::<Vec<_>>(), vec![day(2), day(4)]);
        assert_eq!(subset.values(), vec![Some(2.0), Some(4.0)]);
        assert_eq!(subset.name(), Some("close"));
    }

    #[test]
    fn test_lookup_and_range() {
        let s = series(&[Some(10.0), None, Some(30.0)]);
        assert_eq!(s.get(day(3)).and_then(|o| o.value), Some(30.0));
        assert!(s.get(day(9)).is_none());
        assert_eq!(s.date_range(), Some((day(1), day(3))));
        assert_eq!(s.missing_count(), 1);
        assert_eq!(TimeSeries::empty(None).date_range(), None);
    }

    #[test]
    fn test_serializes_missing_as_null() {
        let s = series(&[Some(1.5), None]);
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["observations"][0]["value"], 1.5);
        assert!(json["observations"][1]["value"].is_null());
    }
}
