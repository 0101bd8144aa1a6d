use crate::series::TimeSeries;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A price cell as delivered by an ingestion source, before any coercion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
    Null,
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<Option<f64>> for RawValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(RawValue::Null, RawValue::Number)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawObservation {
    pub date: NaiveDate,
    pub value: RawValue,
}

/// An uncleaned series straight from ingestion.
///
/// No invariant is enforced here: ordering is checked when the series is
/// cleaned into a `TimeSeries`, and malformed values are coerced there.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawSeries {
    pub name: Option<String>,
    pub observations: Vec<RawObservation>,
}

impl RawSeries {
    pub fn new(name: Option<String>, observations: Vec<RawObservation>) -> Self {
        Self { name, observations }
    }

    pub fn push(&mut self, date: NaiveDate, value: impl Into<RawValue>) {
        self.observations.push(RawObservation {
            date,
            value: value.into(),
        });
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

impl FromIterator<(NaiveDate, RawValue)> for RawSeries {
    fn from_iter<I: IntoIterator<Item = (NaiveDate, RawValue)>>(iter: I) -> Self {
        let observations = iter
            .into_iter()
            .map(|(date, value)| RawObservation { date, value })
            .collect();
        Self::new(None, observations)
    }
}

impl From<&TimeSeries> for RawSeries {
    fn from(series: &TimeSeries) -> Self {
        let observations = series
            .iter()
            .map(|o| RawObservation {
                date: o.date,
                value: o.value.into(),
            })
            .collect();
        Self::new(series.name().map(str::to_string), observations)
    }
}
