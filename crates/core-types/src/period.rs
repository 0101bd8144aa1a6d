use crate::enums::Granularity;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a calendar period: a whole year, or a month within a year.
///
/// Keys order chronologically. Keys of different granularities never meet in
/// the same aggregation, so the derived ordering (`month: None` first) is only
/// ever exercised between keys of one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PeriodKey {
    pub year: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
}

impl PeriodKey {
    pub fn year(year: i32) -> Self {
        Self { year, month: None }
    }

    pub fn month(year: i32, month: u32) -> Self {
        Self {
            year,
            month: Some(month),
        }
    }

    /// Truncates `date` to the period containing it.
    pub fn of(date: NaiveDate, granularity: Granularity) -> Self {
        match granularity {
            Granularity::Month => Self::month(date.year(), date.month()),
            Granularity::Year => Self::year(date.year()),
        }
    }

    pub fn granularity(&self) -> Granularity {
        match self.month {
            Some(_) => Granularity::Month,
            None => Granularity::Year,
        }
    }

    /// The first calendar day of the period, used to place a period on a date axis.
    pub fn start_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month.unwrap_or(1), 1)
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.month {
            Some(month) => write!(f, "{}-{:02}", self.year, month),
            None => write!(f, "{}", self.year),
        }
    }
}
