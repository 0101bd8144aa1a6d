use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The calendar period a daily series is bucketed into for period returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Month,
    Year,
}

impl Granularity {
    /// A human readable label, used for series names and table headers.
    pub fn label(&self) -> &'static str {
        match self {
            Granularity::Month => "monthly",
            Granularity::Year => "yearly",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Granularity::Month => write!(f, "month"),
            Granularity::Year => write!(f, "year"),
        }
    }
}

impl FromStr for Granularity {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "month" | "monthly" | "m" => Ok(Granularity::Month),
            "year" | "yearly" | "y" => Ok(Granularity::Year),
            other => Err(CoreError::InvalidInput(
                "granularity".to_string(),
                format!("'{other}' is not one of month, year"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("month", Granularity::Month)]
    #[case("Monthly", Granularity::Month)]
    #[case(" year ", Granularity::Year)]
    #[case("y", Granularity::Year)]
    fn test_parse_granularity(#[case] input: &str, #[case] expected: Granularity) {
        assert_eq!(input.parse::<Granularity>().unwrap(), expected);
    }

    #[test]
    fn test_parse_unknown_granularity() {
        let err = "week".parse::<Granularity>().unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(field, _) if field == "granularity"));
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for g in [Granularity::Month, Granularity::Year] {
            assert_eq!(g.to_string().parse::<Granularity>().unwrap(), g);
        }
    }
}
