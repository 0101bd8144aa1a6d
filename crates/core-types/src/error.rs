use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Invalid input for {0}: {1}")]
    InvalidInput(String, String),

    #[error("Dates must be strictly increasing: {current} follows {previous}")]
    NotAscending {
        previous: NaiveDate,
        current: NaiveDate,
    },

    #[error("Series length mismatch: {dates} dates vs {values} values")]
    LengthMismatch { dates: usize, values: usize },
}
