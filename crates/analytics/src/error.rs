use core_types::CoreError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: Division by zero encountered in {0}")]
    DivisionByZero(String),
}

// Series invariant violations (ordering, length) are invalid input from the
// point of view of every calculation in this crate.
impl From<CoreError> for AnalyticsError {
    fn from(error: CoreError) -> Self {
        AnalyticsError::InvalidInput(error.to_string())
    }
}
