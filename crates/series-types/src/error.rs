use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SeriesError {
    #[error("Division by zero: the divisor record failed its zero predicate")]
    DivisionByZero,

    #[error("Duplicate key in functional series: {0}")]
    DuplicateKey(String),
}
