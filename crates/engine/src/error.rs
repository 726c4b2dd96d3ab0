use series_types::SeriesError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// A transformation was requested that no dispatch case handles. This
    /// is a hard failure: the engine never falls back to identity.
    #[error("Unsupported transformation: {0}")]
    UnsupportedTransformation(String),

    /// A fixed window must hold at least one record.
    #[error("Invalid window size: {0}")]
    InvalidWindow(usize),

    /// A defensive invariant was violated. Reaching this indicates a bug in
    /// the engine, not bad caller input.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error(transparent)]
    Series(#[from] SeriesError),
}
