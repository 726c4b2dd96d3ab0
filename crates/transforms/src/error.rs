use engine::EngineError;
use series_types::SeriesError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransformError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Series(#[from] SeriesError),
}
