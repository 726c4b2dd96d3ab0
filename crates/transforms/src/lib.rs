//! # Meridian Transforms
//!
//! The named time-series transform library: returns, wealth indices,
//! drawdowns, moving averages, standard deviations, annualized volatility,
//! EWMA, standard-deviation bands and calendar lags, composed from the
//! windowing engine, the transformation dispatcher and the series combiner.
//!
//! Every transform is a pure function from a read-only series to a newly
//! allocated one. Insufficient data is never an error: it resolves to the
//! record type's empty sentinel at the affected keys.

pub mod calendar;
pub mod error;
pub mod functions;
pub mod reducers;

// Re-export the key components to create a clean, public-facing API.
pub use calendar::{detect_periodicity, restrict_to_weekdays, Periodicity};
pub use error::TransformError;
pub use functions::{
    annualized_volatility, calendar_lag, cumulative_return, drawdown_amount,
    drawdown_percentage, ewma, moving_average, observation_returns, standard_deviation,
    standard_deviation_band, wealth, wealth_reverse, WindowSpec, DEFAULT_WEALTH_TARGET,
};
pub use reducers::Classification;
