//! The named time-series transform library.
//!
//! Each transform is a pure function of `(series, parameters)` composing
//! the record/accumulator pair, the windowing engine, the transformation
//! dispatcher and the series combiner. Inputs are read-only; outputs are
//! freshly allocated series over the same keys (calendar lag excepted).

use crate::calendar;
use crate::error::TransformError;
use crate::reducers::{self, Classification};
use engine::{
    combine, dispatch, lag_series, CombineOperator, ReferenceSelector, TransformConfig,
    Transformation,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use series_types::{CalendarKey, LagDaySelection, Record, Series, SeriesKey};

/// The conventional starting value for wealth indices.
pub const DEFAULT_WEALTH_TARGET: Decimal = dec!(1000);

/// Window selection for the reducing transforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowSpec {
    /// The last n records ending at the current key.
    Fixed(usize),
    /// All records from the series start through the current key.
    Expanding,
}

impl WindowSpec {
    fn config(self) -> TransformConfig {
        match self {
            WindowSpec::Fixed(size) => TransformConfig::default().with_window(size),
            WindowSpec::Expanding => TransformConfig::default(),
        }
    }
}

/// current / reference − 1, the shared body of the return transforms.
fn return_transformation<R: Record>(selector: ReferenceSelector) -> Transformation<R> {
    Transformation::reference_point(
        |current: &R, reference: &R| {
            let mut acc = current.accumulator();
            if acc.divide(reference).is_err() {
                tracing::debug!("return against a zero reference; fields set undefined");
            }
            acc.add_scalar(Decimal::NEGATIVE_ONE);
            Ok(acc.into_record())
        },
        selector,
        2,
    )
}

/// Period-over-period return: each record against its immediate
/// predecessor. The first key has no predecessor and yields the empty
/// record.
pub fn observation_returns<K, R>(series: &Series<K, R>) -> Result<Series<K, R>, TransformError>
where
    K: SeriesKey,
    R: Record,
{
    let transform = return_transformation(ReferenceSelector::FirstValid);
    let config = TransformConfig::default().with_window(2);
    Ok(dispatch(series, &transform, &config)?)
}

/// Return of each record against the first valid record of the whole
/// series (a fixed reference, not the prior record).
pub fn cumulative_return<K, R>(series: &Series<K, R>) -> Result<Series<K, R>, TransformError>
where
    K: SeriesKey,
    R: Record,
{
    let transform = return_transformation(ReferenceSelector::FirstValid);
    Ok(dispatch(series, &transform, &TransformConfig::default())?)
}

/// Rebases the series so the first valid record equals `target`.
pub fn wealth<K, R>(series: &Series<K, R>, target: Decimal) -> Result<Series<K, R>, TransformError>
where
    K: SeriesKey,
    R: Record,
{
    rebase(series, series.first_valid().cloned(), target)
}

/// Rebases the series so the *last* valid record equals `target`.
pub fn wealth_reverse<K, R>(
    series: &Series<K, R>,
    target: Decimal,
) -> Result<Series<K, R>, TransformError>
where
    K: SeriesKey,
    R: Record,
{
    rebase(series, series.last_valid().cloned(), target)
}

fn rebase<K, R>(
    series: &Series<K, R>,
    reference: Option<R>,
    target: Decimal,
) -> Result<Series<K, R>, TransformError>
where
    K: SeriesKey,
    R: Record,
{
    let transform = match reference {
        Some(reference) => Transformation::point(move |record: &R| {
            let mut acc = record.accumulator();
            if acc.divide(&reference).is_err() {
                tracing::debug!("rebase against a zero reference; fields set undefined");
            }
            Ok(acc.into_record())
        }),
        // No valid record to rebase against: the whole output is empty
        // sentinels.
        None => Transformation::point(|_: &R| Ok(R::empty())),
    };
    let config = TransformConfig::default().with_scalar(target);
    Ok(dispatch(series, &transform, &config)?)
}

/// current / running-maximum − 1; zero at every new peak, negative in
/// between, never positive.
pub fn drawdown_percentage<K, R>(series: &Series<K, R>) -> Result<Series<K, R>, TransformError>
where
    K: SeriesKey,
    R: Record,
{
    let transform = Transformation::reference_point(
        |current: &R, peak: &R| {
            let mut acc = current.accumulator();
            if acc.divide(peak).is_err() {
                tracing::debug!("drawdown against a zero peak; fields set undefined");
            }
            acc.add_scalar(Decimal::NEGATIVE_ONE);
            Ok(acc.into_record())
        },
        ReferenceSelector::RunningMax,
        1,
    );
    Ok(dispatch(series, &transform, &TransformConfig::default())?)
}

/// current − running-maximum, the absolute-amount companion of
/// [`drawdown_percentage`].
pub fn drawdown_amount<K, R>(series: &Series<K, R>) -> Result<Series<K, R>, TransformError>
where
    K: SeriesKey,
    R: Record,
{
    let transform = Transformation::reference_point(
        |current: &R, peak: &R| {
            let mut acc = current.accumulator();
            acc.subtract(peak);
            Ok(acc.into_record())
        },
        ReferenceSelector::RunningMax,
        1,
    );
    Ok(dispatch(series, &transform, &TransformConfig::default())?)
}

/// Fixed-window arithmetic mean.
pub fn moving_average<K, R>(
    series: &Series<K, R>,
    window: usize,
) -> Result<Series<K, R>, TransformError>
where
    K: SeriesKey,
    R: Record,
{
    let transform = Transformation::vector(reducers::average);
    let config = TransformConfig::default().with_window(window);
    Ok(dispatch(series, &transform, &config)?)
}

/// Windowed or expanding standard deviation under the chosen denominator
/// convention. Windows with too few points for the convention yield the
/// empty record.
pub fn standard_deviation<K, R>(
    series: &Series<K, R>,
    window: WindowSpec,
    classification: Classification,
) -> Result<Series<K, R>, TransformError>
where
    K: SeriesKey,
    R: Record,
{
    let transform =
        Transformation::vector(move |w: &[R]| reducers::std_dev(w, classification));
    Ok(dispatch(series, &transform, &window.config())?)
}

/// Annualized volatility: observation returns, then windowed/expanding
/// standard deviation, scaled by the annualization multiplier of the
/// series' detected periodicity.
///
/// Calendar alignment is explicit: with `align_to_weekday_calendar` the
/// series is restricted to weekday keys *before* returns are computed.
/// The engine never resamples silently.
pub fn annualized_volatility<K, R>(
    series: &Series<K, R>,
    window: WindowSpec,
    classification: Classification,
    align_to_weekday_calendar: bool,
) -> Result<Series<K, R>, TransformError>
where
    K: CalendarKey,
    R: Record,
{
    let base = if align_to_weekday_calendar {
        calendar::restrict_to_weekdays(series)?
    } else {
        series.clone()
    };

    let periodicity = calendar::detect_periodicity(&base);
    let returns = observation_returns(&base)?;

    let transform =
        Transformation::vector(move |w: &[R]| reducers::std_dev(w, classification));
    let config = window
        .config()
        .with_scalar(periodicity.annualization_multiplier());
    Ok(dispatch(&returns, &transform, &config)?)
}

/// Exponentially weighted moving average with an expanding-span α
/// (see [`reducers::ewma`]).
pub fn ewma<K, R>(series: &Series<K, R>, window: WindowSpec) -> Result<Series<K, R>, TransformError>
where
    K: SeriesKey,
    R: Record,
{
    let transform = Transformation::vector(reducers::ewma);
    Ok(dispatch(series, &transform, &window.config())?)
}

/// Signed standard-deviation band: windowed moving average of cumulative
/// return plus k × windowed standard deviation of observation returns.
/// Negative k gives the lower band.
pub fn standard_deviation_band<K, R>(
    series: &Series<K, R>,
    window: usize,
    k: Decimal,
    classification: Classification,
) -> Result<Series<K, R>, TransformError>
where
    K: SeriesKey,
    R: Record,
{
    let center = moving_average(&cumulative_return(series)?, window)?;

    let returns = observation_returns(series)?;
    let transform =
        Transformation::vector(move |w: &[R]| reducers::std_dev(w, classification));
    let config = TransformConfig::default().with_window(window).with_scalar(k);
    let band_width = dispatch(&returns, &transform, &config)?;

    Ok(combine(&[
        (&center, CombineOperator::Add),
        (&band_width, CombineOperator::Add),
    ])?)
}

/// Shifts every key by `days` under the chosen day-selection mode,
/// re-sorting by the new key. A lag of zero returns an owned copy.
pub fn calendar_lag<K, R>(
    series: &Series<K, R>,
    days: i64,
    mode: LagDaySelection,
) -> Result<Series<K, R>, TransformError>
where
    K: CalendarKey,
    R: Record,
{
    Ok(lag_series(series, days, mode)?)
}
