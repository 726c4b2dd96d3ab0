use crate::error::EngineError;
use crate::lag::lag_series;
use crate::window::{expanding_window_reduce, fixed_window_reduce};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use series_types::{CalendarKey, LagDaySelection, Record, Series, SeriesKey};

pub type PointFn<R> = Box<dyn Fn(&R) -> Result<R, EngineError>>;
pub type VectorFn<R> = Box<dyn Fn(&[R]) -> Result<R, EngineError>>;
pub type ReferenceFn<R> = Box<dyn Fn(&R, &R) -> Result<R, EngineError>>;

/// How a reference-point transformation picks its reference record from
/// the window's valid (not fully undefined) records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferenceSelector {
    /// The earliest valid record in the window.
    FirstValid,
    /// The latest valid record in the window.
    LastValid,
    /// The field-wise maximum over the window's valid records.
    RunningMax,
    /// The field-wise minimum over the window's valid records.
    RunningMin,
}

/// The transformation taxonomy, decided once at configuration time.
///
/// The enum is closed and dispatch matches it exhaustively — adding a
/// variant is a compile error until every match site handles it. There is
/// no default arm and no silent identity fallback.
pub enum Transformation<R: Record> {
    /// An independent per-record mapping.
    Point(PointFn<R>),
    /// A reduction of a window of records to one record, run through the
    /// windowing engine (fixed or expanding per the configuration).
    Vector(VectorFn<R>),
    /// A function of the current record and one reference record selected
    /// from the same window. Windows with fewer than `min_points` valid
    /// records resolve to the type's empty record — that is not an error.
    ReferencePoint {
        apply: ReferenceFn<R>,
        selector: ReferenceSelector,
        min_points: usize,
    },
}

impl<R: Record> Transformation<R> {
    pub fn point<F>(f: F) -> Self
    where
        F: Fn(&R) -> Result<R, EngineError> + 'static,
    {
        Self::Point(Box::new(f))
    }

    pub fn vector<F>(f: F) -> Self
    where
        F: Fn(&[R]) -> Result<R, EngineError> + 'static,
    {
        Self::Vector(Box::new(f))
    }

    pub fn reference_point<F>(f: F, selector: ReferenceSelector, min_points: usize) -> Self
    where
        F: Fn(&R, &R) -> Result<R, EngineError> + 'static,
    {
        Self::ReferencePoint {
            apply: Box::new(f),
            selector,
            min_points,
        }
    }
}

/// Shared knobs for every dispatched transformation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformConfig {
    /// Final scalar multiplication applied to every output record. The
    /// default of one short-circuits to an exact copy — no multiplication
    /// is performed, so no decimal drift is introduced.
    pub scalar: Decimal,
    /// Fixed window size for vector and reference-point transforms.
    /// `None` selects expanding windows.
    pub observation_window: Option<usize>,
    /// Signed key shift applied to the finished output series.
    pub observation_lag: i64,
    /// Day-counting mode for the lag step.
    pub lag_day_selection: LagDaySelection,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            scalar: Decimal::ONE,
            observation_window: None,
            observation_lag: 0,
            lag_day_selection: LagDaySelection::AnyDay,
        }
    }
}

impl TransformConfig {
    pub fn with_scalar(mut self, scalar: Decimal) -> Self {
        self.scalar = scalar;
        self
    }

    pub fn with_window(mut self, size: usize) -> Self {
        self.observation_window = Some(size);
        self
    }

    pub fn with_lag(mut self, days: i64, mode: LagDaySelection) -> Self {
        self.observation_lag = days;
        self.lag_day_selection = mode;
        self
    }
}

/// Routes a transformation descriptor to the matching execution path and
/// wires the final scalar stage.
///
/// Works for any totally-ordered key. Configurations carrying a non-zero
/// `observation_lag` need calendar structure — use [`dispatch_with_lag`]
/// for those; here a non-zero lag is an invalid state.
pub fn dispatch<K, R>(
    series: &Series<K, R>,
    transformation: &Transformation<R>,
    config: &TransformConfig,
) -> Result<Series<K, R>, EngineError>
where
    K: SeriesKey,
    R: Record,
{
    if config.observation_lag != 0 {
        return Err(EngineError::InvalidState(
            "observation_lag requires a calendar key; use dispatch_with_lag".to_string(),
        ));
    }
    dispatch_unlagged(series, transformation, config)
}

/// [`dispatch`] for calendar-keyed series: additionally applies the
/// configured observation lag to the output keys.
pub fn dispatch_with_lag<K, R>(
    series: &Series<K, R>,
    transformation: &Transformation<R>,
    config: &TransformConfig,
) -> Result<Series<K, R>, EngineError>
where
    K: CalendarKey,
    R: Record,
{
    let output = dispatch_unlagged(series, transformation, config)?;
    lag_series(&output, config.observation_lag, config.lag_day_selection)
}

fn dispatch_unlagged<K, R>(
    series: &Series<K, R>,
    transformation: &Transformation<R>,
    config: &TransformConfig,
) -> Result<Series<K, R>, EngineError>
where
    K: SeriesKey,
    R: Record,
{
    tracing::debug!(
        window = ?config.observation_window,
        scalar = %config.scalar,
        "dispatching transformation"
    );

    let output = match transformation {
        Transformation::Point(apply) => {
            let mut output = Series::new();
            for (key, record) in series.iter() {
                output.insert(key.clone(), apply(record)?)?;
            }
            output
        }
        Transformation::Vector(reduce) => match config.observation_window {
            Some(size) => fixed_window_reduce(series, size, R::empty, reduce)?,
            None => expanding_window_reduce(series, reduce)?,
        },
        Transformation::ReferencePoint {
            apply,
            selector,
            min_points,
        } => {
            let reduce = |window: &[R]| reference_reduce(window, apply, *selector, *min_points);
            match config.observation_window {
                Some(size) => fixed_window_reduce(series, size, R::empty, reduce)?,
                None => expanding_window_reduce(series, reduce)?,
            }
        }
    };

    apply_scalar(output, config.scalar)
}

fn reference_reduce<R: Record>(
    window: &[R],
    apply: &ReferenceFn<R>,
    selector: ReferenceSelector,
    min_points: usize,
) -> Result<R, EngineError> {
    let valid: Vec<&R> = window.iter().filter(|r| r.is_defined()).collect();
    if valid.is_empty() || valid.len() < min_points {
        return Ok(R::empty());
    }

    let Some(current) = window.last() else {
        return Ok(R::empty());
    };

    let reference = match selector {
        ReferenceSelector::FirstValid => (*valid[0]).clone(),
        ReferenceSelector::LastValid => (*valid[valid.len() - 1]).clone(),
        ReferenceSelector::RunningMax => {
            let mut acc = valid[0].accumulator();
            for record in &valid[1..] {
                acc.max(record);
            }
            acc.into_record()
        }
        ReferenceSelector::RunningMin => {
            let mut acc = valid[0].accumulator();
            for record in &valid[1..] {
                acc.min(record);
            }
            acc.into_record()
        }
    };

    apply(current, &reference)
}

/// The final scalar stage. A scalar of exactly one returns the series as
/// is — no per-field multiplication, so the output is field-for-field
/// identical to its input.
fn apply_scalar<K, R>(series: Series<K, R>, scalar: Decimal) -> Result<Series<K, R>, EngineError>
where
    K: SeriesKey,
    R: Record,
{
    if scalar == Decimal::ONE {
        return Ok(series);
    }

    let mut output = Series::new();
    for (key, record) in series {
        let mut acc = record.accumulator();
        acc.scale(scalar);
        output.insert(key, acc.into_record())?;
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use series_types::Observation;

    fn series(values: &[Decimal]) -> Series<Decimal, Observation> {
        Series::from_records(
            values
                .iter()
                .enumerate()
                .map(|(i, v)| (Decimal::from(i), Observation::new(*v))),
        )
        .unwrap()
    }

    #[test]
    fn scalar_of_one_is_a_field_for_field_copy() {
        let input = series(&[dec!(1.10), dec!(2.20), dec!(3.30)]);
        let identity = Transformation::point(|r: &Observation| Ok(*r));
        let output = dispatch(&input, &identity, &TransformConfig::default()).unwrap();
        assert_eq!(output, input);
    }

    #[test]
    fn point_transform_maps_each_record_independently() {
        let input = series(&[dec!(-1), dec!(2), dec!(-3)]);
        let absolute = Transformation::point(|r: &Observation| {
            let mut acc = r.accumulator();
            acc.abs();
            Ok(acc.into_record())
        });
        let output = dispatch(&input, &absolute, &TransformConfig::default()).unwrap();
        let values: Vec<_> = output.values().map(|r| r.value()).collect();
        assert_eq!(values, vec![Some(dec!(1)), Some(dec!(2)), Some(dec!(3))]);
    }

    #[test]
    fn vector_transform_respects_the_configured_window() {
        let input = series(&[dec!(1), dec!(2), dec!(3)]);
        let last = Transformation::vector(|w: &[Observation]| Ok(w[w.len() - 1]));

        let fixed = dispatch(&input, &last, &TransformConfig::default().with_window(2)).unwrap();
        let values: Vec<_> = fixed.values().map(|r| r.value()).collect();
        assert_eq!(values, vec![None, Some(dec!(2)), Some(dec!(3))]);
    }

    #[test]
    fn reference_point_below_min_points_yields_empty() {
        let input = series(&[dec!(10), dec!(20)]);
        let diff = Transformation::reference_point(
            |current: &Observation, reference: &Observation| {
                let mut acc = current.accumulator();
                acc.subtract(reference);
                Ok(acc.into_record())
            },
            ReferenceSelector::FirstValid,
            2,
        );

        let output = dispatch(&input, &diff, &TransformConfig::default()).unwrap();
        let values: Vec<_> = output.values().map(|r| r.value()).collect();
        assert_eq!(values, vec![None, Some(dec!(10))]);
    }

    #[test]
    fn running_max_selector_tracks_the_window_peak() {
        let input = series(&[dec!(5), dec!(9), dec!(7)]);
        let peak = Transformation::reference_point(
            |_current: &Observation, reference: &Observation| Ok(*reference),
            ReferenceSelector::RunningMax,
            1,
        );
        let output = dispatch(&input, &peak, &TransformConfig::default()).unwrap();
        let values: Vec<_> = output.values().map(|r| r.value()).collect();
        assert_eq!(values, vec![Some(dec!(5)), Some(dec!(9)), Some(dec!(9))]);
    }

    #[test]
    fn scalar_stage_multiplies_every_field() {
        let input = series(&[dec!(1), dec!(2)]);
        let identity = Transformation::point(|r: &Observation| Ok(*r));
        let config = TransformConfig::default().with_scalar(dec!(100));
        let output = dispatch(&input, &identity, &config).unwrap();
        let values: Vec<_> = output.values().map(|r| r.value()).collect();
        assert_eq!(values, vec![Some(dec!(100)), Some(dec!(200))]);
    }

    #[test]
    fn dispatch_with_lag_shifts_output_keys() {
        use chrono::NaiveDate;

        let input = Series::from_records(vec![(
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            Observation::new(dec!(1)),
        )])
        .unwrap();
        let identity = Transformation::point(|r: &Observation| Ok(*r));
        let config = TransformConfig::default().with_lag(1, LagDaySelection::Weekday);

        let output = dispatch_with_lag(&input, &identity, &config).unwrap();
        // Friday + 1 weekday = Monday.
        assert_eq!(
            output.keys().next(),
            Some(&NaiveDate::from_ymd_opt(2024, 3, 4).unwrap())
        );
    }

    #[test]
    fn non_zero_lag_without_calendar_key_is_invalid_state() {
        let input = series(&[dec!(1)]);
        let identity = Transformation::point(|r: &Observation| Ok(*r));
        let config = TransformConfig::default().with_lag(1, LagDaySelection::AnyDay);
        assert!(matches!(
            dispatch(&input, &identity, &config),
            Err(EngineError::InvalidState(_))
        ));
    }
}
