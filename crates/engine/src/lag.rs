use crate::error::EngineError;
use series_types::{CalendarKey, LagDaySelection, Record, Series};

/// Shifts every key of a calendar-keyed series by `days`, re-sorting the
/// output (the container keeps key order by construction).
///
/// A lag of zero returns an owned copy of the input, never an aliased
/// view. Weekday-mode lags can collapse a Saturday and a Sunday onto the
/// same weekday; the resulting duplicate key is reported as an error by
/// the functional container rather than silently dropped.
pub fn lag_series<K, R>(
    series: &Series<K, R>,
    days: i64,
    mode: LagDaySelection,
) -> Result<Series<K, R>, EngineError>
where
    K: CalendarKey,
    R: Record,
{
    if days == 0 {
        return Ok(series.clone());
    }

    tracing::debug!(days, ?mode, "lagging series keys");

    let mut output = Series::new();
    for (key, record) in series.iter() {
        output.insert(key.lag(days, mode), record.clone())?;
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use series_types::Observation;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn zero_lag_returns_an_equal_owned_copy() {
        let input = Series::from_records(vec![
            (date(1), Observation::new(dec!(1))),
            (date(4), Observation::new(dec!(2))),
        ])
        .unwrap();

        let output = lag_series(&input, 0, LagDaySelection::AnyDay).unwrap();
        assert_eq!(output, input);
    }

    #[test]
    fn any_day_lag_shifts_by_calendar_days() {
        let input = Series::from_records(vec![
            (date(1), Observation::new(dec!(1))),
            (date(2), Observation::new(dec!(2))),
        ])
        .unwrap();

        let output = lag_series(&input, 3, LagDaySelection::AnyDay).unwrap();
        let keys: Vec<_> = output.keys().cloned().collect();
        assert_eq!(keys, vec![date(4), date(5)]);
    }

    #[test]
    fn weekday_lag_steps_over_the_weekend() {
        // 2024-03-01 is a Friday: one weekday forward is Monday the 4th.
        let input = Series::from_records(vec![(date(1), Observation::new(dec!(1)))]).unwrap();
        let output = lag_series(&input, 1, LagDaySelection::Weekday).unwrap();
        assert_eq!(output.keys().next(), Some(&date(4)));
    }

    #[test]
    fn negative_lag_shifts_backwards() {
        let input = Series::from_records(vec![(date(4), Observation::new(dec!(1)))]).unwrap();
        let output = lag_series(&input, -1, LagDaySelection::Weekday).unwrap();
        assert_eq!(output.keys().next(), Some(&date(1)));
    }
}
