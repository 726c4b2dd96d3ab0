use crate::error::EngineError;
use series_types::{Record, Series, SeriesKey};

/// Reduces a series over expanding windows: for each key, the reducer sees
/// every record from the start of the series through that key, in key
/// order. One output record per input key — there is no warm-up gap, a
/// one-record window is reduced like any other.
pub fn expanding_window_reduce<K, R, F>(
    series: &Series<K, R>,
    reducer: F,
) -> Result<Series<K, R>, EngineError>
where
    K: SeriesKey,
    R: Record,
    F: Fn(&[R]) -> Result<R, EngineError>,
{
    let mut output = Series::new();
    let mut seen: Vec<R> = Vec::with_capacity(series.len());

    for (key, record) in series.iter() {
        seen.push(record.clone());
        let reduced = reducer(&seen)?;
        output.insert(key.clone(), reduced)?;
    }

    Ok(output)
}

/// Reduces a series over fixed-size rolling windows ending at each key.
///
/// Positions that have not yet accumulated `size` records emit the
/// `empty` sentinel instead of invoking the reducer, so the output always
/// has one record per input key. Reducers never see future keys.
///
/// The re-scan per key is O(n·size); outputs must match an incremental
/// implementation exactly, so the naive form is the reference.
pub fn fixed_window_reduce<K, R, F, E>(
    series: &Series<K, R>,
    size: usize,
    empty: E,
    reducer: F,
) -> Result<Series<K, R>, EngineError>
where
    K: SeriesKey,
    R: Record,
    F: Fn(&[R]) -> Result<R, EngineError>,
    E: Fn() -> R,
{
    if size == 0 {
        return Err(EngineError::InvalidWindow(size));
    }

    let records: Vec<R> = series.values().cloned().collect();
    let mut output = Series::new();

    for (position, (key, _)) in series.iter().enumerate() {
        let reduced = if position + 1 < size {
            empty()
        } else {
            let window = &records[position + 1 - size..=position];
            reducer(window)?
        };
        output.insert(key.clone(), reduced)?;
    }

    Ok(output)
}
