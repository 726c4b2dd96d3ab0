//! The vector reducer set: window-of-records to one record.
//!
//! Every reducer skips records with no defined fields (the empty sentinels
//! a warm-up gap feeds downstream), so chained transforms compose without
//! special-casing. A window with no valid records reduces to the empty
//! record.

use engine::EngineError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use series_types::Record;

/// Variance/standard-deviation denominator convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Classification {
    /// Denominator n − 1; undefined for n ≤ 1.
    Sample,
    /// Denominator n.
    Population,
}

fn valid_records<R: Record>(window: &[R]) -> Vec<&R> {
    window.iter().filter(|r| r.is_defined()).collect()
}

pub fn sum<R: Record>(window: &[R]) -> Result<R, EngineError> {
    let valid = valid_records(window);
    let Some((first, rest)) = valid.split_first() else {
        return Ok(R::empty());
    };
    let mut acc = first.accumulator();
    for record in rest {
        acc.add(record);
    }
    Ok(acc.into_record())
}

pub fn average<R: Record>(window: &[R]) -> Result<R, EngineError> {
    let count = valid_records(window).len();
    if count == 0 {
        return Ok(R::empty());
    }
    let total = sum(window)?;
    let mut acc = total.accumulator();
    acc.scale(Decimal::ONE / Decimal::from(count));
    Ok(acc.into_record())
}

pub fn min<R: Record>(window: &[R]) -> Result<R, EngineError> {
    fold_select(window, |acc, record| acc.min(record))
}

pub fn max<R: Record>(window: &[R]) -> Result<R, EngineError> {
    fold_select(window, |acc, record| acc.max(record))
}

fn fold_select<R, F>(window: &[R], step: F) -> Result<R, EngineError>
where
    R: Record,
    F: Fn(&mut series_types::Accumulator<R>, &R),
{
    let valid = valid_records(window);
    let Some((first, rest)) = valid.split_first() else {
        return Ok(R::empty());
    };
    let mut acc = first.accumulator();
    for record in rest {
        step(&mut acc, record);
    }
    Ok(acc.into_record())
}

pub fn variance<R: Record>(
    window: &[R],
    classification: Classification,
) -> Result<R, EngineError> {
    let valid = valid_records(window);
    let count = valid.len();

    let denominator = match classification {
        Classification::Population if count >= 1 => count,
        Classification::Sample if count >= 2 => count - 1,
        // Too few points for the chosen convention: undefined, not an error.
        _ => return Ok(R::empty()),
    };

    let mean = average(window)?;

    let mut total: Option<series_types::Accumulator<R>> = None;
    for record in valid {
        let mut deviation = record.accumulator();
        deviation.subtract(&mean);
        let deviation = deviation.into_record();

        let mut squared = deviation.accumulator();
        squared.multiply(&deviation);
        let squared = squared.into_record();

        match total.as_mut() {
            Some(acc) => acc.add(&squared),
            None => total = Some(squared.accumulator()),
        }
    }

    let Some(mut acc) = total else {
        return Ok(R::empty());
    };
    acc.scale(Decimal::ONE / Decimal::from(denominator));
    Ok(acc.into_record())
}

pub fn std_dev<R: Record>(window: &[R], classification: Classification) -> Result<R, EngineError> {
    let variance = variance(window, classification)?;
    let mut acc = variance.accumulator();
    acc.sqrt();
    Ok(acc.into_record())
}

/// Exponentially weighted moving average over the window.
///
/// The first valid record seeds the average; every later valid record at
/// running count n (including itself) folds in with α = 2 / (n + 1), so a
/// single-record window is returned exactly as seeded.
pub fn ewma<R: Record>(window: &[R]) -> Result<R, EngineError> {
    let mut current: Option<R> = None;
    let mut count = 0usize;

    for record in window.iter().filter(|r| r.is_defined()) {
        count += 1;
        current = match current.take() {
            None => Some(record.clone()),
            Some(previous) => {
                let alpha = Decimal::TWO / Decimal::from(count + 1);

                let mut decayed = previous.accumulator();
                decayed.scale(Decimal::ONE - alpha);

                let mut weighted = record.accumulator();
                weighted.scale(alpha);
                let weighted = weighted.into_record();

                decayed.add(&weighted);
                Some(decayed.into_record())
            }
        };
    }

    Ok(current.unwrap_or_else(R::empty))
}

/// Z-score of the window's latest record against the window's mean and
/// standard deviation. A zero or undefined deviation yields undefined
/// fields via the division-by-zero signal.
pub fn zscore<R: Record>(window: &[R], classification: Classification) -> Result<R, EngineError> {
    let Some(current) = window.iter().rev().find(|r| r.is_defined()) else {
        return Ok(R::empty());
    };

    let mean = average(window)?;
    let deviation = std_dev(window, classification)?;

    let mut acc = current.accumulator();
    acc.subtract(&mean);
    if acc.divide(&deviation).is_err() {
        tracing::debug!("zscore over a degenerate window; fields set undefined");
    }
    Ok(acc.into_record())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use series_types::Observation;

    fn window(values: &[Decimal]) -> Vec<Observation> {
        values.iter().map(|v| Observation::new(*v)).collect()
    }

    #[test]
    fn sum_and_average_skip_undefined_records() {
        let mut records = window(&[dec!(2), dec!(4)]);
        records.insert(1, Observation::empty());

        assert_eq!(sum(&records).unwrap().value(), Some(dec!(6)));
        assert_eq!(average(&records).unwrap().value(), Some(dec!(3)));
    }

    #[test]
    fn min_max_over_window() {
        let records = window(&[dec!(5), dec!(1), dec!(9)]);
        assert_eq!(min(&records).unwrap().value(), Some(dec!(1)));
        assert_eq!(max(&records).unwrap().value(), Some(dec!(9)));
    }

    #[test]
    fn sample_and_population_standard_deviation() {
        // The classic eight-point set: population 2.0, sample ~2.138.
        let records = window(&[
            dec!(2),
            dec!(4),
            dec!(4),
            dec!(4),
            dec!(5),
            dec!(5),
            dec!(7),
            dec!(9),
        ]);

        let population = std_dev(&records, Classification::Population).unwrap();
        assert_eq!(
            population.value().map(|v| v.round_dp(6)),
            Some(dec!(2.000000))
        );

        let sample = std_dev(&records, Classification::Sample).unwrap();
        assert_eq!(sample.value().map(|v| v.round_dp(3)), Some(dec!(2.138)));
    }

    #[test]
    fn sample_variance_needs_two_points() {
        let records = window(&[dec!(42)]);
        let out = variance(&records, Classification::Sample).unwrap();
        assert!(!out.is_defined());

        // Population variance of a single point is zero, not undefined.
        let out = variance(&records, Classification::Population).unwrap();
        assert_eq!(out.value(), Some(dec!(0)));
    }

    #[test]
    fn ewma_of_single_record_is_the_record() {
        let records = window(&[dec!(7.25)]);
        assert_eq!(ewma(&records).unwrap().value(), Some(dec!(7.25)));
    }

    #[test]
    fn ewma_blends_with_growing_alpha() {
        // Second record: alpha = 2/3, so ewma = 1*(1/3) + 4*(2/3) = 3.
        let records = window(&[dec!(1), dec!(4)]);
        assert_eq!(
            ewma(&records).unwrap().value().map(|v| v.round_dp(10)),
            Some(dec!(3))
        );
    }

    #[test]
    fn zscore_of_constant_window_is_undefined() {
        let records = window(&[dec!(5), dec!(5), dec!(5)]);
        let out = zscore(&records, Classification::Population).unwrap();
        assert!(!out.is_defined());
    }

    #[test]
    fn empty_window_reduces_to_empty_record() {
        let records: Vec<Observation> = Vec::new();
        assert!(!sum(&records).unwrap().is_defined());
        assert!(!average(&records).unwrap().is_defined());
        assert!(!ewma(&records).unwrap().is_defined());
    }
}
