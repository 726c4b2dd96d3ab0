//! Calendar helpers: periodicity detection and weekday-grid alignment.

use crate::error::TransformError;
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use series_types::{CalendarKey, Record, Series};

/// Observation spacing detected from a series' keys, with the standard
/// annualization factor for each grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Periodicity {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Annual,
}

impl Periodicity {
    /// Observations per year on this grid (252 trading days for daily).
    pub fn annualization_factor(&self) -> Decimal {
        match self {
            Periodicity::Daily => dec!(252),
            Periodicity::Weekly => dec!(52),
            Periodicity::Monthly => dec!(12),
            Periodicity::Quarterly => dec!(4),
            Periodicity::Annual => dec!(1),
        }
    }

    /// The volatility scaling multiplier: the square root of the factor.
    pub fn annualization_multiplier(&self) -> Decimal {
        self.annualization_factor().sqrt().unwrap_or(Decimal::ONE)
    }

    /// Classifies a median whole-day gap between consecutive keys.
    pub fn from_median_day_gap(gap: i64) -> Self {
        match gap {
            i64::MIN..=1 => Periodicity::Daily,
            2..=7 => Periodicity::Weekly,
            8..=31 => Periodicity::Monthly,
            32..=92 => Periodicity::Quarterly,
            _ => Periodicity::Annual,
        }
    }
}

/// Detects the series' periodicity from the median gap between
/// consecutive keys. Fewer than two keys defaults to daily.
pub fn detect_periodicity<K, R>(series: &Series<K, R>) -> Periodicity
where
    K: CalendarKey,
    R: Record,
{
    let keys: Vec<&K> = series.keys().collect();
    if keys.len() < 2 {
        return Periodicity::Daily;
    }

    let mut gaps: Vec<i64> = keys
        .windows(2)
        .map(|pair| pair[0].days_between(pair[1]))
        .collect();
    gaps.sort_unstable();
    let median = gaps[gaps.len() / 2];

    let periodicity = Periodicity::from_median_day_gap(median);
    tracing::debug!(median_gap_days = median, ?periodicity, "detected periodicity");
    periodicity
}

/// Restricts a series to weekday-keyed observations. This is the explicit,
/// opt-in calendar alignment step for transforms that want a weekday grid;
/// it is never applied implicitly.
pub fn restrict_to_weekdays<K, R>(series: &Series<K, R>) -> Result<Series<K, R>, TransformError>
where
    K: CalendarKey,
    R: Record,
{
    let mut output = Series::new();
    for (key, record) in series.iter() {
        if key.is_weekday() {
            output.insert(key.clone(), record.clone())?;
        }
    }
    Ok(output)
}
