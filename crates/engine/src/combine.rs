use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use series_types::{Record, Series, SeriesKey};
use std::collections::BTreeSet;

/// The arithmetic a series contributes when combined with others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombineOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

/// Merges N key-aligned series under per-series operators, over the union
/// of all input keys.
///
/// For each key in the union, the accumulator is seeded from the first
/// listed series containing that key (whose operator is treated as
/// identity), then every later series that also has the key applies its
/// declared operator in list order. A series without the key contributes
/// nothing: the output for that key is the partial result of the series
/// that do have it.
///
/// A division-by-zero encountered along the way is local recovery, not an
/// abort: the affected fields come out undefined and the pass continues.
/// A union key found in no input series is impossible by construction and
/// is reported as an invalid state.
pub fn combine<K, R>(
    inputs: &[(&Series<K, R>, CombineOperator)],
) -> Result<Series<K, R>, EngineError>
where
    K: SeriesKey,
    R: Record,
{
    let union: BTreeSet<K> = inputs
        .iter()
        .flat_map(|(series, _)| series.keys().cloned())
        .collect();

    tracing::debug!(
        inputs = inputs.len(),
        keys = union.len(),
        "combining series over key union"
    );

    let mut output = Series::new();

    for key in union {
        let Some(seed_position) = inputs
            .iter()
            .position(|(series, _)| series.contains_key(&key))
        else {
            // Keys come from the union of the inputs, so every key is in at
            // least one series.
            return Err(EngineError::InvalidState(format!(
                "combine key {key:?} missing from every input series"
            )));
        };

        let mut acc = inputs[seed_position]
            .0
            .get(&key)
            .map(R::accumulator)
            .ok_or_else(|| {
                EngineError::InvalidState(format!("combine seed vanished for key {key:?}"))
            })?;

        for (series, operator) in &inputs[seed_position + 1..] {
            let Some(record) = series.get(&key) else {
                continue;
            };
            match operator {
                CombineOperator::Add => acc.add(record),
                CombineOperator::Subtract => acc.subtract(record),
                CombineOperator::Multiply => acc.multiply(record),
                CombineOperator::Divide => {
                    if acc.divide(record).is_err() {
                        tracing::debug!(key = ?key, "division by zero while combining; fields set undefined");
                    }
                }
            }
        }

        output.insert(key, acc.into_record())?;
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use series_types::Observation;

    fn series(pairs: &[(&str, Decimal)]) -> Series<String, Observation> {
        Series::from_records(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), Observation::new(*v))),
        )
        .unwrap()
    }

    #[test]
    fn combines_over_the_union_of_keys() {
        let left = series(&[("A", dec!(1)), ("B", dec!(2))]);
        let right = series(&[("B", dec!(3)), ("C", dec!(4))]);

        let output = combine(&[
            (&left, CombineOperator::Add),
            (&right, CombineOperator::Add),
        ])
        .unwrap();

        assert_eq!(output.len(), 3);
        assert_eq!(output.get(&"A".to_string()).unwrap().value(), Some(dec!(1)));
        assert_eq!(output.get(&"B".to_string()).unwrap().value(), Some(dec!(5)));
        assert_eq!(output.get(&"C".to_string()).unwrap().value(), Some(dec!(4)));
    }

    #[test]
    fn seed_comes_from_the_first_series_holding_the_key() {
        let left = series(&[("A", dec!(10))]);
        let right = series(&[("A", dec!(4)), ("B", dec!(7))]);

        // "B" is seeded from the second series; its Subtract is identity
        // for the seed, so B = 7, while A = 10 - 4.
        let output = combine(&[
            (&left, CombineOperator::Add),
            (&right, CombineOperator::Subtract),
        ])
        .unwrap();

        assert_eq!(output.get(&"A".to_string()).unwrap().value(), Some(dec!(6)));
        assert_eq!(output.get(&"B".to_string()).unwrap().value(), Some(dec!(7)));
    }

    #[test]
    fn operators_apply_in_list_order() {
        let a = series(&[("K", dec!(2))]);
        let b = series(&[("K", dec!(3))]);
        let c = series(&[("K", dec!(4))]);

        // (2 + 3) * 4 under list order, not 2 + (3 * 4).
        let output = combine(&[
            (&a, CombineOperator::Add),
            (&b, CombineOperator::Add),
            (&c, CombineOperator::Multiply),
        ])
        .unwrap();

        assert_eq!(
            output.get(&"K".to_string()).unwrap().value(),
            Some(dec!(20))
        );
    }

    #[test]
    fn divide_by_zero_recovers_locally() {
        let numerators = series(&[("A", dec!(8)), ("B", dec!(9))]);
        let divisors = series(&[("A", dec!(2)), ("B", dec!(0))]);

        let output = combine(&[
            (&numerators, CombineOperator::Add),
            (&divisors, CombineOperator::Divide),
        ])
        .unwrap();

        // A divides cleanly; B's fields are explicitly undefined, and the
        // combine still produced output for both keys.
        assert_eq!(output.get(&"A".to_string()).unwrap().value(), Some(dec!(4)));
        assert_eq!(output.get(&"B".to_string()).unwrap().value(), None);
    }

    #[test]
    fn empty_input_list_yields_empty_series() {
        let inputs: Vec<(&Series<String, Observation>, CombineOperator)> = Vec::new();
        let output = combine(&inputs).unwrap();
        assert!(output.is_empty());
    }
}
