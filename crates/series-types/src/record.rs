use crate::accumulator::Accumulator;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Data-lineage flags carried by every record.
///
/// `is_rolled` marks a value carried forward from a prior period,
/// `is_synthetic` marks an imputed (never observed) value. Both propagate
/// as a logical OR through every record combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Provenance {
    pub is_rolled: bool,
    pub is_synthetic: bool,
}

impl Provenance {
    pub fn new(is_rolled: bool, is_synthetic: bool) -> Self {
        Self {
            is_rolled,
            is_synthetic,
        }
    }

    /// Combines two provenance sets. Rolled or synthetic lineage is sticky:
    /// once a computation has touched a rolled/synthetic record, its output
    /// carries the flag.
    pub fn merged(self, other: Self) -> Self {
        Self {
            is_rolled: self.is_rolled || other.is_rolled,
            is_synthetic: self.is_synthetic || other.is_synthetic,
        }
    }
}

/// The capability trait implemented once per record type.
///
/// A record is an immutable, multi-field decimal observation. All arithmetic
/// happens through the paired [`Accumulator`], which this trait hands out.
/// Fields are `Option<Decimal>`: `None` is the explicit "undefined" state
/// used for empty sentinels and division-by-zero fallout, never a stand-in
/// for zero.
pub trait Record: Clone + Debug + PartialEq + 'static {
    /// Number of decimal fields this record type carries.
    fn field_count() -> usize;

    /// The record's fields in declaration order.
    fn fields(&self) -> Vec<Option<Decimal>>;

    /// Rebuilds a record from a field slice produced by an accumulator.
    ///
    /// The slice length always equals [`Record::field_count`]; accumulators
    /// are seeded from a record of the same type.
    fn from_fields(fields: &[Option<Decimal>], provenance: Provenance) -> Self;

    fn provenance(&self) -> Provenance;

    /// The divide-by-zero guard predicate, consulted on the *divisor* before
    /// every division. True when any field is undefined or exactly zero.
    fn is_zero(&self) -> bool {
        self.fields().iter().any(|f| match f {
            Some(value) => value.is_zero(),
            None => true,
        })
    }

    /// True when at least one field holds a value. The canonical empty
    /// record is the only fully-undefined record a well-formed series
    /// should contain.
    fn is_defined(&self) -> bool {
        self.fields().iter().any(Option::is_some)
    }

    /// The canonical "no value yet" sentinel: every field undefined.
    fn empty() -> Self;

    /// The multiplicative identity: every field one.
    fn one() -> Self;

    /// Constructs the paired mutable accumulator, seeded from this record.
    fn accumulator(&self) -> Accumulator<Self> {
        Accumulator::seed(self)
    }
}
